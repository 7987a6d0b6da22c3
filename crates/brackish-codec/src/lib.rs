//! # brackish-codec - CDC to SQL translation
//!
//! Translates change-data-capture events and full-load snapshots from
//! heterogeneous sources into SQL statements for an analytical sink with
//! semi-structured OBJECT columns.
//!
//! ## Features
//!
//! - `dms` - AWS DMS envelope translation (DDL, DML, two column-mapping strategies)
//! - `dynamodb` - DynamoDB Streams and table-scan translation
//! - `mongodb` - MongoDB change stream and collection-scan translation
//! - `full` - All sources
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌────────────────┐
//! │  AWS DMS  │   │  DynamoDB  │   │    MongoDB     │
//! │ envelopes │   │  Streams   │   │ Change Streams │
//! └─────┬─────┘   └─────┬──────┘   └───────┬────────┘
//!       │               │                  │
//!       ▼               ▼                  ▼
//! ┌──────────────────────────────────────────────────┐
//! │        per-source translators: to_sql(event)     │
//! │   shared: stores, record splitting, transforms   │
//! └────────────────────────┬─────────────────────────┘
//!                          ▼
//! ┌──────────────────────────────────────────────────┐
//! │      SqlOperation { statement, parameters }      │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Translation is synchronous and side-effect-free: each call consumes one
//! raw event (or one batch) and returns a ready-to-execute statement with
//! named parameters. Executing the statement, retrying, and committing are
//! the caller's concern.
//!
//! ## Quick Start
//!
//! ```rust
//! use brackish_codec::dms::DmsTranslator;
//! use serde_json::json;
//!
//! let mut translator = DmsTranslator::default();
//! let operation = translator.to_sql(&json!({
//!     "metadata": {
//!         "operation": "insert",
//!         "schema-name": "public",
//!         "table-name": "foo",
//!         "record-type": "data",
//!     },
//!     "data": {"id": 46, "name": "Jane"},
//! }))?;
//! assert_eq!(
//!     operation.statement,
//!     r#"INSERT INTO public.foo ("id","name") VALUES (:id,:name) ON CONFLICT DO NOTHING;"#
//! );
//! # Ok::<(), brackish_codec::CodecError>(())
//! ```
//!
//! ## Public API Organization
//!
//! This crate exposes types in three tiers:
//!
//! ### Tier 1: Core Types (crate root)
//! The output currency and error taxonomy every caller touches -
//! `SqlOperation`, `SqlParameters`, `CodecError`, `Result`.
//!
//! ### Tier 2: Shared Model (crate root)
//! Table addressing, identifier quoting, per-table stores, record splitting,
//! and the transform hook - shared by all source families.
//!
//! ### Tier 3: Source Families (feature-gated modules)
//! One module per source - `dms::`, `dynamodb::`, `mongodb::` - each with
//! its own translators and wire decoding.

// Common module - always available
pub mod common;

// =============================================================================
// TIER 1: Core Types - The output currency and error taxonomy
// =============================================================================

pub use common::{CodecError, ErrorCategory, Result, SqlOperation, SqlParameters, TableAddress};

// =============================================================================
// TIER 2: Shared Model - Stores, records, quoting, transforms
// =============================================================================

// Clause rendering and identifier quoting
pub use common::{quote_identifier, quote_relation_name, SqlClause};

// Per-table translator state
pub use common::{ColumnType, ColumnTypeMapStore, PrimaryKeyStore};

// Record splitting
pub use common::{DualRecord, UniversalRecord};

// Record transforms
pub use common::{DropFields, RecordTransform, TransformChain};

// =============================================================================
// TIER 3: Source Families - feature-gated
// =============================================================================

// AWS DMS envelopes - feature-gated
#[cfg(feature = "dms")]
pub mod dms;

// DynamoDB Streams and table scans - feature-gated
#[cfg(feature = "dynamodb")]
pub mod dynamodb;

// MongoDB change streams and collection scans - feature-gated
#[cfg(feature = "mongodb")]
pub mod mongodb;
