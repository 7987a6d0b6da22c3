//! # AWS DMS Source
//!
//! Translates change events captured by AWS Database Migration Service
//! (as delivered through Kinesis) into sink SQL. Handles both control
//! events (DDL) and data events (DML), with per-table column mapping
//! strategies:
//!
//! ```text
//! DMS envelope ──► DmsEvent::parse ──► DmsTranslator::to_sql ──► SqlOperation
//!                    │                    │
//!                    │                    ├── DIRECT: one column per column
//!                    │                    └── UNIVERSAL: pk / data / aux
//!                    └── awsdms_* diverted to the `dms` schema
//! ```
//!
//! ## Example
//!
//! ```
//! use brackish_codec::dms::DmsTranslator;
//! use serde_json::json;
//!
//! let mut translator = DmsTranslator::default();
//! let op = translator
//!     .to_sql(&json!({
//!         "data": {"id": 42, "name": "John"},
//!         "metadata": {
//!             "operation": "insert",
//!             "schema-name": "public",
//!             "table-name": "foo",
//!         },
//!     }))
//!     .unwrap();
//! assert_eq!(
//!     op.statement,
//!     "INSERT INTO public.foo (\"id\",\"name\") VALUES (:id,:name) ON CONFLICT DO NOTHING;"
//! );
//! ```

mod event;
mod strategy;
mod translator;

pub use event::{DmsEvent, DmsOperation, TableDef};
pub use strategy::{sink_type, ColumnMappingStrategy};
pub use translator::{DmsTranslator, DmsTranslatorConfig};

// Re-export common types
pub use crate::common::{ColumnType, ColumnTypeMapStore, PrimaryKeyStore, SqlOperation, TableAddress};
