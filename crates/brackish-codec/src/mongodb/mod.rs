//! # MongoDB Source
//!
//! Translates MongoDB change stream events and collection scans into sink
//! SQL. Every document is stored whole, keyed by its stringified OID:
//!
//! ```text
//! Extended JSON ──► ExtendedJsonConverter ──► plain JSON document
//!                                               │
//!                                               ▼
//!                          oid TEXT │ data OBJECT(DYNAMIC)
//! ```
//!
//! Change streams are only available on replica sets and sharded clusters,
//! and `update` events carry a usable document only when the stream was
//! opened with full-document lookup enabled.
//!
//! ## Example
//!
//! ```
//! use brackish_codec::mongodb::MongoDbCdcTranslator;
//! use serde_json::json;
//!
//! let translator = MongoDbCdcTranslator::new("foo");
//! let op = translator
//!     .to_sql(&json!({
//!         "operationType": "insert",
//!         "documentKey": {"_id": {"$oid": "669683c2b0750b2c84893f3e"}},
//!         "fullDocument": {
//!             "_id": {"$oid": "669683c2b0750b2c84893f3e"},
//!             "id": "5F9E",
//!         },
//!     }))
//!     .unwrap()
//!     .expect("insert events always translate");
//! assert_eq!(
//!     op.statement,
//!     "INSERT INTO foo (oid, data) VALUES (:oid, :record);"
//! );
//! ```

mod decoder;
mod translator;

pub use decoder::{DatetimeFormat, ExtendedJsonConverter};
pub use translator::{ChangeStreamOperation, MongoDbCdcTranslator, MongoDbFullLoadTranslator};

// Re-export common types
pub use crate::common::{SqlOperation, TransformChain};
