//! # DynamoDB Source
//!
//! Translates DynamoDB table scans and stream records into sink SQL,
//! storing items in the typed/untyped layout:
//!
//! ```text
//! tagged item ──► TypeDeserializer ──► DualRecord ──► UniversalRecord
//!                                        │  split by PrimaryKeySchema
//!                                        ▼
//!              pk OBJECT(STRICT) │ data OBJECT(DYNAMIC) │ aux OBJECT(IGNORED)
//! ```
//!
//! Lists with mixed element types land in `aux`: the sink's dynamic schema
//! inference rejects them, everything else is queryable via `data`.
//!
//! ## Example
//!
//! ```
//! use brackish_codec::dynamodb::{DynamoDbCdcTranslator, PrimaryKeySchema};
//! use serde_json::json;
//!
//! let translator = DynamoDbCdcTranslator::new("foo")
//!     .with_key_schema(PrimaryKeySchema::new().add("Id", "N").unwrap());
//! let op = translator
//!     .to_sql(&json!({
//!         "eventSource": "aws:dynamodb",
//!         "eventName": "INSERT",
//!         "dynamodb": {
//!             "Keys": {"Id": {"N": "1"}},
//!             "NewImage": {"Id": {"N": "1"}, "name": {"S": "Jane"}},
//!         },
//!     }))
//!     .unwrap();
//! assert_eq!(
//!     op.statement,
//!     "INSERT INTO foo (pk, data, aux) VALUES (:pk, :typed, :untyped) ON CONFLICT DO NOTHING;"
//! );
//! ```

mod deserializer;
mod schema;
mod translator;

pub use deserializer::TypeDeserializer;
pub use schema::{Attribute, AttributeType, PrimaryKeySchema};
pub use translator::{DynamoDbCdcTranslator, DynamoDbFullLoadTranslator, StreamEventName};

// Re-export common types
pub use crate::common::{DualRecord, SqlOperation, UniversalRecord};
