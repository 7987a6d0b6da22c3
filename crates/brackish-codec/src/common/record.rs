//! Typed/untyped record carriers
//!
//! The typed/untyped storage layout lands every row in three container
//! columns: `pk` holds the primary key fields, `data` holds fields whose
//! types the sink can index, and `aux` holds fields it must store
//! uninterpreted (today: lists with mixed element types, which the sink's
//! dynamic schema inference rejects).
//!
//! [`DualRecord`] is what a source deserializer produces (typed vs.
//! untyped); [`UniversalRecord`] adds the primary key split and knows how
//! to render itself as statement parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded record split into sink-typed and sink-opaque fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DualRecord {
    /// Fields the sink can type and index
    pub typed: Map<String, Value>,
    /// Fields stored without type inference
    pub untyped: Map<String, Value>,
}

impl DualRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A record split into primary key, typed, and untyped parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniversalRecord {
    /// Primary key fields
    pub pk: Map<String, Value>,
    /// Fields the sink can type and index
    pub typed: Map<String, Value>,
    /// Fields stored without type inference
    pub untyped: Map<String, Value>,
}

impl UniversalRecord {
    /// Split a dual record by pulling the named key fields into `pk`.
    ///
    /// A field named in `primary_keys` leaves whichever bucket it was in;
    /// key fields that only exist in the untyped bucket still become keys.
    pub fn from_dual(dual: DualRecord, primary_keys: &[String]) -> Self {
        let DualRecord { mut typed, untyped } = dual;
        let mut pk = Map::new();
        let mut rest_untyped = Map::new();

        for (name, value) in untyped {
            if primary_keys.contains(&name) {
                pk.insert(name, value);
            } else {
                rest_untyped.insert(name, value);
            }
        }
        for key in primary_keys {
            if let Some(value) = typed.remove(key) {
                pk.insert(key.clone(), value);
            }
        }

        Self {
            pk,
            typed,
            untyped: rest_untyped,
        }
    }

    /// Split a plain record that has no untyped fields.
    pub fn from_record(record: Map<String, Value>, primary_keys: &[String]) -> Self {
        Self::from_dual(
            DualRecord {
                typed: record,
                untyped: Map::new(),
            },
            primary_keys,
        )
    }

    /// Render as statement parameters for the three container columns.
    pub fn into_parameters(self) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("pk".to_string(), Value::Object(self.pk));
        parameters.insert("typed".to_string(), Value::Object(self.typed));
        parameters.insert("untyped".to_string(), Value::Object(self.untyped));
        parameters
    }
}
