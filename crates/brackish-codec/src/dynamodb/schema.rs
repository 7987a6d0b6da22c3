//! DynamoDB key schema
//!
//! The typed/untyped storage layout needs to know which attributes form
//! the primary key, and what SQL type each key column takes. DynamoDB key
//! attributes are limited to strings, numbers, and binary:
//!
//! | Descriptor | Attribute type | Sink column type |
//! |------------|----------------|------------------|
//! | `S` | STRING | STRING |
//! | `N` | NUMBER | BIGINT |
//! | `B` | BINARY | STRING |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{CodecError, Result};

/// DynamoDB key attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    /// String attribute (`S`)
    String,
    /// Number attribute (`N`)
    Number,
    /// Binary attribute (`B`)
    Binary,
}

impl AttributeType {
    /// Parse a wire-format type descriptor, naming the attribute on failure.
    pub fn from_descriptor(name: &str, descriptor: &str) -> Result<Self> {
        match descriptor {
            "S" => Ok(Self::String),
            "N" => Ok(Self::Number),
            "B" => Ok(Self::Binary),
            other => Err(CodecError::type_mapping(name, other)),
        }
    }

    /// SQL column type for key columns of this attribute type.
    pub fn sink_type(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "BIGINT",
            Self::Binary => "STRING",
        }
    }
}

/// One key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute type
    pub attribute_type: AttributeType,
}

/// Ordered primary key attributes of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeySchema {
    attributes: Vec<Attribute>,
}

impl PrimaryKeySchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one key attribute by wire descriptor. Chainable.
    pub fn add(mut self, name: impl Into<String>, descriptor: &str) -> Result<Self> {
        let name = name.into();
        let attribute_type = AttributeType::from_descriptor(&name, descriptor)?;
        self.attributes.push(Attribute {
            name,
            attribute_type,
        });
        Ok(self)
    }

    /// Build from a table description's `KeySchema` and
    /// `AttributeDefinitions` blocks, in key schema order.
    pub fn from_table(key_schema: &[Value], attribute_definitions: &[Value]) -> Result<Self> {
        let mut schema = Self::new();
        for key in key_schema {
            let name = key
                .get("AttributeName")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    CodecError::config(format!("Key schema entry without AttributeName: {key}"))
                })?;
            let descriptor = attribute_definitions
                .iter()
                .find(|definition| {
                    definition.get("AttributeName").and_then(Value::as_str) == Some(name)
                })
                .and_then(|definition| definition.get("AttributeType"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    CodecError::config(format!("Attribute definition missing for key: {name}"))
                })?;
            schema = schema.add(name, descriptor)?;
        }
        Ok(schema)
    }

    /// Key attribute names, in schema order.
    pub fn keys(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.name.clone()).collect()
    }

    /// Quoted key column names.
    pub fn column_names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|a| format!("\"{}\"", a.name))
            .collect()
    }

    /// DDL clauses for the key columns inside `pk OBJECT(STRICT) AS (...)`.
    pub fn to_sql_ddl_clauses(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|a| format!("\"{}\" {} PRIMARY KEY", a.name, a.attribute_type.sink_type()))
            .collect()
    }

    /// Check whether no key attributes are declared.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
