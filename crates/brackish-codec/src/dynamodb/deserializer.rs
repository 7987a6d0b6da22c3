//! DynamoDB wire-type deserialization
//!
//! DynamoDB items tag every attribute value with a type descriptor:
//!
//! ```json
//! {"device": {"S": "foo"}, "temperature": {"N": "42.42"}, "tags": {"L": [{"S": "a"}]}}
//! ```
//!
//! [`TypeDeserializer`] strips the descriptors and produces plain JSON with
//! sink-oriented adjustments:
//!
//! | Descriptor | Result |
//! |------------|--------|
//! | `S`, `B`, `BOOL` | passed through |
//! | `N`, `NS` | decoded as double precision numbers |
//! | `NULL` | `null` |
//! | `M` | object, values decoded recursively |
//! | `L` | array, elements decoded recursively |
//! | `SS`, `NS`, `BS` | arrays, input order preserved |
//!
//! Top-level lists whose elements carry differing descriptors cannot be
//! typed by the sink's schema inference;
//! [`deserialize_record`](TypeDeserializer::deserialize_record) routes such
//! fields into the untyped bucket of the returned [`DualRecord`].

use serde_json::{Map, Value};

use crate::common::{CodecError, DualRecord, Result};

/// Decodes descriptor-tagged DynamoDB values into plain JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDeserializer;

impl TypeDeserializer {
    /// Create a new deserializer.
    pub fn new() -> Self {
        Self
    }

    /// Decode one tagged value.
    pub fn deserialize(&self, tagged: &Value) -> Result<Value> {
        let (descriptor, payload) = split_descriptor(tagged)?;
        match descriptor {
            // Strings may legitimately be null on the wire.
            "S" | "B" | "BOOL" => Ok(payload.clone()),
            "N" => to_number(payload),
            "NULL" => Ok(Value::Null),
            "M" => {
                let entries = payload.as_object().ok_or_else(|| invalid(tagged))?;
                let mut decoded = Map::new();
                for (name, value) in entries {
                    decoded.insert(name.clone(), self.deserialize(value)?);
                }
                Ok(Value::Object(decoded))
            }
            "L" => {
                let items = payload.as_array().ok_or_else(|| invalid(tagged))?;
                let (values, _) = self.deserialize_list(items)?;
                Ok(Value::Array(values))
            }
            "SS" | "BS" => {
                let items = payload.as_array().ok_or_else(|| invalid(tagged))?;
                Ok(Value::Array(items.to_vec()))
            }
            "NS" => {
                let items = payload.as_array().ok_or_else(|| invalid(tagged))?;
                items.iter().map(to_number).collect::<Result<Vec<_>>>().map(Value::Array)
            }
            other => Err(CodecError::message_format(format!(
                "DynamoDB type not supported: {other}"
            ))),
        }
    }

    /// Decode a list, reporting whether its elements mix type descriptors.
    pub fn deserialize_list(&self, items: &[Value]) -> Result<(Vec<Value>, bool)> {
        let mut first_descriptor: Option<&str> = None;
        let mut varied = false;
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let (descriptor, _) = split_descriptor(item)?;
            match first_descriptor {
                None => first_descriptor = Some(descriptor),
                Some(first) if first != descriptor => varied = true,
                Some(_) => {}
            }
            values.push(self.deserialize(item)?);
        }
        Ok((values, varied))
    }

    /// Decode a whole item into typed and untyped buckets.
    pub fn deserialize_record(&self, item: &Map<String, Value>) -> Result<DualRecord> {
        let mut record = DualRecord::new();
        for (name, tagged) in item {
            let (descriptor, payload) = split_descriptor(tagged)?;
            if descriptor == "L" {
                let items = payload.as_array().ok_or_else(|| invalid(tagged))?;
                let (values, varied) = self.deserialize_list(items)?;
                if varied {
                    record.untyped.insert(name.clone(), Value::Array(values));
                } else {
                    record.typed.insert(name.clone(), Value::Array(values));
                }
            } else {
                record.typed.insert(name.clone(), self.deserialize(tagged)?);
            }
        }
        Ok(record)
    }

    /// Decode a tagged map (e.g. a stream record's `Keys` image) without
    /// any typed/untyped routing.
    pub fn deserialize_map(&self, entries: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut decoded = Map::new();
        for (name, tagged) in entries {
            decoded.insert(name.clone(), self.deserialize(tagged)?);
        }
        Ok(decoded)
    }
}

fn split_descriptor(tagged: &Value) -> Result<(&str, &Value)> {
    let entries = tagged.as_object().filter(|map| map.len() == 1);
    match entries.and_then(|map| map.iter().next()) {
        Some((descriptor, payload)) => Ok((descriptor.as_str(), payload)),
        None => Err(invalid(tagged)),
    }
}

fn invalid(tagged: &Value) -> CodecError {
    CodecError::message_format(format!(
        "Invalid DynamoDB value, expected single-entry type descriptor map: {tagged}"
    ))
}

fn to_number(value: &Value) -> Result<Value> {
    let parsed = match value {
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| {
            CodecError::message_format(format!("Invalid DynamoDB number: {text}"))
        })?,
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| CodecError::message_format(format!("Invalid DynamoDB number: {number}")))?,
        other => {
            return Err(CodecError::message_format(format!(
                "Invalid DynamoDB number: {other}"
            )))
        }
    };
    serde_json::Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| CodecError::message_format(format!("Non-finite DynamoDB number: {value}")))
}
