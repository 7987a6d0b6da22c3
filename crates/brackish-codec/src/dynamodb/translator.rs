//! DynamoDB to SQL translation
//!
//! Two translators over the same typed/untyped storage layout:
//!
//! - [`DynamoDbFullLoadTranslator`] turns batches of table-scan items into
//!   one multi-row INSERT.
//! - [`DynamoDbCdcTranslator`] turns one stream record (Kinesis-delivered
//!   DynamoDB Stream event) into INSERT/UPDATE/DELETE.
//!
//! | Event | Statement |
//! |-------|-----------|
//! | full-load batch | `INSERT INTO ... (pk, data, aux) VALUES (:pk, :typed, :untyped) ON CONFLICT DO NOTHING;` |
//! | `INSERT` | same as full-load, single row |
//! | `MODIFY` | `UPDATE ... SET data=:typed, aux=:untyped WHERE pk=:pk;` |
//! | `REMOVE` | `DELETE FROM ... WHERE pk=:pk;` |
//!
//! Record splitting uses the declared [`PrimaryKeySchema`] when one was
//! provided, falling back to the attribute names of the stream record's
//! `Keys` image. DDL strictly needs the declared schema: a primary key
//! constraint cannot be rendered without knowing the key column types.

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::{quote_relation_name, CodecError, DualRecord, Result, SqlOperation, UniversalRecord};
use crate::dynamodb::deserializer::TypeDeserializer;
use crate::dynamodb::schema::PrimaryKeySchema;

/// DynamoDB stream event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamEventName {
    /// Item created
    Insert,
    /// Item updated in place
    Modify,
    /// Item deleted
    Remove,
}

impl StreamEventName {
    /// Parse the wire-format event name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "INSERT" => Some(Self::Insert),
            "MODIFY" => Some(Self::Modify),
            "REMOVE" => Some(Self::Remove),
            _ => None,
        }
    }

    /// Wire-format event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Modify => "MODIFY",
            Self::Remove => "REMOVE",
        }
    }
}

/// Translates DynamoDB table-scan batches into multi-row inserts.
#[derive(Debug, Clone)]
pub struct DynamoDbFullLoadTranslator {
    table: String,
    key_schema: Option<PrimaryKeySchema>,
    deserializer: TypeDeserializer,
}

impl DynamoDbFullLoadTranslator {
    /// Create a translator for one table.
    pub fn new(table_name: &str) -> Self {
        Self {
            table: quote_relation_name(table_name),
            key_schema: None,
            deserializer: TypeDeserializer::new(),
        }
    }

    /// Declare the table's primary key schema.
    pub fn with_key_schema(mut self, key_schema: PrimaryKeySchema) -> Self {
        self.key_schema = Some(key_schema);
        self
    }

    /// DDL creating the target table.
    pub fn sql_ddl(&self) -> Result<String> {
        render_ddl(&self.table, self.key_schema.as_ref())
    }

    /// Translate a batch of items into one multi-row INSERT.
    pub fn to_sql(&self, records: &[Value]) -> Result<SqlOperation> {
        let keys = self
            .key_schema
            .as_ref()
            .map(PrimaryKeySchema::keys)
            .unwrap_or_default();
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let item = record.as_object().ok_or_else(|| {
                CodecError::message_format(format!("Invalid DynamoDB item, expected object: {record}"))
            })?;
            let dual = self.deserializer.deserialize_record(item)?;
            rows.push(UniversalRecord::from_dual(dual, &keys).into_parameters());
        }
        debug!(table = %self.table, rows = rows.len(), "Translated DynamoDB full-load batch");
        Ok(SqlOperation::batch(insert_statement(&self.table), rows))
    }
}

/// Translates DynamoDB stream records into DML statements.
#[derive(Debug, Clone)]
pub struct DynamoDbCdcTranslator {
    table: String,
    key_schema: Option<PrimaryKeySchema>,
    deserializer: TypeDeserializer,
}

impl DynamoDbCdcTranslator {
    /// Create a translator for one table.
    pub fn new(table_name: &str) -> Self {
        Self {
            table: quote_relation_name(table_name),
            key_schema: None,
            deserializer: TypeDeserializer::new(),
        }
    }

    /// Declare the table's primary key schema.
    pub fn with_key_schema(mut self, key_schema: PrimaryKeySchema) -> Self {
        self.key_schema = Some(key_schema);
        self
    }

    /// DDL creating the target table.
    pub fn sql_ddl(&self) -> Result<String> {
        render_ddl(&self.table, self.key_schema.as_ref())
    }

    /// Translate one stream record into a SQL operation.
    pub fn to_sql(&self, event: &Value) -> Result<SqlOperation> {
        let source = event.get("eventSource").and_then(Value::as_str).unwrap_or("None");
        if source != "aws:dynamodb" {
            return Err(CodecError::message_format(format!(
                "Unknown eventSource: {source}"
            )));
        }
        let event_name = event.get("eventName").and_then(Value::as_str).unwrap_or("None");
        let Some(operation) = StreamEventName::parse(event_name) else {
            return Err(CodecError::unknown_operation(
                format!("Unknown CDC event name: {event_name}"),
                event_name,
                event.clone(),
            ));
        };
        let payload = event
            .get("dynamodb")
            .and_then(Value::as_object)
            .ok_or_else(|| CodecError::message_format("Record has no 'dynamodb' payload"))?;
        debug!(table = %self.table, event = operation.as_str(), "Translating DynamoDB stream record");

        match operation {
            StreamEventName::Insert => {
                let record = self.split(image(payload, "NewImage")?, payload)?;
                Ok(SqlOperation::new(
                    insert_statement(&self.table),
                    record.into_parameters(),
                ))
            }
            StreamEventName::Modify => {
                let record = self.split(image(payload, "NewImage")?, payload)?;
                let keys = self.deserializer.deserialize_map(image(payload, "Keys")?)?;
                let mut parameters = Map::new();
                parameters.insert("typed".to_string(), Value::Object(record.typed));
                parameters.insert("untyped".to_string(), Value::Object(record.untyped));
                parameters.insert("pk".to_string(), Value::Object(keys));
                Ok(SqlOperation::new(
                    format!("UPDATE {} SET data=:typed, aux=:untyped WHERE pk=:pk;", self.table),
                    parameters,
                ))
            }
            StreamEventName::Remove => {
                let keys = self.deserializer.deserialize_map(image(payload, "Keys")?)?;
                let mut parameters = Map::new();
                parameters.insert("pk".to_string(), Value::Object(keys));
                Ok(SqlOperation::new(
                    format!("DELETE FROM {} WHERE pk=:pk;", self.table),
                    parameters,
                ))
            }
        }
    }

    /// Decode one tagged item into typed and untyped buckets.
    pub fn decode_record(&self, item: &Map<String, Value>) -> Result<DualRecord> {
        self.deserializer.deserialize_record(item)
    }

    fn split(
        &self,
        item: &Map<String, Value>,
        payload: &Map<String, Value>,
    ) -> Result<UniversalRecord> {
        let dual = self.decode_record(item)?;
        Ok(UniversalRecord::from_dual(dual, &self.effective_keys(payload)))
    }

    // Declared key schema wins; otherwise the stream record's own Keys
    // image names the key attributes.
    fn effective_keys(&self, payload: &Map<String, Value>) -> Vec<String> {
        if let Some(schema) = &self.key_schema {
            return schema.keys();
        }
        payload
            .get("Keys")
            .and_then(Value::as_object)
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn image<'a>(payload: &'a Map<String, Value>, name: &str) -> Result<&'a Map<String, Value>> {
    payload
        .get(name)
        .and_then(Value::as_object)
        .ok_or_else(|| CodecError::message_format(format!("Record has no '{name}' image")))
}

fn insert_statement(table: &str) -> String {
    format!("INSERT INTO {table} (pk, data, aux) VALUES (:pk, :typed, :untyped) ON CONFLICT DO NOTHING;")
}

fn render_ddl(table: &str, key_schema: Option<&PrimaryKeySchema>) -> Result<String> {
    let Some(schema) = key_schema.filter(|schema| !schema.is_empty()) else {
        return Err(CodecError::config(
            "Unable to render SQL DDL without a primary key schema",
        ));
    };
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {table} (pk OBJECT(STRICT) AS ({}), data OBJECT(DYNAMIC), aux OBJECT(IGNORED));",
        schema.to_sql_ddl_clauses().join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_event_name_parse() {
        assert_eq!(StreamEventName::parse("INSERT"), Some(StreamEventName::Insert));
        assert_eq!(StreamEventName::parse("MODIFY"), Some(StreamEventName::Modify));
        assert_eq!(StreamEventName::parse("REMOVE"), Some(StreamEventName::Remove));
        assert_eq!(StreamEventName::parse("FOOBAR"), None);
    }

    #[test]
    fn test_table_name_quoting_policy() {
        assert_eq!(DynamoDbCdcTranslator::new("foo").table, "foo");
        assert_eq!(DynamoDbCdcTranslator::new("MyTable").table, "\"MyTable\"");
    }

    #[test]
    fn test_ddl_requires_key_schema() {
        let err = DynamoDbCdcTranslator::new("foo").sql_ddl().unwrap_err();
        assert!(err
            .to_string()
            .contains("Unable to render SQL DDL without a primary key schema"));

        let err = DynamoDbCdcTranslator::new("foo")
            .with_key_schema(PrimaryKeySchema::new())
            .sql_ddl()
            .unwrap_err();
        assert!(err.to_string().contains("primary key schema"));
    }

    #[test]
    fn test_effective_keys_fall_back_to_keys_image() {
        let translator = DynamoDbCdcTranslator::new("foo");
        let payload = json!({"Keys": {"device": {"S": "foo"}, "timestamp": {"S": "t"}}});
        assert_eq!(
            translator.effective_keys(payload.as_object().unwrap()),
            vec!["device", "timestamp"]
        );

        let translator = translator.with_key_schema(PrimaryKeySchema::new().add("Id", "N").unwrap());
        assert_eq!(
            translator.effective_keys(payload.as_object().unwrap()),
            vec!["Id"]
        );
    }
}
