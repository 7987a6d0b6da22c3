//! MongoDB to SQL translation
//!
//! Change stream events and collection scans both land in the same two-column
//! layout: the stringified document OID plus the whole decoded document in a
//! dynamic object column.
//!
//! | Event | Statement |
//! |-------|-----------|
//! | full-load batch | `INSERT INTO ... (oid, data) VALUES (:oid, :record);` |
//! | `insert` | same as full-load, single row |
//! | `update` / `replace` | `UPDATE ... SET data = :record WHERE oid = '...';` |
//! | `delete` | `DELETE FROM ... WHERE oid = '...';` |
//! | `drop` / `invalidate` | none, intentionally ignored |
//!
//! Update events carry enough state only when the change stream was opened
//! with full-document lookup enabled; without it, the `fullDocument` entry is
//! absent and translation fails. That subscription mode is a caller-side
//! precondition this layer cannot check upfront.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::common::{quote_relation_name, CodecError, Result, SqlOperation};
use crate::mongodb::decoder::ExtendedJsonConverter;

/// Column holding the stringified document OID.
const ID_COLUMN: &str = "oid";

/// Column holding the decoded document.
const DATA_COLUMN: &str = "data";

/// MongoDB change stream operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStreamOperation {
    Insert,
    Update,
    Replace,
    Delete,
    Drop,
    Invalidate,
}

impl ChangeStreamOperation {
    /// Parse the wire-format operation type. Returns None for unknown kinds.
    pub fn parse(operation: &str) -> Option<Self> {
        match operation {
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "replace" => Some(Self::Replace),
            "delete" => Some(Self::Delete),
            "drop" => Some(Self::Drop),
            "invalidate" => Some(Self::Invalidate),
            _ => None,
        }
    }

    /// Wire-format operation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Drop => "drop",
            Self::Invalidate => "invalidate",
        }
    }
}

/// Translates batches of MongoDB documents into multi-row inserts.
#[derive(Debug, Clone)]
pub struct MongoDbFullLoadTranslator {
    table: String,
    converter: ExtendedJsonConverter,
}

impl MongoDbFullLoadTranslator {
    /// Create a translator for one collection.
    pub fn new(table_name: &str) -> Self {
        Self {
            table: quote_relation_name(table_name),
            converter: ExtendedJsonConverter::default(),
        }
    }

    /// Replace the default converter.
    pub fn with_converter(mut self, converter: ExtendedJsonConverter) -> Self {
        self.converter = converter;
        self
    }

    /// DDL creating the target table.
    pub fn sql_ddl(&self) -> String {
        render_ddl(&self.table)
    }

    /// Translate a batch of documents into one multi-row INSERT.
    pub fn to_sql(&self, records: &[Value]) -> Result<SqlOperation> {
        let mut rows = Vec::with_capacity(records.len());
        for record in self.converter.decode_documents(records) {
            let oid = record
                .get("_id")
                .cloned()
                .ok_or_else(|| CodecError::message_format("Document has no '_id' field"))?;
            let mut row = Map::new();
            row.insert(ID_COLUMN.into(), Value::String(stringify_id(oid)));
            row.insert("record".into(), record);
            rows.push(row);
        }
        debug!(table = %self.table, rows = rows.len(), "Translated MongoDB full-load batch");
        Ok(SqlOperation::batch(insert_statement(&self.table), rows))
    }
}

/// Translates MongoDB change stream events into DML statements.
#[derive(Debug, Clone)]
pub struct MongoDbCdcTranslator {
    table: String,
    converter: ExtendedJsonConverter,
}

impl MongoDbCdcTranslator {
    /// Create a translator for one collection.
    pub fn new(table_name: &str) -> Self {
        Self {
            table: quote_relation_name(table_name),
            converter: ExtendedJsonConverter::default(),
        }
    }

    /// Replace the default converter.
    pub fn with_converter(mut self, converter: ExtendedJsonConverter) -> Self {
        self.converter = converter;
        self
    }

    /// DDL creating the target table.
    pub fn sql_ddl(&self) -> String {
        render_ddl(&self.table)
    }

    /// Translate one change stream event.
    ///
    /// Returns Ok(None) for `drop` and `invalidate` events, which are
    /// intentionally not applied to the sink.
    pub fn to_sql(&self, event: &Value) -> Result<Option<SqlOperation>> {
        let operation_type = match event.get("operationType").and_then(Value::as_str) {
            Some(operation_type) if !operation_type.is_empty() => operation_type,
            _ => {
                return Err(CodecError::message_format(format!(
                    "Operation Type missing or empty: {event}"
                )))
            }
        };
        let Some(operation) = ChangeStreamOperation::parse(operation_type) else {
            return Err(CodecError::unknown_operation(
                format!("Unknown CDC operation type: {operation_type}"),
                operation_type,
                event.clone(),
            ));
        };
        debug!(
            operation = operation.as_str(),
            table = %self.table,
            "Translating MongoDB change stream event"
        );

        let operation = match operation {
            ChangeStreamOperation::Insert => {
                let oid = self.document_key(event)?;
                let record = self.converter.decode_document(self.full_document(event)?);
                let mut parameters = Map::new();
                parameters.insert(ID_COLUMN.into(), Value::String(oid));
                parameters.insert("record".into(), record);
                SqlOperation::new(insert_statement(&self.table), parameters)
            }
            ChangeStreamOperation::Update | ChangeStreamOperation::Replace => {
                let oid = self.document_key(event)?;
                let record = self.converter.decode_document(self.full_document(event)?);
                let mut parameters = Map::new();
                parameters.insert("record".into(), record);
                SqlOperation::new(
                    format!(
                        "UPDATE {} SET {DATA_COLUMN} = :record WHERE {ID_COLUMN} = '{oid}';",
                        self.table
                    ),
                    parameters,
                )
            }
            ChangeStreamOperation::Delete => {
                let oid = self.document_key(event)?;
                SqlOperation::without_parameters(format!(
                    "DELETE FROM {} WHERE {ID_COLUMN} = '{oid}';",
                    self.table
                ))
            }
            ChangeStreamOperation::Drop => {
                info!("Received 'drop' operation, but skipping to apply 'DROP TABLE'");
                return Ok(None);
            }
            ChangeStreamOperation::Invalidate => {
                info!("Ignoring 'invalidate' CDC operation");
                return Ok(None);
            }
        };
        Ok(Some(operation))
    }

    /// Stringified document OID from the event's `documentKey` entry.
    fn document_key(&self, event: &Value) -> Result<String> {
        let id = event
            .get("documentKey")
            .and_then(|key| key.get("_id"))
            .cloned()
            .ok_or_else(|| CodecError::message_format("Record has no 'documentKey._id' entry"))?;
        Ok(stringify_id(self.converter.decode_value(id)))
    }

    /// Full document payload, present only with full-document lookup enabled.
    fn full_document(&self, event: &Value) -> Result<Value> {
        event
            .get("fullDocument")
            .cloned()
            .ok_or_else(|| CodecError::message_format("Record has no 'fullDocument' representation"))
    }
}

/// Document ids are usually OID strings, but any scalar is accepted.
fn stringify_id(id: Value) -> String {
    match id {
        Value::String(id) => id,
        other => other.to_string(),
    }
}

fn insert_statement(table: &str) -> String {
    format!("INSERT INTO {table} ({ID_COLUMN}, {DATA_COLUMN}) VALUES (:oid, :record);")
}

fn render_ddl(table: &str) -> String {
    format!("CREATE TABLE IF NOT EXISTS {table} ({ID_COLUMN} TEXT, {DATA_COLUMN} OBJECT(DYNAMIC));")
}
