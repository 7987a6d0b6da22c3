//! AWS DMS event envelope parsing
//!
//! DMS emits one JSON envelope per change, with a `metadata` block naming
//! the operation and source table, a `data` block for row images, and a
//! `control` block for DDL payloads:
//!
//! ```json
//! {
//!   "data": {"age": 31, "id": 46, "name": "Jane"},
//!   "metadata": {
//!     "operation": "insert",
//!     "record-type": "data",
//!     "schema-name": "public",
//!     "table-name": "foo"
//!   }
//! }
//! ```
//!
//! Companion tables such as `awsdms_apply_exceptions` arrive without a
//! schema name; they are diverted to a dedicated `dms` schema before any
//! envelope validation runs.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::common::{CodecError, Result, TableAddress};

/// DMS change event operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DmsOperation {
    /// DDL: create the target table
    CreateTable,
    /// DDL: drop the target table
    DropTable,
    /// Initial full-load row
    Load,
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
}

impl DmsOperation {
    /// Parse the wire-format operation name.
    pub fn parse(operation: &str) -> Option<Self> {
        match operation {
            "create-table" => Some(Self::CreateTable),
            "drop-table" => Some(Self::DropTable),
            "load" => Some(Self::Load),
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Wire-format operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "create-table",
            Self::DropTable => "drop-table",
            Self::Load => "load",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Check whether this operation is a DDL control operation.
    pub fn is_ddl(&self) -> bool {
        matches!(self, Self::CreateTable | Self::DropTable)
    }
}

/// Declared table schema from a `create-table` control event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDef {
    /// Column name to DMS type name
    pub columns: BTreeMap<String, String>,
    /// Declared primary key column names
    pub primary_key: Vec<String>,
}

/// One parsed DMS envelope.
#[derive(Debug, Clone)]
pub struct DmsEvent {
    /// Operation named by the envelope metadata
    pub operation: DmsOperation,
    /// Target table, after companion-table schema diversion
    pub address: TableAddress,
    /// Row image for data events
    pub data: Map<String, Value>,
    /// Control payload for DDL events
    pub control: Map<String, Value>,
}

impl DmsEvent {
    /// Parse and validate one raw DMS envelope.
    pub fn parse(event: &Value) -> Result<Self> {
        let metadata = event
            .get("metadata")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty());
        let operation_name = metadata
            .and_then(|m| m.get("operation"))
            .and_then(Value::as_str)
            .filter(|o| !o.is_empty());
        let (Some(metadata), Some(operation_name)) = (metadata, operation_name) else {
            return Err(CodecError::message_format(
                "Record not in DMS format: metadata and/or operation is missing",
            ));
        };

        let schema = metadata.get("schema-name").and_then(Value::as_str);
        let table = metadata.get("table-name").and_then(Value::as_str);

        // Replication-internal tables arrive without a schema name.
        let schema = match table {
            Some(t) if t.starts_with("awsdms_") => Some("dms"),
            _ => schema,
        };

        if schema.map_or(true, str::is_empty) || table.map_or(true, str::is_empty) {
            return Err(CodecError::message_format(format!(
                "Schema or table name missing or empty: schema={}, table={}",
                schema.unwrap_or("None"),
                table.unwrap_or("None"),
            )));
        }

        let Some(operation) = DmsOperation::parse(operation_name) else {
            return Err(CodecError::unknown_operation(
                format!("DMS CDC event operation unknown: {operation_name}"),
                operation_name,
                event.clone(),
            ));
        };

        Ok(Self {
            operation,
            address: TableAddress::new(schema.unwrap_or_default(), table.unwrap_or_default()),
            data: event
                .get("data")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            control: event
                .get("control")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Declared table schema, for `create-table` events.
    ///
    /// Missing pieces come back empty rather than failing: companion-table
    /// DDL carries no `primary-key` list at all.
    pub fn table_def(&self) -> TableDef {
        let def = self.control.get("table-def").and_then(Value::as_object);

        let mut columns = BTreeMap::new();
        if let Some(declared) = def.and_then(|d| d.get("columns")).and_then(Value::as_object) {
            for (name, descriptor) in declared {
                let type_name = descriptor
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("STRING");
                columns.insert(name.clone(), type_name.to_string());
            }
        }

        let primary_key = def
            .and_then(|d| d.get("primary-key"))
            .and_then(Value::as_array)
            .map(|keys| {
                keys.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        TableDef {
            columns,
            primary_key,
        }
    }
}
