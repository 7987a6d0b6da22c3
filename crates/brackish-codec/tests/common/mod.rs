//! Shared DMS envelope fixtures and translator builders
//!
//! The events mirror real replication envelopes captured from a PostgreSQL
//! source task: control records carry a `table-def`, data records carry the
//! changed row plus stream metadata. Both strategy test targets consume the
//! same fixtures so statement shapes stay comparable.

#![allow(dead_code)] // Each test target uses its own subset of fixtures.

use brackish_codec::dms::{
    ColumnMappingStrategy, ColumnType, ColumnTypeMapStore, DmsTranslator, DmsTranslatorConfig,
    PrimaryKeyStore, TableAddress,
};
use serde_json::{json, Value};

pub fn table_foo() -> TableAddress {
    TableAddress::new("public", "foo")
}

pub fn table_awsdms() -> TableAddress {
    TableAddress::new("dms", "awsdms_apply_exceptions")
}

/// Translator seeded like a freshly configured replication task: the
/// `attributes` column is declared as OBJECT so its JSON-string payload gets
/// parsed before parameter binding.
pub fn translator(strategy: ColumnMappingStrategy) -> DmsTranslator {
    let column_types =
        ColumnTypeMapStore::new().add(table_foo(), "attributes", ColumnType::Object);
    let config = DmsTranslatorConfig::new()
        .with_column_types(column_types)
        .with_strategy(table_foo(), strategy)
        .with_strategy(table_awsdms(), strategy);
    DmsTranslator::new(config)
}

/// Translator with caller-declared primary keys and DDL handling disabled.
pub fn translator_without_ddl(strategy: ColumnMappingStrategy) -> DmsTranslator {
    let column_types =
        ColumnTypeMapStore::new().add(table_foo(), "attributes", ColumnType::Object);
    let primary_keys = PrimaryKeyStore::new().with_table(table_foo(), &["id"]);
    let config = DmsTranslatorConfig::new()
        .with_primary_keys(primary_keys)
        .with_column_types(column_types)
        .with_strategy(table_foo(), strategy)
        .with_ignore_ddl(table_foo());
    DmsTranslator::new(config)
}

pub fn record_insert() -> Value {
    json!({"age": 31, "attributes": {"baz": "qux"}, "id": 46, "name": "Jane"})
}

pub fn record_update() -> Value {
    json!({"age": 33, "attributes": {"foo": "bar"}, "id": 42, "name": "John"})
}

pub fn msg_unknown_shape() -> Value {
    json!({"unknown": "foo:bar"})
}

pub fn msg_schema_table_missing() -> Value {
    json!({
        "control": {},
        "metadata": {
            "operation": "insert",
        },
    })
}

pub fn msg_unknown_operation() -> Value {
    json!({
        "control": {},
        "metadata": {
            "operation": "FOOBAR",
            "schema-name": "public",
            "table-name": "foo",
        },
    })
}

pub fn msg_control_create_table() -> Value {
    json!({
        "control": {
            "table-def": {
                "columns": {
                    "age": {"nullable": true, "type": "INT32"},
                    "attributes": {"nullable": true, "type": "STRING"},
                    "id": {"nullable": false, "type": "INT32"},
                    "name": {"nullable": true, "type": "STRING"},
                },
                "primary-key": ["id"],
            }
        },
        "metadata": {
            "operation": "create-table",
            "partition-key-type": "task-id",
            "partition-key-value": "serv-res-id-1722195358878-yhru",
            "record-type": "control",
            "schema-name": "public",
            "table-name": "foo",
            "timestamp": "2024-07-29T00:30:47.266581Z",
        },
    })
}

pub fn msg_control_drop_table() -> Value {
    json!({
        "control": {},
        "metadata": {
            "operation": "drop-table",
            "partition-key-type": "task-id",
            "partition-key-value": "serv-res-id-1722195358878-yhru",
            "record-type": "control",
            "schema-name": "public",
            "table-name": "foo",
            "timestamp": "2024-07-29T00:30:47.258815Z",
        },
    })
}

/// Replication-internal control table, arriving with an empty schema name.
pub fn msg_control_awsdms() -> Value {
    json!({
        "control": {
            "table-def": {
                "columns": {
                    "ERROR": {"nullable": false, "type": "STRING"},
                    "ERROR_TIME": {"nullable": false, "type": "TIMESTAMP"},
                    "STATEMENT": {"nullable": false, "type": "STRING"},
                    "TABLE_NAME": {"length": 128, "nullable": false, "type": "STRING"},
                    "TABLE_OWNER": {"length": 128, "nullable": false, "type": "STRING"},
                    "TASK_NAME": {"length": 128, "nullable": false, "type": "STRING"},
                }
            }
        },
        "metadata": {
            "operation": "create-table",
            "partition-key-type": "task-id",
            "partition-key-value": "7QBLNBTPCNDEBG7CHI3WA73YFA",
            "record-type": "control",
            "schema-name": "",
            "table-name": "awsdms_apply_exceptions",
            "timestamp": "2024-08-04T10:50:10.584772Z",
        },
    })
}

pub fn msg_data_load() -> Value {
    json!({
        "data": {"age": 30, "attributes": "{\"foo\": \"bar\"}", "id": 42, "name": "John"},
        "metadata": {
            "operation": "load",
            "partition-key-type": "primary-key",
            "partition-key-value": "public.foo.42",
            "record-type": "data",
            "schema-name": "public",
            "table-name": "foo",
            "timestamp": "2024-07-29T00:57:35.691762Z",
        },
    })
}

pub fn msg_data_insert() -> Value {
    json!({
        "data": {"age": 31, "attributes": "{\"baz\": \"qux\"}", "id": 46, "name": "Jane"},
        "metadata": {
            "commit-timestamp": "2024-07-29T00:58:17.974340Z",
            "operation": "insert",
            "partition-key-type": "schema-table",
            "record-type": "data",
            "schema-name": "public",
            "stream-position": "00000002/7C007178.3.00000002/7C007178",
            "table-name": "foo",
            "timestamp": "2024-07-29T00:58:17.983670Z",
            "transaction-id": 1139,
            "transaction-record-id": 1,
        },
    })
}

pub fn msg_data_update_value() -> Value {
    json!({
        "before-image": {},
        "data": {"age": 33, "attributes": "{\"foo\": \"bar\"}", "id": 42, "name": "John"},
        "metadata": {
            "commit-timestamp": "2024-07-29T00:58:44.886717Z",
            "operation": "update",
            "partition-key-type": "schema-table",
            "prev-transaction-id": 1139,
            "prev-transaction-record-id": 1,
            "record-type": "data",
            "schema-name": "public",
            "stream-position": "00000002/7C007328.2.00000002/7C007328",
            "table-name": "foo",
            "timestamp": "2024-07-29T00:58:44.895275Z",
            "transaction-id": 1140,
            "transaction-record-id": 1,
        },
    })
}

pub fn msg_data_delete() -> Value {
    json!({
        "data": {"age": null, "attributes": null, "id": 45, "name": null},
        "metadata": {
            "commit-timestamp": "2024-07-29T01:09:25.366257Z",
            "operation": "delete",
            "partition-key-type": "schema-table",
            "prev-transaction-id": 1141,
            "prev-transaction-record-id": 1,
            "record-type": "data",
            "schema-name": "public",
            "stream-position": "00000002/840001D8.2.00000002/840001D8",
            "table-name": "foo",
            "timestamp": "2024-07-29T01:09:25.375525Z",
            "transaction-id": 1144,
            "transaction-record-id": 1,
        },
    })
}
