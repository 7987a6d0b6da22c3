#![cfg(feature = "dms")]

//! DMS translation with the DIRECT column mapping strategy
//!
//! DIRECT maps every source column onto a sink column of its own, so these
//! tests cover the full lifecycle against one table: create, insert, update,
//! delete, drop, plus the envelope-level error taxonomy shared by both
//! strategies.

mod common;

use brackish_codec::dms::ColumnMappingStrategy;
use brackish_codec::CodecError;
use common::*;
use serde_json::json;

// ============================================================================
// Envelope errors
// ============================================================================

#[test]
fn test_unknown_shape() {
    let error = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_unknown_shape())
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Record not in DMS format: metadata and/or operation is missing"
    );
}

#[test]
fn test_missing_schema_or_table() {
    let error = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_schema_table_missing())
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Schema or table name missing or empty: schema=None, table=None"
    );
}

#[test]
fn test_unknown_operation() {
    let error = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_unknown_operation())
        .unwrap_err();
    assert_eq!(error.to_string(), "DMS CDC event operation unknown: FOOBAR");
    match error {
        CodecError::UnknownOperation {
            operation, record, ..
        } => {
            assert_eq!(operation, "FOOBAR");
            assert_eq!(record, msg_unknown_operation());
        }
        other => panic!("expected UnknownOperation, got: {other}"),
    }
}

// ============================================================================
// DDL
// ============================================================================

#[test]
fn test_create_table() {
    let operation = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_control_create_table())
        .unwrap();
    assert_eq!(
        operation.statement,
        "CREATE TABLE IF NOT EXISTS public.foo \
         (\"age\" INT4, \"attributes\" TEXT, \"id\" INT4 PRIMARY KEY, \"name\" TEXT);"
    );
    assert!(operation.parameters.is_none());
}

#[test]
fn test_drop_table() {
    let operation = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_control_drop_table())
        .unwrap();
    assert_eq!(operation.statement, "DROP TABLE IF EXISTS public.foo;");
    assert!(operation.parameters.is_none());
}

#[test]
fn test_create_table_ignored() {
    let error = translator_without_ddl(ColumnMappingStrategy::Direct)
        .to_sql(&msg_control_create_table())
        .unwrap_err();
    assert!(error.is_skip());
    assert_eq!(error.to_string(), "Ignoring DMS DDL event: create-table");
}

#[test]
fn test_drop_table_ignored() {
    let error = translator_without_ddl(ColumnMappingStrategy::Direct)
        .to_sql(&msg_control_drop_table())
        .unwrap_err();
    assert!(error.is_skip());
    assert_eq!(error.to_string(), "Ignoring DMS DDL event: drop-table");
}

#[test]
fn test_create_table_awsdms() {
    // Replication-internal tables divert to the `dms` schema.
    let operation = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_control_awsdms())
        .unwrap();
    assert_eq!(
        operation.statement,
        "CREATE TABLE IF NOT EXISTS dms.awsdms_apply_exceptions \
         (\"ERROR\" TEXT, \"ERROR_TIME\" TEXT, \"STATEMENT\" TEXT, \
         \"TABLE_NAME\" TEXT, \"TABLE_OWNER\" TEXT, \"TASK_NAME\" TEXT);"
    );
}

// ============================================================================
// DML
// ============================================================================

#[test]
fn test_insert_without_primary_key() {
    let operation = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_data_insert())
        .unwrap();
    assert_eq!(
        operation.statement,
        "INSERT INTO public.foo (\"age\",\"attributes\",\"id\",\"name\") \
         VALUES (:age,:attributes,:id,:name) ON CONFLICT DO NOTHING;"
    );
    assert_eq!(
        operation.parameters.as_record().unwrap(),
        record_insert().as_object().unwrap()
    );
}

#[test]
fn test_insert_with_primary_key() {
    // Primary key knowledge does not change the INSERT shape.
    let mut cdc = translator(ColumnMappingStrategy::Direct);
    cdc.to_sql(&msg_control_create_table()).unwrap();
    let operation = cdc.to_sql(&msg_data_insert()).unwrap();
    assert_eq!(
        operation.statement,
        "INSERT INTO public.foo (\"age\",\"attributes\",\"id\",\"name\") \
         VALUES (:age,:attributes,:id,:name) ON CONFLICT DO NOTHING;"
    );
    assert_eq!(
        operation.parameters.as_record().unwrap(),
        record_insert().as_object().unwrap()
    );
}

#[test]
fn test_load_behaves_like_insert() {
    let operation = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_data_load())
        .unwrap();
    assert_eq!(
        operation.statement,
        "INSERT INTO public.foo (\"age\",\"attributes\",\"id\",\"name\") \
         VALUES (:age,:attributes,:id,:name) ON CONFLICT DO NOTHING;"
    );
    assert_eq!(
        operation.parameters.as_record().unwrap(),
        json!({"age": 30, "attributes": {"foo": "bar"}, "id": 42, "name": "John"})
            .as_object()
            .unwrap()
    );
}

#[test]
fn test_update() {
    let mut cdc = translator(ColumnMappingStrategy::Direct);
    cdc.to_sql(&msg_control_create_table()).unwrap();
    let operation = cdc.to_sql(&msg_data_update_value()).unwrap();
    // The primary key column only appears in the WHERE clause.
    assert_eq!(
        operation.statement,
        "UPDATE public.foo SET age=:age, attributes=:attributes, name=:name WHERE id=:id;"
    );
    assert_eq!(
        operation.parameters.as_record().unwrap(),
        record_update().as_object().unwrap()
    );
}

#[test]
fn test_update_without_primary_key_fails() {
    let error = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_data_update_value())
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Unable to invoke DML operation without primary key information"
    );
}

#[test]
fn test_delete() {
    let mut cdc = translator(ColumnMappingStrategy::Direct);
    cdc.to_sql(&msg_control_create_table()).unwrap();
    let operation = cdc.to_sql(&msg_data_delete()).unwrap();
    assert_eq!(operation.statement, "DELETE FROM public.foo WHERE id=:id;");
    assert_eq!(
        operation.parameters.as_record().unwrap(),
        json!({"id": 45}).as_object().unwrap()
    );
}

#[test]
fn test_delete_without_primary_key_fails() {
    let error = translator(ColumnMappingStrategy::Direct)
        .to_sql(&msg_data_delete())
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Unable to invoke DML operation without primary key information"
    );
}
