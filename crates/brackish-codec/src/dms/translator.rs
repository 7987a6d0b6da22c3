//! AWS DMS to SQL translation
//!
//! Stateful translator: `create-table` control events teach it primary
//! keys and column type hints, later data events rely on that knowledge
//! for WHERE clauses and JSON column decoding. State can also be seeded
//! at construction for pipelines that start mid-stream.
//!
//! | Operation | Statement |
//! |-----------|-----------|
//! | `create-table` | `CREATE TABLE IF NOT EXISTS ...` (layout per strategy) |
//! | `drop-table` | `DROP TABLE IF EXISTS ...`, resets learned state |
//! | `load`, `insert` | `INSERT ... ON CONFLICT DO NOTHING` |
//! | `update` | `UPDATE ... SET ... WHERE <keys>` |
//! | `delete` | `DELETE FROM ... WHERE <keys>` |

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::{
    CodecError, ColumnType, ColumnTypeMapStore, PrimaryKeyStore, Result, SqlClause, SqlOperation,
    TableAddress, UniversalRecord,
};
use crate::dms::event::{DmsEvent, DmsOperation};
use crate::dms::strategy::{sink_type, ColumnMappingStrategy};

/// Configuration for [`DmsTranslator`].
#[derive(Debug, Clone, Default)]
pub struct DmsTranslatorConfig {
    /// Primary keys per table, seeded ahead of any control event
    pub primary_keys: PrimaryKeyStore,
    /// Column type hints per table
    pub column_types: ColumnTypeMapStore,
    /// Column mapping strategy per table
    pub mapping_strategy: BTreeMap<TableAddress, ColumnMappingStrategy>,
    /// Tables whose DDL events are suppressed
    pub ignore_ddl: BTreeMap<TableAddress, bool>,
    /// Strategy for tables not listed in `mapping_strategy`
    pub default_strategy: ColumnMappingStrategy,
}

impl DmsTranslatorConfig {
    /// Create an empty configuration (DIRECT strategy, no seeded state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed primary keys.
    pub fn with_primary_keys(mut self, primary_keys: PrimaryKeyStore) -> Self {
        self.primary_keys = primary_keys;
        self
    }

    /// Seed column type hints.
    pub fn with_column_types(mut self, column_types: ColumnTypeMapStore) -> Self {
        self.column_types = column_types;
        self
    }

    /// Pin the strategy for one table.
    pub fn with_strategy(mut self, address: TableAddress, strategy: ColumnMappingStrategy) -> Self {
        self.mapping_strategy.insert(address, strategy);
        self
    }

    /// Suppress DDL events for one table.
    pub fn with_ignore_ddl(mut self, address: TableAddress) -> Self {
        self.ignore_ddl.insert(address, true);
        self
    }

    /// Set the strategy for tables without an explicit entry.
    pub fn with_default_strategy(mut self, strategy: ColumnMappingStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }
}

/// Translates AWS DMS change events into sink SQL statements.
pub struct DmsTranslator {
    primary_keys: PrimaryKeyStore,
    column_types: ColumnTypeMapStore,
    mapping_strategy: BTreeMap<TableAddress, ColumnMappingStrategy>,
    ignore_ddl: BTreeMap<TableAddress, bool>,
    default_strategy: ColumnMappingStrategy,
    // Construction-time state, restored per table on drop-table.
    seeded_primary_keys: PrimaryKeyStore,
    seeded_column_types: ColumnTypeMapStore,
}

impl Default for DmsTranslator {
    fn default() -> Self {
        Self::new(DmsTranslatorConfig::default())
    }
}

impl DmsTranslator {
    /// Create a translator from configuration.
    pub fn new(config: DmsTranslatorConfig) -> Self {
        Self {
            seeded_primary_keys: config.primary_keys.clone(),
            seeded_column_types: config.column_types.clone(),
            primary_keys: config.primary_keys,
            column_types: config.column_types,
            mapping_strategy: config.mapping_strategy,
            ignore_ddl: config.ignore_ddl,
            default_strategy: config.default_strategy,
        }
    }

    /// Translate one DMS envelope into a SQL operation.
    pub fn to_sql(&mut self, event: &Value) -> Result<SqlOperation> {
        let event = DmsEvent::parse(event)?;
        let strategy = self.strategy_for(&event.address);
        debug!(
            operation = event.operation.as_str(),
            table = %event.address,
            strategy = %strategy,
            "Translating DMS event"
        );

        match event.operation {
            DmsOperation::CreateTable => self.create_table(&event, strategy),
            DmsOperation::DropTable => self.drop_table(&event),
            DmsOperation::Load | DmsOperation::Insert => self.upsert(&event, strategy),
            DmsOperation::Update => self.update(&event, strategy),
            DmsOperation::Delete => self.delete(&event, strategy),
        }
    }

    fn strategy_for(&self, address: &TableAddress) -> ColumnMappingStrategy {
        self.mapping_strategy
            .get(address)
            .copied()
            .unwrap_or(self.default_strategy)
    }

    fn check_ignore_ddl(&self, event: &DmsEvent) -> Result<()> {
        if self.ignore_ddl.get(&event.address).copied().unwrap_or(false) {
            return Err(CodecError::skip_operation(format!(
                "Ignoring DMS DDL event: {}",
                event.operation.as_str()
            )));
        }
        Ok(())
    }

    fn keys_for(&self, address: &TableAddress) -> Vec<String> {
        self.primary_keys
            .get(address)
            .map(|keys| keys.to_vec())
            .unwrap_or_default()
    }

    fn create_table(
        &mut self,
        event: &DmsEvent,
        strategy: ColumnMappingStrategy,
    ) -> Result<SqlOperation> {
        self.check_ignore_ddl(event)?;
        let table_def = event.table_def();

        self.primary_keys
            .register(&event.address, table_def.primary_key.iter().cloned());
        // DMS marshals JSON|JSONB source columns to CLOB, i.e. strings.
        // Remember them so data events get parsed back into objects.
        for (column, type_name) in &table_def.columns {
            if matches!(type_name.as_str(), "JSON" | "JSONB") {
                self.column_types
                    .insert(&event.address, column.clone(), ColumnType::Map);
            }
        }

        let primary_keys = self.keys_for(&event.address);
        let fqn = event.address.fqn()?;
        let statement = match strategy {
            ColumnMappingStrategy::Direct => {
                let columns = table_def
                    .columns
                    .iter()
                    .map(|(name, type_name)| {
                        let mut column = format!("\"{name}\" {}", sink_type(type_name));
                        if primary_keys.contains(name) {
                            column.push_str(" PRIMARY KEY");
                        }
                        column
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("CREATE TABLE IF NOT EXISTS {fqn} ({columns});")
            }
            ColumnMappingStrategy::Universal => {
                let pk_column = if primary_keys.is_empty() {
                    "pk OBJECT(STRICT)".to_string()
                } else {
                    let keys = primary_keys
                        .iter()
                        .map(|name| {
                            let type_name = table_def
                                .columns
                                .get(name)
                                .map(String::as_str)
                                .unwrap_or("STRING");
                            format!("\"{name}\" {} PRIMARY KEY", sink_type(type_name))
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("pk OBJECT(STRICT) AS ({keys})")
                };
                format!(
                    "CREATE TABLE IF NOT EXISTS {fqn} ({pk_column}, data OBJECT(DYNAMIC), aux OBJECT(IGNORED));"
                )
            }
        };
        Ok(SqlOperation::without_parameters(statement))
    }

    fn drop_table(&mut self, event: &DmsEvent) -> Result<SqlOperation> {
        self.check_ignore_ddl(event)?;
        let address = &event.address;
        // Learned schema must not survive the table it was learned from.
        self.primary_keys.reset(
            address,
            self.seeded_primary_keys.get(address).map(|k| k.to_vec()),
        );
        self.column_types
            .reset(address, self.seeded_column_types.get(address).cloned());
        Ok(SqlOperation::without_parameters(format!(
            "DROP TABLE IF EXISTS {};",
            address.fqn()?
        )))
    }

    fn upsert(&self, event: &DmsEvent, strategy: ColumnMappingStrategy) -> Result<SqlOperation> {
        let data = self.decode_data(event)?;
        let fqn = event.address.fqn()?;
        match strategy {
            ColumnMappingStrategy::Direct => {
                let mut clause = SqlClause::new();
                for (column, value) in &data {
                    clause.add(column.clone(), column, value.clone());
                }
                let statement = format!(
                    "INSERT INTO {fqn} ({}) VALUES ({}) ON CONFLICT DO NOTHING;",
                    clause.render_lvals(),
                    clause.render_rvals()
                );
                Ok(SqlOperation::new(statement, clause.into_values()))
            }
            ColumnMappingStrategy::Universal => {
                let record = UniversalRecord::from_record(data, &self.keys_for(&event.address));
                Ok(SqlOperation::new(
                    format!(
                        "INSERT INTO {fqn} (pk, data, aux) VALUES (:pk, :typed, :untyped) ON CONFLICT DO NOTHING;"
                    ),
                    record.into_parameters(),
                ))
            }
        }
    }

    fn update(&self, event: &DmsEvent, strategy: ColumnMappingStrategy) -> Result<SqlOperation> {
        let data = self.decode_data(event)?;
        let primary_keys = self.keys_for(&event.address);
        let where_clause = keys_to_where(&data, &primary_keys, strategy)?;

        let mut set_clause = SqlClause::new();
        for (column, value) in &data {
            if primary_keys.contains(column) {
                continue;
            }
            match strategy {
                ColumnMappingStrategy::Direct => {
                    set_clause.add(column.clone(), column, value.clone());
                }
                ColumnMappingStrategy::Universal => {
                    // Subscript assignments into an object column need an
                    // explicit cast when the bound value is itself nested.
                    let lval = format!("data['{column}']");
                    if value.is_object() {
                        set_clause.add_cast(lval, column, value.clone(), "OBJECT");
                    } else if matches!(
                        value.as_array().and_then(|items| items.first()),
                        Some(Value::Object(_))
                    ) {
                        set_clause.add_cast(lval, column, value.clone(), "OBJECT[]");
                    } else {
                        set_clause.add(lval, column, value.clone());
                    }
                }
            }
        }

        let statement = format!(
            "UPDATE {} SET {} WHERE {};",
            event.address.fqn()?,
            set_clause.render_set(),
            where_clause.render_where()
        );
        let mut parameters = set_clause.into_values();
        parameters.extend(where_clause.into_values());
        Ok(SqlOperation::new(statement, parameters))
    }

    fn delete(&self, event: &DmsEvent, strategy: ColumnMappingStrategy) -> Result<SqlOperation> {
        let primary_keys = self.keys_for(&event.address);
        let where_clause = keys_to_where(&event.data, &primary_keys, strategy)?;
        let statement = format!(
            "DELETE FROM {} WHERE {};",
            event.address.fqn()?,
            where_clause.render_where()
        );
        Ok(SqlOperation::new(statement, where_clause.into_values()))
    }

    /// Decode one data record, parsing JSON strings for columns carrying
    /// an object-like type hint.
    fn decode_data(&self, event: &DmsEvent) -> Result<Map<String, Value>> {
        let mut data = event.data.clone();
        if let Some(column_types) = self.column_types.get(&event.address) {
            // Both hint variants mean "value arrives as a JSON string".
            for column in column_types.keys() {
                if let Some(Value::String(text)) = data.get(column) {
                    let parsed: Value = serde_json::from_str(text)?;
                    data.insert(column.clone(), parsed);
                }
            }
        }
        Ok(data)
    }
}

fn keys_to_where(
    data: &Map<String, Value>,
    primary_keys: &[String],
    strategy: ColumnMappingStrategy,
) -> Result<SqlClause> {
    if primary_keys.is_empty() {
        return Err(CodecError::precondition(
            "Unable to invoke DML operation without primary key information",
        ));
    }
    let mut clause = SqlClause::new();
    for key in primary_keys {
        let lval = match strategy {
            ColumnMappingStrategy::Direct => key.clone(),
            ColumnMappingStrategy::Universal => format!("pk['{key}']"),
        };
        clause.add(lval, key, data.get(key).cloned().unwrap_or(Value::Null));
    }
    Ok(clause)
}
