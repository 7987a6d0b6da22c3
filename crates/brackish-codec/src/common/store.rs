//! Per-table metadata stores
//!
//! Translators are stateful: they remember primary keys and column type
//! hints per [`TableAddress`], either seeded by the operator at
//! construction or learned from DDL control events. Both stores persist to
//! a flat string form (`schema:table:column` keys) so they can travel
//! through connector property maps that only speak strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::error::{CodecError, Result};
use crate::common::model::TableAddress;

/// Sink-side column type hint.
///
/// Both variants mark a column whose values arrive as serialized JSON
/// strings and must be parsed before binding. `map` is the legacy spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Container column, legacy spelling
    Map,
    /// Container column
    Object,
}

impl ColumnType {
    /// String form used in the flat persistence format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Map => "map",
            ColumnType::Object => "object",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "map" => Ok(ColumnType::Map),
            "object" => Ok(ColumnType::Object),
            other => Err(CodecError::config(format!(
                "'{other}' is not a valid ColumnType"
            ))),
        }
    }
}

/// Primary key names per table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyStore {
    entries: BTreeMap<TableAddress, Vec<String>>,
}

impl PrimaryKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed keys for a table, replacing any previous entry. Chainable.
    pub fn with_table(mut self, address: TableAddress, keys: &[&str]) -> Self {
        self.entries
            .insert(address, keys.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Key names registered for a table.
    pub fn get(&self, address: &TableAddress) -> Option<&[String]> {
        self.entries.get(address).map(Vec::as_slice)
    }

    /// Mutable key list for a table, created empty on first access.
    pub fn get_or_create(&mut self, address: &TableAddress) -> &mut Vec<String> {
        self.entries.entry(address.clone()).or_default()
    }

    /// Append key names not yet present, preserving declaration order.
    ///
    /// Replayed DDL events must not duplicate entries.
    pub fn register(&mut self, address: &TableAddress, keys: impl IntoIterator<Item = String>) {
        let entry = self.get_or_create(address);
        for key in keys {
            if !entry.contains(&key) {
                entry.push(key);
            }
        }
    }

    /// Replace the entry for one table, or remove it when `keys` is `None`.
    pub fn reset(&mut self, address: &TableAddress, keys: Option<Vec<String>>) {
        match keys {
            Some(keys) => {
                self.entries.insert(address.clone(), keys);
            }
            None => {
                self.entries.remove(address);
            }
        }
    }

    /// Check whether no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Column type hints per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeMapStore {
    entries: BTreeMap<TableAddress, BTreeMap<String, ColumnType>>,
}

impl ColumnTypeMapStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hint. Chainable for literal construction.
    pub fn add(mut self, address: TableAddress, column: impl Into<String>, t: ColumnType) -> Self {
        self.insert(&address, column, t);
        self
    }

    /// Add one hint in place.
    pub fn insert(&mut self, address: &TableAddress, column: impl Into<String>, t: ColumnType) {
        self.entries
            .entry(address.clone())
            .or_default()
            .insert(column.into(), t);
    }

    /// Hints registered for a table.
    pub fn get(&self, address: &TableAddress) -> Option<&BTreeMap<String, ColumnType>> {
        self.entries.get(address)
    }

    /// Mutable hint map for a table, created empty on first access.
    pub fn get_or_create(&mut self, address: &TableAddress) -> &mut BTreeMap<String, ColumnType> {
        self.entries.entry(address.clone()).or_default()
    }

    /// Replace the entry for one table, or remove it when `columns` is `None`.
    pub fn reset(&mut self, address: &TableAddress, columns: Option<BTreeMap<String, ColumnType>>) {
        match columns {
            Some(columns) => {
                self.entries.insert(address.clone(), columns);
            }
            None => {
                self.entries.remove(address);
            }
        }
    }

    /// Check whether no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten to `schema:table:column -> type` pairs.
    pub fn to_flat_map(&self) -> Map<String, Value> {
        let mut data = Map::new();
        for (address, columns) in &self.entries {
            for (column, t) in columns {
                let key = format!("{}:{}:{}", address.schema, address.table, column);
                data.insert(key, Value::String(t.as_str().to_string()));
            }
        }
        data
    }

    /// Serialize the flat form to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_flat_map())?)
    }

    /// Rebuild from the flat form. Empty input yields `None`.
    pub fn from_flat_map(data: &Map<String, Value>) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        let mut store = Self::new();
        for (key, value) in data {
            let mut parts = key.splitn(3, ':');
            let (Some(schema), Some(table), Some(column)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(CodecError::config(format!(
                    "Invalid column type map key, expected schema:table:column: {key}"
                )));
            };
            let Some(type_name) = value.as_str() else {
                return Err(CodecError::config(format!(
                    "Invalid column type map value for {key}: {value}"
                )));
            };
            store.insert(
                &TableAddress::new(schema, table),
                column,
                type_name.parse()?,
            );
        }
        Ok(Some(store))
    }

    /// Rebuild from a JSON payload. Empty or blank input yields `None`.
    pub fn from_json(payload: &str) -> Result<Option<Self>> {
        if payload.trim().is_empty() {
            return Ok(None);
        }
        let data: Map<String, Value> = serde_json::from_str(payload)?;
        Self::from_flat_map(&data)
    }
}
