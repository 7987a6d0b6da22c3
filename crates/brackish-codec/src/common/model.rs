//! Core SQL model shared by all translators
//!
//! Every source module produces the same output currency: a
//! [`SqlOperation`] bundling one parameterized statement with its bound
//! values. The pieces here are deliberately dialect-aware for a sink that
//! speaks PostgreSQL with `OBJECT(...)` column extensions:
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`TableAddress`] | Schema-qualified table identity, store key |
//! | [`SqlOperation`] | Statement text plus [`SqlParameters`] |
//! | [`SqlClause`] | lval/rval accumulator for SET/WHERE/column lists |
//!
//! Identifier quoting follows the sink's rule: quote only when necessary,
//! i.e. when a name is not all-lowercase `[a-z_][a-z0-9_]*` or collides
//! with a reserved word. Column names inside DDL and INSERT column lists
//! are always quoted to keep mixed-case source columns intact.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::error::{CodecError, Result};

/// Reserved words that force quoting when used as a relation name component.
///
/// Subset of the sink dialect's keyword table; extend as collisions surface.
const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "any", "array", "as", "asc", "between", "by", "called", "case",
    "cast", "column", "constraint", "create", "cross", "current_date", "current_time",
    "current_timestamp", "default", "delete", "deny", "desc", "describe", "directory", "distinct",
    "drop", "else", "end", "escape", "except", "exists", "extract", "false", "first", "for",
    "from", "full", "function", "grant", "group", "having", "if", "in", "index", "inner", "input",
    "insert", "intersect", "into", "is", "join", "last", "left", "like", "limit", "match",
    "natural", "not", "null", "nulls", "object", "offset", "on", "or", "order", "outer",
    "persistent", "recursive", "reset", "returns", "revoke", "right", "select", "session_user",
    "set", "some", "stratify", "table", "then", "transient", "true", "try_cast", "unbounded",
    "union", "update", "user", "using", "values", "when", "where", "with",
];

fn is_unquoted_safe(ident: &str) -> bool {
    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return false;
    }
    !RESERVED_WORDS.contains(&ident)
}

/// Quote a single identifier if the sink would otherwise fold or reject it.
pub fn quote_identifier(ident: &str) -> String {
    if is_unquoted_safe(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Quote a dotted relation name component-wise.
///
/// Components that arrive pre-quoted are passed through unchanged.
///
/// ```
/// use brackish_codec::quote_relation_name;
/// assert_eq!(quote_relation_name("public.foo"), "public.foo");
/// assert_eq!(quote_relation_name("from.mongodb"), "\"from\".mongodb");
/// ```
pub fn quote_relation_name(name: &str) -> String {
    name.split('.')
        .map(|part| {
            if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
                part.to_string()
            } else {
                quote_identifier(part)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Schema-qualified table address.
///
/// Identifies a table across events and serves as the key type for the
/// per-table stores. Ordering is derived so addresses enumerate
/// deterministically when stores are serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableAddress {
    /// Schema name
    pub schema: String,
    /// Table name
    pub table: String,
}

impl TableAddress {
    /// Create a new table address.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Fully qualified, correctly quoted relation name.
    ///
    /// An empty schema is an error: an unqualified statement would resolve
    /// against the session search path instead of a fixed schema.
    pub fn fqn(&self) -> Result<String> {
        if self.schema.is_empty() {
            return Err(CodecError::config(
                "Unable to compute a full-qualified table name without schema name",
            ));
        }
        if self.table.is_empty() {
            return Err(CodecError::config(
                "Unable to compute a full-qualified table name without table name",
            ));
        }
        Ok(format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.table)
        ))
    }
}

impl fmt::Display for TableAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Parameter payload of a [`SqlOperation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParameters {
    /// Statement binds no parameters
    #[default]
    None,
    /// One parameter record
    Record(Map<String, Value>),
    /// One parameter record per row, executed as a batch
    Batch(Vec<Map<String, Value>>),
}

impl SqlParameters {
    /// Check whether the statement binds no parameters.
    pub fn is_none(&self) -> bool {
        matches!(self, SqlParameters::None)
    }

    /// The single parameter record, if present.
    pub fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            SqlParameters::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The batch payload, if present.
    pub fn as_batch(&self) -> Option<&[Map<String, Value>]> {
        match self {
            SqlParameters::Batch(rows) => Some(rows),
            _ => None,
        }
    }
}

/// A single executable SQL statement with bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlOperation {
    /// SQL text with `:name` placeholders
    pub statement: String,
    /// Values for the placeholders
    #[serde(default, skip_serializing_if = "SqlParameters::is_none")]
    pub parameters: SqlParameters,
}

impl SqlOperation {
    /// Create an operation binding one parameter record.
    pub fn new(statement: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            statement: statement.into(),
            parameters: SqlParameters::Record(parameters),
        }
    }

    /// Create an operation that binds no parameters (DDL, fixed DELETE).
    pub fn without_parameters(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: SqlParameters::None,
        }
    }

    /// Create an operation executed once per parameter record.
    pub fn batch(statement: impl Into<String>, rows: Vec<Map<String, Value>>) -> Self {
        Self {
            statement: statement.into(),
            parameters: SqlParameters::Batch(rows),
        }
    }
}

impl fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statement)
    }
}

/// Accumulates lval/rval pairs and their bound values for one SQL clause.
///
/// The same accumulator renders all clause shapes; the caller picks the
/// join style:
///
/// | Renderer | Join | Example |
/// |----------|------|---------|
/// | [`render_set`](Self::render_set) | `, ` | `age=:age, name=:name` |
/// | [`render_where`](Self::render_where) | ` AND ` | `id=:id AND ts=:ts` |
/// | [`render_lvals`](Self::render_lvals) | `,` | `"age","name"` |
/// | [`render_rvals`](Self::render_rvals) | `,` | `:age,:name` |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlClause {
    lvals: Vec<String>,
    rvals: Vec<String>,
    values: Map<String, Value>,
}

impl SqlClause {
    /// Create an empty clause.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `lval = :name` pair and bind its value.
    pub fn add(&mut self, lval: impl Into<String>, name: &str, value: Value) {
        self.lvals.push(lval.into());
        self.rvals.push(format!(":{name}"));
        self.values.insert(name.to_string(), value);
    }

    /// Add one pair whose rval casts the bound value, e.g.
    /// `CAST(:attrs AS OBJECT)` for nested records the sink cannot infer.
    pub fn add_cast(&mut self, lval: impl Into<String>, name: &str, value: Value, type_name: &str) {
        self.lvals.push(lval.into());
        self.rvals.push(format!("CAST(:{name} AS {type_name})"));
        self.values.insert(name.to_string(), value);
    }

    /// Check whether no pairs have been added.
    pub fn is_empty(&self) -> bool {
        self.lvals.is_empty()
    }

    /// Render as an UPDATE SET clause body.
    pub fn render_set(&self) -> String {
        self.pairs().collect::<Vec<_>>().join(", ")
    }

    /// Render as a WHERE clause body.
    pub fn render_where(&self) -> String {
        self.pairs().collect::<Vec<_>>().join(" AND ")
    }

    /// Render the lvals as a quoted column list.
    pub fn render_lvals(&self) -> String {
        self.lvals
            .iter()
            .map(|lval| format!("\"{lval}\""))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Render the rvals as a placeholder list.
    pub fn render_rvals(&self) -> String {
        self.rvals.join(",")
    }

    /// Bound values, keyed by placeholder name.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consume the clause, returning the bound values.
    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    fn pairs(&self) -> impl Iterator<Item = String> + '_ {
        self.lvals
            .iter()
            .zip(&self.rvals)
            .map(|(lval, rval)| format!("{lval}={rval}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== Quoting ====================

    #[test]
    fn test_quote_identifier_plain() {
        assert_eq!(quote_identifier("foo"), "foo");
        assert_eq!(quote_identifier("awsdms_apply_exceptions"), "awsdms_apply_exceptions");
        assert_eq!(quote_identifier("_private"), "_private");
        assert_eq!(quote_identifier("v2"), "v2");
    }

    #[test]
    fn test_quote_identifier_special() {
        assert_eq!(quote_identifier("from"), "\"from\"");
        assert_eq!(quote_identifier("Foo"), "\"Foo\"");
        assert_eq!(quote_identifier("foo-bar"), "\"foo-bar\"");
        assert_eq!(quote_identifier("42nd"), "\"42nd\"");
        assert_eq!(quote_identifier(""), "\"\"");
    }

    #[test]
    fn test_quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("fo\"o"), "\"fo\"\"o\"");
    }

    #[test]
    fn test_quote_relation_name() {
        assert_eq!(quote_relation_name("foo"), "foo");
        assert_eq!(quote_relation_name("public.foo"), "public.foo");
        assert_eq!(quote_relation_name("from.mongodb"), "\"from\".mongodb");
        assert_eq!(quote_relation_name("\"keep\".me"), "\"keep\".me");
    }

    // ==================== TableAddress ====================

    #[test]
    fn test_table_address_fqn() {
        let address = TableAddress::new("public", "foo");
        assert_eq!(address.fqn().unwrap(), "public.foo");
    }

    #[test]
    fn test_table_address_fqn_quotes_reserved() {
        let address = TableAddress::new("from", "mongodb");
        assert_eq!(address.fqn().unwrap(), "\"from\".mongodb");
    }

    #[test]
    fn test_table_address_fqn_without_schema() {
        let address = TableAddress::new("", "foo");
        let err = address.fqn().unwrap_err();
        assert!(err
            .to_string()
            .contains("Unable to compute a full-qualified table name without schema name"));
    }

    #[test]
    fn test_table_address_display() {
        let address = TableAddress::new("public", "foo");
        assert_eq!(address.to_string(), "public.foo");
    }

    #[test]
    fn test_table_address_ordering() {
        let mut addresses = vec![
            TableAddress::new("public", "zz"),
            TableAddress::new("dms", "aa"),
            TableAddress::new("public", "aa"),
        ];
        addresses.sort();
        assert_eq!(addresses[0], TableAddress::new("dms", "aa"));
        assert_eq!(addresses[2], TableAddress::new("public", "zz"));
    }

    // ==================== SqlOperation ====================

    #[test]
    fn test_sql_operation_without_parameters() {
        let op = SqlOperation::without_parameters("DROP TABLE IF EXISTS public.foo;");
        assert_eq!(op.statement, "DROP TABLE IF EXISTS public.foo;");
        assert!(op.parameters.is_none());
    }

    #[test]
    fn test_sql_operation_record_parameters() {
        let mut record = Map::new();
        record.insert("id".to_string(), json!(42));
        let op = SqlOperation::new("DELETE FROM public.foo WHERE id=:id;", record);
        assert_eq!(op.parameters.as_record().unwrap()["id"], json!(42));
        assert!(op.parameters.as_batch().is_none());
    }

    #[test]
    fn test_sql_operation_serde() {
        let op = SqlOperation::without_parameters("SELECT 1;");
        let encoded = serde_json::to_value(&op).unwrap();
        assert_eq!(encoded, json!({"statement": "SELECT 1;"}));

        let decoded: SqlOperation =
            serde_json::from_value(json!({"statement": "SELECT 1;", "parameters": {"a": 1}}))
                .unwrap();
        assert_eq!(decoded.parameters.as_record().unwrap()["a"], json!(1));

        let decoded: SqlOperation =
            serde_json::from_value(json!({"statement": "SELECT 1;", "parameters": [{"a": 1}]}))
                .unwrap();
        assert_eq!(decoded.parameters.as_batch().unwrap().len(), 1);
    }

    // ==================== SqlClause ====================

    #[test]
    fn test_clause_render_set() {
        let mut clause = SqlClause::new();
        clause.add("age", "age", json!(33));
        clause.add("name", "name", json!("John"));
        assert_eq!(clause.render_set(), "age=:age, name=:name");
        assert_eq!(clause.values()["age"], json!(33));
    }

    #[test]
    fn test_clause_render_where() {
        let mut clause = SqlClause::new();
        clause.add("id", "id", json!(42));
        clause.add("data['ts']", "ts", json!(17));
        assert_eq!(clause.render_where(), "id=:id AND data['ts']=:ts");
    }

    #[test]
    fn test_clause_render_column_lists() {
        let mut clause = SqlClause::new();
        clause.add("age", "age", json!(31));
        clause.add("name", "name", json!("Jane"));
        assert_eq!(clause.render_lvals(), "\"age\",\"name\"");
        assert_eq!(clause.render_rvals(), ":age,:name");
    }

    #[test]
    fn test_clause_add_cast() {
        let mut clause = SqlClause::new();
        clause.add_cast("data['x']", "x", json!({"a": 1}), "OBJECT");
        clause.add_cast("data['y']", "y", json!([{"b": 2}]), "OBJECT[]");
        assert_eq!(
            clause.render_set(),
            "data['x']=CAST(:x AS OBJECT), data['y']=CAST(:y AS OBJECT[])"
        );
    }

    #[test]
    fn test_clause_empty() {
        let clause = SqlClause::new();
        assert!(clause.is_empty());
        assert_eq!(clause.render_set(), "");
    }

    #[test]
    fn test_clause_value_merge() {
        let mut set_clause = SqlClause::new();
        set_clause.add("age", "age", json!(33));
        let mut where_clause = SqlClause::new();
        where_clause.add("id", "id", json!(42));

        let mut parameters = set_clause.into_values();
        parameters.extend(where_clause.into_values());
        assert_eq!(parameters["age"], json!(33));
        assert_eq!(parameters["id"], json!(42));
    }
}
