//! Column mapping strategies and type mapping
//!
//! Two ways to lay out a captured table on the sink:
//!
//! | Strategy | Layout |
//! |----------|--------|
//! | `DIRECT` | One sink column per source column, types mapped below |
//! | `UNIVERSAL` | Three containers: `pk OBJECT(STRICT)`, `data OBJECT(DYNAMIC)`, `aux OBJECT(IGNORED)` |
//!
//! `DIRECT` gives natural SQL against the sink table but breaks when the
//! source schema drifts; `UNIVERSAL` absorbs schema drift at the cost of
//! subscript access paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{CodecError, Result};

/// How source columns map onto sink columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnMappingStrategy {
    /// One sink column per source column
    #[default]
    Direct,
    /// Typed/untyped container layout
    Universal,
}

impl ColumnMappingStrategy {
    /// Canonical configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "DIRECT",
            Self::Universal => "UNIVERSAL",
        }
    }
}

impl fmt::Display for ColumnMappingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnMappingStrategy {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DIRECT" => Ok(Self::Direct),
            "UNIVERSAL" => Ok(Self::Universal),
            other => Err(CodecError::config(format!(
                "'{other}' is not a valid ColumnMappingStrategy"
            ))),
        }
    }
}

/// Map a DMS column type onto a sink column type.
///
/// Integer widths map directly; unsigned types take the next width up so
/// the value range fits. Everything else, temporal types included, lands
/// in TEXT and is left to the reader to interpret.
pub fn sink_type(dms_type: &str) -> &'static str {
    match dms_type {
        "INT8" | "INT16" | "UINT8" => "INT2",
        "INT32" | "UINT16" => "INT4",
        "INT64" | "UINT32" | "UINT64" => "INT8",
        _ => "TEXT",
    }
}
