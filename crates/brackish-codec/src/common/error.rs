//! Error types for translation operations
//!
//! One error enum for all sources, with classification for metrics and
//! triage. Translators distinguish three failure shapes that callers treat
//! differently: envelopes that are not in the expected wire format
//! ([`CodecError::MessageFormat`]), envelopes that are well-formed but carry
//! an operation the translator does not speak ([`CodecError::UnknownOperation`],
//! which keeps the full record for dead-letter handling), and events an
//! operator explicitly configured away ([`CodecError::SkipOperation`], which
//! is a signal rather than a failure).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Envelope does not match the source wire format
    Format,
    /// Well-formed envelope with an unsupported operation
    Operation,
    /// Event suppressed by operator configuration
    Skipped,
    /// Missing prerequisite state (e.g. primary keys for DML)
    Precondition,
    /// Invalid translator configuration
    Configuration,
    /// Type mapping failure
    Schema,
    /// JSON encoding/decoding failure
    Serialization,
}

/// Errors produced while translating change events into SQL.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Event envelope does not match the source wire format
    #[error("{0}")]
    MessageFormat(String),

    /// Recognized envelope carrying an operation the translator does not
    /// support. The offending record travels with the error so callers can
    /// route it to a dead-letter channel.
    #[error("{message}")]
    UnknownOperation {
        message: String,
        operation: String,
        record: Value,
    },

    /// Event intentionally suppressed by configuration
    #[error("{0}")]
    SkipOperation(String),

    /// Required state is missing for the requested statement
    #[error("{0}")]
    Precondition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A DynamoDB key attribute type has no SQL column type counterpart
    #[error("Mapping DynamoDB type failed: name={column}, type={type_name}")]
    TypeMapping { column: String, type_name: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Create a new message format error
    pub fn message_format(msg: impl Into<String>) -> Self {
        Self::MessageFormat(msg.into())
    }

    /// Create a new unknown operation error carrying the offending record
    pub fn unknown_operation(
        message: impl Into<String>,
        operation: impl Into<String>,
        record: Value,
    ) -> Self {
        Self::UnknownOperation {
            message: message.into(),
            operation: operation.into(),
            record,
        }
    }

    /// Create a new skip signal
    pub fn skip_operation(msg: impl Into<String>) -> Self {
        Self::SkipOperation(msg.into())
    }

    /// Create a new precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new type mapping error
    pub fn type_mapping(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::TypeMapping {
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    /// Check if this error is a skip signal rather than a failure.
    ///
    /// Pipelines drop the event and move on instead of raising an alert.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SkipOperation(_))
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MessageFormat(_) => ErrorCategory::Format,
            Self::UnknownOperation { .. } => ErrorCategory::Operation,
            Self::SkipOperation(_) => ErrorCategory::Skipped,
            Self::Precondition(_) => ErrorCategory::Precondition,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::TypeMapping { .. } => ErrorCategory::Schema,
            Self::Json(_) => ErrorCategory::Serialization,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MessageFormat(_) => "message_format",
            Self::UnknownOperation { .. } => "unknown_operation",
            Self::SkipOperation(_) => "skip_operation",
            Self::Precondition(_) => "precondition",
            Self::Config(_) => "config",
            Self::TypeMapping { .. } => "type_mapping",
            Self::Json(_) => "json",
        }
    }
}
