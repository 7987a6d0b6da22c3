//! Record transforms
//!
//! A hook for reshaping decoded records before they are bound as statement
//! parameters: redact fields, rename, or drop whole records. Transforms run
//! after source decoding, so they see plain JSON values rather than wire
//! envelopes.
//!
//! ```
//! use brackish_codec::{DropFields, TransformChain};
//! use serde_json::json;
//!
//! let chain = TransformChain::new().add(DropFields::new(&["password"]));
//! let out = chain.apply(json!({"user": "jane", "password": "s3cret"}));
//! assert_eq!(out, Some(json!({"user": "jane"})));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Transform applied to a decoded record.
pub trait RecordTransform: Send + Sync {
    /// Transform a record. Returns None to drop the record.
    fn apply(&self, record: Value) -> Option<Value>;

    /// Get the transform name.
    fn name(&self) -> &'static str;
}

/// Chain of record transforms applied in sequence.
#[derive(Clone)]
pub struct TransformChain {
    transforms: Vec<Arc<dyn RecordTransform>>,
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("transforms", &self.names())
            .finish()
    }
}

impl Default for TransformChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformChain {
    /// Create a new empty chain.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Add a transform to the chain (builder pattern).
    #[allow(clippy::should_implement_trait)] // Builder pattern, not std::ops::Add
    pub fn add<T: RecordTransform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// Add a shared transform to the chain.
    pub fn add_shared(mut self, transform: Arc<dyn RecordTransform>) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Apply all transforms in sequence.
    pub fn apply(&self, mut record: Value) -> Option<Value> {
        for transform in &self.transforms {
            record = transform.apply(record)?;
        }
        Some(record)
    }

    /// Get number of transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if chain is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Get transform names.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

// ============================================================================
// DropFields - Remove top-level fields from a record
// ============================================================================

/// Removes named top-level fields. Non-object records pass through.
pub struct DropFields {
    fields: Vec<String>,
}

impl DropFields {
    /// Create a transform dropping the given field names.
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl RecordTransform for DropFields {
    fn apply(&self, mut record: Value) -> Option<Value> {
        if let Value::Object(map) = &mut record {
            for field in &self.fields {
                map.remove(field);
            }
        }
        Some(record)
    }

    fn name(&self) -> &'static str {
        "drop_fields"
    }
}
