//! # Common Model and Stores
//!
//! Source-agnostic building blocks shared by every translator:
//!
//! - [`SqlOperation`] - One parameterized statement plus bound values
//! - [`SqlClause`] - lval/rval accumulator for SET/WHERE/column lists
//! - [`TableAddress`] - Schema-qualified table identity
//! - [`PrimaryKeyStore`] / [`ColumnTypeMapStore`] - Per-table translator state
//! - [`DualRecord`] / [`UniversalRecord`] - typed/untyped record carriers
//! - [`RecordTransform`] / [`TransformChain`] - Record reshaping hook
//! - [`CodecError`] - Error taxonomy with skip/unknown-operation signals
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Common Module                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  SqlOperation  ←─── Output currency of every translator  │
//! │  SqlClause     ←─── Deterministic clause rendering       │
//! │  TableAddress  ←─── Store key, quoted fqn rendering      │
//! │  Stores        ←─── Seeded or learned per-table state    │
//! │  Records       ←─── pk / typed / untyped splitting       │
//! │  Transforms    ←─── Drop/reshape before parameter bind   │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod error;
mod model;
mod record;
mod store;
mod transform;

pub use error::*;
pub use model::*;
pub use record::*;
pub use store::*;
pub use transform::*;
