//! Data model for the healthcare encounter star schema.
//!
//! - **column**: the fixed set of normalized columns and their semantic kinds
//! - **value**: a single typed cell, hashable so it can form natural keys
//! - **record**: `NormalizedRecord` and `FactRecord`
//! - **dimension**: dimension specifications and surrogate-keyed tables
//! - **diagnostics**: field-level issue tally and join mismatch counts
//! - **table**: sink-facing table schemas and rows
//! - **error**: `SchemaError` and `TransformError`

pub mod column;
pub mod diagnostics;
pub mod dimension;
pub mod error;
pub mod record;
pub mod table;
pub mod value;

pub use column::{ColumnKind, NormalizedColumn};
pub use diagnostics::{Diagnostics, FieldIssue, FieldIssueReason, JoinReport};
pub use dimension::{DimensionRow, DimensionSpec, DimensionTable, StarDimensions};
pub use error::{SchemaError, TransformError};
pub use record::{FactRecord, NormalizedRecord};
pub use table::{ColumnDef, SqlType, TableData, TableSchema};
pub use value::FieldValue;
