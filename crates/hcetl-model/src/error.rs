//! Fatal schema and transform errors.

use thiserror::Error;

use crate::column::NormalizedColumn;

/// The source or a dimension specification does not have the expected shape.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required normalized column is absent after header standardization.
    #[error("required column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    /// Two raw headers collapse to the same standardized identifier.
    #[error("source headers '{first}' and '{second}' both standardize to '{column}'")]
    DuplicateColumn {
        column: String,
        first: String,
        second: String,
    },

    /// A dimension references a column the normalized dataset does not have.
    #[error("dimension '{dimension}' references unknown column '{column}'")]
    UnknownColumn { dimension: String, column: String },

    /// A dimension has no natural-key columns.
    #[error("dimension '{dimension}' has an empty natural key")]
    EmptyNaturalKey { dimension: String },
}

/// The normalizer could not produce a normalized dataset.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Field-level failures exceeded the operator-set threshold.
    #[error(
        "{failures} field-level failures exceed the threshold of {threshold} \
         (most affected column: {column})"
    )]
    ThresholdExceeded {
        failures: usize,
        threshold: usize,
        column: NormalizedColumn,
    },

    /// A column could not be read from the source frame.
    #[error("failed to read column '{column}': {message}")]
    Frame { column: String, message: String },
}
