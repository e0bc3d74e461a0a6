//! Encounter extract ingestion.
//!
//! The extractor is the pipeline's source collaborator: it reads a flat CSV
//! extract once, fully materialized, into a [`RawDataset`]. Column headers are
//! kept exactly as found; standardizing them is the normalizer's job.
//!
//! # Example
//!
//! ```ignore
//! use hcetl_ingest::{CsvSource, Source};
//!
//! let source = CsvSource::new("healthcare_dataset.csv");
//! let raw = source.read()?;
//! println!("{} rows, columns {:?}", raw.height(), raw.column_names());
//! ```

mod csv;
mod dataset;
mod error;

pub use csv::{CsvSource, CsvSourceOptions, MAX_CSV_FILE_SIZE, validate_encoding};
pub use dataset::RawDataset;
pub use error::{Result, SourceError};

/// A producer of the raw tabular dataset.
pub trait Source {
    /// Human-readable description for logs (e.g. the file path).
    fn describe(&self) -> String;

    /// Reads the whole dataset.
    fn read(&self) -> Result<RawDataset>;
}
