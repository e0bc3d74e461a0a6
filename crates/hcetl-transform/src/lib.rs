//! Transform stage of the encounter ETL.
//!
//! This crate turns a raw extract into a star schema:
//!
//! - **normalization**: per-field cleaning rules (headers, names, hospitals, dates, numbers)
//! - **normalizer**: applies the rules to a whole [`RawDataset`](hcetl_ingest::RawDataset)
//! - **dimension**: deduplicated dimension tables with dense surrogate keys
//! - **fact**: left-join of normalized rows against the dimensions
//! - **frame**: renders a normalized dataset back into a Polars DataFrame
//!
//! Every stage takes an immutable input and returns a new collection.

pub mod dimension;
pub mod fact;
pub mod frame;
pub mod normalization;
pub mod normalizer;

pub use dimension::{StarDimensionSpecs, build_dimension, build_star_dimensions};
pub use fact::{FactAssembly, assemble_facts};
pub use frame::normalized_frame;
pub use normalizer::{
    DEFAULT_DATE_FORMATS, NormalizeError, NormalizeOptions, NormalizedDataset, normalize,
};
