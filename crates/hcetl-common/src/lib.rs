//! Shared utilities for the healthcare ETL crates.
//!
//! This crate provides common utilities used across the workspace,
//! including Polars DataFrame helpers and the row-level redaction switch.

pub mod polars;
pub mod redact;

pub use polars::{cell_text, column_strings};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
