//! Field-level cleaning rules.
//!
//! Each rule is a pure function on one cell so it can be tested in isolation:
//! - **header**: column identifier standardization
//! - **name**: title case and leading honorific removal
//! - **hospital**: trailing separator removal
//! - **date**: calendar date parsing
//! - **numeric**: decimal and integer coercion

pub mod date;
pub mod header;
pub mod hospital;
pub mod name;
pub mod numeric;

pub use date::parse_date;
pub use header::standardize_column_name;
pub use hospital::normalize_hospital;
pub use name::{normalize_name, strip_honorific, title_case};
pub use numeric::{parse_integer, parse_numeric};
