//! Loader collaborator for the encounter star schema.
//!
//! - **star**: turns dimension tables and facts into sink-ready [`TableData`](hcetl_model::TableData)
//! - **ddl**: quoted DDL and insert statements
//! - **sink**: the [`Sink`] trait plus SQLite, CSV-directory, and in-memory sinks
//! - **loader**: provisions and fills every table, retrying transient failures
//!
//! Every table is provisioned drop-then-create, so a load is always a full reload.

pub mod ddl;
mod error;
pub mod loader;
pub mod sink;
pub mod star;

pub use ddl::{create_table_sql, drop_table_sql, insert_sql, quote_identifier};
pub use error::{Result, SinkError};
pub use loader::{LoadOptions, LoadReport, RetryPolicy, TableLoad, load_star, load_table};
pub use sink::{CsvDirSink, MemorySink, Sink, SqliteSink};
pub use star::{
    StarTables, TargetNames, dimension_table_data, fact_table_data, star_tables,
};
