//! Target sinks.

mod csv_dir;
mod memory;
mod sqlite;

pub use csv_dir::CsvDirSink;
pub use memory::MemorySink;
pub use sqlite::SqliteSink;

use hcetl_model::{FieldValue, TableSchema};

use crate::error::{Result, SinkError};

/// A relational target accepting typed rows by positional binding.
pub trait Sink {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Creates the table, dropping any same-named table first.
    fn provision(&mut self, schema: &TableSchema) -> Result<()>;

    /// Inserts rows in column order, `batch_size` rows per statement.
    ///
    /// Returns the number of rows written.
    fn insert(
        &mut self,
        schema: &TableSchema,
        rows: &[Vec<FieldValue>],
        batch_size: usize,
    ) -> Result<usize>;
}

/// Rejects rows whose width does not match the table.
pub(crate) fn check_row_shapes(schema: &TableSchema, rows: &[Vec<FieldValue>]) -> Result<()> {
    let expected = schema.columns.len();
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(SinkError::RowShape {
            table: schema.qualified_name(),
            row,
            expected,
            actual: rows[row].len(),
        }),
        None => Ok(()),
    }
}
