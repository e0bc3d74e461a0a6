use std::collections::BTreeMap;

use hcetl_model::{FieldValue, TableSchema};

use super::{Sink, check_row_shapes};
use crate::error::{Result, SinkError};

/// Keeps every table in memory, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: BTreeMap<String, (TableSchema, Vec<Vec<FieldValue>>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of a table by `schema.name`.
    pub fn rows(&self, qualified_name: &str) -> Option<&[Vec<FieldValue>]> {
        self.tables
            .get(qualified_name)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn schema(&self, qualified_name: &str) -> Option<&TableSchema> {
        self.tables.get(qualified_name).map(|(schema, _)| schema)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }
}

impl Sink for MemorySink {
    fn describe(&self) -> String {
        "in-memory sink".to_string()
    }

    fn provision(&mut self, schema: &TableSchema) -> Result<()> {
        self.tables
            .insert(schema.qualified_name(), (schema.clone(), Vec::new()));
        Ok(())
    }

    fn insert(
        &mut self,
        schema: &TableSchema,
        rows: &[Vec<FieldValue>],
        _batch_size: usize,
    ) -> Result<usize> {
        check_row_shapes(schema, rows)?;
        let name = schema.qualified_name();
        let (_, stored) = self
            .tables
            .get_mut(&name)
            .ok_or(SinkError::NotProvisioned(name))?;
        stored.extend(rows.iter().cloned());
        Ok(rows.len())
    }
}
