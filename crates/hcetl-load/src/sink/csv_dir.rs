use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use hcetl_model::{FieldValue, TableSchema};
use tracing::debug;

use super::{Sink, check_row_shapes};
use crate::ddl::quote_identifier;
use crate::error::{Result, SinkError};

/// Writes each table to `<dir>/<schema>.<table>.csv` with a header row.
pub struct CsvDirSink {
    dir: PathBuf,
    writers: HashMap<String, (PathBuf, csv::Writer<File>)>,
}

impl CsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writers: HashMap::new(),
        }
    }

    /// File path a table is written to.
    pub fn table_path(&self, schema: &TableSchema) -> PathBuf {
        self.dir
            .join(format!("{}.{}.csv", schema.schema, schema.name))
    }
}

impl Sink for CsvDirSink {
    fn describe(&self) -> String {
        format!("CSV directory {}", self.dir.display())
    }

    fn provision(&mut self, schema: &TableSchema) -> Result<()> {
        // Names become file names.
        quote_identifier(&schema.schema)?;
        quote_identifier(&schema.name)?;

        fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;
        // A reload replaces the previous writer before its file is truncated.
        if let Some((old_path, mut old)) = self.writers.remove(&schema.qualified_name()) {
            flush(&mut old, &old_path)?;
        }
        let path = self.table_path(schema);
        let mut writer = csv::Writer::from_path(&path).map_err(|source| SinkError::Csv {
            path: path.clone(),
            source,
        })?;
        writer
            .write_record(schema.column_names())
            .map_err(|source| SinkError::Csv {
                path: path.clone(),
                source,
            })?;
        flush(&mut writer, &path)?;
        debug!(path = %path.display(), "provisioned CSV table");
        self.writers.insert(schema.qualified_name(), (path, writer));
        Ok(())
    }

    fn insert(
        &mut self,
        schema: &TableSchema,
        rows: &[Vec<FieldValue>],
        batch_size: usize,
    ) -> Result<usize> {
        check_row_shapes(schema, rows)?;
        let name = schema.qualified_name();
        let (path, writer) = self
            .writers
            .get_mut(&name)
            .ok_or(SinkError::NotProvisioned(name))?;
        for batch in rows.chunks(batch_size.max(1)) {
            for row in batch {
                writer
                    .write_record(row.iter().map(ToString::to_string))
                    .map_err(|source| SinkError::Csv {
                        path: path.clone(),
                        source,
                    })?;
            }
            flush(writer, path)?;
        }
        flush(writer, path)?;
        Ok(rows.len())
    }
}

fn flush(writer: &mut csv::Writer<File>, path: &Path) -> Result<()> {
    writer.flush().map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}
