use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hcetl_model::{FieldValue, TableSchema};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

use super::{Sink, check_row_shapes};
use crate::ddl::{create_table_sql, drop_table_sql, insert_sql, quote_identifier};
use crate::error::{Result, SinkError};

/// SQLite's default cap on bound parameters per statement.
const MAX_BOUND_PARAMETERS: usize = 32_766;

const IN_MEMORY: &str = ":memory:";

/// SQLite target.
///
/// The `main` schema is the opened database. Any other schema is attached
/// on first use: in memory for an in-memory database, otherwise as
/// `<schema>.db` next to the main file.
pub struct SqliteSink {
    conn: Connection,
    path: String,
    attached: HashSet<String>,
}

impl SqliteSink {
    /// Opens (or creates) a database file. `:memory:` opens an in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(&path)
        }
        .map_err(|source| SinkError::Open {
            target: path.clone(),
            source,
        })?;
        Ok(Self {
            conn,
            path,
            attached: HashSet::new(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(IN_MEMORY)
    }

    /// The underlying connection, for inspection after a load.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn attach_target(&self, schema: &str) -> String {
        if self.path == IN_MEMORY {
            return IN_MEMORY.to_string();
        }
        let parent = Path::new(&self.path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        parent
            .join(format!("{schema}.db"))
            .to_string_lossy()
            .into_owned()
    }

    fn ensure_schema(&mut self, schema: &str) -> Result<()> {
        if schema == "main" || self.attached.contains(schema) {
            return Ok(());
        }
        let target = self.attach_target(schema);
        let sql = format!("ATTACH DATABASE ?1 AS {}", quote_identifier(schema)?);
        self.conn
            .execute(&sql, [&target])
            .map_err(|source| SinkError::Open {
                target: target.clone(),
                source,
            })?;
        info!(schema, target = %target, "attached schema");
        self.attached.insert(schema.to_string());
        Ok(())
    }
}

fn sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(v) => Value::Text(v.clone()),
        FieldValue::Integer(v) => Value::Integer(*v),
        FieldValue::Decimal(v) => Value::Real(*v),
        FieldValue::Date(v) => Value::Text(v.format("%Y-%m-%d").to_string()),
    }
}

impl Sink for SqliteSink {
    fn describe(&self) -> String {
        format!("SQLite database {}", PathBuf::from(&self.path).display())
    }

    fn provision(&mut self, schema: &TableSchema) -> Result<()> {
        self.ensure_schema(&schema.schema)?;
        let sql = format!("{};\n{};", drop_table_sql(schema)?, create_table_sql(schema)?);
        self.conn
            .execute_batch(&sql)
            .map_err(|source| SinkError::Provision {
                table: schema.qualified_name(),
                source,
            })?;
        debug!(table = %schema.qualified_name(), "provisioned table");
        Ok(())
    }

    fn insert(
        &mut self,
        schema: &TableSchema,
        rows: &[Vec<FieldValue>],
        batch_size: usize,
    ) -> Result<usize> {
        check_row_shapes(schema, rows)?;
        let table = schema.qualified_name();
        let width = schema.columns.len().max(1);
        let batch_size = batch_size.clamp(1, MAX_BOUND_PARAMETERS / width);

        let insert_error = |row: usize| {
            let table = table.clone();
            move |source| SinkError::Insert { table, row, source }
        };

        let tx = self.conn.transaction().map_err(insert_error(0))?;
        for (batch_idx, batch) in rows.chunks(batch_size).enumerate() {
            let first_row = batch_idx * batch_size;
            let sql = insert_sql(schema, batch.len())?;
            let mut stmt = tx.prepare_cached(&sql).map_err(insert_error(first_row))?;
            stmt.execute(params_from_iter(batch.iter().flatten().map(sql_value)))
                .map_err(insert_error(first_row))?;
            debug!(table = %table, first_row, rows = batch.len(), "inserted batch");
        }
        tx.commit().map_err(insert_error(rows.len()))?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_main_schema_is_attached_next_to_the_file() {
        let sink = SqliteSink {
            conn: Connection::open_in_memory().unwrap(),
            path: "/data/healthcare.db".into(),
            attached: HashSet::new(),
        };
        assert_eq!(sink.attach_target("staging"), "/data/staging.db");
    }

    #[test]
    fn dates_bind_as_iso_text() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(
            sql_value(&FieldValue::Date(date)),
            Value::Text("2024-02-01".into())
        );
        assert_eq!(sql_value(&FieldValue::Null), Value::Null);
    }
}
