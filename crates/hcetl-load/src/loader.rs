//! Table loading with bounded retries.

use std::thread;
use std::time::{Duration, Instant};

use hcetl_model::TableData;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::error::Result;
use crate::sink::Sink;
use crate::star::StarTables;

/// How often a table load is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows per insert statement.
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub rows: usize,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Provisions and fills one table.
///
/// A retryable failure restarts the whole table (drop, create, insert) after
/// the policy's backoff. Other failures, and the last retryable one, are
/// returned as-is.
pub fn load_table(sink: &mut dyn Sink, table: &TableData, options: &LoadOptions) -> Result<TableLoad> {
    let name = table.schema.qualified_name();
    let max_attempts = options.retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let outcome = sink
            .provision(&table.schema)
            .and_then(|()| sink.insert(&table.schema, &table.rows, options.batch_size));
        match outcome {
            Ok(rows) => {
                return Ok(TableLoad {
                    table: name,
                    rows,
                    attempts: attempt,
                });
            }
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    table = %name,
                    attempt,
                    max_attempts,
                    error = %err,
                    "table load failed, retrying"
                );
                thread::sleep(options.retry.backoff);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Loads every dimension table, then the fact table.
pub fn load_star(
    sink: &mut dyn Sink,
    tables: &StarTables,
    options: &LoadOptions,
) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    for table in tables.iter() {
        let table_span = info_span!("load_table", table = %table.schema.qualified_name());
        let start = Instant::now();
        let load = table_span.in_scope(|| load_table(sink, table, options))?;
        info!(
            table = %load.table,
            rows = load.rows,
            attempts = load.attempts,
            duration_ms = start.elapsed().as_millis(),
            "loaded table"
        );
        report.tables.push(load);
    }
    Ok(report)
}
