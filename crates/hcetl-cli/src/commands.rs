//! Command implementations behind the `hcetl` subcommands.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hcetl_core::{RunReport, run_pipeline};
use hcetl_ingest::Source;
use hcetl_load::{TargetNames, create_table_sql, star_tables};
use hcetl_transform::{
    NormalizedDataset, StarDimensionSpecs, build_star_dimensions, normalize, normalized_frame,
};
use polars::prelude::{CsvWriter, SerWriter};
use tracing::info;

use crate::config::EtlConfig;

/// Runs the full pipeline. With `dry_run` the sink is never opened.
pub fn run_etl(config: &EtlConfig, dry_run: bool, report_path: Option<&Path>) -> Result<RunReport> {
    let source = config.csv_source()?;
    let options = config.pipeline_options();

    let report = if dry_run {
        run_pipeline(&source, None, &options)?
    } else {
        let mut sink = config
            .open_sink()
            .with_context(|| format!("open sink {}", config.sink_path.display()))?;
        run_pipeline(&source, Some(sink.as_mut()), &options)?
    };

    if let Some(path) = report_path {
        write_report(&report, path)?;
    }
    Ok(report)
}

/// Writes the run report as pretty-printed JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("write run report {}", path.display()))?;
    info!(path = %path.display(), "wrote run report");
    Ok(())
}

#[derive(Debug)]
pub struct NormalizeOutcome {
    pub source: String,
    pub rows_read: usize,
    pub dataset: NormalizedDataset,
    pub output: Option<PathBuf>,
}

/// Normalizes the source only, optionally writing the cleaned rows as CSV.
pub fn run_normalize(config: &EtlConfig, output: Option<&Path>) -> Result<NormalizeOutcome> {
    let source = config.csv_source()?;
    let raw = source.read().context("read source")?;
    let dataset = normalize(&raw, &config.normalize_options()).context("normalize")?;

    if let Some(path) = output {
        let mut frame = normalized_frame(&dataset.records).context("build normalized frame")?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), rows = dataset.len(), "wrote normalized CSV");
    }

    Ok(NormalizeOutcome {
        source: source.describe(),
        rows_read: raw.height(),
        dataset,
        output: output.map(Path::to_path_buf),
    })
}

/// `CREATE TABLE` statements for every target table, dimensions first.
pub fn schema_ddl(names: &TargetNames) -> Result<Vec<String>> {
    let dimensions = build_star_dimensions(&[], &StarDimensionSpecs::default(), false)?;
    star_tables(&dimensions, &[], names)
        .iter()
        .map(|table| {
            create_table_sql(&table.schema)
                .with_context(|| format!("table {}", table.schema.qualified_name()))
        })
        .collect()
}
