//! Stage sequencing.

use std::time::Instant;

use hcetl_ingest::{RawDataset, Source};
use hcetl_load::{LoadOptions, Sink, StarTables, TargetNames, load_star, star_tables};
use hcetl_model::StarDimensions;
use hcetl_transform::{
    FactAssembly, NormalizeOptions, NormalizedDataset, StarDimensionSpecs, assemble_facts,
    build_star_dimensions, normalize,
};
use tracing::{Span, info, info_span, warn};

use crate::cancel::CancelFlag;
use crate::error::{PipelineError, PipelineErrorKind, Stage};
use crate::report::{DimensionCount, RunReport, StageTiming};

/// Everything a run needs besides the source and sink handles.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub normalize: NormalizeOptions,
    pub dimensions: StarDimensionSpecs,
    /// Build the four dimensions concurrently.
    pub parallel_dimensions: bool,
    pub target: TargetNames,
    pub load: LoadOptions,
    pub cancel: CancelFlag,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            dimensions: StarDimensionSpecs::default(),
            parallel_dimensions: true,
            target: TargetNames::default(),
            load: LoadOptions::default(),
            cancel: CancelFlag::default(),
        }
    }
}

/// In-memory result of the transform stages.
#[derive(Debug, Clone)]
pub struct StarOutput {
    pub normalized: NormalizedDataset,
    pub dimensions: StarDimensions,
    pub facts: FactAssembly,
    pub tables: StarTables,
    pub stages: Vec<StageTiming>,
}

struct Runner<'a> {
    cancel: &'a CancelFlag,
    timings: Vec<StageTiming>,
}

impl<'a> Runner<'a> {
    fn new(cancel: &'a CancelFlag) -> Self {
        Self {
            cancel,
            timings: Vec::new(),
        }
    }

    /// Runs one stage inside its span unless cancellation was requested.
    fn stage<T, E>(
        &mut self,
        stage: Stage,
        span: &Span,
        run: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, PipelineError>
    where
        E: Into<PipelineErrorKind>,
    {
        if self.cancel.is_cancelled() {
            warn!(stage = %stage, "pipeline cancelled");
            return Err(PipelineError::new(stage, PipelineErrorKind::Cancelled));
        }
        let start = Instant::now();
        let result = span.in_scope(run);
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.timings.push(StageTiming { stage, duration_ms });
        match result {
            Ok(value) => {
                span.in_scope(|| info!(duration_ms, "stage complete"));
                Ok(value)
            }
            Err(err) => Err(PipelineError::new(stage, err)),
        }
    }
}

/// Runs normalize, dimensions, and facts on an already-extracted dataset.
pub fn transform(raw: &RawDataset, options: &PipelineOptions) -> Result<StarOutput, PipelineError> {
    let mut runner = Runner::new(&options.cancel);
    let mut output = transform_with(&mut runner, raw, options)?;
    output.stages = runner.timings;
    Ok(output)
}

fn transform_with(
    runner: &mut Runner<'_>,
    raw: &RawDataset,
    options: &PipelineOptions,
) -> Result<StarOutput, PipelineError> {
    let normalized = runner.stage(
        Stage::Normalize,
        &info_span!("normalize", rows = raw.height()),
        || normalize(raw, &options.normalize),
    )?;

    let dimensions = runner.stage(
        Stage::Dimensions,
        &info_span!("dimensions", parallel = options.parallel_dimensions),
        || {
            build_star_dimensions(
                &normalized.records,
                &options.dimensions,
                options.parallel_dimensions,
            )
        },
    )?;

    let facts = runner.stage(Stage::Facts, &info_span!("facts"), || {
        Ok::<_, PipelineErrorKind>(assemble_facts(&normalized.records, &dimensions))
    })?;

    let tables = star_tables(&dimensions, &facts.facts, &options.target);
    Ok(StarOutput {
        normalized,
        dimensions,
        facts,
        tables,
        stages: Vec::new(),
    })
}

/// Runs the whole pipeline.
///
/// With `sink` set to `None` the run stops after the facts stage (dry run)
/// and the report has no load section.
///
/// # Errors
///
/// Returns the first failing stage's error, or a cancellation error naming
/// the stage that was about to start.
pub fn run_pipeline(
    source: &dyn Source,
    sink: Option<&mut dyn Sink>,
    options: &PipelineOptions,
) -> Result<RunReport, PipelineError> {
    let description = source.describe();
    let pipeline_span = info_span!("pipeline", source = %description);
    let _pipeline_guard = pipeline_span.enter();
    let start = Instant::now();
    let mut runner = Runner::new(&options.cancel);

    let raw = runner.stage(Stage::Extract, &info_span!("extract"), || source.read())?;
    let output = transform_with(&mut runner, &raw, options)?;

    let load = match sink {
        Some(sink) => {
            let load_span = info_span!("load", sink = %sink.describe());
            Some(runner.stage(Stage::Load, &load_span, || {
                load_star(sink, &output.tables, &options.load)
            })?)
        }
        None => {
            info!("dry run, skipping load");
            None
        }
    };

    let report = RunReport {
        source: description,
        rows_read: raw.height(),
        rows_normalized: output.normalized.len(),
        field_issues: output.normalized.diagnostics.by_column().clone(),
        dimensions: output
            .dimensions
            .iter()
            .map(|table| DimensionCount {
                dimension: table.name.clone(),
                table: options.target.dimension_table(&table.name),
                rows: table.len(),
            })
            .collect(),
        fact_rows: output.facts.facts.len(),
        unmatched: output.facts.joins.unmatched().clone(),
        load,
        stages: runner.timings,
    };

    info!(
        rows = report.rows_read,
        facts = report.fact_rows,
        field_issues = report.field_issue_total(),
        unmatched = report.unmatched_total(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(report)
}
