use std::collections::BTreeMap;

use hcetl_load::LoadReport;
use hcetl_model::NormalizedColumn;
use serde::Serialize;

use crate::error::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub stage: Stage,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionCount {
    pub dimension: String,
    pub table: String,
    pub rows: usize,
}

/// Everything a run observed, serializable as the JSON run report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub source: String,
    pub rows_read: usize,
    pub rows_normalized: usize,
    pub field_issues: BTreeMap<NormalizedColumn, usize>,
    pub dimensions: Vec<DimensionCount>,
    pub fact_rows: usize,
    pub unmatched: BTreeMap<String, usize>,
    /// `None` when the run stopped before the load stage (dry run).
    pub load: Option<LoadReport>,
    pub stages: Vec<StageTiming>,
}

impl RunReport {
    pub fn field_issue_total(&self) -> usize {
        self.field_issues.values().sum()
    }

    pub fn unmatched_total(&self) -> usize {
        self.unmatched.values().sum()
    }
}
