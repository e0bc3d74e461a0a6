//! Per-run diagnostics: field-level issues and join mismatches.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::column::NormalizedColumn;

/// Why a field was nulled during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssueReason {
    UnparsableDate,
    NonNumeric,
    NonInteger,
}

impl fmt::Display for FieldIssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnparsableDate => "unparsable date",
            Self::NonNumeric => "non-numeric value",
            Self::NonInteger => "non-integer value",
        })
    }
}

/// A field that failed its cleaning rule. The row is kept with the field nulled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Zero-based row index in the source dataset.
    pub row: usize,
    pub column: NormalizedColumn,
    pub reason: FieldIssueReason,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} ({})", self.row, self.column, self.reason)
    }
}

/// Tally of field-level failures for one normalization run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    issues: Vec<FieldIssue>,
    by_column: BTreeMap<NormalizedColumn, usize>,
}

impl Diagnostics {
    pub fn record(&mut self, issue: FieldIssue) {
        *self.by_column.entry(issue.column).or_insert(0) += 1;
        self.issues.push(issue);
    }

    pub fn total(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count_for(&self, column: NormalizedColumn) -> usize {
        self.by_column.get(&column).copied().unwrap_or(0)
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn by_column(&self) -> &BTreeMap<NormalizedColumn, usize> {
        &self.by_column
    }

    /// Column with the most failures, ties broken by column order.
    pub fn most_affected_column(&self) -> Option<NormalizedColumn> {
        self.by_column
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(column, _)| *column)
    }
}

/// Fact rows whose natural key found no dimension row, per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    unmatched: BTreeMap<String, usize>,
}

impl JoinReport {
    pub fn record_unmatched(&mut self, dimension: &str) {
        *self.unmatched.entry(dimension.to_string()).or_insert(0) += 1;
    }

    pub fn unmatched_for(&self, dimension: &str) -> usize {
        self.unmatched.get(dimension).copied().unwrap_or(0)
    }

    pub fn total_unmatched(&self) -> usize {
        self.unmatched.values().sum()
    }

    pub fn unmatched(&self) -> &BTreeMap<String, usize> {
        &self.unmatched
    }
}
