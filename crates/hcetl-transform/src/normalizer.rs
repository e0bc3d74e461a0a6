//! Whole-dataset normalization.
//!
//! Maps a [`RawDataset`] with source headers onto the fixed
//! [`NormalizedColumn`] set and applies the per-field rules from
//! [`crate::normalization`]. Field-level failures null the field and are
//! tallied in [`Diagnostics`]; only structural problems and an exceeded
//! failure threshold abort the run.

use std::collections::BTreeMap;

use hcetl_common::{column_strings, redact_value};
use hcetl_ingest::RawDataset;
use hcetl_model::{
    Diagnostics, FieldIssue, FieldIssueReason, NormalizedColumn, NormalizedRecord, SchemaError,
    TransformError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::normalization::{
    normalize_hospital, normalize_name, parse_date, parse_integer, parse_numeric,
    standardize_column_name,
};

/// Day-first source format, then ISO so normalized output parses again.
pub const DEFAULT_DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

/// Errors that stop normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Options controlling normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// chrono formats tried in order for the two date columns.
    pub date_formats: Vec<String>,
    /// Abort when more than this many fields fail their rule. `None` never aborts.
    pub max_field_failures: Option<usize>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| (*f).to_string()).collect(),
            max_field_failures: None,
        }
    }
}

impl NormalizeOptions {
    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }

    pub fn with_max_field_failures(mut self, threshold: Option<usize>) -> Self {
        self.max_field_failures = threshold;
        self
    }
}

/// Result of normalization: one record per input row, in input order.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDataset {
    pub records: Vec<NormalizedRecord>,
    pub diagnostics: Diagnostics,
    /// Source header for each normalized column.
    pub source_headers: BTreeMap<NormalizedColumn, String>,
}

impl NormalizedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalizes every row of a raw dataset.
///
/// # Errors
///
/// - [`SchemaError::MissingColumn`] if a required column is absent after
///   header standardization
/// - [`SchemaError::DuplicateColumn`] if two headers standardize to the same name
/// - [`TransformError::ThresholdExceeded`] if field failures exceed
///   [`NormalizeOptions::max_field_failures`]
pub fn normalize(
    raw: &RawDataset,
    options: &NormalizeOptions,
) -> Result<NormalizedDataset, NormalizeError> {
    let source_headers = map_headers(&raw.column_names())?;
    let frame = raw.frame();

    let mut cells: BTreeMap<NormalizedColumn, Vec<String>> = BTreeMap::new();
    for (column, header) in &source_headers {
        let values = column_strings(frame, header).map_err(|e| TransformError::Frame {
            column: header.clone(),
            message: e.to_string(),
        })?;
        cells.insert(*column, values);
    }

    let mut normalizer = RowNormalizer {
        cells: &cells,
        options,
        diagnostics: Diagnostics::default(),
    };
    let records: Vec<NormalizedRecord> = (0..raw.height()).map(|row| normalizer.row(row)).collect();
    let diagnostics = normalizer.diagnostics;

    if let Some(threshold) = options.max_field_failures
        && diagnostics.total() > threshold
    {
        let column = diagnostics
            .most_affected_column()
            .unwrap_or(NormalizedColumn::Name);
        return Err(TransformError::ThresholdExceeded {
            failures: diagnostics.total(),
            threshold,
            column,
        }
        .into());
    }

    if diagnostics.is_empty() {
        info!(rows = records.len(), "normalized dataset");
    } else {
        for (column, count) in diagnostics.by_column() {
            warn!(column = %column, count, "fields nulled during normalization");
        }
        info!(
            rows = records.len(),
            nulled_fields = diagnostics.total(),
            "normalized dataset"
        );
    }

    Ok(NormalizedDataset {
        records,
        diagnostics,
        source_headers,
    })
}

/// Maps each normalized column to the source header that standardizes to it.
fn map_headers(headers: &[String]) -> Result<BTreeMap<NormalizedColumn, String>, SchemaError> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for header in headers {
        let standardized = standardize_column_name(header);
        if let Some(first) = seen.get(&standardized) {
            return Err(SchemaError::DuplicateColumn {
                column: standardized,
                first: first.clone(),
                second: header.clone(),
            });
        }
        if standardized != *header {
            debug!(from = %header, to = %standardized, "renamed column");
        }
        seen.insert(standardized, header.clone());
    }

    let mut mapping = BTreeMap::new();
    for column in NormalizedColumn::ALL {
        let Some(header) = seen.get(column.as_str()) else {
            return Err(SchemaError::MissingColumn {
                column: column.as_str().to_string(),
                available: seen.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        };
        mapping.insert(column, header.clone());
    }
    Ok(mapping)
}

struct RowNormalizer<'a> {
    cells: &'a BTreeMap<NormalizedColumn, Vec<String>>,
    options: &'a NormalizeOptions,
    diagnostics: Diagnostics,
}

impl<'a> RowNormalizer<'a> {
    fn cell(&self, row: usize, column: NormalizedColumn) -> &'a str {
        let cells = self.cells;
        cells
            .get(&column)
            .and_then(|values| values.get(row))
            .map_or("", |value| value.trim())
    }

    fn text(&self, row: usize, column: NormalizedColumn) -> String {
        self.cell(row, column).to_string()
    }

    /// Applies a parser, recording a field issue when a non-blank cell fails.
    fn parsed<T>(
        &mut self,
        row: usize,
        column: NormalizedColumn,
        reason: FieldIssueReason,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = self.cell(row, column);
        if raw.is_empty() {
            return None;
        }
        let parsed = parse(raw);
        if parsed.is_none() {
            debug!(row, column = %column, value = redact_value(raw), reason = %reason, "field nulled");
            self.diagnostics.record(FieldIssue {
                row,
                column,
                reason,
            });
        }
        parsed
    }

    fn date(&mut self, row: usize, column: NormalizedColumn) -> Option<chrono::NaiveDate> {
        let options = self.options;
        let formats = options.date_formats.as_slice();
        self.parsed(row, column, FieldIssueReason::UnparsableDate, |value| {
            parse_date(value, formats)
        })
    }

    fn row(&mut self, row: usize) -> NormalizedRecord {
        use NormalizedColumn as C;

        NormalizedRecord {
            name: normalize_name(self.cell(row, C::Name)),
            age: self.parsed(row, C::Age, FieldIssueReason::NonInteger, parse_integer),
            gender: self.text(row, C::Gender),
            blood_type: self.text(row, C::BloodType),
            medical_condition: self.text(row, C::MedicalCondition),
            date_of_admission: self.date(row, C::DateOfAdmission),
            doctor: self.text(row, C::Doctor),
            hospital: normalize_hospital(self.cell(row, C::Hospital)),
            insurance_provider: self.text(row, C::InsuranceProvider),
            billing_amount: self.parsed(
                row,
                C::BillingAmount,
                FieldIssueReason::NonNumeric,
                parse_numeric,
            ),
            room_number: self.parsed(row, C::RoomNumber, FieldIssueReason::NonInteger, parse_integer),
            admission_type: self.text(row, C::AdmissionType),
            discharge_date: self.date(row, C::DischargeDate),
            medication: self.text(row, C::Medication),
            test_results: self.text(row, C::TestResults),
        }
    }
}
