//! Normalized records as a Polars DataFrame.

use hcetl_model::{ColumnKind, FieldValue, NormalizedColumn, NormalizedRecord};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};

/// Renders records as a frame with standardized column names.
///
/// Integer and decimal columns are typed, dates are ISO `YYYY-MM-DD`
/// strings, and nulls stay null. Feeding the result back through
/// [`crate::normalize`] reproduces the same records.
pub fn normalized_frame(records: &[NormalizedRecord]) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = NormalizedColumn::ALL
        .iter()
        .map(|column| {
            let name = column.as_str().into();
            let values = records.iter().map(|record| record.value(*column));
            let series = match column.kind() {
                ColumnKind::Text => {
                    let cells: Vec<String> = values.map(|v| v.to_string()).collect();
                    Series::new(name, cells)
                }
                ColumnKind::Integer => {
                    let cells: Vec<Option<i64>> = values.map(|v| v.as_integer()).collect();
                    Series::new(name, cells)
                }
                ColumnKind::Decimal => {
                    let cells: Vec<Option<f64>> = values
                        .map(|v| match v {
                            FieldValue::Decimal(d) => Some(d),
                            _ => None,
                        })
                        .collect();
                    Series::new(name, cells)
                }
                ColumnKind::Date => {
                    let cells: Vec<Option<String>> = values
                        .map(|v| (!v.is_null()).then(|| v.to_string()))
                        .collect();
                    Series::new(name, cells)
                }
            };
            series.into_column()
        })
        .collect();
    DataFrame::new(columns)
}
