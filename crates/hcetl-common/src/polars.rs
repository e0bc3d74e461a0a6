//! Reading polars columns back as raw cell text.
//!
//! The normalizer works on cell strings. Extracts arrive as string columns,
//! but a normalized frame fed back in carries `Int64`/`Float64` columns with
//! nulls, so every cell is rendered the way it would appear in a CSV.

use polars::prelude::{AnyValue, DataFrame, PolarsResult};

/// Renders one cell as CSV-style text. Null is the empty string.
///
/// Floats use the shortest representation that parses back to the same
/// value, so `1234.5` stays `"1234.5"` and `40.0` becomes `"40"`.
pub fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => f64::from(v).to_string(),
        // Display never prints `-0`.
        AnyValue::Float64(v) if v == 0.0 => "0".to_string(),
        AnyValue::Float64(v) => v.to_string(),
        other => {
            let s = other.to_string();
            s.strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .map_or_else(|| s.clone(), str::to_string)
        }
    }
}

/// Reads every cell of a column as text, in row order.
pub fn column_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(cell_text(column.get(idx)?));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    #[test]
    fn null_is_empty() {
        assert_eq!(cell_text(AnyValue::Null), "");
    }

    #[test]
    fn billing_amounts_keep_their_digits() {
        assert_eq!(cell_text(AnyValue::Float64(1234.5)), "1234.5");
        assert_eq!(cell_text(AnyValue::Float64(40.0)), "40");
        assert_eq!(cell_text(AnyValue::Float64(-0.0)), "0");
        assert_eq!(
            cell_text(AnyValue::Float64(18856.281305978155)),
            "18856.281305978155"
        );
    }

    #[test]
    fn ages_and_rooms_render_as_integers() {
        assert_eq!(cell_text(AnyValue::Int64(41)), "41");
        assert_eq!(cell_text(AnyValue::Int32(-3)), "-3");
    }

    #[test]
    fn column_strings_reads_typed_and_text_columns() {
        let columns: Vec<Column> = vec![
            Series::new("age".into(), vec![Some(30i64), None, Some(7)]).into_column(),
            Series::new("name".into(), vec!["a", "b", "c"]).into_column(),
        ];
        let df = DataFrame::new(columns).unwrap();

        assert_eq!(column_strings(&df, "age").unwrap(), vec!["30", "", "7"]);
        assert_eq!(column_strings(&df, "name").unwrap(), vec!["a", "b", "c"]);
        assert!(column_strings(&df, "missing").is_err());
    }
}
