//! Decimal and integer coercion.

/// Parses a decimal value.
///
/// Handles common numeric formats:
/// - Standard numbers: "123", "-45.67"
/// - Thousands separators: "1,234,567"
/// - Whitespace: "  123  "
/// - Scientific notation: "1.23e5"
///
/// Returns `None` for blank input, unparsable text, and non-finite values
/// (`NaN`, `inf`), none of which can be stored in a sink column.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return None;
    }

    // Remove thousands separators and whitespace
    let cleaned = trimmed
        .replace(',', "")
        .replace(' ', "")
        .replace('\u{a0}', ""); // Non-breaking space

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a whole number.
///
/// Integral decimals such as `"42.0"` are accepted; `"42.5"` is not.
pub fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    let decimal = parse_numeric(trimmed)?;
    let in_range = decimal >= i64::MIN as f64 && decimal < i64::MAX as f64;
    (decimal.fract() == 0.0 && in_range).then_some(decimal as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_integer() {
        assert_eq!(parse_numeric("123"), Some(123.0));
        assert_eq!(parse_numeric("-456"), Some(-456.0));
    }

    #[test]
    fn test_decimal() {
        assert_eq!(parse_numeric("18856.281305978155"), Some(18856.281305978155));
        assert_eq!(parse_numeric("-0.5"), Some(-0.5));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse_numeric("1,234,567"), Some(1234567.0));
        assert_eq!(parse_numeric("1,234.56"), Some(1234.56));
    }

    #[test]
    fn test_scientific() {
        assert_eq!(parse_numeric("1.5e3"), Some(1500.0));
    }

    #[test]
    fn test_rejects_text_and_non_finite() {
        assert_eq!(parse_numeric("N/A"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("nan"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn test_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer(" 42.0 "), Some(42));
        assert_eq!(parse_integer("42.5"), None);
        assert_eq!(parse_integer("forty"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("1e30"), None);
    }
}
