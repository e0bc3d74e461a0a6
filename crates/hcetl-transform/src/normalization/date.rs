//! Calendar date parsing.

use chrono::NaiveDate;

/// Parses a date using the first format that matches.
///
/// Returns `None` for blank input or when no format matches, including
/// impossible calendar dates such as `31-13-2023`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hcetl_transform::normalization::parse_date;
///
/// let formats = ["%d-%m-%Y", "%Y-%m-%d"];
/// assert_eq!(parse_date("31-01-2024", &formats), NaiveDate::from_ymd_opt(2024, 1, 31));
/// assert_eq!(parse_date("2024-01-31", &formats), NaiveDate::from_ymd_opt(2024, 1, 31));
/// assert_eq!(parse_date("31-13-2023", &formats), None);
/// ```
pub fn parse_date<S: AsRef<str>>(value: &str, formats: &[S]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format.as_ref()).ok())
}
