//! Column identifier standardization.

/// Trims, lower-cases, and replaces internal spaces with underscores.
///
/// Runs of whitespace collapse to a single underscore. A leading byte order
/// mark is dropped.
///
/// # Examples
///
/// ```
/// use hcetl_transform::normalization::standardize_column_name;
///
/// assert_eq!(standardize_column_name(" Date of Admission "), "date_of_admission");
/// assert_eq!(standardize_column_name("Billing  Amount"), "billing_amount");
/// assert_eq!(standardize_column_name("name"), "name");
/// ```
pub fn standardize_column_name(raw: &str) -> String {
    let trimmed = raw.trim_matches('\u{feff}').trim();
    trimmed
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
