//! Hospital name cleaning.

/// Strips trailing commas (and the whitespace around them).
///
/// Leading and internal content is left untouched.
///
/// # Examples
///
/// ```
/// use hcetl_transform::normalization::normalize_hospital;
///
/// assert_eq!(normalize_hospital("General Hospital,"), "General Hospital");
/// assert_eq!(normalize_hospital("General, Hospital"), "General, Hospital");
/// ```
pub fn normalize_hospital(value: &str) -> String {
    value
        .trim_start()
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_repeated_trailing_separators() {
        assert_eq!(normalize_hospital("Smith and Sons,,"), "Smith and Sons");
        assert_eq!(normalize_hospital("Smith and Sons, ,"), "Smith and Sons");
    }

    #[test]
    fn leaves_leading_and_internal_commas() {
        assert_eq!(normalize_hospital(",Smith, Jones and Ward"), ",Smith, Jones and Ward");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_hospital(" , "), "");
    }
}
