//! Patient name cleaning.

use std::sync::LazyLock;

use regex::Regex;

/// A leading honorific followed by a period and/or separator.
///
/// Matches against title-cased input, so `"mrs. jane"` is caught after
/// [`title_case`] has produced `"Mrs. Jane"`. A bare prefix such as the `Dr`
/// in `"Drake"` does not match because a period, space, or comma must follow.
static HONORIFIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Mrs|Mr|Ms|Dr)(?:\.[\s,]*|[\s,]+)").expect("Invalid honorific regex")
});

/// Title-cases a string: the first letter of every alphabetic run is
/// upper-cased and the rest are lower-cased.
///
/// Any non-alphabetic character starts a new run, so `"o'neil"` becomes
/// `"O'Neil"` and `"anne-marie"` becomes `"Anne-Marie"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Removes one leading honorific from an already title-cased name.
///
/// Returns the input unchanged when nothing would remain after removal.
///
/// # Examples
///
/// ```
/// use hcetl_transform::normalization::strip_honorific;
///
/// assert_eq!(strip_honorific("Mr. John Doe"), "John Doe");
/// assert_eq!(strip_honorific("Drake Bell"), "Drake Bell");
/// assert_eq!(strip_honorific("Dr."), "Dr.");
/// ```
pub fn strip_honorific(value: &str) -> &str {
    match HONORIFIC_REGEX.find(value) {
        Some(found) => {
            let rest = value[found.end()..].trim();
            if rest.is_empty() { value } else { rest }
        }
        None => value,
    }
}

/// Full name rule: trim, title-case, then drop a leading honorific.
pub fn normalize_name(value: &str) -> String {
    let titled = title_case(value.trim());
    strip_honorific(&titled).to_string()
}
