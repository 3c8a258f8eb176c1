use std::sync::OnceLock;

use regex::Regex;

/// Leading-date rule shared by every convention: a run of 6 to 8 digits at
/// the start of the name, terminated by `-` or `_`.
pub(super) fn leading_date(filename: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"^(\d{6,8})[-_]").expect("valid pattern"));
    pattern
        .captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Filename with its final extension removed.
pub(super) fn strip_extension(filename: &str) -> &str {
    filename
        .rfind('.')
        .filter(|&i| i > 0)
        .map(|i| &filename[..i])
        .unwrap_or(filename)
}
