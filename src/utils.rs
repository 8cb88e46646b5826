//! Small string helpers shared by the classifiers and transport.

/// Keep at most `max` characters of `value`.
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Collapse every whitespace run into a single space and trim both ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop everything from the first `?` onwards.
pub fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or_default()
}
