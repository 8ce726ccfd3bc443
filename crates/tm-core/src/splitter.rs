//! Statement splitting for migration scripts

/// Split a script into the statements it contains.
///
/// Segments are separated by `;`, trimmed, and empty segments are dropped.
/// Document order is preserved.
///
/// The split is purely textual. A `;` inside a quoted literal or a comment
/// ends the statement early, so scripts must keep semicolons out of string
/// values.
///
/// # Examples
/// ```
/// use tm_core::splitter::split_statements;
/// assert_eq!(split_statements("A; B; ;  C;"), vec!["A", "B", "C"]);
/// ```
pub fn split_statements(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
