#[cfg(test)]
#[path = "./utils.tests.rs"]
mod utils_tests;

/// Maps any string to a valid metric name or label token.\
/// ASCII letters and digits are kept, `-`, `_`, `.` and `/` are folded to `_`, anything else is dropped.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter_map(|ch| match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' => Some(ch),
            '-' | '_' | '.' | '/' => Some('_'),
            _ => None,
        })
        .collect()
}

/// Joins name parts with `_` and sanitizes the result.
pub fn sanitize_join(parts: &[&str]) -> String {
    sanitize(&parts.join("_"))
}
