//! Utility functions and helpers.

pub mod http;

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
