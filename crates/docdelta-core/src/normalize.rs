//! Text normalization for comparison
//!
//! `char::is_whitespace` covers non-breaking and thin spaces, so they
//! collapse like ordinary spaces.

use crate::config::CompareOptions;

/// Normalize text according to the whitespace and case options
pub fn normalize_text(text: &str, options: &CompareOptions) -> String {
    let text = if options.normalize_whitespace {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        text.to_string()
    };
    if options.ignore_case {
        text.to_lowercase()
    } else {
        text
    }
}

/// Comparison key of a single token
pub fn token_key(token: &str, options: &CompareOptions) -> String {
    if options.ignore_case {
        token.to_lowercase()
    } else {
        token.to_string()
    }
}

/// Whitespace-separated tokens of a text
pub fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Truncate a value to at most `max` characters
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
