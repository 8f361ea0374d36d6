//! Character-based text helpers

/// Truncate to at most `max_chars` Unicode scalar values.
///
/// Slicing happens on a char boundary, so multi-byte content never panics.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Estimate tokens using a simple heuristic (chars / 4).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
