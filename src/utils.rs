//! Text helpers shared by the parsers
//!
//! These mirror the two ways page text is read: joined fragments (each trimmed,
//! empty ones dropped) and raw concatenation.

use scraper::ElementRef;

/// All text fragments under `element`, trimmed, empty ones dropped, joined by `separator`
pub fn joined_text(element: &ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Raw concatenated text under `element`, whitespace preserved
pub fn raw_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// First `max_chars` characters of `text` (never splits a code point)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
