//! Text sanitization for display fields and download filenames

/// Placeholder title when an upload carries no usable title
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Placeholder artist when an upload carries no performer tag
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Reduce free text to a safe single-line display form
///
/// Control characters become spaces, runs of whitespace collapse to a
/// single space, and the result is trimmed.
pub fn display_text(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitize display text, returning `None` when nothing is left
pub fn non_empty_display_text(s: &str) -> Option<String> {
    let cleaned = display_text(s);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Sanitize a filename component for use in a `Content-Disposition` header
///
/// Characters invalid in filenames on common platforms, quotes and
/// control characters are replaced with `_`.
pub fn filename_part(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
