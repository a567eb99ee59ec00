//! Character-safe text trimming helpers.

/// Ellipsis appended to truncated text.
pub const ELLIPSIS: char = '…';

/// First `max` characters of `s`.
pub fn cap_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// `s` unchanged if it fits in `max` characters, otherwise its first `max`
/// characters (trailing whitespace dropped) followed by an ellipsis.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = cap_chars(s, max).trim_end().to_string();
    out.push(ELLIPSIS);
    out
}
