//! Common utilities for document generation.
//!
//! Shared helpers for markup escaping, filename sanitization and timestamps.

use chrono::{DateTime, SecondsFormat, Utc};
use sanitize_filename::{sanitize_with_options, Options};

/// Characters never allowed in a generated filename.
pub const FORBIDDEN_FILENAME_CHARS: [char; 10] =
    ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Maximum length of a sanitized filename, in characters.
pub const MAX_FILENAME_CHARS: usize = 120;

/// Escape special characters for HTML text and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Sanitize a string for use as a storage filename.
///
/// Drops forbidden and control characters, collapses whitespace runs into a
/// single space and caps the result at [`MAX_FILENAME_CHARS`]. Applying it to
/// its own output returns the same string.
pub fn sanitize_filename(name: &str) -> String {
    sanitize_filename_within(name, MAX_FILENAME_CHARS)
}

/// [`sanitize_filename`] with a custom length cap, in characters.
pub fn sanitize_filename_within(name: &str, max_chars: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some(' ')
            } else if ch.is_control() || FORBIDDEN_FILENAME_CHARS.contains(&ch) {
                None
            } else {
                Some(ch)
            }
        })
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_chars).collect();
    let trimmed = truncated.trim_end_matches([' ', '.']);

    // Reserved device names (CON, NUL, ...) and dot-only names come out empty.
    sanitize_with_options(
        trimmed,
        Options {
            windows: true,
            truncate: false,
            replacement: "",
        },
    )
}

/// Current wall-clock time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 timestamp with millisecond precision, e.g. `2025-01-31T08:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whether the bytes carry the PDF magic header.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}
