//! Storage naming rules for uploaded files.
//!
//! Target names have the form `{time}_{sanitized original name}`. Nothing in
//! here touches the filesystem.

use chrono::{DateTime, Utc};

use super::MAX_STORED_NAME_BYTES;

/// Characters replaced with `_` because common filesystems reject them.
const HOSTILE_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Directory separators accepted from any client platform.
const SEPARATORS: &[char] = &['/', '\\'];

/// Name used when sanitizing leaves nothing behind.
const FALLBACK_NAME: &str = "file";

/// Resolution of the time component in a stored name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Unix seconds, used for documents.
    Seconds,
    /// Unix nanoseconds, used for news images.
    Nanos,
}

impl Resolution {
    /// Time component for the given instant.
    pub fn component(self, at: DateTime<Utc>) -> i64 {
        match self {
            Resolution::Seconds => at.timestamp(),
            Resolution::Nanos => at
                .timestamp_nanos_opt()
                .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1000)),
        }
    }
}

/// Reduce an uploaded file name to a single safe path segment.
///
/// Only the last segment survives (both `/` and `\` count as separators).
/// Whitespace becomes `_`, control characters are dropped, hostile characters
/// become `_` and leading dots are stripped.
pub fn sanitize(original: &str) -> String {
    let segment = original.rsplit(SEPARATORS).next().unwrap_or_default();

    let cleaned: String = segment
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_control() {
                None
            } else if HOSTILE_CHARS.contains(&c) {
                Some('_')
            } else {
                Some(c)
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    truncate_keeping_extension(trimmed, MAX_STORED_NAME_BYTES)
}

/// Build the stored name for an upload: `{time}_{sanitized}`.
pub fn stored_name(original: &str, time: i64) -> String {
    format!("{time}_{}", sanitize(original))
}

/// Derive a document title from a file name by dropping its last extension.
///
/// Falls back to the whole name when nothing would be left.
pub fn derive_title(original: &str) -> String {
    let segment = original
        .rsplit(SEPARATORS)
        .next()
        .unwrap_or_default()
        .trim();

    match segment.rfind('.') {
        Some(pos) if pos > 0 => segment[..pos].trim_end().to_string(),
        _ => segment.to_string(),
    }
}

/// Lowercased extension of a file name, if it has one.
pub fn extension(name: &str) -> Option<String> {
    let segment = name.rsplit(SEPARATORS).next().unwrap_or_default();
    match segment.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < segment.len() => {
            Some(segment[pos + 1..].to_ascii_lowercase())
        }
        _ => None,
    }
}

/// Whether `name` is a single path segment that cannot escape its directory.
pub fn is_flat_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(SEPARATORS)
        && !name.chars().any(char::is_control)
}

fn truncate_keeping_extension(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let ext = match name.rfind('.') {
        Some(pos) if pos > 0 && name.len() - pos <= max_bytes / 4 => &name[pos..],
        _ => "",
    };

    let mut end = max_bytes - ext.len();
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{ext}", &name[..end])
}
