//! Dotted configuration names.
//!
//! A name is one or more segments joined by `.`. Each segment starts with
//! an ASCII letter, may contain letters, digits, `_` and `-`, and must not
//! end with `_` or `-`.

use crate::error::{Error, Result};

/// Separator between the segments of a dotted name.
pub const SEPARATOR: char = '.';

/// Check a single segment against the name grammar.
///
/// # Examples
///
/// ```
/// use layerconf::name::is_valid_segment;
///
/// assert!(is_valid_segment("http"));
/// assert!(is_valid_segment("limit_tps"));
/// assert!(is_valid_segment("a"));
/// assert!(!is_valid_segment("limit_"));
/// assert!(!is_valid_segment("9lives"));
/// assert!(!is_valid_segment(""));
/// ```
#[must_use]
pub fn is_valid_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    first.is_ascii_alphabetic()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
}

/// Validate a segment, reporting the full name on failure.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the segment violates the grammar.
pub fn validate_segment(segment: &str, name: &str) -> Result<()> {
    if is_valid_segment(segment) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            segment: segment.to_string(),
            name: name.to_string(),
        })
    }
}

/// Split a dotted name into its validated segments.
///
/// The returned vector is never empty.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] for the first segment that violates the
/// grammar, including empty segments from `""`, `"a..b"` or `"a."`.
///
/// # Examples
///
/// ```
/// use layerconf::name::split;
///
/// assert_eq!(split("server.http.port").unwrap(), vec!["server", "http", "port"]);
/// assert!(split("server..port").is_err());
/// ```
pub fn split(name: &str) -> Result<Vec<&str>> {
    name.split(SEPARATOR)
        .map(|segment| validate_segment(segment, name).map(|()| segment))
        .collect()
}

/// Join a parent name and a child segment.
///
/// An empty parent yields the child alone.
#[must_use]
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}{SEPARATOR}{child}")
    }
}
