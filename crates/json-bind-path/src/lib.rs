//! Store paths for json-bind.
//!
//! A [`Path`] addresses a location in a hierarchical store. Paths are written
//! as `/`-separated strings (`/pager/page`), passed as ready-made segment
//! sequences, or derived from a chain of nested scopes that each declare one
//! piece of the path (see [`scope`]). The [`PathResolver`] turns any of those
//! references into an absolute path, resolving relative references against a
//! context.
//!
//! # Example
//!
//! ```
//! use json_bind_path::{Path, PathResolver, Reference};
//!
//! let path = Path::parse("/pager/page");
//! assert!(path.is_absolute());
//! assert_eq!(path.to_string(), "/pager/page");
//!
//! let resolver = PathResolver::new();
//! let context = Path::parse("/pager");
//! let resolved = resolver
//!     .resolve(Reference::from("pages"), Some(Reference::from(&context)))
//!     .unwrap();
//! assert_eq!(resolved.to_string(), "/pager/pages");
//! ```

use thiserror::Error;

pub mod path;
pub use path::Path;

pub mod resolve;
pub use resolve::{PathResolver, Reference, DEFAULT_SCOPE_ATTRIBUTE};

pub mod scope;
pub use scope::{ScopeElement, ScopeNode};

pub mod validate;
pub use validate::PathLimits;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Unescapes a path segment.
///
/// `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// # Example
///
/// ```
/// use json_bind_path::unescape_segment;
///
/// assert_eq!(unescape_segment("a~0b"), "a~b");
/// assert_eq!(unescape_segment("c~1d"), "c/d");
/// assert_eq!(unescape_segment("no-escapes"), "no-escapes");
/// ```
pub fn unescape_segment(segment: &str) -> String {
    if !segment.contains('~') {
        return segment.to_string();
    }
    // ~1 first, so "~01" decodes to "~1" and not "/"
    segment.replace("~1", "/").replace("~0", "~")
}

/// Escapes a path segment so it can be embedded in a canonical string.
///
/// `~` is replaced with `~0` and `/` is replaced with `~1`.
///
/// # Example
///
/// ```
/// use json_bind_path::escape_segment;
///
/// assert_eq!(escape_segment("a~b"), "a~0b");
/// assert_eq!(escape_segment("c/d"), "c~1d");
/// assert_eq!(escape_segment("no-escapes"), "no-escapes");
/// ```
pub fn escape_segment(segment: &str) -> String {
    if !segment.contains('/') && !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace('~', "~0").replace('/', "~1")
}

/// Format segments as an absolute canonical string.
///
/// The root (no segments) renders as `/`.
///
/// # Example
///
/// ```
/// use json_bind_path::format_segments;
///
/// assert_eq!(format_segments(&[]), "/");
/// assert_eq!(format_segments(&["foo".to_string(), "bar".to_string()]), "/foo/bar");
/// assert_eq!(format_segments(&["a/b".to_string()]), "/a~1b");
/// ```
pub fn format_segments(segments: &[String]) -> String {
    if segments.is_empty() {
        return SEPARATOR.to_string();
    }
    let mut out = String::with_capacity(segments.len() * 8);
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(&escape_segment(segment));
    }
    out
}

/// Check if a segment is a valid list index: ASCII digits without a leading
/// zero (except `"0"` itself).
///
/// # Example
///
/// ```
/// use json_bind_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("abc"));
/// ```
pub fn is_valid_index(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    let bytes = segment.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Parse a segment as a list index.
pub fn parse_index(segment: &str) -> Option<usize> {
    if !is_valid_index(segment) {
        return None;
    }
    segment.parse().ok()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path must start with '/': {0:?}")]
    NotAbsolute(String),
    #[error("path has {depth} segments, at most {max} allowed")]
    TooDeep { depth: usize, max: usize },
    #[error("path is {len} characters long, at most {max} allowed")]
    TooLong { len: usize, max: usize },
}
