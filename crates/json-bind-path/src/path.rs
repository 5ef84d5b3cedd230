//! The [`Path`] type.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::validate::PathLimits;
use crate::{escape_segment, unescape_segment, PathError, SEPARATOR};

const CURRENT: &str = ".";
const PARENT: &str = "..";

/// A normalized location in the store.
///
/// Absolute paths start at the store root. Relative paths only exist while a
/// reference is being resolved; they may keep leading `..` segments that are
/// applied when the path is joined onto a context.
///
/// Two paths are equal iff their canonical strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    absolute: bool,
    segments: Vec<String>,
}

impl Path {
    /// The store root, `/`.
    pub fn root() -> Self {
        Self {
            absolute: true,
            segments: Vec::new(),
        }
    }

    /// An absolute path made of the given segments, taken verbatim.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            absolute: true,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a path string.
    ///
    /// A leading `/` makes the path absolute. Empty segments and `.` are
    /// dropped, `..` removes the previous segment (at the root it is a no-op
    /// for absolute paths and is kept for relative ones). Segments are
    /// unescaped (`~1` → `/`, `~0` → `~`).
    ///
    /// ```
    /// use json_bind_path::Path;
    ///
    /// assert_eq!(Path::parse("/a//b/").to_string(), "/a/b");
    /// assert_eq!(Path::parse("/a/./b/../c").to_string(), "/a/c");
    /// assert_eq!(Path::parse("../x").to_string(), "../x");
    /// assert!(!Path::parse("x").is_absolute());
    /// ```
    pub fn parse(input: &str) -> Self {
        let absolute = input.starts_with(SEPARATOR);
        let mut path = Self {
            absolute,
            segments: Vec::new(),
        };
        for raw in input.split(SEPARATOR) {
            path.push_raw(raw);
        }
        path
    }

    fn push_raw(&mut self, raw: &str) {
        match raw {
            "" | CURRENT => {}
            PARENT => self.pop_or_climb(),
            _ => self.segments.push(unescape_segment(raw)),
        }
    }

    fn pop_or_climb(&mut self) {
        let climbs = !self.absolute && self.segments.last().map_or(true, |last| last == PARENT);
        if climbs {
            self.segments.push(PARENT.to_string());
        } else {
            self.segments.pop();
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_root(&self) -> bool {
        self.absolute && self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The first `len` segments, keeping the absolute flag.
    ///
    /// `len` is clamped to the path length.
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.segments.len());
        Self {
            absolute: self.absolute,
            segments: self.segments[..len].to_vec(),
        }
    }

    /// The path one level up, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(self.prefix(self.segments.len() - 1))
    }

    /// This path extended by one verbatim segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self {
            absolute: self.absolute,
            segments,
        }
    }

    /// Resolve `other` against this path.
    ///
    /// An absolute `other` is returned as-is. A relative `other` is appended,
    /// applying its leading `..` segments first.
    ///
    /// ```
    /// use json_bind_path::Path;
    ///
    /// let base = Path::parse("/list/0");
    /// assert_eq!(base.join(&Path::parse("name")).to_string(), "/list/0/name");
    /// assert_eq!(base.join(&Path::parse("../1")).to_string(), "/list/1");
    /// assert_eq!(base.join(&Path::parse("/other")).to_string(), "/other");
    /// ```
    pub fn join(&self, other: &Path) -> Self {
        if other.absolute {
            return other.clone();
        }
        let mut joined = self.clone();
        for segment in &other.segments {
            if segment == PARENT {
                joined.pop_or_climb();
            } else {
                joined.segments.push(segment.clone());
            }
        }
        joined
    }

    /// Check if this path equals `other` or is one of its ancestors.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.absolute == other.absolute
            && self.segments.len() <= other.segments.len()
            && self.segments[..] == other.segments[..self.segments.len()]
    }

    /// Check if `other` is a strict descendant of this path.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.segments.len() < other.segments.len() && self.is_prefix_of(other)
    }

    /// The canonical string, `/seg/seg` for absolute paths and `seg/seg` for
    /// relative ones. The absolute root renders as `/`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 || self.absolute {
                f.write_str("/")?;
            }
            f.write_str(&escape_segment(segment))?;
        }
        Ok(())
    }
}

/// Strict parsing: the string must be absolute and the normalized path
/// within [`PathLimits::DEFAULT`].
impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with(SEPARATOR) {
            return Err(PathError::NotAbsolute(s.to_string()));
        }
        let path = Path::parse(s);
        PathLimits::DEFAULT.check(&path)?;
        Ok(path)
    }
}

impl Index<usize> for Path {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.segments[index]
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root() {
        let root = Path::root();
        assert!(root.is_root());
        assert!(root.is_absolute());
        assert_eq!(root.to_string(), "/");
        assert_eq!(Path::parse("/"), root);
        assert_eq!(Path::parse("/.."), root);
        assert_eq!(Path::default(), root);
    }

    #[test]
    fn test_parse_absolute() {
        let path = Path::parse("/foo/bar");
        assert!(path.is_absolute());
        assert_eq!(path.segments(), &["foo", "bar"]);
        assert_eq!(&path[1], "bar");
    }

    #[test]
    fn test_parse_relative() {
        let path = Path::parse("foo/bar");
        assert!(!path.is_absolute());
        assert_eq!(path.to_string(), "foo/bar");
    }

    #[test]
    fn test_parse_normalizes_dots() {
        assert_eq!(Path::parse("/a/../../b").to_string(), "/b");
        assert_eq!(Path::parse("a/../..").to_string(), "..");
        assert_eq!(Path::parse("../../a").segments(), &["..", "..", "a"]);
        assert_eq!(Path::parse("./a/.").to_string(), "a");
    }

    #[test]
    fn test_parse_unescapes() {
        let path = Path::parse("/a~1b/c~0d");
        assert_eq!(path.segments(), &["a/b", "c~d"]);
        assert_eq!(path.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn test_prefix_and_parent() {
        let path = Path::parse("/a/b/c");
        assert_eq!(path.prefix(0), Path::root());
        assert_eq!(path.prefix(2).to_string(), "/a/b");
        assert_eq!(path.prefix(10), path);
        assert_eq!(path.parent().unwrap().to_string(), "/a/b");
        assert!(Path::root().parent().is_none());
    }

    #[test]
    fn test_iterates_unescaped_segments() {
        let path = Path::parse("/a~1b/c");
        let mut seen = Vec::new();
        for segment in &path {
            seen.push(segment.as_str());
        }
        assert_eq!(seen, vec!["a/b", "c"]);
    }

    #[test]
    fn test_child() {
        assert_eq!(Path::root().child("x").to_string(), "/x");
        assert_eq!(Path::parse("/a").child("b/c").to_string(), "/a/b~1c");
    }

    #[test]
    fn test_join_relative_onto_relative() {
        let joined = Path::parse("a").join(&Path::parse("../../b"));
        assert!(!joined.is_absolute());
        assert_eq!(joined.to_string(), "../b");
    }

    #[test]
    fn test_join_climbs_past_root() {
        let joined = Path::parse("/a").join(&Path::parse("../../b"));
        assert_eq!(joined.to_string(), "/b");
    }

    #[test]
    fn test_prefix_relationships() {
        let a = Path::parse("/a");
        let ab = Path::parse("/a/b");
        assert!(a.is_prefix_of(&ab));
        assert!(a.is_prefix_of(&a));
        assert!(a.is_ancestor_of(&ab));
        assert!(!a.is_ancestor_of(&a));
        assert!(!ab.is_prefix_of(&a));
        assert!(Path::root().is_prefix_of(&ab));
        assert!(!Path::parse("a").is_prefix_of(&ab));
    }

    #[test]
    fn test_from_str_strict() {
        assert_eq!("/a/b".parse::<Path>().unwrap().to_string(), "/a/b");
        assert_eq!(
            "a/b".parse::<Path>(),
            Err(PathError::NotAbsolute("a/b".to_string()))
        );
        let long = format!("/{}", "x".repeat(2000));
        assert!(matches!(
            long.parse::<Path>(),
            Err(PathError::TooLong { len: 2001, max: 1024 })
        ));
    }

    #[test]
    fn test_equality_is_canonical() {
        assert_eq!(Path::parse("/a/b"), Path::from_segments(["a", "b"]));
        assert_ne!(Path::parse("/a/b"), Path::parse("a/b"));
    }
}
