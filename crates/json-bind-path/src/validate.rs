//! Size limits for strictly parsed paths.
//!
//! Limits apply to the normalized [`Path`], so `..` and empty segments in
//! the input do not count against them.

use crate::{Path, PathError};

/// Depth and canonical-length bounds a path must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLimits {
    /// Most segments a path may have.
    pub max_depth: usize,
    /// Longest canonical string, escapes included.
    pub max_len: usize,
}

impl PathLimits {
    pub const DEFAULT: PathLimits = PathLimits {
        max_depth: 256,
        max_len: 1024,
    };

    /// ```
    /// use json_bind_path::{Path, PathError, PathLimits};
    ///
    /// let limits = PathLimits { max_depth: 2, max_len: 16 };
    /// assert!(limits.check(&Path::parse("/a/b/../c")).is_ok());
    /// assert_eq!(
    ///     limits.check(&Path::parse("/a/b/c")),
    ///     Err(PathError::TooDeep { depth: 3, max: 2 })
    /// );
    /// ```
    pub fn check(&self, path: &Path) -> Result<(), PathError> {
        if path.len() > self.max_depth {
            return Err(PathError::TooDeep {
                depth: path.len(),
                max: self.max_depth,
            });
        }
        let len = path.canonical().len();
        if len > self.max_len {
            return Err(PathError::TooLong {
                len,
                max: self.max_len,
            });
        }
        Ok(())
    }
}

impl Default for PathLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
