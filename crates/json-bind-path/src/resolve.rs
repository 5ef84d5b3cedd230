//! Reference resolution.

use std::fmt;

use tracing::trace;

use crate::scope::ScopeNode;
use crate::Path;

/// Attribute a scope node uses to declare its path piece unless configured
/// otherwise.
pub const DEFAULT_SCOPE_ATTRIBUTE: &str = "data-model";

/// Anything that can name a store location.
#[derive(Clone, Copy)]
pub enum Reference<'a> {
    /// A path string, absolute when it starts with `/`.
    Pointer(&'a str),
    /// A segment sequence, used verbatim as an absolute path.
    Segments(&'a [String]),
    /// An already parsed path; relative paths still get a context.
    Path(&'a Path),
    /// The innermost node of a scope chain.
    Scope(&'a dyn ScopeNode),
}

impl fmt::Debug for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Pointer(s) => f.debug_tuple("Pointer").field(s).finish(),
            Reference::Segments(s) => f.debug_tuple("Segments").field(s).finish(),
            Reference::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Reference::Scope(_) => f.write_str("Scope(..)"),
        }
    }
}

impl<'a> From<&'a str> for Reference<'a> {
    fn from(value: &'a str) -> Self {
        Reference::Pointer(value)
    }
}

impl<'a> From<&'a String> for Reference<'a> {
    fn from(value: &'a String) -> Self {
        Reference::Pointer(value)
    }
}

impl<'a> From<&'a [String]> for Reference<'a> {
    fn from(value: &'a [String]) -> Self {
        Reference::Segments(value)
    }
}

impl<'a> From<&'a Vec<String>> for Reference<'a> {
    fn from(value: &'a Vec<String>) -> Self {
        Reference::Segments(value)
    }
}

impl<'a> From<&'a Path> for Reference<'a> {
    fn from(value: &'a Path) -> Self {
        Reference::Path(value)
    }
}

impl<'a> From<&'a dyn ScopeNode> for Reference<'a> {
    fn from(value: &'a dyn ScopeNode) -> Self {
        Reference::Scope(value)
    }
}

/// Turns references into absolute paths.
///
/// Holds the default context relative references fall back to when the
/// caller gives none, and the attribute name scope nodes declare their
/// path pieces under.
#[derive(Debug, Clone)]
pub struct PathResolver {
    default_context: Path,
    scope_attribute: String,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::with_scope_attribute(DEFAULT_SCOPE_ATTRIBUTE)
    }

    pub fn with_scope_attribute(attribute: impl Into<String>) -> Self {
        Self {
            default_context: Path::root(),
            scope_attribute: attribute.into(),
        }
    }

    pub fn scope_attribute(&self) -> &str {
        &self.scope_attribute
    }

    pub fn default_context(&self) -> &Path {
        &self.default_context
    }

    /// Replace the default context.
    ///
    /// The new context is itself resolved against the current default, so
    /// it is always absolute. Returns the new context, or `None` (leaving the
    /// default untouched) if the reference cannot be resolved.
    pub fn set_default_context(&mut self, context: Reference<'_>) -> Option<Path> {
        let resolved = self.resolve(context, None)?;
        self.default_context = resolved.clone();
        Some(resolved)
    }

    /// Resolve `reference` into an absolute path.
    ///
    /// Relative references are joined onto `context`, which is resolved
    /// first (against the default context). Without a context the default
    /// context is used. Returns `None` when the reference names nothing,
    /// e.g. a scope chain without any declarations.
    pub fn resolve(&self, reference: Reference<'_>, context: Option<Reference<'_>>) -> Option<Path> {
        let path = match reference {
            Reference::Pointer(pointer) => Path::parse(pointer),
            Reference::Segments(segments) => return Some(Path::from_segments(segments.iter().cloned())),
            Reference::Path(path) => path.clone(),
            Reference::Scope(node) => match self.scope_path(node) {
                Some(path) => path,
                None => {
                    trace!(attribute = %self.scope_attribute, "scope chain declares no path");
                    return None;
                }
            },
        };
        if path.is_absolute() {
            return Some(path);
        }
        let base = match context {
            Some(context) => self.resolve(context, None)?,
            None => self.default_context.clone(),
        };
        Some(base.join(&path))
    }

    /// Collect the declarations of a scope chain, innermost last.
    ///
    /// The walk stops at the first absolute declaration. The result is
    /// relative if no declaration along the chain was absolute.
    fn scope_path(&self, start: &dyn ScopeNode) -> Option<Path> {
        let mut collected: Option<Path> = None;
        let mut node = Some(start);
        while let Some(current) = node {
            if let Some(declared) = current.declared_segment(&self.scope_attribute) {
                let declared = Path::parse(&declared);
                let path = match collected {
                    Some(inner) => declared.join(&inner),
                    None => declared,
                };
                if path.is_absolute() {
                    return Some(path);
                }
                collected = Some(path);
            }
            node = current.parent_scope();
        }
        collected
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}
