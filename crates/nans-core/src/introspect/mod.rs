//! Object introspection for attribute completion.
//!
//! The completion engine never loads code. It asks an [`ObjectIntrospector`]
//! for the members of a dotted path; the production implementation is the
//! [`ModuleRegistry`], a table of explicitly described modules. Anything not
//! in the table resolves to nothing.

mod modules;
mod registry;

pub use modules::ModuleIndex;
pub use registry::{MemberSpec, ModuleRegistry, ObjectSpec, RegistryError};

/// Longest dotted path an introspector will walk.
pub const MAX_PATH_DEPTH: usize = 16;

/// Opaque reference to a resolved object, used for documentation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    path: String,
}

impl ObjectHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Fully-qualified dotted path of the object.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Result of resolving a dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Member names of the resolved object, unordered.
    pub members: Vec<String>,
    /// Handle for documentation lookup; `None` when resolution failed.
    pub handle: Option<ObjectHandle>,
}

impl Resolution {
    /// The result of any failed lookup.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Resolves dotted paths to member lists.
///
/// Implementations must never panic and never surface errors: unknown
/// modules, unknown attributes and over-long paths all yield
/// [`Resolution::empty`].
pub trait ObjectIntrospector: Send + Sync {
    /// Resolve `dotted_path` (e.g. `os.path`) to its members.
    fn resolve(&self, dotted_path: &str) -> Resolution;

    /// First line of the documentation of `member` on the object behind
    /// `handle`, or an empty string.
    fn doc_first_line(&self, handle: &ObjectHandle, member: &str) -> String;
}

/// Whether `s` is a non-empty `[A-Za-z0-9_]+` name.
pub(crate) fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a dotted path into segments, rejecting empty or over-long paths.
pub(crate) fn split_path(dotted_path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = dotted_path.split('.').collect();
    if segments.len() > MAX_PATH_DEPTH || !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }
    Some(segments)
}

/// First line of a docstring, ignoring surrounding whitespace.
pub(crate) fn first_line(doc: &str) -> &str {
    doc.trim().lines().next().unwrap_or("").trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("os.path"), Some(vec!["os", "path"]));
        assert_eq!(split_path("os..path"), None);
        assert_eq!(split_path(""), None);
        assert_eq!(split_path("os-path"), None);
    }

    #[test]
    fn test_split_path_depth_bound() {
        let deep = vec!["a"; MAX_PATH_DEPTH + 1].join(".");
        assert_eq!(split_path(&deep), None);
        let ok = vec!["a"; MAX_PATH_DEPTH].join(".");
        assert!(split_path(&ok).is_some());
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n  Return the cwd.\n\n  More text."), "Return the cwd.");
        assert_eq!(first_line(""), "");
        assert_eq!(first_line("   "), "");
    }
}
