//! Installed top-level module discovery.
//!
//! Mirrors what an interpreter's module finder would list: for each search
//! directory, every `name.py`, every compiled extension `name.<tag>.so` /
//! `name.pyd`, and every package directory containing an `__init__` file.
//! The index is built once at startup and shared read-only afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{ModuleRegistry, is_identifier};

const SOURCE_EXTENSIONS: [&str; 5] = ["py", "pyc", "pyw", "so", "pyd"];

/// The set of importable top-level module names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIndex {
    names: BTreeSet<String>,
}

impl ModuleIndex {
    /// Build an index from explicit names (used by tests and the CLI).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Scan `search_paths` and add every registry root module.
    ///
    /// Unreadable directories are logged and skipped.
    pub fn discover(search_paths: &[PathBuf], registry: &ModuleRegistry) -> Self {
        let mut names: BTreeSet<String> = registry.roots().map(str::to_string).collect();
        for dir in search_paths {
            match scan_dir(dir) {
                Ok(found) => {
                    debug!(dir = %dir.display(), count = found.len(), "Scanned module directory");
                    names.extend(found);
                }
                Err(e) => warn!(dir = %dir.display(), error = %e, "Cannot scan module directory"),
            }
        }
        Self { names }
    }

    /// Names whose lowercase form starts with `prefix` lowercased, sorted
    /// case-insensitively.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let mut matches: Vec<String> = self
            .names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        crate::completion::sort_case_insensitive(&mut matches);
        matches
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// List the module names provided by one directory (non-recursive).
fn scan_dir(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut found = Vec::new();
    if !dir.is_dir() {
        return Ok(found);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') || file_name == "__pycache__" {
            continue;
        }

        if path.is_dir() {
            if is_identifier(file_name) && is_package(&path) {
                found.push(file_name.to_string());
            }
        } else if let Some(name) = module_name(file_name) {
            found.push(name.to_string());
        }
    }
    Ok(found)
}

/// A directory is a regular package when it holds an `__init__` module.
fn is_package(dir: &Path) -> bool {
    SOURCE_EXTENSIONS
        .iter()
        .any(|ext| dir.join(format!("__init__.{ext}")).is_file())
}

/// `foo.py` gives `foo`; `_speedups.cpython-312-x86_64-linux-gnu.so` gives
/// `_speedups`. Anything else (including `__init__`) gives `None`.
fn module_name(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !SOURCE_EXTENSIONS.contains(&ext) {
        return None;
    }
    let name = stem.split('.').next().unwrap_or(stem);
    (is_identifier(name) && name != "__init__").then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("numpy.py"), Some("numpy"));
        assert_eq!(
            module_name("_speedups.cpython-312-x86_64-linux-gnu.so"),
            Some("_speedups")
        );
        assert_eq!(module_name("README.md"), None);
        assert_eq!(module_name("__init__.py"), None);
        assert_eq!(module_name("bad-name.py"), None);
        assert_eq!(module_name("noext"), None);
    }

    #[test]
    fn test_discover_scans_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::write(root.join("num2words.py"), "").unwrap();
        std::fs::create_dir(root.join("numpy")).unwrap();
        std::fs::write(root.join("numpy/__init__.py"), "").unwrap();
        // Not packages: no __init__, dist metadata, cache dir.
        std::fs::create_dir(root.join("namespace_only")).unwrap();
        std::fs::create_dir(root.join("numpy-1.26.dist-info")).unwrap();
        std::fs::create_dir(root.join("__pycache__")).unwrap();

        let index = ModuleIndex::discover(&[root.to_path_buf()], &ModuleRegistry::new());
        let names: Vec<&str> = index.names().collect();
        assert_eq!(names, vec!["num2words", "numpy"]);
    }

    #[test]
    fn test_discover_includes_registry_roots() {
        let registry = ModuleRegistry::bundled().unwrap();
        let index = ModuleIndex::discover(&[], &registry);
        assert!(index.contains("os"));
        assert!(!index.contains("os.path"));
    }

    #[test]
    fn test_discover_skips_missing_directory() {
        let index = ModuleIndex::discover(
            &[PathBuf::from("/definitely/not/here")],
            &ModuleRegistry::new(),
        );
        assert!(index.is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive_and_sorted() {
        let index = ModuleIndex::from_names(["numpy", "Numba", "num2words", "os"]);
        assert_eq!(index.matching("NUM"), vec!["num2words", "Numba", "numpy"]);
        assert_eq!(index.matching("").len(), 4);
        assert!(index.matching("zzz").is_empty());
    }
}
