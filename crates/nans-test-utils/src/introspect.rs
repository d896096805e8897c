//! Canned introspection data.
//!
//! [`StaticIntrospector`] is a hand-filled [`ObjectIntrospector`] that
//! counts lookups, for tests that care about how the engine queries it.
//! [`fixture_registry`] is a small registry in the on-disk TOML format, for
//! tests that want the production resolution rules.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nans_core::introspect::{ObjectHandle, Resolution};
use nans_core::{CompletionEngine, ModuleIndex, ModuleRegistry, ObjectIntrospector};

/// Registry text used by [`fixture_registry`].
pub const FIXTURE_REGISTRY: &str = r#"
[[object]]
path = "os"
doc = "OS routines."
members = [
    { name = "getcwd", doc = "Return a unicode string representing the current working directory." },
    { name = "listdir", doc = "Return a list containing the names of the files in the directory." },
    { name = "path" },
    { name = "sep" },
]

[[object]]
path = "os.path"
members = [
    { name = "exists", doc = "Test whether a path exists." },
    { name = "join", doc = "Join two or more pathname components." },
    { name = "splitext" },
]

[[object]]
path = "sys"
members = [
    { name = "argv" },
    { name = "exit", doc = "Exit the interpreter by raising SystemExit(status)." },
    { name = "path" },
    { name = "version" },
]

[[object]]
path = "pkg"
members = [{ name = "name" }, { name = "other" }]

[[object]]
path = "pkg.name"
members = [{ name = "alpha" }, { name = "Beta" }, { name = "gamma" }]
"#;

/// Names in the fixture module index.
pub const FIXTURE_MODULES: [&str; 6] = ["numpy", "num2words", "os", "pkg", "requests", "sys"];

/// Parse [`FIXTURE_REGISTRY`].
pub fn fixture_registry() -> ModuleRegistry {
    ModuleRegistry::from_toml_str(FIXTURE_REGISTRY).expect("fixture registry is valid")
}

/// An engine over [`fixture_registry`] and [`FIXTURE_MODULES`].
pub fn fixture_engine() -> CompletionEngine {
    CompletionEngine::new(
        Arc::new(fixture_registry()),
        Arc::new(ModuleIndex::from_names(FIXTURE_MODULES)),
    )
}

/// In-memory introspector keyed by full dotted path.
#[derive(Debug, Default)]
pub struct StaticIntrospector {
    objects: HashMap<String, Vec<(String, String)>>,
    resolve_calls: AtomicUsize,
    doc_calls: AtomicUsize,
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe the object at `path` with `(member, doc)` pairs.
    pub fn with_object(mut self, path: &str, members: &[(&str, &str)]) -> Self {
        self.objects.insert(
            path.to_string(),
            members
                .iter()
                .map(|(name, doc)| (name.to_string(), doc.to_string()))
                .collect(),
        );
        self
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::Relaxed)
    }

    pub fn doc_calls(&self) -> usize {
        self.doc_calls.load(Ordering::Relaxed)
    }
}

impl ObjectIntrospector for StaticIntrospector {
    fn resolve(&self, dotted_path: &str) -> Resolution {
        self.resolve_calls.fetch_add(1, Ordering::Relaxed);
        match self.objects.get(dotted_path) {
            Some(members) => Resolution {
                members: members.iter().map(|(name, _)| name.clone()).collect(),
                handle: Some(ObjectHandle::new(dotted_path)),
            },
            None => Resolution::empty(),
        }
    }

    fn doc_first_line(&self, handle: &ObjectHandle, member: &str) -> String {
        self.doc_calls.fetch_add(1, Ordering::Relaxed);
        self.objects
            .get(handle.path())
            .and_then(|members| members.iter().find(|(name, _)| name == member))
            .map(|(_, doc)| doc.lines().next().unwrap_or("").to_string())
            .unwrap_or_default()
    }
}
