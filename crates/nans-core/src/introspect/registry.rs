//! Registry of statically described modules.
//!
//! The registry stands in for runtime reflection: an object is only
//! reachable if a registry file describes it. A standard-library registry is
//! compiled into the binary and further files can be layered on top.
//!
//! ## TOML format
//!
//! ```toml
//! [[object]]
//! path = "os"
//! doc = "OS routines for NT or Posix depending on what system we're on."
//! members = [
//!     { name = "getcwd", doc = "Return a unicode string representing the current working directory." },
//!     { name = "path" },
//! ]
//!
//! [[object]]
//! path = "os.path"
//! members = [{ name = "join" }]
//! ```
//!
//! A single-segment path registers an importable module. A nested path is
//! reachable only if every prefix is registered and lists the next segment
//! as a member.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{ObjectHandle, ObjectIntrospector, Resolution, first_line, is_identifier, split_path};

const BUNDLED_STDLIB: &str = include_str!("../../registry/stdlib.toml");

/// Errors from loading a registry file.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read registry file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse registry TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid registry: {0}")]
    Validation(String),
}

/// One `[[object]]` table of a registry file.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSpec {
    /// Dotted path of the object.
    pub path: String,
    /// The object's own docstring.
    #[serde(default)]
    pub doc: Option<String>,
    /// Members visible through attribute access.
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

/// A member listed by an [`ObjectSpec`].
#[derive(Debug, Clone, Deserialize)]
pub struct MemberSpec {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "object")]
    objects: Vec<ObjectSpec>,
}

#[derive(Debug, Clone, Default)]
struct ObjectEntry {
    doc: Option<String>,
    members: BTreeMap<String, Option<String>>,
}

/// In-memory registry of described objects, keyed by dotted path.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    objects: HashMap<String, ObjectEntry>,
}

impl ModuleRegistry {
    /// An empty registry; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard-library registry compiled into the binary.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUNDLED_STDLIB)
    }

    /// Parse and validate a registry from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(s)?;
        Self::from_specs(file.objects)
    }

    /// Load a registry file using async I/O.
    pub async fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    /// Build a registry from object descriptions.
    pub fn from_specs(specs: Vec<ObjectSpec>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut objects = HashMap::with_capacity(specs.len());

        for (i, spec) in specs.into_iter().enumerate() {
            if split_path(&spec.path).is_none() {
                return Err(RegistryError::Validation(format!(
                    "object[{i}].path {:?} is not a dotted identifier path",
                    spec.path
                )));
            }
            if !seen.insert(spec.path.clone()) {
                return Err(RegistryError::Validation(format!(
                    "object[{i}].path {:?} is declared twice",
                    spec.path
                )));
            }

            let mut members = BTreeMap::new();
            for member in spec.members {
                if !is_identifier(&member.name) {
                    return Err(RegistryError::Validation(format!(
                        "object[{i}] ({}) has invalid member name {:?}",
                        spec.path, member.name
                    )));
                }
                members.insert(member.name, member.doc);
            }

            objects.insert(
                spec.path,
                ObjectEntry {
                    doc: spec.doc,
                    members,
                },
            );
        }

        Ok(Self { objects })
    }

    /// Layer `other` over this registry. Objects present in both keep the
    /// union of their members; `other` wins for docs.
    pub fn merge(&mut self, other: ModuleRegistry) {
        for (path, entry) in other.objects {
            let target = self.objects.entry(path).or_default();
            if entry.doc.is_some() {
                target.doc = entry.doc;
            }
            for (name, doc) in entry.members {
                let slot = target.members.entry(name).or_default();
                if doc.is_some() {
                    *slot = doc;
                }
            }
        }
    }

    /// Bundled registry plus each file in `paths`, in order.
    ///
    /// Files that fail to load are skipped with a warning; a broken extra
    /// registry must not take completion down with it.
    pub async fn load_layered(paths: &[impl AsRef<Path>]) -> Self {
        let mut registry = Self::bundled().unwrap_or_else(|e| {
            warn!(error = %e, "Bundled registry is invalid, starting empty");
            Self::new()
        });
        for path in paths {
            let path = path.as_ref();
            match Self::load(path).await {
                Ok(extra) => {
                    debug!(path = %path.display(), objects = extra.len(), "Loaded registry file");
                    registry.merge(extra);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping registry file"),
            }
        }
        registry
    }

    /// Top-level module names.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.objects
            .keys()
            .map(String::as_str)
            .filter(|p| !p.contains('.'))
    }

    /// Whether the object at `path` is described.
    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    /// Number of described objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Walk `segments` from the root module, requiring each step to be a
    /// listed member of the previous object.
    fn reachable(&self, segments: &[&str]) -> bool {
        if !self.objects.contains_key(segments[0]) {
            return false;
        }
        let mut parent = segments[0].to_string();
        for segment in &segments[1..] {
            let listed = self
                .objects
                .get(&parent)
                .is_some_and(|entry| entry.members.contains_key(*segment));
            if !listed {
                return false;
            }
            parent.push('.');
            parent.push_str(segment);
        }
        true
    }
}

impl ObjectIntrospector for ModuleRegistry {
    fn resolve(&self, dotted_path: &str) -> Resolution {
        let Some(segments) = split_path(dotted_path) else {
            return Resolution::empty();
        };
        if !self.reachable(&segments) {
            return Resolution::empty();
        }
        let members = self
            .objects
            .get(dotted_path)
            .map(|entry| entry.members.keys().cloned().collect())
            .unwrap_or_default();
        Resolution {
            members,
            handle: Some(ObjectHandle::new(dotted_path)),
        }
    }

    fn doc_first_line(&self, handle: &ObjectHandle, member: &str) -> String {
        let listed = self
            .objects
            .get(handle.path())
            .and_then(|entry| entry.members.get(member))
            .and_then(|doc| doc.as_deref());
        let doc = listed.or_else(|| {
            self.objects
                .get(&format!("{}.{member}", handle.path()))
                .and_then(|entry| entry.doc.as_deref())
        });
        doc.map(|d| first_line(d).to_string()).unwrap_or_default()
    }
}
