//! Import alias recovery by line-anchored pattern matching.
//!
//! The table is rebuilt from the whole document on every completion request.
//! Three statement shapes are recognised:
//!
//! | statement                          | binds                  |
//! |------------------------------------|------------------------|
//! | `import <module> as <alias>`       | `alias -> module`      |
//! | `from <module> import <n> as <a>`  | `a -> module.n`        |
//! | `from <module> import <n>`         | `n -> module.n`        |
//!
//! Anything else, including half-typed statements, binds nothing. The shapes
//! are applied in whole-document passes in the order of the table above, so
//! a binding from a later shape overwrites one from an earlier shape wherever
//! it appears. Within one pass the later line wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static IMPORT_AS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+([A-Za-z0-9_.]+)[ \t]+as[ \t]+([A-Za-z0-9_]+)")
        .expect("import-as pattern compiles")
});

static FROM_IMPORT_AS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*from[ \t]+([A-Za-z0-9_.]+)[ \t]+import[ \t]+([A-Za-z0-9_]+)[ \t]+as[ \t]+([A-Za-z0-9_]+)",
    )
    .expect("from-import-as pattern compiles")
});

static FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*from[ \t]+([A-Za-z0-9_.]+)[ \t]+import[ \t]+([A-Za-z0-9_]+)")
        .expect("from-import pattern compiles")
});

/// One recovered binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// The name used in the buffer.
    pub local_name: String,
    /// Bare module name or `module.attribute` path.
    pub target: String,
}

/// Mapping from local names to fully-qualified paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, AliasEntry>,
}

impl AliasTable {
    /// Build a fresh table from the full document text.
    pub fn refresh(text: &str) -> Self {
        let mut table = Self::default();

        for caps in IMPORT_AS.captures_iter(text) {
            table.bind(&caps[2], caps[1].to_string());
        }
        for caps in FROM_IMPORT_AS.captures_iter(text) {
            table.bind(&caps[3], format!("{}.{}", &caps[1], &caps[2]));
        }
        for caps in FROM_IMPORT.captures_iter(text) {
            table.bind(&caps[2], format!("{}.{}", &caps[1], &caps[2]));
        }

        table
    }

    fn bind(&mut self, local_name: &str, target: String) {
        self.entries.insert(
            local_name.to_string(),
            AliasEntry {
                local_name: local_name.to_string(),
                target,
            },
        );
    }

    /// Look up the target bound to `local_name`.
    pub fn resolve(&self, local_name: &str) -> Option<&str> {
        self.entries.get(local_name).map(|e| e.target.as_str())
    }

    /// Iterate over all entries in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
