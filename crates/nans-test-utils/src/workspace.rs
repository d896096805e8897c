//! Temporary on-disk workspaces.
//!
//! A [`TestWorkspace`] owns a temp directory laid out like a small project:
//! a `site-packages` directory with fake modules, optional registry files,
//! and a `nans.toml` pointing at both. Everything is removed on drop.

use std::path::{Path, PathBuf};

use nans_config::AppConfig;
use tempfile::TempDir;

pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// An empty workspace with a `site-packages` directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir(dir.path().join("site-packages"))
            .expect("failed to create site-packages");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn site_packages(&self) -> PathBuf {
        self.root().join("site-packages")
    }

    /// Add `site-packages/<name>.py`.
    pub fn add_module(&self, name: &str) -> &Self {
        std::fs::write(self.site_packages().join(format!("{name}.py")), "")
            .expect("failed to write module");
        self
    }

    /// Add `site-packages/<name>/__init__.py`.
    pub fn add_package(&self, name: &str) -> &Self {
        let dir = self.site_packages().join(name);
        std::fs::create_dir_all(&dir).expect("failed to create package dir");
        std::fs::write(dir.join("__init__.py"), "").expect("failed to write __init__.py");
        self
    }

    /// Write an arbitrary file relative to the workspace root.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, content).expect("failed to write file");
        path
    }

    /// Write `nans.toml` scanning this workspace's `site-packages` and
    /// loading `registries` (paths relative to the root). Returns its path.
    pub fn write_config(&self, registries: &[&str]) -> PathBuf {
        let registry_files: Vec<String> = registries
            .iter()
            .map(|r| format!("{:?}", self.root().join(r).display().to_string()))
            .collect();
        let content = format!(
            "[completion]\nmodule_paths = [{:?}]\nuse_pythonpath = false\nregistry_files = [{}]\n\n[update]\nenabled = false\n",
            self.site_packages().display().to_string(),
            registry_files.join(", ")
        );
        self.write("nans.toml", &content)
    }

    /// Parse the workspace's `nans.toml`.
    pub async fn load_config(&self) -> AppConfig {
        AppConfig::load(&self.root().join("nans.toml"))
            .await
            .expect("failed to load workspace config")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
