#![deny(unsafe_code)]

//! Configuration loading and validation for the nans editor.
//!
//! Loads a TOML configuration file and validates it. Every section is
//! optional; an empty file (or no file at all) yields [`AppConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Editor shell behaviour.
    #[serde(default)]
    pub editor: EditorConfig,

    /// Completion engine inputs (module search paths, extra registries).
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Self-update fetcher.
    #[serde(default)]
    pub update: UpdateConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Editor shell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// File opened when no path is given on the command line.
    #[serde(default = "default_file")]
    pub default_file: String,

    /// Maximum number of rows shown in the completion popup.
    #[serde(default = "default_menu_max_height")]
    pub menu_max_height: u16,

    /// Rows kept visible above/below the selection when the popup scrolls.
    #[serde(default = "default_menu_scroll_offset")]
    pub menu_scroll_offset: u16,

    /// Open the completion popup on every keystroke, not only on Tab.
    #[serde(default = "default_true")]
    pub complete_while_typing: bool,

    /// How long transient status messages stay visible, in milliseconds.
    #[serde(default = "default_status_ttl_ms")]
    pub status_ttl_ms: u64,

    /// Number of spaces inserted by Tab when no completion is pending.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_file: default_file(),
            menu_max_height: default_menu_max_height(),
            menu_scroll_offset: default_menu_scroll_offset(),
            complete_while_typing: true,
            status_ttl_ms: default_status_ttl_ms(),
            tab_width: default_tab_width(),
        }
    }
}

fn default_file() -> String {
    "hello.txt".to_string()
}

fn default_menu_max_height() -> u16 {
    8
}

fn default_menu_scroll_offset() -> u16 {
    1
}

fn default_true() -> bool {
    true
}

fn default_status_ttl_ms() -> u64 {
    2000
}

fn default_tab_width() -> usize {
    4
}

/// Inputs for the completion engine.
///
/// ## TOML Example
///
/// ```toml
/// [completion]
/// module_paths = ["/usr/lib/python3/dist-packages", "./vendor"]
/// use_pythonpath = false
/// registry_files = ["registries/numpy.toml"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Directories scanned once at startup for importable module names.
    #[serde(default)]
    pub module_paths: Vec<String>,

    /// Also scan the entries of `$PYTHONPATH`.
    #[serde(default = "default_true")]
    pub use_pythonpath: bool,

    /// Additional introspection registries layered over the bundled one.
    #[serde(default)]
    pub registry_files: Vec<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            module_paths: Vec::new(),
            use_pythonpath: true,
            registry_files: Vec::new(),
        }
    }
}

impl CompletionConfig {
    /// Module search paths in scan order: configured paths first, then
    /// `$PYTHONPATH` entries when enabled.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.module_paths.iter().map(PathBuf::from).collect();
        if self.use_pythonpath
            && let Some(raw) = std::env::var_os("PYTHONPATH")
        {
            paths.extend(std::env::split_paths(&raw).filter(|p| !p.as_os_str().is_empty()));
        }
        paths
    }
}

/// Self-update configuration (F2 in the editor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Whether the self-update key does anything.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL the new program text is fetched from.
    #[serde(default = "default_update_url")]
    pub url: String,

    /// File name the fetched text is written to.
    #[serde(default = "default_target_name")]
    pub target_name: String,

    /// Request timeout in seconds.
    #[serde(default = "default_update_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_update_url(),
            target_name: default_target_name(),
            timeout_secs: default_update_timeout_secs(),
        }
    }
}

fn default_update_url() -> String {
    "https://github.com/ibrahim443213/nans/blob/main/nans.py".to_string()
}

fn default_target_name() -> String {
    "nans.py".to_string()
}

fn default_update_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path. Empty disables file logging; the terminal itself is
    /// owned by the editor so there is no stderr output.
    #[serde(default)]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// The log file path, if file logging is enabled.
    pub fn file_path(&self) -> Option<&Path> {
        if self.file.is_empty() {
            None
        } else {
            Some(Path::new(&self.file))
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load the file at `path` if it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if tokio::fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.editor.default_file.is_empty() {
            return Err(ConfigError::Validation(
                "editor.default_file must not be empty".to_string(),
            ));
        }
        if self.editor.menu_max_height == 0 {
            return Err(ConfigError::Validation(
                "editor.menu_max_height must be at least 1".to_string(),
            ));
        }
        if self.editor.menu_scroll_offset >= self.editor.menu_max_height {
            return Err(ConfigError::Validation(format!(
                "editor.menu_scroll_offset must be smaller than menu_max_height ({}), got {}",
                self.editor.menu_max_height, self.editor.menu_scroll_offset
            )));
        }
        if self.editor.tab_width == 0 {
            return Err(ConfigError::Validation(
                "editor.tab_width must be at least 1".to_string(),
            ));
        }

        if self.update.enabled {
            if !(self.update.url.starts_with("http://") || self.update.url.starts_with("https://"))
            {
                return Err(ConfigError::Validation(format!(
                    "update.url must be an http(s) URL, got {:?}",
                    self.update.url
                )));
            }
            if self.update.timeout_secs == 0 {
                return Err(ConfigError::Validation(
                    "update.timeout_secs must be non-zero".to_string(),
                ));
            }
        }
        if self.update.target_name.is_empty() {
            return Err(ConfigError::Validation(
                "update.target_name must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        for (i, path) in self.completion.registry_files.iter().enumerate() {
            if path.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "completion.registry_files[{i}] must not be empty"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.editor.default_file, "hello.txt");
        assert_eq!(config.editor.menu_max_height, 8);
        assert_eq!(config.editor.menu_scroll_offset, 1);
        assert!(config.editor.complete_while_typing);
        assert_eq!(config.update.target_name, "nans.py");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file_path().is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.editor.status_ttl_ms, 2000);
        assert!(config.completion.use_pythonpath);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [editor]
            default_file = "scratch.py"
            menu_max_height = 12
            menu_scroll_offset = 2
            complete_while_typing = false

            [completion]
            module_paths = ["/opt/site-packages"]
            use_pythonpath = false
            registry_files = ["extra.toml"]

            [update]
            url = "https://example.com/nans.py"
            target_name = "nans-new.py"

            [logging]
            level = "debug"
            file = "/tmp/nans.log"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.editor.default_file, "scratch.py");
        assert_eq!(config.editor.menu_max_height, 12);
        assert!(!config.editor.complete_while_typing);
        assert_eq!(config.completion.module_paths, vec!["/opt/site-packages"]);
        assert_eq!(config.completion.registry_files, vec!["extra.toml"]);
        assert_eq!(config.update.target_name, "nans-new.py");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.file_path(),
            Some(Path::new("/tmp/nans.log"))
        );
    }

    #[test]
    fn test_search_paths_without_pythonpath() {
        let toml = r#"
            [completion]
            module_paths = ["a", "b"]
            use_pythonpath = false
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(
            config.completion.search_paths(),
            vec![PathBuf::from("a"), PathBuf::from("b")]
        );
    }

    #[test]
    fn test_validation_rejects_zero_menu_height() {
        let toml = r#"
            [editor]
            menu_max_height = 0
            menu_scroll_offset = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_scroll_offset_past_height() {
        let toml = r#"
            [editor]
            menu_max_height = 2
            menu_scroll_offset = 2
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_default_file() {
        let toml = r#"
            [editor]
            default_file = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_non_http_update_url() {
        let toml = r#"
            [update]
            url = "ftp://example.com/nans.py"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_disabled_update_skips_url_check() {
        let toml = r#"
            [update]
            enabled = false
            url = ""
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert!(!config.update.enabled);
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let toml = r#"
            [logging]
            level = "loud"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_registry_path() {
        let toml = r#"
            [completion]
            registry_files = ["ok.toml", ""]
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("registry_files[1]"));
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nans.toml");
        tokio::fs::write(&path, b"[editor]\nmenu_max_height = 5\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.editor.menu_max_height, 5);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/file.toml")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_or_default_missing_file() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&tmp.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config.editor.default_file, "hello.txt");
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[")
            .await
            .unwrap();

        let result = AppConfig::load(&path).await;
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
