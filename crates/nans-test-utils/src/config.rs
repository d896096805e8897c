//! Configuration builders for tests.

use nans_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .menu_max_height(4)
///     .update_enabled(false)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn default_file(mut self, name: &str) -> Self {
        self.config.editor.default_file = name.to_string();
        self
    }

    pub fn menu_max_height(mut self, rows: u16) -> Self {
        self.config.editor.menu_max_height = rows;
        self
    }

    pub fn complete_while_typing(mut self, enabled: bool) -> Self {
        self.config.editor.complete_while_typing = enabled;
        self
    }

    pub fn status_ttl_ms(mut self, ms: u64) -> Self {
        self.config.editor.status_ttl_ms = ms;
        self
    }

    pub fn module_path(mut self, path: &str) -> Self {
        self.config.completion.module_paths.push(path.to_string());
        self
    }

    pub fn use_pythonpath(mut self, enabled: bool) -> Self {
        self.config.completion.use_pythonpath = enabled;
        self
    }

    pub fn registry_file(mut self, path: &str) -> Self {
        self.config.completion.registry_files.push(path.to_string());
        self
    }

    pub fn update_enabled(mut self, enabled: bool) -> Self {
        self.config.update.enabled = enabled;
        self
    }

    pub fn update_url(mut self, url: &str) -> Self {
        self.config.update.url = url.to_string();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
