//! Editor state and action handling.
//!
//! [`App::handle_action`] is synchronous and never does I/O. Work that needs
//! the runtime (saving, self-update) is returned as an [`Effect`] for the
//! event loop to carry out, which then reports back through
//! [`App::on_saved`] and [`App::set_status`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use nans_config::EditorConfig;
use nans_core::{CompletionEngine, Document, FileError, StatusReader};
use tracing::debug;

use crate::keymap::Action;
use crate::panels::{CompletionMenu, EditorPanel};

/// Follow-up work requested by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Save,
    SaveAndExit,
    SelfUpdate,
}

/// A status bar message that disappears at `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub expires_at: Instant,
}

pub struct App {
    pub should_quit: bool,
    pub document: Document,
    pub file_path: PathBuf,
    pub menu: Option<CompletionMenu>,
    pub editor: EditorPanel,
    engine: CompletionEngine,
    config: EditorConfig,
    status: Option<StatusMessage>,
    warnings: StatusReader,
    last_warning: u64,
}

impl App {
    pub fn new(
        config: EditorConfig,
        engine: CompletionEngine,
        document: Document,
        file_path: PathBuf,
        warnings: StatusReader,
    ) -> Self {
        // Warnings logged during startup are not news once the editor opens.
        let last_warning = warnings.latest().map_or(0, |e| e.seq);
        Self {
            should_quit: false,
            document,
            file_path,
            menu: None,
            editor: EditorPanel::new(),
            engine,
            config,
            status: None,
            warnings,
            last_warning,
        }
    }

    /// Name shown in the header and status bar.
    pub fn file_label(&self) -> String {
        display_name(&self.file_path)
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) -> Effect {
        match action {
            Action::Insert(c) => {
                self.document.insert_char(c);
                if self.config.complete_while_typing && triggers_completion(c) {
                    self.open_menu();
                } else {
                    self.menu = None;
                }
            }
            Action::Enter => {
                if self.menu.is_some() {
                    self.accept_selected();
                } else {
                    self.document.insert_newline();
                }
            }
            Action::Tab => {
                if self.menu.is_some() {
                    self.accept_selected();
                } else if self.at_indentation() {
                    self.document.insert_str(&" ".repeat(self.config.tab_width));
                } else {
                    self.open_menu();
                    if self.menu.is_none() {
                        self.set_status("No completions", now);
                    }
                }
            }
            Action::Backspace => {
                self.document.backspace();
                if self.menu.is_some() {
                    self.open_menu();
                }
            }
            Action::Up => match self.menu.as_mut() {
                Some(menu) => menu.select_prev(),
                None => self.document.move_up(),
            },
            Action::Down => match self.menu.as_mut() {
                Some(menu) => menu.select_next(),
                None => self.document.move_down(),
            },
            Action::Escape => self.menu = None,
            Action::Delete => self.close_menu_after(Document::delete),
            Action::Left => self.close_menu_after(Document::move_left),
            Action::Right => self.close_menu_after(Document::move_right),
            Action::Home => self.close_menu_after(Document::move_home),
            Action::End => self.close_menu_after(Document::move_end),
            Action::Save => return Effect::Save,
            Action::SaveAndExit => return Effect::SaveAndExit,
            Action::SelfUpdate => return Effect::SelfUpdate,
            Action::Exit => self.should_quit = true,
            Action::None => {}
        }
        Effect::None
    }

    /// Record the outcome of a save requested by `effect`.
    pub fn on_saved(&mut self, effect: Effect, result: Result<usize, FileError>, now: Instant) {
        match result {
            Ok(bytes) => {
                self.document.mark_saved();
                if effect == Effect::SaveAndExit {
                    self.should_quit = true;
                } else {
                    self.set_status(format!("Saved {bytes} bytes to {}", self.file_label()), now);
                }
            }
            // Stay open so the text is not lost.
            Err(e) => self.set_status(format!("Save failed: {e}"), now),
        }
    }

    /// Show `text` in the status bar for the configured time.
    pub fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            expires_at: now + Duration::from_millis(self.config.status_ttl_ms),
        });
    }

    /// Expire the status message and surface any new warning.
    ///
    /// A warning never replaces a message that is still showing; the
    /// message usually already describes the same failure.
    pub fn tick(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| now >= s.expires_at) {
            self.status = None;
        }
        if let Some(newest) = self.warnings.since(self.last_warning).pop() {
            self.last_warning = newest.seq;
            if self.status.is_none() {
                self.set_status(newest.status_line(), now);
            }
        }
    }

    /// Text for the status bar: the transient message, or the key help.
    pub fn status_text(&self) -> String {
        match &self.status {
            Some(status) => status.text.clone(),
            None => crate::panels::help_line(&self.file_label()),
        }
    }

    fn open_menu(&mut self) {
        let candidates: Vec<_> = self
            .engine
            .completions(self.document.text(), self.document.cursor())
            .collect();
        debug!(count = candidates.len(), "Refreshed completion popup");
        self.menu = CompletionMenu::new(
            candidates,
            self.config.menu_max_height,
            self.config.menu_scroll_offset,
        );
    }

    fn accept_selected(&mut self) {
        if let Some(menu) = self.menu.take() {
            self.document.apply_candidate(menu.selected());
        }
    }

    fn close_menu_after<R>(&mut self, edit: impl FnOnce(&mut Document) -> R) {
        edit(&mut self.document);
        self.menu = None;
    }

    /// Whether only whitespace precedes the cursor on its line.
    fn at_indentation(&self) -> bool {
        let before = self.document.text_before_cursor();
        let line = before.rsplit('\n').next().unwrap_or(before);
        line.chars().all(char::is_whitespace)
    }
}

fn triggers_completion(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use nans_core::{ModuleIndex, ModuleRegistry, StatusFeed};
    use nans_test_utils::TestConfigBuilder;
    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    const REGISTRY: &str = r#"
        [[object]]
        path = "os"
        members = [{ name = "getcwd" }, { name = "getenv" }, { name = "path" }]
    "#;

    fn make_app_with(text: &str, feed: &StatusFeed) -> App {
        make_app_configured(text, feed, EditorConfig::default())
    }

    fn make_app_configured(text: &str, feed: &StatusFeed, config: EditorConfig) -> App {
        let registry = ModuleRegistry::from_toml_str(REGISTRY).unwrap();
        let engine = CompletionEngine::new(
            Arc::new(registry),
            Arc::new(ModuleIndex::from_names(["numpy", "os"])),
        );
        let mut document = Document::from_text(text);
        document.set_cursor(text.len());
        App::new(
            config,
            engine,
            document,
            PathBuf::from("/tmp/work/hello.txt"),
            feed.reader(),
        )
    }

    fn make_app(text: &str) -> App {
        make_app_with(text, &StatusFeed::new(8))
    }

    fn type_str(app: &mut App, s: &str, now: Instant) {
        for c in s.chars() {
            app.handle_action(Action::Insert(c), now);
        }
    }

    #[test]
    fn test_typing_dot_opens_attribute_menu() {
        let mut app = make_app("import os\nos");
        let now = Instant::now();
        app.handle_action(Action::Insert('.'), now);
        let menu = app.menu.as_ref().unwrap();
        assert_eq!(menu.len(), 3);
        assert_eq!(menu.selected().insert_text, "getcwd");
    }

    #[test]
    fn test_tab_accepts_selected() {
        let mut app = make_app("import os\n");
        let now = Instant::now();
        type_str(&mut app, "os.", now);
        app.handle_action(Action::Down, now);
        app.handle_action(Action::Tab, now);
        assert_eq!(app.document.text(), "import os\nos.getenv");
        assert!(app.menu.is_none());
    }

    #[test]
    fn test_enter_accepts_word_replacing_prefix() {
        let mut app = make_app("");
        let now = Instant::now();
        type_str(&mut app, "pr", now);
        app.handle_action(Action::Enter, now);
        assert_eq!(app.document.text(), "print");
    }

    #[test]
    fn test_enter_without_menu_inserts_newline() {
        let mut app = make_app("x");
        app.handle_action(Action::Enter, Instant::now());
        assert_eq!(app.document.text(), "x\n");
    }

    #[test]
    fn test_space_closes_menu() {
        let mut app = make_app("");
        let now = Instant::now();
        type_str(&mut app, "pr", now);
        assert!(app.menu.is_some());
        app.handle_action(Action::Insert(' '), now);
        assert!(app.menu.is_none());
    }

    #[test]
    fn test_escape_dismisses_and_arrows_move_cursor() {
        let mut app = make_app("ab\ncd");
        let now = Instant::now();
        app.handle_action(Action::Insert('e'), now);
        app.handle_action(Action::Escape, now);
        assert!(app.menu.is_none());
        app.handle_action(Action::Up, now);
        assert_eq!(app.document.cursor_position(), (0, 2));
    }

    #[test]
    fn test_tab_at_line_start_indents() {
        let mut app = make_app("if x:\n");
        app.handle_action(Action::Tab, Instant::now());
        assert_eq!(app.document.text(), "if x:\n    ");
        assert!(app.menu.is_none());
    }

    #[test]
    fn test_explicit_tab_opens_import_menu() {
        let mut app = make_app("import nu");
        app.handle_action(Action::Tab, Instant::now());
        assert_eq!(app.menu.as_ref().unwrap().selected().insert_text, "numpy");
    }

    #[test]
    fn test_tab_with_no_candidates_reports() {
        let mut app = make_app("zzzq");
        let now = Instant::now();
        app.handle_action(Action::Tab, now);
        assert_eq!(app.status_text(), "No completions");
    }

    #[test]
    fn test_backspace_refreshes_open_menu() {
        let mut app = make_app("");
        let now = Instant::now();
        type_str(&mut app, "prin", now);
        assert_eq!(app.menu.as_ref().unwrap().len(), 1);
        app.handle_action(Action::Backspace, now);
        app.handle_action(Action::Backspace, now);
        assert_eq!(app.menu.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_save_effects() {
        let mut app = make_app("");
        let now = Instant::now();
        assert_eq!(app.handle_action(Action::Save, now), Effect::Save);
        assert_eq!(app.handle_action(Action::SaveAndExit, now), Effect::SaveAndExit);
        assert_eq!(app.handle_action(Action::SelfUpdate, now), Effect::SelfUpdate);
        assert!(!app.should_quit);
        app.handle_action(Action::Exit, now);
        assert!(app.should_quit);
    }

    #[test]
    fn test_on_saved_exit_only_on_success() {
        let mut app = make_app("data");
        let now = Instant::now();
        let err = FileError::Encoding {
            path: PathBuf::from("x"),
        };
        app.on_saved(Effect::SaveAndExit, Err(err), now);
        assert!(!app.should_quit);
        assert!(app.status_text().starts_with("Save failed"));

        app.on_saved(Effect::SaveAndExit, Ok(4), now);
        assert!(app.should_quit);
    }

    #[test]
    fn test_on_saved_reports_and_clears_modified() {
        let mut app = make_app("");
        let now = Instant::now();
        app.handle_action(Action::Insert('x'), now);
        app.on_saved(Effect::Save, Ok(1), now);
        assert!(!app.document.is_modified());
        assert_eq!(app.status_text(), "Saved 1 bytes to hello.txt");
    }

    #[test]
    fn test_status_expires_after_ttl() {
        let mut app = make_app("");
        let now = Instant::now();
        app.set_status("Updating from GitHub...", now);
        app.tick(now + Duration::from_millis(1999));
        assert_eq!(app.status_text(), "Updating from GitHub...");
        app.tick(now + Duration::from_millis(2000));
        assert_eq!(
            app.status_text(),
            "^O Save  ^X Save+Exit  ^C Exit  F2:NANSUP  File: hello.txt"
        );
    }

    #[test]
    fn test_configured_status_ttl() {
        let config = TestConfigBuilder::new().status_ttl_ms(500).build();
        let mut app = make_app_configured("", &StatusFeed::new(8), config.editor);
        let now = Instant::now();
        app.set_status("Saved 0 bytes to hello.txt", now);
        app.tick(now + Duration::from_millis(499));
        assert_eq!(app.status_text(), "Saved 0 bytes to hello.txt");
        app.tick(now + Duration::from_millis(500));
        assert!(app.status_text().starts_with("^O Save"));
    }

    #[test]
    fn test_typing_without_auto_completion() {
        let config = TestConfigBuilder::new()
            .complete_while_typing(false)
            .build();
        let mut app = make_app_configured("import os\nos", &StatusFeed::new(8), config.editor);
        let now = Instant::now();
        app.handle_action(Action::Insert('.'), now);
        assert!(app.menu.is_none());

        app.handle_action(Action::Tab, now);
        assert_eq!(app.menu.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_menu_height_capped_by_config() {
        let config = TestConfigBuilder::new().menu_max_height(2).build();
        let mut app = make_app_configured("import os\nos", &StatusFeed::new(8), config.editor);
        app.handle_action(Action::Insert('.'), Instant::now());
        let menu = app.menu.as_ref().unwrap();
        assert_eq!(menu.len(), 3);
        assert_eq!(menu.height(), 2);
    }

    #[test]
    fn test_tick_surfaces_new_warnings() {
        let feed = StatusFeed::new(8);
        let _guard = tracing_subscriber::registry()
            .with(feed.clone())
            .set_default();
        tracing::warn!("before startup");

        let mut app = make_app_with("", &feed);
        let now = Instant::now();
        app.tick(now);
        assert!(app.status_text().starts_with("^O Save"));

        tracing::warn!("disk full");
        app.tick(now);
        assert_eq!(app.status_text(), "WARN: disk full");
    }

    #[test]
    fn test_warning_does_not_replace_active_message() {
        let feed = StatusFeed::new(8);
        let _guard = tracing_subscriber::registry()
            .with(feed.clone())
            .set_default();
        let mut app = make_app_with("", &feed);
        let now = Instant::now();

        app.set_status("Update failed: timeout", now);
        tracing::warn!("Self-update failed");
        app.tick(now);
        assert_eq!(app.status_text(), "Update failed: timeout");

        // Already seen, so it does not reappear once the message expires.
        app.tick(now + Duration::from_secs(5));
        assert!(app.status_text().starts_with("^O Save"));
    }
}
