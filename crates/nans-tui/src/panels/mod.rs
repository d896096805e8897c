//! Screen regions and the frame layout that stacks them.

mod completion_menu;
mod editor;
mod status_bar;

pub use completion_menu::CompletionMenu;
pub use editor::EditorPanel;
pub use status_bar::{header_line, help_line};

use ratatui::prelude::*;

use crate::app::App;

/// Draw one frame: header, editor, popup (when open), status bar.
pub fn render(app: &mut App, frame: &mut Frame) {
    let menu_height = app.menu.as_ref().map_or(0, CompletionMenu::height);
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(menu_height),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let label = app.file_label();
    status_bar::render_header(
        frame,
        chunks[0],
        &header_line(&label, app.document.is_modified()),
        &nans_core::build_info::version_string(),
    );
    app.editor.render(frame, chunks[1], &app.document);
    if let Some(menu) = &app.menu {
        menu.render(frame, chunks[2]);
    }
    status_bar::render_status(frame, chunks[3], &app.status_text());
}
