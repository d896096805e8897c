//! Key bindings.
//!
//! Maps terminal key events to editor actions. Bindings are fixed and
//! nano-like; whether `Up`/`Down`/`Tab`/`Enter` drive the buffer or the
//! completion popup is decided by the app, not here.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// An action the editor can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Open the popup, or accept the selected candidate when it is open.
    Tab,
    /// Dismiss the popup.
    Escape,
    Save,
    SaveAndExit,
    Exit,
    SelfUpdate,
    None,
}

/// Resolve a key event to an [`Action`].
pub fn resolve(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('o') | KeyCode::Char('O') => Action::Save,
            KeyCode::Char('x') | KeyCode::Char('X') => Action::SaveAndExit,
            KeyCode::Char('c') | KeyCode::Char('C') => Action::Exit,
            KeyCode::Char(' ') => Action::Tab,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Enter => Action::Enter,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Tab => Action::Tab,
        KeyCode::Esc => Action::Escape,
        KeyCode::F(2) => Action::SelfUpdate,
        _ => Action::None,
    }
}
