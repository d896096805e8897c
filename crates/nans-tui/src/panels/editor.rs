//! Editor area: soft-wrapped document text with the cursor kept in view.

use nans_core::Document;
use ratatui::{prelude::*, widgets::Paragraph};

/// Screen rows produced by wrapping the document at a fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedText {
    pub rows: Vec<String>,
    /// Cursor as `(row, column)` within `rows`.
    pub cursor: (usize, usize),
}

/// Wrap `doc` at `width` columns, one column per char. Tabs render as a
/// single space.
pub fn wrap(doc: &Document, width: usize) -> WrappedText {
    let width = width.max(1);
    let (cursor_line, cursor_col) = doc.cursor_position();
    let mut rows = Vec::new();
    let mut cursor = (0, 0);

    for (line_no, line) in doc.lines().enumerate() {
        if line_no == cursor_line {
            cursor = (rows.len() + cursor_col / width, cursor_col % width);
        }
        let chars: Vec<char> = line
            .chars()
            .map(|c| if c == '\t' { ' ' } else { c })
            .collect();
        if chars.is_empty() {
            rows.push(String::new());
        } else {
            rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect()));
        }
    }
    WrappedText { rows, cursor }
}

/// Viewport over the wrapped document.
#[derive(Debug, Default)]
pub struct EditorPanel {
    /// First wrapped row on screen.
    top: usize,
}

impl EditorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> usize {
        self.top
    }

    /// Adjust the viewport so `cursor_row` is inside `height` rows.
    pub fn follow(&mut self, cursor_row: usize, height: usize) {
        let height = height.max(1);
        if cursor_row < self.top {
            self.top = cursor_row;
        } else if cursor_row >= self.top + height {
            self.top = cursor_row + 1 - height;
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, doc: &Document) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let wrapped = wrap(doc, usize::from(area.width));
        self.follow(wrapped.cursor.0, usize::from(area.height));

        let lines: Vec<Line> = wrapped
            .rows
            .into_iter()
            .skip(self.top)
            .take(usize::from(area.height))
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(lines), area);

        let (row, col) = wrapped.cursor;
        let x = area.x + (col as u16).min(area.width.saturating_sub(1));
        let y = area.y + (row - self.top) as u16;
        frame.set_cursor_position((x, y));
    }
}
