//! Editable text buffer with a single cursor.
//!
//! The text is one `String`; the cursor is a byte offset that always sits
//! on a char boundary. Column arithmetic is done in chars.

use crate::completion::Candidate;

/// The buffer being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    cursor: usize,
    modified: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding `text` with the cursor at the start.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            modified: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor as a byte offset into [`Document::text`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text before the cursor.
    pub fn text_before_cursor(&self) -> &str {
        &self.text[..self.cursor]
    }

    /// Whether the text changed since load or the last [`Document::mark_saved`].
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Move the cursor to byte `offset`, clamped and snapped back to a char
    /// boundary.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = crate::completion::context::clamp_offset(&self.text, offset);
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.modified = true;
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.modified = true;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the char before the cursor. Returns `false` at document start.
    pub fn backspace(&mut self) -> bool {
        let Some(c) = self.text[..self.cursor].chars().next_back() else {
            return false;
        };
        self.cursor -= c.len_utf8();
        self.text.remove(self.cursor);
        self.modified = true;
        true
    }

    /// Delete the char under the cursor. Returns `false` at document end.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.text.remove(self.cursor);
        self.modified = true;
        true
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    /// Move up one line, keeping the char column where possible.
    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.text[start..self.cursor].chars().count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(prev_start, column);
    }

    /// Move down one line, keeping the char column where possible.
    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.text.len() {
            self.cursor = end;
            return;
        }
        let column = self.text[self.line_start(self.cursor)..self.cursor]
            .chars()
            .count();
        self.cursor = self.offset_in_line(end + 1, column);
    }

    /// Zero-based `(row, column)` of the cursor, column in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let column = before[self.line_start(self.cursor)..].chars().count();
        (row, column)
    }

    /// Byte offset of zero-based `(row, column)`, clamped to the document.
    pub fn offset_of(&self, row: usize, column: usize) -> usize {
        let mut start = 0;
        for _ in 0..row {
            match self.text[start..].find('\n') {
                Some(i) => start += i + 1,
                None => return self.text.len(),
            }
        }
        self.offset_in_line(start, column)
    }

    /// Replace the prefix the candidate overwrites and insert its text.
    pub fn apply_candidate(&mut self, candidate: &Candidate) {
        for _ in 0..candidate.replace_len() {
            if !self.backspace() {
                break;
            }
        }
        self.insert_str(&candidate.insert_text);
    }

    /// Lines of the document; a trailing newline yields a final empty line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |i| offset + i)
    }

    /// Byte offset `column` chars into the line starting at `start`, or the
    /// line end if the line is shorter.
    fn offset_in_line(&self, start: usize, column: usize) -> usize {
        let end = self.line_end(start);
        self.text[start..end]
            .char_indices()
            .nth(column)
            .map_or(end, |(i, _)| start + i)
    }
}
