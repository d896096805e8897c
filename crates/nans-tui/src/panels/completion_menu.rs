//! Completion popup: candidate list with a selection and a scrolled window.

use nans_core::{Candidate, CandidateKind};
use ratatui::{
    prelude::*,
    widgets::{List, ListItem},
};

/// Open completion popup.
///
/// Always holds at least one candidate; [`CompletionMenu::new`] returns
/// `None` for an empty list.
#[derive(Debug, Clone)]
pub struct CompletionMenu {
    items: Vec<Candidate>,
    selected: usize,
    /// Index of the first visible row.
    top: usize,
    max_height: usize,
    /// Rows kept visible above and below the selection when scrolling.
    scroll_offset: usize,
}

impl CompletionMenu {
    pub fn new(items: Vec<Candidate>, max_height: u16, scroll_offset: u16) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self {
            items,
            selected: 0,
            top: 0,
            max_height: usize::from(max_height.max(1)),
            scroll_offset: usize::from(scroll_offset),
        })
    }

    pub fn selected(&self) -> &Candidate {
        &self.items[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Rows the popup occupies on screen.
    pub fn height(&self) -> u16 {
        self.items.len().min(self.max_height) as u16
    }

    /// Index range currently on screen.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        self.top..self.top + usize::from(self.height())
    }

    /// Move the selection down, wrapping to the first candidate.
    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
        self.ensure_visible();
    }

    /// Move the selection up, wrapping to the last candidate.
    pub fn select_prev(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.items.len() - 1);
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let height = usize::from(self.height());
        let margin = self.scroll_offset.min(height.saturating_sub(1) / 2);

        if self.selected < self.top + margin {
            self.top = self.selected.saturating_sub(margin);
        } else if self.selected + margin >= self.top + height {
            self.top = self.selected + margin + 1 - height;
        }
        self.top = self.top.min(self.items.len() - height);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .visible_range()
            .map(|i| {
                let candidate = &self.items[i];
                let style = if i == self.selected {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().bg(Color::DarkGray).fg(kind_color(candidate.kind))
                };
                ListItem::new(Line::from(format!(" {} ", candidate.display_label))).style(style)
            })
            .collect();

        frame.render_widget(List::new(items), area);
    }
}

fn kind_color(kind: CandidateKind) -> Color {
    match kind {
        CandidateKind::Keyword => Color::Magenta,
        CandidateKind::Builtin => Color::White,
        CandidateKind::Module => Color::Yellow,
        CandidateKind::Attribute => Color::Green,
    }
}
