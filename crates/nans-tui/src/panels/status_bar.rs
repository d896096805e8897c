//! One-line header and status bar.

use ratatui::{prelude::*, widgets::Paragraph};

/// Key help shown when no transient message is active.
pub fn help_line(file_label: &str) -> String {
    format!("^O Save  ^X Save+Exit  ^C Exit  F2:NANSUP  File: {file_label}")
}

/// `-- <file> --`, with a modified marker once the buffer is dirty.
pub fn header_line(file_label: &str, modified: bool) -> String {
    if modified {
        format!("-- {file_label} [+] --")
    } else {
        format!("-- {file_label} --")
    }
}

pub fn render_header(frame: &mut Frame, area: Rect, title: &str, version: &str) {
    let layout = Layout::horizontal([Constraint::Min(1), Constraint::Length(version.len() as u16)])
        .split(area);
    frame.render_widget(Paragraph::new(title), layout[0]);
    frame.render_widget(
        Paragraph::new(version).style(Style::default().fg(Color::DarkGray)),
        layout[1],
    );
}

pub fn render_status(frame: &mut Frame, area: Rect, text: &str) {
    let bar = Paragraph::new(text).style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_line_names_file() {
        assert_eq!(
            help_line("hello.txt"),
            "^O Save  ^X Save+Exit  ^C Exit  F2:NANSUP  File: hello.txt"
        );
    }

    #[test]
    fn test_header_marks_modified() {
        assert_eq!(header_line("a.py", false), "-- a.py --");
        assert_eq!(header_line("a.py", true), "-- a.py [+] --");
    }
}
