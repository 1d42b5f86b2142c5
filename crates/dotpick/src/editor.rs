//! Overlay for editing the team list.

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Clear, Paragraph},
};

/// Raw text being edited, one name per line.
#[derive(Debug, Clone, Default)]
pub struct NameEditor {
    text: String,
}

impl NameEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn insert(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Draw the editor centred over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect, color: Color) {
        let popup = centered(area, 50, 60);

        let mut lines: Vec<Line> = self.text.split('\n').map(Line::from).collect();
        if let Some(last) = lines.last_mut() {
            last.push_span("▏".fg(color));
        }

        let block = Block::bordered()
            .title(" Team names ".bold().fg(color))
            .title_bottom(
                Line::from(vec![
                    " ctrl+s".bold().fg(color),
                    " save  ".dark_gray(),
                    "esc".bold().fg(color),
                    " close ".dark_gray(),
                ])
                .centered(),
            )
            .border_style(Style::new().fg(color));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// A rectangle of the given percentages, centred in `area`.
fn centered(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Percentage(width_percent)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Percentage(height_percent)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing() {
        let mut editor = NameEditor::new("Alice");
        editor.newline();
        editor.insert('B');
        editor.insert('o');
        editor.insert('b');
        assert_eq!(editor.text(), "Alice\nBob");
        editor.backspace();
        editor.backspace();
        editor.backspace();
        editor.backspace();
        assert_eq!(editor.text(), "Alice");
    }

    #[test]
    fn test_backspace_on_empty_text() {
        let mut editor = NameEditor::default();
        editor.backspace();
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_centered() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(centered(area, 50, 60), Rect::new(25, 10, 50, 30));
    }
}
