use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::Theme;

/// Status bar showing keyboard shortcuts
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;

        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Right text only when it does not overlap the hints
        if let Some(right) = self.right_text {
            let right_width = right.width() as u16;
            let right_span = Span::styled(&right, Theme::status_bar());
            let right_x = area.x + area.width.saturating_sub(right_width + 2);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &right_span, right_width);
            }
        }
    }
}

/// Hints while the pod tree has focus
pub fn pod_list_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("↑/k", "Up"),
        ("↓/j", "Down"),
        ("Enter", "Open"),
        ("r", "Pod List"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}

/// Hints while the log panel has focus
pub fn log_panel_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("j/k", "Scroll"),
        ("g/G", "Top/Bottom"),
        ("l", "Reload"),
        ("Esc", "Back"),
        ("q", "Quit"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_renders_hints_and_right_text() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new()
            .hints([("q", "Quit")])
            .right("2 pods · #3")
            .render(area, &mut buf);

        let text = row_text(&buf, 60);
        assert!(text.starts_with(" [q] Quit"));
        assert!(text.trim_end().ends_with("2 pods · #3"));
    }

    #[test]
    fn test_right_text_dropped_when_crowded() {
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new()
            .hints(pod_list_hints())
            .right("12 pods")
            .render(area, &mut buf);

        assert!(!row_text(&buf, 20).contains("pods"));
    }
}
