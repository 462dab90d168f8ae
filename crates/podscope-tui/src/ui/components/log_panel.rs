use podscope_view::{ContainerKey, LogBlock, sanitize_log};
use ratatui::{
    buffer::Buffer,
    layout::{Margin, Rect},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};

use crate::ui::Theme;

/// One container's log as plain text
///
/// The state is the scroll offset; it is clamped to the log length on every
/// render so scrolling past either end is harmless.
pub struct LogPanel<'a> {
    key: &'a ContainerKey,
    block: Option<&'a LogBlock>,
    focused: bool,
}

impl<'a> LogPanel<'a> {
    pub fn new(key: &'a ContainerKey, block: Option<&'a LogBlock>) -> Self {
        Self {
            key,
            block,
            focused: true,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl StatefulWidget for LogPanel<'_> {
    type State = usize;

    fn render(self, area: Rect, buf: &mut Buffer, scroll: &mut usize) {
        let border = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };
        let mut outline = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(format!(" {} ", self.key), Theme::title()));
        if let Some(block) = self.block {
            let fetched = block
                .fetched_at
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S");
            let stamp = format!(" {} · fetched {} ", block.generation, fetched);
            outline = outline
                .title_top(Line::from(Span::styled(stamp, Theme::text_dim())).right_aligned());
        }

        let text = self.block.map(|block| sanitize_log(block.text.as_str()));
        let lines: Vec<&str> = match &text {
            Some(text) => text.lines().collect(),
            None => Vec::new(),
        };

        let inner_height = area.height.saturating_sub(2) as usize;
        let max_scroll = lines.len().saturating_sub(inner_height);
        *scroll = (*scroll).min(max_scroll);

        let body: Vec<Line> = match self.block {
            None => vec![Line::from(Span::styled("Waiting for logs…", Theme::text_dim()))],
            Some(_) if lines.is_empty() => {
                vec![Line::from(Span::styled("(no output)", Theme::text_dim()))]
            }
            Some(_) => lines
                .iter()
                .skip(*scroll)
                .take(inner_height)
                .map(|line| Line::from(Span::styled(*line, Theme::text())))
                .collect(),
        };

        Paragraph::new(body).block(outline).render(area, buf);

        if max_scroll > 0 {
            let mut scrollbar_state = scrollbar_state(lines.len(), inner_height, *scroll);
            Scrollbar::new(ScrollbarOrientation::VerticalRight).render(
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                buf,
                &mut scrollbar_state,
            );
        }
    }
}

/// Thumb sized by the share of the log that fits in the viewport
fn scrollbar_state(total_lines: usize, viewport: usize, scroll: usize) -> ScrollbarState {
    ScrollbarState::new(total_lines)
        .viewport_content_length(viewport)
        .position(scroll)
}
