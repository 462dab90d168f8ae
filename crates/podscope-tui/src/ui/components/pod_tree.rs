use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget},
};

use crate::app::Row;
use crate::ui::Theme;

/// Pods with their containers folded underneath
pub struct PodTree<'a> {
    rows: &'a [Row],
    title: &'a str,
    focused: bool,
}

impl<'a> PodTree<'a> {
    pub fn new(title: &'a str, rows: &'a [Row]) -> Self {
        Self {
            rows,
            title,
            focused: true,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn item(row: &Row) -> ListItem<'_> {
        let line = match row {
            Row::Pod {
                pod,
                containers,
                expanded,
            } => {
                let marker = if *expanded { "▾ " } else { "▸ " };
                let count = match containers {
                    Some(1) => "  1 container".to_string(),
                    Some(n) => format!("  {} containers", n),
                    None => String::new(),
                };
                Line::from(vec![
                    Span::styled(marker, Theme::text_dim()),
                    Span::styled(pod.as_str(), Theme::pod()),
                    Span::styled(count, Theme::text_dim()),
                ])
            }
            Row::Container { key, log_lines } => {
                let status = match log_lines {
                    Some(n) => Span::styled(format!("  {} lines", n), Theme::log_ready()),
                    None => Span::styled("  …", Theme::text_dim()),
                };
                Line::from(vec![
                    Span::raw("    "),
                    Span::styled(key.container.as_str(), Theme::container()),
                    status,
                ])
            }
        };
        ListItem::new(line)
    }
}

impl StatefulWidget for PodTree<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(self.title, Theme::title()));

        let items: Vec<ListItem> = self.rows.iter().map(Self::item).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Theme::list_item_selected())
            .highlight_symbol("▶ ");

        StatefulWidget::render(list, area, buf, state);
    }
}
