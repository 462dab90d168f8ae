use podscope_view::{PodListModel, render};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    app::{AppState, Focus},
    ui::{
        Layout, Theme,
        components::{LogPanel, PodTree, StatusBar, log_panel_hints, pod_list_hints},
    },
};

/// The pod list with its log panel
pub struct PodListScreen;

impl PodListScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState, model: &PodListModel) {
        let area = frame.area();
        let (header_area, content_area, status_area) = Layout::main(area);

        Self::render_header(frame, header_area, state, model);
        Self::render_content(frame, content_area, state, model);
        Self::render_status_bar(frame, status_area, state, model);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, model: &PodListModel) {
        let mut spans = vec![
            Span::styled("podscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.source.as_str(), Theme::text_highlight()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled("List of Pods", Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled("Pod List", Theme::tab_active()),
        ];
        if model.back_visible() {
            spans.push(Span::styled("  ← Back", Theme::text_highlight()));
        }

        let mut refreshed = format!(" {} ", model.generation());
        if let Some(at) = state.last_refresh {
            refreshed = format!(" {} at {} ", model.generation(), at.format("%H:%M:%S"));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title_top(Line::from(Span::styled(refreshed, Theme::text_dim())).right_aligned()),
        );

        frame.render_widget(header, area);
    }

    fn render_content(frame: &mut Frame, area: Rect, state: &mut AppState, model: &PodListModel) {
        let tree = render(model);
        let (tree_area, log_area) = Layout::pod_list(area, tree.log_panel.is_some());

        let rows = state.rows(model);
        let focus = state.ui_state.focus;
        let pods = PodTree::new(" Pods ", &rows).focused(focus == Focus::PodList);
        frame.render_stateful_widget(pods, tree_area, &mut state.ui_state.list_state);

        if let (Some(log_area), Some((key, block))) = (log_area, tree.log_panel) {
            let panel = LogPanel::new(key, block).focused(focus == Focus::LogPanel);
            frame.render_stateful_widget(panel, log_area, &mut state.ui_state.log_scroll);
        }
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, model: &PodListModel) {
        let hints = match state.ui_state.focus {
            Focus::PodList => pod_list_hints(),
            Focus::LogPanel => log_panel_hints(),
        };
        let counts = format!("{} pods · {} logs", model.pod_count(), model.log_count());

        frame.render_widget(StatusBar::new().hints(hints).right(counts), area);
    }
}
