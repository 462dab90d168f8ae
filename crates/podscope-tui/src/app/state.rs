use std::collections::HashSet;

use chrono::{DateTime, Local};
use podscope_view::{ContainerKey, PodListModel, PodName, render};
use ratatui::widgets::ListState;

/// Number of lines a page scroll moves the log panel
const PAGE: usize = 20;

/// Which pane receives navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    PodList,
    LogPanel,
}

/// One visible line of the pod tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Row {
    Pod {
        pod: PodName,
        /// `None` while the container group is not rendered
        containers: Option<usize>,
        expanded: bool,
    },
    Container {
        key: ContainerKey,
        /// Line count of the fetched log, `None` while it is outstanding
        log_lines: Option<usize>,
    },
}

impl Row {
    pub fn pod(&self) -> &PodName {
        match self {
            Self::Pod { pod, .. } => pod,
            Self::Container { key, .. } => &key.pod,
        }
    }
}

/// UI-specific transient state
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Selection in the pod tree
    pub list_state: ListState,

    /// Pods whose containers are listed under them
    pub expanded: HashSet<PodName>,

    pub focus: Focus,

    /// Scroll position in the log panel
    pub log_scroll: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            help_visible: false,
            list_state: ListState::default(),
            expanded: HashSet::new(),
            focus: Focus::PodList,
            log_scroll: 0,
        }
    }
}

/// Global application state
pub struct AppState {
    /// Human-readable description of where pods come from
    pub source: String,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,

    /// When the current generation was requested
    pub last_refresh: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(source: impl Into<String>) -> Self {
        let mut ui_state = UiState::default();
        ui_state.list_state.select(Some(0));

        Self {
            source: source.into(),
            ui_state,
            should_quit: false,
            render_dirty: true, // Start dirty to ensure initial render
            last_refresh: None,
        }
    }

    /// Flatten the rendered pod list into tree rows
    pub fn rows(&self, model: &PodListModel) -> Vec<Row> {
        let tree = render(model);
        let mut rows = Vec::new();

        for section in &tree.sections {
            let expanded = self.ui_state.expanded.contains(section.pod);
            rows.push(Row::Pod {
                pod: section.pod.clone(),
                containers: section.group.as_ref().map(Vec::len),
                expanded,
            });

            if !expanded {
                continue;
            }
            for entry in section.group.iter().flatten() {
                rows.push(Row::Container {
                    key: entry.key.clone(),
                    log_lines: entry.log.map(|block| block.text.line_count()),
                });
            }
        }
        rows
    }

    pub fn selected_row(&self, model: &PodListModel) -> Option<Row> {
        let index = self.ui_state.list_state.selected()?;
        self.rows(model).into_iter().nth(index)
    }

    /// Move selection up
    pub fn list_up(&mut self, model: &PodListModel) {
        let len = self.rows(model).len();
        if len == 0 {
            return;
        }

        let i = match self.ui_state.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.ui_state.list_state.select(Some(i));
    }

    /// Move selection down
    pub fn list_down(&mut self, model: &PodListModel) {
        let len = self.rows(model).len();
        if len == 0 {
            return;
        }

        let i = match self.ui_state.list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.ui_state.list_state.select(Some(i));
    }

    /// Forget expanded pods that left the model and keep the selection
    /// inside the current row count
    pub fn clamp_selection(&mut self, model: &PodListModel) {
        self.ui_state.expanded.retain(|pod| model.has_pod(pod));

        let len = self.rows(model).len();
        let selected = self.ui_state.list_state.selected().unwrap_or(0);
        self.ui_state
            .list_state
            .select(Some(selected.min(len.saturating_sub(1))));
    }

    /// Expand or collapse the selected pod
    ///
    /// Returns the selected container instead when a container row is
    /// selected, so the caller can open its log.
    pub fn toggle_selected(&mut self, model: &PodListModel) -> Option<ContainerKey> {
        match self.selected_row(model)? {
            Row::Pod { pod, expanded, .. } => {
                if expanded {
                    self.ui_state.expanded.remove(&pod);
                } else {
                    self.ui_state.expanded.insert(pod);
                }
                None
            }
            Row::Container { key, .. } => Some(key),
        }
    }

    /// Expand the selected pod, or return the selected container
    pub fn expand_selected(&mut self, model: &PodListModel) -> Option<ContainerKey> {
        match self.selected_row(model)? {
            Row::Pod { pod, .. } => {
                self.ui_state.expanded.insert(pod);
                None
            }
            Row::Container { key, .. } => Some(key),
        }
    }

    /// Collapse the pod owning the selected row and select its header
    pub fn collapse_selected(&mut self, model: &PodListModel) {
        let Some(row) = self.selected_row(model) else {
            return;
        };
        let pod = row.pod().clone();
        self.ui_state.expanded.remove(&pod);

        let header = self
            .rows(model)
            .iter()
            .position(|r| matches!(r, Row::Pod { pod: p, .. } if *p == pod));
        if let Some(index) = header {
            self.ui_state.list_state.select(Some(index));
        }
    }

    pub fn expand_all(&mut self, model: &PodListModel) {
        let pods: Vec<PodName> = render(model)
            .sections
            .iter()
            .map(|section| section.pod.clone())
            .collect();
        self.ui_state.expanded.extend(pods);
    }

    pub fn collapse_all(&mut self) {
        self.ui_state.expanded.clear();
        self.ui_state.list_state.select(Some(0));
    }

    /// Move focus to the log panel, starting at the top
    pub fn show_log(&mut self) {
        self.ui_state.focus = Focus::LogPanel;
        self.ui_state.log_scroll = 0;
    }

    /// Return from the log panel; false if there was nothing to go back from
    pub fn go_back(&mut self) -> bool {
        match self.ui_state.focus {
            Focus::LogPanel => {
                self.ui_state.focus = Focus::PodList;
                self.ui_state.log_scroll = 0;
                true
            }
            Focus::PodList => false,
        }
    }

    /// Reset per-generation UI state after the view was cleared
    ///
    /// Expanded pods are remembered by name, so a pod that reappears after
    /// the refresh stays open.
    pub fn on_refresh(&mut self) {
        self.ui_state.focus = Focus::PodList;
        self.ui_state.log_scroll = 0;
        self.ui_state.list_state.select(Some(0));
        self.last_refresh = Some(Local::now());
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        // Clamped to the log length when the panel is drawn
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_add(n);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(PAGE);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(PAGE);
    }

    pub fn scroll_to_top(&mut self) {
        self.ui_state.log_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.ui_state.log_scroll = usize::MAX;
    }
}

#[cfg(test)]
mod tests {
    use podscope_view::{LogText, PodInfo, PodsOutcome};

    use super::*;

    fn model() -> PodListModel {
        let mut model = PodListModel::new();
        let generation = model.begin_refresh();
        let outcome = model.apply_pods(
            generation,
            vec![
                PodInfo::new("web", ["app", "proxy"]),
                PodInfo::new("db", ["pg"]),
            ],
        );
        assert!(matches!(outcome, PodsOutcome::Applied { .. }));
        model.insert_log(
            generation,
            ContainerKey::new("web", "app"),
            LogText::new("one\ntwo\n"),
        );
        model
    }

    #[test]
    fn test_rows_collapsed_by_default() {
        let model = model();
        let state = AppState::new("test");
        let rows = state.rows(&model);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            Row::Pod {
                pod: "web".into(),
                containers: Some(2),
                expanded: false,
            }
        );
    }

    #[test]
    fn test_toggle_expands_pod() {
        let model = model();
        let mut state = AppState::new("test");

        assert_eq!(state.toggle_selected(&model), None);
        let rows = state.rows(&model);
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[1],
            Row::Container {
                key: ContainerKey::new("web", "app"),
                log_lines: Some(2),
            }
        );
        assert_eq!(
            rows[2],
            Row::Container {
                key: ContainerKey::new("web", "proxy"),
                log_lines: None,
            }
        );

        state.toggle_selected(&model);
        assert_eq!(state.rows(&model).len(), 2);
    }

    #[test]
    fn test_select_container_returns_key() {
        let model = model();
        let mut state = AppState::new("test");
        state.expand_selected(&model);
        state.list_down(&model);

        assert_eq!(
            state.toggle_selected(&model),
            Some(ContainerKey::new("web", "app"))
        );
    }

    #[test]
    fn test_list_navigation_wraps() {
        let model = model();
        let mut state = AppState::new("test");

        state.list_up(&model);
        assert_eq!(state.ui_state.list_state.selected(), Some(1));
        state.list_down(&model);
        assert_eq!(state.ui_state.list_state.selected(), Some(0));
    }

    #[test]
    fn test_navigation_on_empty_model() {
        let model = PodListModel::new();
        let mut state = AppState::new("test");
        state.list_down(&model);
        assert!(state.selected_row(&model).is_none());
        assert_eq!(state.toggle_selected(&model), None);
    }

    #[test]
    fn test_collapse_selects_pod_header() {
        let model = model();
        let mut state = AppState::new("test");
        state.expand_all(&model);
        assert_eq!(state.rows(&model).len(), 5);

        // db/pg
        state.ui_state.list_state.select(Some(4));
        state.collapse_selected(&model);
        assert_eq!(state.ui_state.list_state.selected(), Some(3));
        assert_eq!(state.rows(&model).len(), 4);

        state.collapse_all();
        assert_eq!(state.rows(&model).len(), 2);
    }

    #[test]
    fn test_go_back_from_log_panel() {
        let mut state = AppState::new("test");
        state.show_log();
        state.scroll_down(5);
        assert_eq!(state.ui_state.focus, Focus::LogPanel);

        assert!(state.go_back());
        assert_eq!(state.ui_state.focus, Focus::PodList);
        assert_eq!(state.ui_state.log_scroll, 0);
        assert!(!state.go_back());
    }

    #[test]
    fn test_refresh_keeps_expanded_names() {
        let mut model = model();
        let mut state = AppState::new("test");
        state.expand_selected(&model);
        state.show_log();

        let generation = model.begin_refresh();
        state.on_refresh();
        assert_eq!(state.ui_state.focus, Focus::PodList);
        assert!(state.rows(&model).is_empty());

        model.apply_pods(generation, vec![PodInfo::new("web", ["app"])]);
        let rows = state.rows(&model);
        assert_eq!(rows.len(), 2);
        assert!(matches!(&rows[0], Row::Pod { expanded: true, .. }));
    }

    #[test]
    fn test_clamp_forgets_vanished_pods() {
        let mut model = model();
        let mut state = AppState::new("test");
        state.expand_all(&model);
        state.ui_state.list_state.select(Some(4));

        let generation = model.begin_refresh();
        state.on_refresh();
        model.apply_pods(generation, vec![PodInfo::new("db", ["pg"])]);
        state.clamp_selection(&model);

        assert!(!state.ui_state.expanded.contains(&PodName::from("web")));
        assert!(state.ui_state.expanded.contains(&PodName::from("db")));
        assert_eq!(state.rows(&model).len(), 2);
        assert_eq!(state.ui_state.list_state.selected(), Some(0));

        // A pod that comes back later starts collapsed
        let generation = model.begin_refresh();
        model.apply_pods(generation, vec![PodInfo::new("web", ["app"])]);
        state.clamp_selection(&model);
        assert!(matches!(
            &state.rows(&model)[0],
            Row::Pod { expanded: false, .. }
        ));
    }

    #[test]
    fn test_scroll_saturates() {
        let mut state = AppState::new("test");
        state.scroll_up(3);
        assert_eq!(state.ui_state.log_scroll, 0);
        state.page_down();
        assert_eq!(state.ui_state.log_scroll, PAGE);
        state.scroll_to_bottom();
        state.scroll_down(1);
        assert_eq!(state.ui_state.log_scroll, usize::MAX);
    }
}
