/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    GoBack,
    Quit,

    // Pod tree
    ListUp,
    ListDown,
    /// Toggle a pod, or open the selected container's log
    ListSelect,
    Expand,
    Collapse,
    ExpandAll,
    CollapseAll,

    // Fetching
    Refresh,
    ReloadLog,

    // Log panel
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,

    ToggleHelp,

    // Render request
    Render,
}
