mod help_overlay;
mod log_panel;
mod pod_tree;
mod status_bar;

pub use help_overlay::HelpOverlay;
pub use log_panel::LogPanel;
pub use pod_tree::PodTree;
pub use status_bar::{StatusBar, log_panel_hints, pod_list_hints};
