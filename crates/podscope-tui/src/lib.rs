//! Terminal UI for podscope
//!
//! State, keybindings, terminal event handling and widgets for browsing the
//! pod list view. The view model itself lives in `podscope-view`; this crate
//! only decides how it is drawn and which keys drive it.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Focus, Row, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui, install_panic_hook};
pub use ui::components::{HelpOverlay, LogPanel, PodTree, StatusBar};
pub use ui::screens::PodListScreen;
pub use ui::{Layout, Theme};
