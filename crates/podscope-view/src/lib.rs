//! Pod list view for podscope
//!
//! This crate holds the view model keyed by pod and container, the pure
//! render into a view tree, and the fetch orchestration that fills it.

mod fetch;
mod model;
mod render;
mod text;

pub use fetch::{FetchEvent, Fetcher, PodListView};
pub use model::{LogOutcome, PodListModel, PodsOutcome};
pub use render::{ContainerEntry, Node, PodSection, ViewTree, render};
pub use text::sanitize_log;

// Re-export types used in our public API
pub use podscope_types::{
    ContainerKey, ElementId, Generation, LogBlock, LogText, PodInfo, PodName,
};
