//! Pod sources for podscope
//!
//! This crate provides the two ways podscope obtains pods and container logs:
//! the HTTP pod/log endpoints, and the Kubernetes API directly.

mod cluster;
mod error;
mod http;
mod source;

pub use cluster::{ClusterPodSource, ClusterSourceConfig, DEFAULT_NAMESPACE};
pub use error::FetchError;
pub use http::{DEFAULT_ENDPOINT, HttpPodSource, HttpSourceConfig};
pub use source::{PodSource, SharedPodSource};

// Re-export types that are used in our public API
pub use podscope_types::{ContainerKey, LogText, PodInfo};
