use std::sync::Arc;

use async_trait::async_trait;
use podscope_types::{ContainerKey, LogText, PodInfo};

use crate::FetchError;

/// Something that can list pods and return container logs
#[async_trait]
pub trait PodSource: Send + Sync {
    /// Fetch the current pod list
    async fn list_pods(&self) -> Result<Vec<PodInfo>, FetchError>;

    /// Fetch the log body of one container
    async fn container_logs(&self, key: &ContainerKey) -> Result<LogText, FetchError>;

    /// Short description for the header, e.g. the endpoint or namespace
    fn describe(&self) -> String;
}

pub type SharedPodSource = Arc<dyn PodSource>;
