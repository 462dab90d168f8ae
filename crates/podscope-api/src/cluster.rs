//! Kubernetes API pod source
//!
//! Serves the same data as the pod service without going through it: the
//! pods of one namespace with the names from their container specs, and the
//! logs of a single container.

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::{ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use podscope_types::{ContainerKey, LogText, PodInfo};
use tracing::debug;

use crate::{FetchError, PodSource};

/// Namespace the pod service lists
pub const DEFAULT_NAMESPACE: &str = "cnf-certsuite-operator";

/// Settings for [`ClusterPodSource`]
#[derive(Clone, Debug)]
pub struct ClusterSourceConfig {
    /// Kubeconfig context; `None` infers the config (kubeconfig or in-cluster)
    pub context: Option<String>,
    pub namespace: String,
    /// Only fetch the last N lines of each log
    pub tail_lines: Option<i64>,
}

impl Default for ClusterSourceConfig {
    fn default() -> Self {
        Self {
            context: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            tail_lines: None,
        }
    }
}

/// Pod source reading directly from the Kubernetes API
pub struct ClusterPodSource {
    pods: Api<Pod>,
    config: ClusterSourceConfig,
}

impl ClusterPodSource {
    /// Connect using the configured context, or infer the cluster config
    pub async fn connect(config: ClusterSourceConfig) -> Result<Self> {
        let kube_config = match &config.context {
            Some(context_name) => {
                let kubeconfig = Kubeconfig::read()
                    .context("Failed to read kubeconfig. Is kubectl configured?")?;
                kube::Config::from_custom_kubeconfig(
                    kubeconfig,
                    &KubeConfigOptions {
                        context: Some(context_name.clone()),
                        ..Default::default()
                    },
                )
                .await
                .context(format!(
                    "Failed to create config for context: {}",
                    context_name
                ))?
            }
            None => kube::Config::infer()
                .await
                .context("Failed to infer cluster configuration")?,
        };

        let client =
            kube::Client::try_from(kube_config).context("Failed to create Kubernetes client")?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: kube::Client, config: ClusterSourceConfig) -> Self {
        let pods = Api::namespaced(client, &config.namespace);
        Self { pods, config }
    }

    fn log_params(&self, key: &ContainerKey) -> LogParams {
        LogParams {
            container: Some(key.container.as_str().to_string()),
            tail_lines: self.config.tail_lines,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PodSource for ClusterPodSource {
    async fn list_pods(&self) -> Result<Vec<PodInfo>, FetchError> {
        let list = self.pods.list(&ListParams::default()).await?;
        debug!(namespace = %self.config.namespace, count = list.items.len(), "listed pods");
        Ok(list.items.into_iter().map(pod_to_info).collect())
    }

    async fn container_logs(&self, key: &ContainerKey) -> Result<LogText, FetchError> {
        let text = self
            .pods
            .logs(key.pod.as_str(), &self.log_params(key))
            .await?;
        Ok(LogText::from(text))
    }

    fn describe(&self) -> String {
        match &self.config.context {
            Some(context) => format!("{}/{}", context, self.config.namespace),
            None => self.config.namespace.clone(),
        }
    }
}

/// Convert a k8s Pod to PodInfo, taking container names from the pod spec
fn pod_to_info(pod: Pod) -> PodInfo {
    let name = pod.metadata.name.unwrap_or_default();
    let containers = pod
        .spec
        .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
        .unwrap_or_default();

    PodInfo { name, containers }
}
