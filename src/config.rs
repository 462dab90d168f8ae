//! Configuration file handling
//!
//! Settings come from three layers: built-in defaults, an optional TOML file,
//! and command-line flags. Later layers win key by key.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use podscope_api::{ClusterSourceConfig, HttpSourceConfig};
use serde::Deserialize;
use tracing::debug;

/// Where pods and logs are read from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The pod service's HTTP endpoints
    #[default]
    Api,
    /// The Kubernetes API
    Cluster,
}

/// One layer of optional settings, as found in the config file or on the CLI
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub source: Option<SourceKind>,
    pub endpoint: Option<String>,
    pub tls_ca: Option<PathBuf>,
    pub insecure: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub namespace: Option<String>,
    pub context: Option<String>,
    pub tail_lines: Option<i64>,
    pub refresh_interval_secs: Option<u64>,
}

impl ConfigLayer {
    /// Combine two layers; values set in `over` take precedence
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            source: over.source.or(self.source),
            endpoint: over.endpoint.or(self.endpoint),
            tls_ca: over.tls_ca.or(self.tls_ca),
            insecure: over.insecure.or(self.insecure),
            timeout_secs: over.timeout_secs.or(self.timeout_secs),
            namespace: over.namespace.or(self.namespace),
            context: over.context.or(self.context),
            tail_lines: over.tail_lines.or(self.tail_lines),
            refresh_interval_secs: over.refresh_interval_secs.or(self.refresh_interval_secs),
        }
    }
}

/// Fully resolved settings
#[derive(Clone, Debug)]
pub struct Settings {
    pub source: SourceKind,
    pub http: HttpSourceConfig,
    pub cluster: ClusterSourceConfig,
    /// `None` disables periodic refresh
    pub refresh_interval: Option<Duration>,
}

impl From<ConfigLayer> for Settings {
    fn from(layer: ConfigLayer) -> Self {
        let http_defaults = HttpSourceConfig::default();
        let cluster_defaults = ClusterSourceConfig::default();

        Self {
            source: layer.source.unwrap_or_default(),
            http: HttpSourceConfig {
                endpoint: layer.endpoint.unwrap_or(http_defaults.endpoint),
                tls_ca: layer.tls_ca,
                insecure: layer.insecure.unwrap_or(http_defaults.insecure),
                timeout: layer
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(http_defaults.timeout),
            },
            cluster: ClusterSourceConfig {
                context: layer.context,
                namespace: layer.namespace.unwrap_or(cluster_defaults.namespace),
                tail_lines: layer.tail_lines,
            },
            refresh_interval: layer
                .refresh_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// `$CONFIG_DIR/podscope/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("podscope").join("config.toml"))
}

/// Load the config file layer
///
/// An explicit path must exist. Without one the default location is tried,
/// and an absent file there yields an empty layer.
pub fn load(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) => read(path),
        None => match default_path() {
            Some(path) if path.exists() => read(&path),
            _ => Ok(ConfigLayer::default()),
        },
    }
}

fn read(path: &Path) -> Result<ConfigLayer> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let layer = toml::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    Ok(layer)
}
