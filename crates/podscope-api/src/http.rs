//! HTTP pod source
//!
//! Talks to the pod service over two endpoints:
//! - `GET {endpoint}/api/pods` returns a JSON array of `{name, containers}`
//! - `GET {endpoint}/api/logs/{pod}/{container}` returns the raw log body
//!
//! The endpoint may be given with or without a scheme; without one it is
//! treated as `https://`, which is how the service is deployed in-cluster.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use podscope_types::{ContainerKey, LogText, PodInfo, parse_pod_list};
use tracing::{debug, warn};

use crate::{FetchError, PodSource};

/// In-cluster address of the pod service
pub const DEFAULT_ENDPOINT: &str =
    "https://cnf-certsuite-plugin.cnf-certsuite-plugin-ns.svc.cluster.local:9443";

/// Connection settings for [`HttpPodSource`]
#[derive(Clone, Debug)]
pub struct HttpSourceConfig {
    pub endpoint: String,
    /// PEM bundle to trust in addition to the system roots
    pub tls_ca: Option<PathBuf>,
    /// Skip certificate verification entirely
    pub insecure: bool,
    pub timeout: Duration,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tls_ca: None,
            insecure: false,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Pod source backed by the pod service's REST endpoints
pub struct HttpPodSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPodSource {
    /// Build a source and its HTTP client from connection settings
    pub fn new(config: &HttpSourceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);

        if let Some(ca_path) = &config.tls_ca {
            let pem = std::fs::read(ca_path)
                .with_context(|| format!("Failed to read CA bundle {}", ca_path.display()))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .with_context(|| format!("Invalid CA bundle {}", ca_path.display()))?;
            builder = builder.add_root_certificate(cert);
        }

        if config.insecure {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self::with_client(&config.endpoint, client))
    }

    /// Use an existing client
    pub fn with_client(endpoint: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: normalize_endpoint(endpoint),
            client,
        }
    }

    pub fn pods_url(&self) -> String {
        format!("{}/api/pods", self.base_url)
    }

    /// Logs URL with both path segments percent-encoded
    pub fn logs_url(&self, key: &ContainerKey) -> String {
        format!(
            "{}/api/logs/{}/{}",
            self.base_url,
            urlencoding::encode(key.pod.as_str()),
            urlencoding::encode(key.container.as_str())
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send().await?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(FetchError::status(resp.status()))
        }
    }
}

#[async_trait]
impl PodSource for HttpPodSource {
    async fn list_pods(&self) -> Result<Vec<PodInfo>, FetchError> {
        let body = self.get(&self.pods_url()).await?.bytes().await?;
        Ok(parse_pod_list(&body)?)
    }

    async fn container_logs(&self, key: &ContainerKey) -> Result<LogText, FetchError> {
        let text = self.get(&self.logs_url(key)).await?.text().await?;
        Ok(LogText::from(text))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Trim trailing slashes and default the scheme to `https`
fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::Request;
    use axum::http::StatusCode;
    use axum::middleware::{self, Next};
    use axum::routing::get;
    use tokio::net::TcpListener;

    use super::*;

    type Route = (&'static str, u16, &'static str);

    /// Serve canned responses by request path; returns the base URL and the
    /// list of paths requested so far. Unknown paths get a 404.
    async fn serve(routes: Vec<Route>) -> (String, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut app = Router::new();
        for (path, status, body) in routes {
            let status = StatusCode::from_u16(status).unwrap();
            app = app.route(path, get(move || async move { (status, body) }));
        }

        let recorder = Arc::clone(&seen);
        let app = app.layer(middleware::from_fn(move |request: Request, next: Next| {
            let recorder = Arc::clone(&recorder);
            async move {
                recorder.lock().unwrap().push(request.uri().path().to_string());
                next.run(request).await
            }
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), seen)
    }

    fn source(base_url: &str) -> HttpPodSource {
        HttpPodSource::new(&HttpSourceConfig {
            endpoint: base_url.to_string(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_pods() {
        let (base, seen) = serve(vec![(
            "/api/pods",
            200,
            r#"[{"name":"web-0","containers":["app","proxy"]},{"name":"db-0","containers":["pg"]}]"#,
        )])
        .await;

        let pods = source(&base).list_pods().await.unwrap();
        assert_eq!(pods.len(), 2);
        assert_eq!(pods[0], PodInfo::new("web-0", ["app", "proxy"]));
        assert_eq!(seen.lock().unwrap().as_slice(), ["/api/pods"]);
    }

    #[tokio::test]
    async fn test_list_pods_null_body() {
        let (base, _) = serve(vec![("/api/pods", 200, "null")]).await;
        assert!(source(&base).list_pods().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_pods_server_error() {
        let (base, _) = serve(vec![("/api/pods", 500, "boom")]).await;
        let err = source(&base).list_pods().await.unwrap_err();
        assert!(err.to_string().contains("500"), "{}", err);
    }

    #[tokio::test]
    async fn test_list_pods_bad_body() {
        let (base, _) = serve(vec![("/api/pods", 200, "<html></html>")]).await;
        assert!(matches!(
            source(&base).list_pods().await,
            Err(FetchError::RequestFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_container_logs_verbatim() {
        let body = "line 1\n<b>not markup</b>\n";
        let (base, seen) = serve(vec![("/api/logs/web-0/app", 200, body)]).await;

        let key = ContainerKey::new("web-0", "app");
        let text = source(&base).container_logs(&key).await.unwrap();
        assert_eq!(text.as_str(), body);
        assert_eq!(seen.lock().unwrap().as_slice(), ["/api/logs/web-0/app"]);
    }

    #[tokio::test]
    async fn test_container_logs_not_found() {
        let (base, _) = serve(vec![]).await;
        let key = ContainerKey::new("web-0", "missing");
        assert!(source(&base).container_logs(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(&format!("http://{}", addr)).list_pods().await.unwrap_err();
        assert!(err.to_string().starts_with("request failed"));
    }

    #[test]
    fn test_logs_url_encodes_segments() {
        let src = HttpPodSource::with_client("http://svc:9443/", reqwest::Client::new());
        let key = ContainerKey::new("web 0", "a/b");
        assert_eq!(src.logs_url(&key), "http://svc:9443/api/logs/web%200/a%2Fb");
    }

    #[test]
    fn test_describe_uses_normalized_endpoint() {
        let src = HttpPodSource::with_client("svc:9443/", reqwest::Client::new());
        assert_eq!(src.describe(), "https://svc:9443");
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("svc:9443"), "https://svc:9443");
        assert_eq!(normalize_endpoint("http://svc:80//"), "http://svc:80");
        assert_eq!(normalize_endpoint(" https://svc "), "https://svc");
    }

    #[test]
    fn test_missing_ca_bundle() {
        let config = HttpSourceConfig {
            tls_ca: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..Default::default()
        };
        assert!(HttpPodSource::new(&config).is_err());
    }
}
