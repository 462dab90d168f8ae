/// Failure of a pod-list or log request
///
/// Network failures, non-success statuses and undecodable bodies are not
/// distinguished.
#[derive(Clone, Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl FetchError {
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::RequestFailed(format!("HTTP {}", status))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed(e.to_string())
    }
}

impl From<kube::Error> for FetchError {
    fn from(e: kube::Error) -> Self {
        Self::RequestFailed(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::RequestFailed(format!("invalid response body: {}", e))
    }
}
