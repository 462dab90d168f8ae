//! Shared types for podscope
//!
//! This crate contains the wire types returned by pod sources and the typed
//! identifiers the view model is keyed by.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Wire Types
// ============================================================================

/// A pod as reported by the pod-list endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub containers: Vec<String>,
}

impl PodInfo {
    pub fn new<I, S>(name: impl Into<String>, containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            containers: containers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn pod_name(&self) -> PodName {
        PodName::new(self.name.clone())
    }
}

/// Deserialize a JSON `null` list as an empty `Vec`
///
/// The pod endpoint encodes an empty slice as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a pod-list response body, treating `null` as no pods
pub fn parse_pod_list(body: &[u8]) -> serde_json::Result<Vec<PodInfo>> {
    Ok(serde_json::from_slice::<Option<Vec<PodInfo>>>(body)?.unwrap_or_default())
}

// ============================================================================
// Identifiers
// ============================================================================

/// Name of a pod, unique within one pod-list response
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PodName(String);

impl PodName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PodName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PodName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of a container, scoped to its pod
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerName(String);

impl ContainerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContainerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A container addressed by its `(pod, container)` pair
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerKey {
    pub pod: PodName,
    pub container: ContainerName,
}

impl ContainerKey {
    pub fn new(pod: impl Into<PodName>, container: impl Into<ContainerName>) -> Self {
        Self {
            pod: pod.into(),
            container: container.into(),
        }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pod, self.container)
    }
}

/// Identifier of a header element in the rendered view
///
/// Displays as `pod-<name>` or `con-<pod>-<container>`. The string form is
/// for display only and may be ambiguous; equality is on the typed keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementId {
    Pod(PodName),
    Container(ContainerKey),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pod(pod) => write!(f, "pod-{}", pod),
            Self::Container(key) => write!(f, "con-{}-{}", key.pod, key.container),
        }
    }
}

// ============================================================================
// Render Generations
// ============================================================================

/// Refresh cycle counter
///
/// Every refresh starts a new generation. Fetch results carry the generation
/// they were requested in so that results from an earlier cycle can be
/// recognised and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Raw log body of one container, as returned by the source
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogText(String);

impl LogText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of lines, not counting a trailing newline
    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl From<String> for LogText {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A fetched log placed after its container in the view
#[derive(Clone, Debug)]
pub struct LogBlock {
    pub key: ContainerKey,
    pub text: LogText,
    /// Generation the fetch was issued in
    pub generation: Generation,
    pub fetched_at: DateTime<Utc>,
}

impl LogBlock {
    pub fn new(key: ContainerKey, text: LogText, generation: Generation) -> Self {
        Self {
            key,
            text,
            generation,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pod_list() {
        let body = br#"[{"name":"web-0","containers":["app","sidecar"]},{"name":"db-0","containers":["pg"]}]"#;
        let pods = parse_pod_list(body).unwrap();
        assert_eq!(pods.len(), 2);
        assert_eq!(pods[0], PodInfo::new("web-0", ["app", "sidecar"]));
        assert_eq!(pods[1].containers, vec!["pg".to_string()]);
    }

    #[test]
    fn test_parse_null_pod_list() {
        assert!(parse_pod_list(b"null").unwrap().is_empty());
        assert!(parse_pod_list(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_null_containers() {
        let pods = parse_pod_list(br#"[{"name":"a","containers":null},{"name":"b"}]"#).unwrap();
        assert!(pods[0].containers.is_empty());
        assert!(pods[1].containers.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_pod_list(b"<html>").is_err());
    }

    #[test]
    fn test_element_id_display() {
        assert_eq!(ElementId::Pod("web-0".into()).to_string(), "pod-web-0");
        assert_eq!(
            ElementId::Container(ContainerKey::new("web-0", "app")).to_string(),
            "con-web-0-app"
        );
    }

    #[test]
    fn test_typed_keys_do_not_collide() {
        // Both display as con-a-b-c
        let left = ContainerKey::new("a-b", "c");
        let right = ContainerKey::new("a", "b-c");
        assert_eq!(
            ElementId::Container(left.clone()).to_string(),
            ElementId::Container(right.clone()).to_string()
        );
        assert_ne!(ElementId::Container(left), ElementId::Container(right));
    }

    #[test]
    fn test_generation_next() {
        let g = Generation::ZERO.next().next();
        assert_eq!(g.get(), 2);
        assert!(g > Generation::ZERO);
        assert_eq!(g.to_string(), "#2");
    }

    #[test]
    fn test_log_line_count() {
        assert_eq!(LogText::new("a\nb\n").line_count(), 2);
        assert_eq!(LogText::new("").line_count(), 0);
    }
}
