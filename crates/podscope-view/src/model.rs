use std::collections::{HashMap, HashSet};

use podscope_types::{ContainerKey, Generation, LogBlock, LogText, PodInfo, PodName};
use tracing::{debug, warn};

/// Result of applying a pod-list response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PodsOutcome {
    /// Headers and groups were created; these containers need their logs
    Applied { log_requests: Vec<ContainerKey> },
    /// The response belongs to an earlier refresh
    Stale,
}

/// Result of delivering a log body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogOutcome {
    Inserted,
    /// An earlier block for the same container was overwritten
    Replaced,
    /// The container element no longer exists
    Dropped,
    /// The fetch belongs to an earlier refresh
    Stale,
}

/// A pod header and, once rendered, its container group
#[derive(Clone, Debug)]
pub(crate) struct PodEntry {
    pub(crate) pod: PodName,
    pub(crate) group: Option<Vec<ContainerKey>>,
}

/// In-memory view of the pod list
///
/// Holds the three view containers the pod fetch manages: the pod list
/// (headers, container groups and log blocks), the log panel, and the
/// visibility of the back control. Everything is keyed by [`PodName`] and
/// [`ContainerKey`]; nothing is looked up by derived string ids.
#[derive(Debug, Default)]
pub struct PodListModel {
    generation: Generation,
    pods: Vec<PodEntry>,
    index: HashMap<PodName, usize>,
    logs: HashMap<ContainerKey, LogBlock>,
    log_panel: Option<ContainerKey>,
    back_visible: bool,
}

impl PodListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all view containers and start a new generation
    ///
    /// Results tagged with an earlier generation are ignored from now on.
    pub fn begin_refresh(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.clear();
        debug!(generation = %self.generation, "refresh started");
        self.generation
    }

    fn clear(&mut self) {
        self.pods.clear();
        self.index.clear();
        self.logs.clear();
        self.log_panel = None;
        self.back_visible = false;
    }

    /// Populate the pod list from a pod-list response
    ///
    /// Appends one header per pod in response order and renders each pod's
    /// containers. A repeated pod name keeps its first occurrence.
    pub fn apply_pods(&mut self, generation: Generation, pods: Vec<PodInfo>) -> PodsOutcome {
        if generation != self.generation {
            debug!(%generation, current = %self.generation, "dropping stale pod list");
            return PodsOutcome::Stale;
        }

        self.clear();

        let mut log_requests = Vec::new();
        for pod in pods {
            let name = pod.pod_name();
            if self.index.contains_key(&name) {
                warn!(pod = %name, "duplicate pod name in response, keeping the first");
                continue;
            }
            self.index.insert(name.clone(), self.pods.len());
            self.pods.push(PodEntry {
                pod: name.clone(),
                group: None,
            });

            log_requests.extend(self.render_containers(&name, &pod.containers));
        }

        PodsOutcome::Applied { log_requests }
    }

    /// Create the container group for a pod
    ///
    /// Does nothing and returns no keys if the pod header does not exist.
    /// Otherwise the group is placed directly after the pod header and the
    /// returned keys are the containers whose logs should be fetched.
    pub fn render_containers(&mut self, pod: &PodName, containers: &[String]) -> Vec<ContainerKey> {
        let Some(&position) = self.index.get(pod) else {
            debug!(pod = %pod, "no header for pod, skipping containers");
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let group: Vec<ContainerKey> = containers
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .map(|name| ContainerKey::new(pod.clone(), name.as_str()))
            .collect();

        self.pods[position].group = Some(group.clone());
        group
    }

    /// Place a fetched log directly after its container
    ///
    /// A second delivery for the same container replaces the first block.
    pub fn insert_log(
        &mut self,
        generation: Generation,
        key: ContainerKey,
        text: LogText,
    ) -> LogOutcome {
        if generation != self.generation {
            debug!(%generation, container = %key, "dropping stale log");
            return LogOutcome::Stale;
        }
        if !self.has_container(&key) {
            debug!(container = %key, "container not rendered, dropping log");
            return LogOutcome::Dropped;
        }

        let block = LogBlock::new(key.clone(), text, generation);
        match self.logs.insert(key, block) {
            Some(_) => LogOutcome::Replaced,
            None => LogOutcome::Inserted,
        }
    }

    /// Show a container's log in the log panel and reveal the back control
    pub fn open_log_panel(&mut self, key: &ContainerKey) -> bool {
        if !self.has_container(key) {
            return false;
        }
        self.log_panel = Some(key.clone());
        self.back_visible = true;
        true
    }

    pub fn close_log_panel(&mut self) {
        self.log_panel = None;
        self.back_visible = false;
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn pod_count(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty() && self.logs.is_empty()
    }

    pub fn has_pod(&self, pod: &PodName) -> bool {
        self.index.contains_key(pod)
    }

    pub fn has_container(&self, key: &ContainerKey) -> bool {
        self.containers(&key.pod)
            .is_some_and(|group| group.contains(key))
    }

    /// The container group of a pod, if it has been rendered
    pub fn containers(&self, pod: &PodName) -> Option<&[ContainerKey]> {
        let position = *self.index.get(pod)?;
        self.pods[position].group.as_deref()
    }

    pub fn log(&self, key: &ContainerKey) -> Option<&LogBlock> {
        self.logs.get(key)
    }

    pub fn log_count(&self) -> usize {
        self.logs.len()
    }

    pub fn log_panel(&self) -> Option<&ContainerKey> {
        self.log_panel.as_ref()
    }

    pub fn back_visible(&self) -> bool {
        self.back_visible
    }

    pub(crate) fn entries(&self) -> &[PodEntry] {
        &self.pods
    }
}
