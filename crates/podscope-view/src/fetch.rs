//! Pod and log fetching
//!
//! Every fetch runs as its own task and reports exactly one [`FetchEvent`]
//! over the event channel, tagged with the generation it was started in.
//! Failures are logged where they happen and otherwise only reported so the
//! in-flight count stays accurate.

use podscope_api::SharedPodSource;
use podscope_types::{ContainerKey, Generation, LogText, PodInfo};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{LogOutcome, PodListModel, PodsOutcome};

/// Completion of a single fetch
#[derive(Debug)]
pub enum FetchEvent {
    PodsLoaded {
        generation: Generation,
        pods: Vec<PodInfo>,
    },
    PodsFailed {
        generation: Generation,
    },
    LogLoaded {
        generation: Generation,
        key: ContainerKey,
        text: LogText,
    },
    LogFailed {
        generation: Generation,
        key: ContainerKey,
    },
}

/// Spawns fetch tasks against a pod source
#[derive(Clone)]
pub struct Fetcher {
    source: SharedPodSource,
    events: mpsc::UnboundedSender<FetchEvent>,
}

impl Fetcher {
    pub fn new(source: SharedPodSource, events: mpsc::UnboundedSender<FetchEvent>) -> Self {
        Self { source, events }
    }

    /// Request the pod list
    pub fn fetch_pods(&self, generation: Generation) -> tokio::task::JoinHandle<()> {
        let source = self.source.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = match source.list_pods().await {
                Ok(pods) => {
                    debug!(%generation, count = pods.len(), "pods fetched");
                    FetchEvent::PodsLoaded { generation, pods }
                }
                Err(e) => {
                    error!(%generation, error = %e, "Error fetching pods");
                    FetchEvent::PodsFailed { generation }
                }
            };
            let _ = events.send(event);
        })
    }

    /// Request the logs of one container
    pub fn fetch_log(&self, generation: Generation, key: ContainerKey) -> tokio::task::JoinHandle<()> {
        let source = self.source.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = match source.container_logs(&key).await {
                Ok(text) => FetchEvent::LogLoaded {
                    generation,
                    key,
                    text,
                },
                Err(e) => {
                    error!(
                        %generation,
                        pod = %key.pod,
                        container = %key.container,
                        error = %e,
                        "Error fetching logs"
                    );
                    FetchEvent::LogFailed { generation, key }
                }
            };
            let _ = events.send(event);
        })
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }
}

/// The pod list view: model plus the fetches that populate it
///
/// The event receiver is kept by the caller so it can be polled alongside
/// other event sources; every event must be passed back to [`handle`].
///
/// [`handle`]: PodListView::handle
pub struct PodListView {
    model: PodListModel,
    fetcher: Fetcher,
    pending: usize,
}

impl PodListView {
    pub fn new(source: SharedPodSource, events: mpsc::UnboundedSender<FetchEvent>) -> Self {
        Self {
            model: PodListModel::new(),
            fetcher: Fetcher::new(source, events),
            pending: 0,
        }
    }

    /// Initial load
    pub fn mount(&mut self) -> Generation {
        self.refresh()
    }

    /// Clear the view and request the pod list again
    ///
    /// Fetches still running from the previous generation are not cancelled;
    /// their results are dropped when they arrive.
    pub fn refresh(&mut self) -> Generation {
        let generation = self.model.begin_refresh();
        self.pending += 1;
        self.fetcher.fetch_pods(generation);
        generation
    }

    /// Fetch one container's log again; the result replaces its block
    pub fn reload_log(&mut self, key: &ContainerKey) -> bool {
        if !self.model.has_container(key) {
            return false;
        }
        self.spawn_log(key.clone());
        true
    }

    fn spawn_log(&mut self, key: ContainerKey) {
        self.pending += 1;
        self.fetcher.fetch_log(self.model.generation(), key);
    }

    /// Apply one fetch completion; returns whether the view changed
    pub fn handle(&mut self, event: FetchEvent) -> bool {
        self.pending = self.pending.saturating_sub(1);

        match event {
            FetchEvent::PodsLoaded { generation, pods } => {
                match self.model.apply_pods(generation, pods) {
                    PodsOutcome::Applied { log_requests } => {
                        for key in log_requests {
                            self.spawn_log(key);
                        }
                        true
                    }
                    PodsOutcome::Stale => false,
                }
            }
            FetchEvent::LogLoaded {
                generation,
                key,
                text,
            } => matches!(
                self.model.insert_log(generation, key, text),
                LogOutcome::Inserted | LogOutcome::Replaced
            ),
            FetchEvent::PodsFailed { .. } | FetchEvent::LogFailed { .. } => false,
        }
    }

    /// Process events until no fetch is outstanding
    pub async fn settle(&mut self, events: &mut mpsc::UnboundedReceiver<FetchEvent>) {
        while self.pending > 0 {
            match events.recv().await {
                Some(event) => {
                    self.handle(event);
                }
                None => break,
            }
        }
    }

    /// Number of fetches whose completion has not been handled yet
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn model(&self) -> &PodListModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut PodListModel {
        &mut self.model
    }

    pub fn describe_source(&self) -> String {
        self.fetcher.describe_source()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use podscope_api::{FetchError, PodSource};
    use tokio::sync::Semaphore;

    use super::*;
    use crate::{Node, render};

    /// In-memory source; logs for keys in `failing` return an error, and
    /// keys in `slow` wait for a permit on `gate` before answering.
    struct FakeSource {
        pods: Option<Vec<PodInfo>>,
        logs: HashMap<ContainerKey, String>,
        failing: Vec<ContainerKey>,
        slow: Vec<ContainerKey>,
        gate: Semaphore,
    }

    impl Default for FakeSource {
        fn default() -> Self {
            Self {
                pods: None,
                logs: HashMap::new(),
                failing: Vec::new(),
                slow: Vec::new(),
                gate: Semaphore::new(0),
            }
        }
    }

    #[async_trait]
    impl PodSource for FakeSource {
        async fn list_pods(&self) -> Result<Vec<PodInfo>, FetchError> {
            self.pods
                .clone()
                .ok_or_else(|| FetchError::RequestFailed("HTTP 503".to_string()))
        }

        async fn container_logs(&self, key: &ContainerKey) -> Result<LogText, FetchError> {
            if self.slow.contains(key) {
                let _permit = self.gate.acquire().await;
            }
            if self.failing.contains(key) {
                return Err(FetchError::RequestFailed("connection reset".to_string()));
            }
            Ok(LogText::new(self.logs.get(key).cloned().unwrap_or_default()))
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn key(pod: &str, container: &str) -> ContainerKey {
        ContainerKey::new(pod, container)
    }

    fn view(source: FakeSource) -> (PodListView, mpsc::UnboundedReceiver<FetchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PodListView::new(Arc::new(source), tx), rx)
    }

    fn two_pods() -> FakeSource {
        FakeSource {
            pods: Some(vec![
                PodInfo::new("web", ["app", "proxy"]),
                PodInfo::new("db", ["pg"]),
            ]),
            logs: HashMap::from([
                (key("web", "app"), "app started\n".to_string()),
                (key("web", "proxy"), "proxy ready\n".to_string()),
                (key("db", "pg"), "accepting connections\n".to_string()),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mount_renders_pods_and_logs() {
        let (mut view, mut rx) = view(two_pods());
        view.mount();
        view.settle(&mut rx).await;

        let model = view.model();
        assert_eq!(model.pod_count(), 2);
        assert_eq!(model.log_count(), 3);
        assert_eq!(
            model.log(&key("db", "pg")).unwrap().text.as_str(),
            "accepting connections\n"
        );
        assert_eq!(
            render(model)
                .element_ids()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["pod-web", "con-web-app", "con-web-proxy", "pod-db", "con-db-pg"]
        );
    }

    #[tokio::test]
    async fn test_failed_pod_fetch_leaves_view_empty() {
        let (mut view, mut rx) = view(FakeSource::default());
        view.mount();
        view.settle(&mut rx).await;

        assert_eq!(view.pending(), 0);
        assert!(view.model().is_empty());
        assert!(render(view.model()).nodes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_log_does_not_block_siblings() {
        let mut source = two_pods();
        source.failing.push(key("web", "app"));
        let (mut view, mut rx) = view(source);
        view.mount();
        view.settle(&mut rx).await;

        let model = view.model();
        assert!(model.log(&key("web", "app")).is_none());
        assert!(model.log(&key("web", "proxy")).is_some());
        assert!(model.log(&key("db", "pg")).is_some());
        assert!(model.has_container(&key("web", "app")));
    }

    #[tokio::test]
    async fn test_refresh_clears_before_repopulating() {
        let (mut view, mut rx) = view(two_pods());
        view.mount();
        view.settle(&mut rx).await;
        assert_eq!(view.model().pod_count(), 2);

        view.refresh();
        assert!(view.model().is_empty());
        assert!(render(view.model()).nodes().is_empty());

        view.settle(&mut rx).await;
        assert_eq!(view.model().pod_count(), 2);
        assert_eq!(view.model().log_count(), 3);
    }

    #[tokio::test]
    async fn test_stale_log_dropped_after_refresh() {
        let source = Arc::new({
            let mut source = two_pods();
            source.slow.push(key("db", "pg"));
            source
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut view = PodListView::new(source.clone(), tx);

        view.mount();
        // Pod list plus the two fast logs; the slow one stays in flight
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            view.handle(event);
        }
        assert_eq!(view.pending(), 1);
        assert!(view.model().log(&key("db", "pg")).is_none());

        let first = view.model().generation();
        view.refresh();
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, FetchEvent::PodsLoaded { .. }));
        view.handle(event);

        // Release the first generation's slow fetch; it must not render
        source.gate.add_permits(1);
        let event = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = rx.recv().await.unwrap();
                if let FetchEvent::LogLoaded { generation, .. } = &event {
                    if *generation == first {
                        return event;
                    }
                }
                view.handle(event);
            }
        })
        .await
        .unwrap();
        assert!(!view.handle(event));
        assert!(view.model().generation() > first);
    }

    #[tokio::test]
    async fn test_reload_log_replaces_block() {
        let (mut view, mut rx) = view(two_pods());
        view.mount();
        view.settle(&mut rx).await;

        assert!(view.reload_log(&key("web", "app")));
        assert!(!view.reload_log(&key("web", "missing")));
        view.settle(&mut rx).await;

        let tree = render(view.model());
        let blocks = tree
            .nodes()
            .iter()
            .filter(|n| matches!(n, Node::LogBlock(b) if b.key == key("web", "app")))
            .count();
        assert_eq!(blocks, 1);
    }
}
