//! The offline agent coordinator.

use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use http::Uri;
use shelter_cache::{
    reserved, CacheBackend, CacheEntry, CacheError, CacheKey, CacheStatus, CacheStore,
};
use shelter_core::{AgentConfig, AgentState, Request, Response};
use shelter_sync::{FlushOutcome, SyncError, SyncQueue, SyncTags, Transmitter};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::ClientRegistry;
use crate::counters::{AgentCounters, CountersSnapshot};
use crate::fallback::synthesized_offline;
use crate::message::{AppMessage, MessageError, MessageOutcome};
use crate::network::{FetchError, Network};
use crate::notify::{Notification, NotificationAction, NotificationRoute};

/// Error type for coordinator operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Message(#[from] MessageError),
}

/// Result of an install pass over the asset manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallReport {
    /// Assets attempted (manifest plus the offline fallback).
    pub attempted: usize,
    /// Assets stored.
    pub stored: usize,
    /// Assets skipped after a fetch or store failure.
    pub skipped: usize,
}

/// Result of activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    /// Superseded cache versions that were deleted.
    pub evicted: Vec<String>,
    /// Open clients re-bound to this agent.
    pub claimed: usize,
}

/// Outcome of a fetch interception.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the host issues the request itself, unmodified.
    Passthrough,
    /// Intercepted and answered.
    Respond(Response),
}

impl FetchOutcome {
    /// The response, if the request was intercepted.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Respond(response) => Some(response),
            Self::Passthrough => None,
        }
    }
}

/// The offline caching coordinator.
///
/// One instance per application origin. All configuration is explicit;
/// nothing is read from process-wide state. Handlers are async methods
/// the host awaits, and spawned background writes are tracked so the
/// host can defer shutdown until `settle` returns.
pub struct Agent {
    config: AgentConfig,
    store: CacheStore,
    sync: SyncQueue,
    tags: SyncTags,
    network: Arc<dyn Network>,
    clients: Arc<dyn ClientRegistry>,
    transmitter: Arc<dyn Transmitter>,
    state: RwLock<AgentState>,
    counters: AgentCounters,
    writes: Mutex<Vec<JoinHandle<()>>>,
}

impl Agent {
    /// Create an agent over its collaborators.
    pub fn new(
        config: AgentConfig,
        backend: Arc<dyn CacheBackend>,
        network: Arc<dyn Network>,
        clients: Arc<dyn ClientRegistry>,
        transmitter: Arc<dyn Transmitter>,
    ) -> Self {
        let store = CacheStore::new(backend, config.cache_version.clone());
        let sync = SyncQueue::new(store.clone());
        Self {
            config,
            store,
            sync,
            tags: SyncTags::standard(),
            network,
            clients,
            transmitter,
            state: RwLock::new(AgentState::Installing),
            counters: AgentCounters::default(),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Replace the sync tag registry.
    pub fn with_sync_tags(mut self, tags: SyncTags) -> Self {
        self.tags = tags;
        self
    }

    /// The configuration this agent was constructed with.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The cache store handle for the current version.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: AgentState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        debug!(from = %*state, to = %next, "lifecycle transition");
        *state = next;
    }

    /// Point-in-time counter snapshot.
    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    /// Mark this agent as replaced by a newer version. A superseded agent
    /// stops intercepting; the host drops it once `settle` returns.
    pub fn mark_superseded(&self) {
        self.set_state(AgentState::Superseded);
    }

    /// Install: open the current cache version and pre-load the asset
    /// manifest. A failed asset is logged and skipped, never fatal; the
    /// agent is eligible for activation as soon as this returns
    /// (skip-waiting semantics).
    pub async fn handle_install(&self) -> Result<InstallReport, AgentError> {
        self.set_state(AgentState::Installing);
        self.store.open().await?;

        let mut manifest = self.config.precache.clone();
        manifest.ensure(&self.config.offline_fallback);

        let attempts = manifest.paths().iter().map(|path| self.precache_asset(path));
        let results = join_all(attempts).await;

        let attempted = results.len();
        let stored = results.iter().filter(|stored| **stored).count();
        let report = InstallReport {
            attempted,
            stored,
            skipped: attempted - stored,
        };

        self.set_state(AgentState::Installed);
        info!(
            version = self.store.version(),
            stored = report.stored,
            skipped = report.skipped,
            "install complete"
        );
        Ok(report)
    }

    async fn precache_asset(&self, path: &str) -> bool {
        let url: Uri = match self.config.origin.url_for(path).parse() {
            Ok(url) => url,
            Err(_) => {
                warn!(path, "unusable asset path, skipped");
                self.counters.record_precache_skipped();
                return false;
            }
        };

        let request = Request::get(url);
        match self.network.fetch(&request).await {
            Ok(response) if response.is_cacheable() => {
                let entry = CacheEntry::from_response(&response);
                match self.store.put(&CacheKey::from_path(path), entry).await {
                    Ok(()) => {
                        self.counters.record_precached();
                        true
                    }
                    Err(error) => {
                        warn!(path, %error, "failed to store asset, skipped");
                        self.counters.record_precache_skipped();
                        false
                    }
                }
            }
            Ok(response) => {
                warn!(path, status = %response.status, "asset not cacheable, skipped");
                self.counters.record_precache_skipped();
                false
            }
            Err(error) => {
                warn!(path, %error, "asset fetch failed, skipped");
                self.counters.record_precache_skipped();
                false
            }
        }
    }

    /// Activate: delete every cache version except the current one, then
    /// claim all open clients without a reload.
    pub async fn handle_activate(&self) -> Result<ActivateReport, AgentError> {
        self.set_state(AgentState::Activating);

        let mut evicted = Vec::new();
        for version in self.store.list_versions().await? {
            if version != self.store.version() && self.store.delete_version(&version).await? {
                info!(%version, "evicted superseded cache version");
                evicted.push(version);
            }
        }

        let claimed = self.clients.list().await.len();
        self.clients.claim(self.store.version()).await;

        self.set_state(AgentState::Active);
        info!(version = self.store.version(), claimed, "activation complete");
        Ok(ActivateReport { evicted, claimed })
    }

    /// Intercept a fetch.
    ///
    /// Cache-first for same-origin network requests; cacheable misses are
    /// stored by a spawned background task whose failure never reaches the
    /// caller. HTML navigations that fail network-wise get the offline
    /// fallback; other failures propagate.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, AgentError> {
        if !self.state().can_intercept()
            || !request.is_network()
            || !self.config.origin.contains(&request.url)
        {
            self.counters.record_passthrough();
            return Ok(FetchOutcome::Passthrough);
        }

        let key = CacheKey::for_request(&request.method, &request.url);

        if let Some(key) = &key {
            if let Some(entry) = self.store.get(key).await? {
                self.counters.record_hit();
                let mut response = entry.to_response();
                CacheStatus::Hit.stamp(&mut response.headers);
                return Ok(FetchOutcome::Respond(response));
            }
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if let Some(key) = key {
                    if response.is_cacheable() {
                        self.counters.record_miss();
                        self.spawn_write(key, CacheEntry::from_response(&response))
                            .await;
                        let mut response = response;
                        CacheStatus::Miss.stamp(&mut response.headers);
                        return Ok(FetchOutcome::Respond(response));
                    }
                }
                Ok(FetchOutcome::Respond(response))
            }
            Err(error) => {
                if request.accepts_html() {
                    self.counters.record_fallback();
                    warn!(url = %request.url, %error, "network failed, serving offline fallback");
                    let fallback_key = CacheKey::from_path(&self.config.offline_fallback);
                    let mut response = match self.store.get(&fallback_key).await {
                        Ok(Some(entry)) => entry.to_response(),
                        _ => synthesized_offline(),
                    };
                    CacheStatus::Fallback.stamp(&mut response.headers);
                    Ok(FetchOutcome::Respond(response))
                } else {
                    Err(error.into())
                }
            }
        }
    }

    async fn spawn_write(&self, key: CacheKey, entry: CacheEntry) {
        let store = self.store.clone();
        let handle = tokio::spawn(async move {
            if let Err(error) = store.put(&key, entry).await {
                warn!(%key, %error, "background cache write failed");
            }
        });
        self.writes.lock().await.push(handle);
    }

    /// Await every background cache write spawned so far. Hosts call this
    /// before tearing the agent down.
    pub async fn settle(&self) {
        let handles: Vec<_> = self.writes.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Flush the reserved key bound to a sync trigger tag.
    pub async fn handle_sync(&self, tag: &str) -> Result<FlushOutcome, AgentError> {
        let binding = self
            .tags
            .resolve(tag)
            .ok_or_else(|| SyncError::UnknownTag(tag.to_string()))?;

        match self.sync.flush(&binding.key, self.transmitter.as_ref()).await {
            Ok(FlushOutcome::Flushed) => {
                self.counters.record_flush();
                Ok(FlushOutcome::Flushed)
            }
            Ok(FlushOutcome::Empty) => Ok(FlushOutcome::Empty),
            Err(error) => {
                self.counters.record_flush_failure();
                warn!(tag, %error, "sync flush failed, payload preserved");
                Err(error.into())
            }
        }
    }

    /// Handle a message posted by the application.
    pub async fn handle_message(&self, raw: &str) -> Result<MessageOutcome, AgentError> {
        match AppMessage::parse(raw)? {
            Some(AppMessage::CacheEmergencyData { payload }) => {
                self.sync.enqueue(reserved::EMERGENCY_DATA, &payload).await?;
                Ok(MessageOutcome::Cached {
                    key: reserved::EMERGENCY_DATA.to_string(),
                })
            }
            Some(AppMessage::SkipWaiting) => {
                info!("skip-waiting requested by application");
                Ok(MessageOutcome::ActivationRequested)
            }
            None => {
                debug!("ignoring message not addressed to the agent");
                Ok(MessageOutcome::Ignored)
            }
        }
    }

    /// Build the notification for a push payload.
    pub fn handle_push(&self, payload: Option<&str>) -> Notification {
        Notification::from_push(&self.config.notification, payload)
    }

    /// Route a notification interaction. The default (body) interaction
    /// behaves as `View`.
    pub async fn handle_notification_action(
        &self,
        action: NotificationAction,
    ) -> NotificationRoute {
        match action {
            NotificationAction::Dismiss => NotificationRoute::Closed,
            NotificationAction::View => {
                for client in self.clients.list().await {
                    let same_origin = client
                        .url
                        .parse::<Uri>()
                        .map(|uri| self.config.origin.contains(&uri))
                        .unwrap_or(false);
                    if same_origin && self.clients.focus(client.id).await {
                        debug!(client = %client.id, "focused existing client");
                        return NotificationRoute::Focused(client.id);
                    }
                }

                let opened = self.clients.open(&self.config.entry_url).await;
                info!(client = %opened.id, url = %opened.url, "opened new client");
                NotificationRoute::Opened(opened.id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use http::{Method, StatusCode};
    use shelter_cache::header_names::X_CACHE_STATUS;
    use shelter_cache::MemoryBackend;
    use shelter_core::{AssetManifest, Origin, ResponseClass};
    use shelter_sync::TransmitError;

    use super::*;
    use crate::clients::MemoryClients;

    struct StubNetwork {
        responses: HashMap<String, Response>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl StubNetwork {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                offline: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn with(mut self, path: &str, response: Response) -> Self {
            self.responses.insert(path.to_string(), response);
            self
        }

        fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(FetchError::Unreachable("offline".to_string()));
            }
            let mut path = request.url.path().to_string();
            if let Some(query) = request.url.query() {
                path.push('?');
                path.push_str(query);
            }
            self.responses
                .get(&path)
                .cloned()
                .ok_or_else(|| FetchError::Unreachable(path))
        }
    }

    struct StubTransmitter {
        fail: AtomicBool,
    }

    impl StubTransmitter {
        fn ok() -> Self {
            Self {
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            Self {
                fail: AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl Transmitter for StubTransmitter {
        async fn transmit(
            &self,
            _key: &str,
            _payload: &serde_json::Value,
        ) -> Result<(), TransmitError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(TransmitError("upstream rejected".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        agent: Agent,
        network: Arc<StubNetwork>,
        clients: Arc<MemoryClients>,
        backend: Arc<MemoryBackend>,
    }

    fn fixture(network: StubNetwork, transmitter: StubTransmitter, manifest: AssetManifest) -> Fixture {
        let origin = Origin::parse("https://school.example").unwrap();
        let config = AgentConfig::new("static-v2", origin).with_precache(manifest);
        let backend = Arc::new(MemoryBackend::new());
        let network = Arc::new(network);
        let clients = Arc::new(MemoryClients::new());
        let agent = Agent::new(
            config,
            backend.clone(),
            network.clone(),
            clients.clone(),
            Arc::new(transmitter),
        );
        Fixture {
            agent,
            network,
            clients,
            backend,
        }
    }

    fn offline_page() -> Response {
        Response::ok("<html><body>cached offline page</body></html>")
            .with_header("content-type", "text/html")
    }

    async fn activated(fx: &Fixture) {
        fx.agent.handle_install().await.unwrap();
        fx.agent.handle_activate().await.unwrap();
    }

    fn get(url: &str) -> Request {
        Request::get(url.parse().unwrap())
    }

    fn navigation(url: &str) -> Request {
        get(url).with_header("accept", "text/html,application/xhtml+xml")
    }

    fn status_header(response: &Response) -> Option<&str> {
        response.headers.get(X_CACHE_STATUS).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn install_tolerates_a_missing_asset() {
        let network = StubNetwork::new()
            .with("/", Response::ok("index").with_header("content-type", "text/html"))
            .with("/app.js", Response::ok("js"))
            .with("/offline.html", offline_page());
        let manifest = AssetManifest::from_paths(["/", "/app.js", "/missing.css"]);
        let fx = fixture(network, StubTransmitter::ok(), manifest);

        let report = fx.agent.handle_install().await.unwrap();

        assert_eq!(fx.agent.state(), AgentState::Installed);
        assert!(fx.agent.state().activation_ready());
        assert_eq!(report.attempted, 4);
        assert_eq!(report.stored, 3);
        assert_eq!(report.skipped, 1);

        let store = fx.agent.store();
        assert!(store.get(&CacheKey::from_path("/app.js")).await.unwrap().is_some());
        assert!(store.get(&CacheKey::from_path("/missing.css")).await.unwrap().is_none());
        assert!(store
            .get(&CacheKey::from_path("/offline.html"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn activation_leaves_exactly_one_version() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());

        let old = CacheStore::new(fx.backend.clone(), "static-v1");
        old.open().await.unwrap();
        let older = CacheStore::new(fx.backend.clone(), "static-v0");
        older.open().await.unwrap();

        fx.clients.connect("/", true).await;
        fx.clients.connect("/scan", false).await;

        fx.agent.handle_install().await.unwrap();
        let report = fx.agent.handle_activate().await.unwrap();

        assert_eq!(fx.agent.state(), AgentState::Active);
        assert_eq!(report.claimed, 2);
        let mut evicted = report.evicted.clone();
        evicted.sort();
        assert_eq!(evicted, vec!["static-v0", "static-v1"]);

        let versions = fx.agent.store().list_versions().await.unwrap();
        assert_eq!(versions, vec!["static-v2"]);

        for client in fx.clients.list().await {
            assert_eq!(client.controller.as_deref(), Some("static-v2"));
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_the_network() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        fx.agent
            .store()
            .put(
                &CacheKey::from_path("/app.js"),
                CacheEntry::new(200, b"cached js".to_vec()),
            )
            .await
            .unwrap();

        let calls_before = fx.network.calls();
        let outcome = fx
            .agent
            .handle_fetch(&get("https://school.example/app.js"))
            .await
            .unwrap();

        let response = outcome.response().expect("intercepted");
        assert_eq!(response.body, b"cached js");
        assert_eq!(status_header(response), Some("HIT"));
        assert_eq!(fx.network.calls(), calls_before);
    }

    #[tokio::test]
    async fn miss_is_stored_in_the_background() {
        let network = StubNetwork::new()
            .with("/offline.html", offline_page())
            .with("/data.json", Response::ok("{\"ok\":true}"));
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;
        let calls_after_install = fx.network.calls();

        let outcome = fx
            .agent
            .handle_fetch(&get("https://school.example/data.json"))
            .await
            .unwrap();
        assert_eq!(status_header(outcome.response().unwrap()), Some("MISS"));

        fx.agent.settle().await;

        let outcome = fx
            .agent
            .handle_fetch(&get("https://school.example/data.json"))
            .await
            .unwrap();
        assert_eq!(status_header(outcome.response().unwrap()), Some("HIT"));
        assert_eq!(fx.network.calls(), calls_after_install + 1);
    }

    #[tokio::test]
    async fn non_cacheable_success_is_returned_unmodified() {
        let network = StubNetwork::new()
            .with("/offline.html", offline_page())
            .with(
                "/cors.js",
                Response::ok("cors").with_class(ResponseClass::Cors),
            );
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        let outcome = fx
            .agent
            .handle_fetch(&get("https://school.example/cors.js"))
            .await
            .unwrap();
        let response = outcome.response().unwrap();
        assert_eq!(response.body, b"cors");
        assert!(status_header(response).is_none());

        fx.agent.settle().await;
        assert!(fx
            .agent
            .store()
            .get(&CacheKey::from_path("/cors.js"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn post_requests_are_never_cached() {
        let network = StubNetwork::new()
            .with("/offline.html", offline_page())
            .with("/api/report", Response::ok("accepted"));
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        let request = Request::new(
            Method::POST,
            "https://school.example/api/report".parse().unwrap(),
        );
        let outcome = fx.agent.handle_fetch(&request).await.unwrap();
        assert!(status_header(outcome.response().unwrap()).is_none());

        fx.agent.settle().await;
        assert!(fx
            .agent
            .store()
            .get(&CacheKey::from_path("/api/report"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn cross_origin_and_non_network_pass_through() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;
        let calls = fx.network.calls();

        let outcome = fx
            .agent
            .handle_fetch(&get("https://cdn.example/lib.js"))
            .await
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Passthrough));

        let outcome = fx
            .agent
            .handle_fetch(&get("chrome-extension://abc/content.js"))
            .await
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Passthrough));

        assert_eq!(fx.network.calls(), calls);
    }

    #[tokio::test]
    async fn no_interception_before_activation() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());

        let outcome = fx
            .agent
            .handle_fetch(&get("https://school.example/app.js"))
            .await
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Passthrough));
    }

    #[tokio::test]
    async fn failed_navigation_gets_the_cached_fallback() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;
        fx.network.go_offline();

        let outcome = fx
            .agent
            .handle_fetch(&navigation("https://school.example/schedule"))
            .await
            .unwrap();

        let response = outcome.response().unwrap();
        assert_eq!(status_header(response), Some("FALLBACK"));
        assert_eq!(response.body, b"<html><body>cached offline page</body></html>");
        assert!(response
            .content_type()
            .is_some_and(|ct| ct.starts_with("text/html")));
    }

    #[tokio::test]
    async fn failed_navigation_synthesizes_without_a_cached_fallback() {
        // Offline page missing from the network, so install skips it.
        let network = StubNetwork::new();
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;
        fx.network.go_offline();

        let outcome = fx
            .agent
            .handle_fetch(&navigation("https://school.example/schedule"))
            .await
            .unwrap();

        let response = outcome.response().unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(status_header(response), Some("FALLBACK"));
        assert!(response
            .content_type()
            .is_some_and(|ct| ct.starts_with("text/html")));
    }

    #[tokio::test]
    async fn failed_non_html_request_propagates() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;
        fx.network.go_offline();

        let request =
            get("https://school.example/api/status").with_header("accept", "application/json");
        let result = fx.agent.handle_fetch(&request).await;
        assert!(matches!(result, Err(AgentError::Fetch(_))));
    }

    #[tokio::test]
    async fn emergency_message_then_successful_flush() -> anyhow::Result<()> {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        let outcome = fx
            .agent
            .handle_message(r#"{"type":"CACHE_EMERGENCY_DATA","payload":{"id":1}}"#)
            .await?;
        assert_eq!(
            outcome,
            MessageOutcome::Cached {
                key: reserved::EMERGENCY_DATA.to_string()
            }
        );

        let outcome = fx.agent.handle_sync("emergency-data-sync").await?;
        assert_eq!(outcome, FlushOutcome::Flushed);

        assert!(fx
            .agent
            .store()
            .get(&CacheKey::from_path(reserved::EMERGENCY_DATA))
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failed_flush_preserves_the_entry() -> anyhow::Result<()> {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::failing(), AssetManifest::new());
        activated(&fx).await;

        fx.agent
            .handle_message(r#"{"type":"CACHE_EMERGENCY_DATA","payload":{"id":9}}"#)
            .await?;

        let key = CacheKey::from_path(reserved::EMERGENCY_DATA);
        let before = fx.agent.store().get(&key).await?.expect("pending entry");

        let result = fx.agent.handle_sync("emergency-data-sync").await;
        assert!(matches!(result, Err(AgentError::Sync(SyncError::Transmit { .. }))));

        let after = fx.agent.store().get(&key).await?.expect("still pending");
        assert_eq!(before.body, after.body);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_sync_tag_is_an_error() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        let result = fx.agent.handle_sync("no-such-tag").await;
        assert!(matches!(
            result,
            Err(AgentError::Sync(SyncError::UnknownTag(_)))
        ));
    }

    #[tokio::test]
    async fn flush_of_empty_mailbox_is_a_noop() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        let outcome = fx.agent.handle_sync("student-scans-sync").await.unwrap();
        assert_eq!(outcome, FlushOutcome::Empty);
    }

    #[tokio::test]
    async fn skip_waiting_and_unknown_messages() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());

        let outcome = fx
            .agent
            .handle_message(r#"{"type":"SKIP_WAITING"}"#)
            .await
            .unwrap();
        assert_eq!(outcome, MessageOutcome::ActivationRequested);

        let outcome = fx
            .agent
            .handle_message(r#"{"type":"PING"}"#)
            .await
            .unwrap();
        assert_eq!(outcome, MessageOutcome::Ignored);
    }

    #[tokio::test]
    async fn superseded_agent_stops_intercepting() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        fx.agent.mark_superseded();
        assert!(fx.agent.state().is_terminal());

        let outcome = fx
            .agent
            .handle_fetch(&get("https://school.example/app.js"))
            .await
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Passthrough));
    }

    #[tokio::test]
    async fn notification_view_focuses_an_existing_client() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        let id = fx.clients.connect("https://school.example/dashboard", false).await;

        let route = fx
            .agent
            .handle_notification_action(NotificationAction::View)
            .await;
        assert_eq!(route, NotificationRoute::Focused(id));
    }

    #[tokio::test]
    async fn notification_view_opens_the_entry_url_when_no_client_matches() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        fx.clients.connect("https://other.example/page", true).await;

        let route = fx
            .agent
            .handle_notification_action(NotificationAction::View)
            .await;
        let NotificationRoute::Opened(id) = route else {
            panic!("expected a new client, got {route:?}");
        };
        let clients = fx.clients.list().await;
        let opened = clients.iter().find(|c| c.id == id).unwrap();
        assert_eq!(opened.url, "/?emergency=true");
    }

    #[tokio::test]
    async fn notification_dismiss_closes() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());

        let route = fx
            .agent
            .handle_notification_action(NotificationAction::Dismiss)
            .await;
        assert_eq!(route, NotificationRoute::Closed);
    }

    #[tokio::test]
    async fn push_uses_payload_or_default_body() {
        let network = StubNetwork::new().with("/offline.html", offline_page());
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());

        let n = fx.agent.handle_push(Some("Shelter in place"));
        assert_eq!(n.body, "Shelter in place");

        let n = fx.agent.handle_push(None);
        assert_eq!(n.body, fx.agent.config().notification.default_body);
    }

    #[tokio::test]
    async fn counters_track_a_scripted_sequence() {
        let network = StubNetwork::new()
            .with("/offline.html", offline_page())
            .with("/data.json", Response::ok("{}"));
        let fx = fixture(network, StubTransmitter::ok(), AssetManifest::new());
        activated(&fx).await;

        // miss, then hit, then fallback
        fx.agent
            .handle_fetch(&get("https://school.example/data.json"))
            .await
            .unwrap();
        fx.agent.settle().await;
        fx.agent
            .handle_fetch(&get("https://school.example/data.json"))
            .await
            .unwrap();
        fx.network.go_offline();
        fx.agent
            .handle_fetch(&navigation("https://school.example/page"))
            .await
            .unwrap();

        let counters = fx.agent.counters();
        assert_eq!(counters.misses, 1);
        assert_eq!(counters.hits, 1);
        assert_eq!(counters.fallbacks, 1);
        assert_eq!(counters.precached, 1);
    }
}
