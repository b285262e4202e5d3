use super::config::{ConfigError, resolve_endpoint, validate_app_id};
use super::dispatcher::{Dispatcher, DispatcherState};
use super::hostname::{normalize_hostname, resolve_hostname};
use crate::buffer::DeliveryQueue;
use crate::domain::{Category, LogLevel, LogRecord, Params, PendingRecord, PerformanceRecord};
use crate::reliability::RetryPolicy;
use crate::sender::{
    ClientConfig, ClientError, DeliveryStats, DeliveryStatsSnapshot, HttpTransport, Transport,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::error::Error;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Transport error: {0}")]
    Transport(#[from] ClientError),
    #[error("Failed to start dispatcher: {0}")]
    SpawnFailed(#[source] std::io::Error),
    #[error("Dispatcher thread panicked")]
    WorkerPanicked,
}

/// Destination identity and delivery settings of one engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub app_id: String,
    /// Ingestion endpoint; the production endpoint when `None` or blank.
    pub endpoint: Option<String>,
    /// Hostname override; the machine name when `None` or blank.
    pub hostname: Option<String>,
    pub client: ClientConfig,
    pub retry_policy: RetryPolicy,
    pub announce_startup: bool,
}

impl EngineConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            endpoint: None,
            hostname: None,
            client: ClientConfig::default(),
            retry_policy: RetryPolicy::default(),
            announce_startup: true,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_announce_startup(mut self, announce_startup: bool) -> Self {
        self.announce_startup = announce_startup;
        self
    }

    /// Checks the app id and returns the resolved endpoint.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        validate_app_id(&self.app_id)?;
        resolve_endpoint(self.endpoint.as_deref())
    }
}

/// State shared between producers and the dispatcher.
pub(crate) struct EngineShared {
    pub(crate) queue: DeliveryQueue,
    pub(crate) stats: DeliveryStats,
    shutdown: AtomicBool,
    state: AtomicU8,
    hostname: RwLock<Option<String>>,
}

impl EngineShared {
    pub(crate) fn new(hostname: Option<String>) -> Self {
        Self {
            queue: DeliveryQueue::new(),
            stats: DeliveryStats::new(),
            shutdown: AtomicBool::new(false),
            state: AtomicU8::new(DispatcherState::Idle as u8),
            hostname: RwLock::new(hostname),
        }
    }

    pub(crate) fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: DispatcherState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub(crate) fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Sets the shutdown flag, then wakes the dispatcher so it observes it.
    pub(crate) fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.queue.raise();
    }

    fn hostname(&self) -> Option<String> {
        self.hostname.read().clone()
    }

    fn set_hostname(&self, hostname: Option<String>) {
        *self.hostname.write() = hostname;
    }

    /// Serializes a document and queues it. Never blocks on delivery and
    /// never fails; problems are logged and the document is dropped.
    fn submit<T: Serialize + ?Sized>(&self, category: Category, document: &T) {
        let payload = match serde_json::to_string(document) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(queue = %category, error = %e, "Failed to serialize record, dropping");
                return;
            }
        };

        if self.queue.enqueue(PendingRecord::new(category, payload)) {
            self.stats.record_enqueued();
        } else {
            warn!(queue = %category, "Engine stopped, dropping record");
        }
    }
}

/// Cloneable producer side of an [`Engine`].
///
/// Every send is fire-and-forget: the record is queued and the call returns
/// without waiting on the network.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Arc<EngineShared>,
}

impl EngineHandle {
    pub fn send_log(&self, level: LogLevel, content: impl Into<String>) {
        self.send_log_with(level, None, content, None);
    }

    pub fn send_log_with(
        &self,
        level: LogLevel,
        correlation: Option<&str>,
        content: impl Into<String>,
        params: Option<Params>,
    ) {
        let record = LogRecord::new(level, content)
            .with_hostname(self.shared.hostname())
            .with_correlation(correlation.map(str::to_string))
            .with_params(params);
        self.shared.submit(Category::Log, &record);
    }

    /// Ships an error and its `source()` chain at [`LogLevel::Exception`].
    pub fn send_exception(&self, error: &(dyn Error + 'static), correlation: Option<&str>) {
        let record = LogRecord::from_error(error)
            .with_hostname(self.shared.hostname())
            .with_correlation(correlation.map(str::to_string));
        self.shared.submit(Category::Log, &record);
    }

    pub fn send_performance(&self, label: impl Into<String>, duration_ms: i64) {
        let record = PerformanceRecord::new(label, duration_ms);
        self.shared.submit(Category::Performance, &record);
    }

    /// Overrides the hostname attached to subsequent log records. A blank
    /// value clears it.
    pub fn set_hostname(&self, hostname: Option<&str>) {
        self.shared.set_hostname(normalize_hostname(hostname));
    }

    pub fn hostname(&self) -> Option<String> {
        self.shared.hostname()
    }

    pub fn state(&self) -> DispatcherState {
        self.shared.state()
    }

    pub fn stats(&self) -> DeliveryStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Records waiting for an attempt, retries included.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    fn announce_startup(&self) {
        let host = self
            .shared
            .hostname()
            .unwrap_or_else(|| "unknown host".to_string());
        self.send_log(LogLevel::Debug, format!("rask-log-shipper started on {host}"));
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Owns the dispatcher thread for one destination.
///
/// Dropping the engine drains the queue and joins the dispatcher, the same
/// as [`Engine::shutdown`]. Records still queued when the process exits
/// without either are lost.
pub struct Engine {
    handle: EngineHandle,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Validates the destination and starts delivering over HTTP.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let endpoint = config.validate()?;
        let transport = HttpTransport::new(&endpoint, &config.app_id, config.client.clone())?;
        info!(
            endpoint = %endpoint,
            app_id = %config.app_id,
            "Starting telemetry engine"
        );
        Self::spawn(&config, transport)
    }

    /// Starts an engine that delivers through `transport`.
    pub fn with_transport<T: Transport>(
        config: EngineConfig,
        transport: T,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Self::spawn(&config, transport)
    }

    fn spawn<T: Transport>(config: &EngineConfig, transport: T) -> Result<Self, EngineError> {
        let shared = Arc::new(EngineShared::new(resolve_hostname(
            config.hostname.as_deref(),
        )));
        let handle = EngineHandle {
            shared: shared.clone(),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::SpawnFailed)?;

        // Queued ahead of the thread so it is always the first record out.
        if config.announce_startup {
            handle.announce_startup();
        }

        let dispatcher = Dispatcher::new(shared, transport, config.retry_policy);
        let worker = thread::Builder::new()
            .name("rask-dispatcher".to_string())
            .spawn(move || runtime.block_on(dispatcher.run()))
            .map_err(EngineError::SpawnFailed)?;

        Ok(Self {
            handle,
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Requests shutdown and blocks until every queued record has been
    /// delivered or dropped.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        debug!(pending = self.handle.pending(), "Shutting down telemetry engine");
        self.handle.shared.request_shutdown();
        let joined = worker.join();
        self.handle.shared.set_state(DispatcherState::Stopped);

        // Only non-empty when the dispatcher died before draining.
        for record in self.handle.shared.queue.close() {
            warn!(
                queue = %record.category(),
                attempts = record.attempts(),
                "Dispatcher gone, dropping undelivered record"
            );
        }

        match joined {
            Ok(()) => {
                let stats = self.handle.stats();
                info!(
                    delivered = stats.delivered,
                    dropped = stats.dropped,
                    "Telemetry engine stopped"
                );
                Ok(())
            }
            Err(_) => {
                error!("Dispatcher thread panicked during shutdown");
                Err(EngineError::WorkerPanicked)
            }
        }
    }
}

impl Deref for Engine {
    type Target = EngineHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Telemetry engine shutdown failed: {}", e);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("handle", &self.handle)
            .field("running", &self.worker.is_some())
            .finish()
    }
}
