//! Shared application state.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{
        document::{self, DocumentStore},
        registry::TargetRegistry,
        session::SessionStore,
    },
    display::DisplayGateway,
    provider::{StatusSource, cache::StatusCache},
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Phase of the background status poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    /// Waiting for the next tick.
    Idle,
    /// A reconciliation cycle is running.
    Fetching,
}

/// Central application state owning the registry, session, cache, status
/// source, and the installable display gateway. Created once at startup and
/// passed to every component; there are no ambient globals.
pub struct AppState {
    config: AppConfig,
    registry: TargetRegistry,
    session: SessionStore,
    cache: StatusCache,
    source: Arc<dyn StatusSource>,
    display: RwLock<Option<Arc<dyn DisplayGateway>>>,
    poller_phase: watch::Sender<PollerPhase>,
}

impl AppState {
    /// Load the persisted documents and assemble the shared state.
    ///
    /// The application starts in degraded mode until a display gateway is
    /// installed.
    pub async fn initialise(config: AppConfig, source: Arc<dyn StatusSource>) -> SharedState {
        let lock = document::write_lock();
        let registry =
            TargetRegistry::open(DocumentStore::new(config.registry_path(), lock.clone())).await;
        let session = SessionStore::open(DocumentStore::new(config.session_path(), lock)).await;
        let cache = StatusCache::new(source.clone());
        let (poller_phase, _rx) = watch::channel(PollerPhase::Idle);

        Arc::new(Self {
            config,
            registry,
            session,
            cache,
            source,
            display: RwLock::new(None),
            poller_phase,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of tracked targets.
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Durable session state of the display.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Response cache over the status source.
    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    /// Direct handle to the status source, bypassing the cache.
    pub fn status_source(&self) -> &Arc<dyn StatusSource> {
        &self.source
    }

    /// Obtain a handle to the display gateway, if one is installed.
    pub async fn display(&self) -> Option<Arc<dyn DisplayGateway>> {
        let guard = self.display.read().await;
        guard.as_ref().cloned()
    }

    /// Install a display gateway and leave degraded mode.
    pub async fn install_display(&self, gateway: Arc<dyn DisplayGateway>) {
        let mut guard = self.display.write().await;
        *guard = Some(gateway);
    }

    /// Whether the application runs without a display gateway.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.display.read().await;
        guard.is_none()
    }

    /// Publish the poller phase.
    pub fn set_poller_phase(&self, phase: PollerPhase) {
        let _ = self.poller_phase.send(phase);
    }

    /// Current poller phase.
    pub fn poller_phase(&self) -> PollerPhase {
        *self.poller_phase.borrow()
    }
}
