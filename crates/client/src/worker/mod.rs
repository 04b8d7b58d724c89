//! The offline-caching worker.
//!
//! ### Lifecycle
//! - `install` fetches the whole asset manifest and writes it to the static
//!   bucket in one batch, then asks to be activated immediately.
//! - `activate` purges every bucket from other versions and claims clients.
//!
//! ### Fetch routing
//! - Static assets: cache-first against the static bucket.
//! - Dynamic assets and API calls: network-first against the dynamic bucket.
//! - Everything else: stale-while-revalidate against the dynamic bucket.
//! - Non-GET requests pass through untouched.
//!
//! ### Auxiliary channels
//! - Push display and notification-click routing.
//! - Page messages (`SKIP_WAITING`, `GET_VERSION`).
//! - Background sync refresh of the static bucket and connectivity signals.

pub mod lifecycle;
pub mod message;
pub mod notify;
pub mod routing;
pub mod strategy;
pub mod sync;

pub use lifecycle::{ActivationReport, InstallReport, LifecycleState};
pub use message::{ClientMessage, MessageOutcome, VersionReply};
pub use notify::{ClickOutcome, Notification, NotificationAction, NotificationData};
pub use routing::{BucketKind, FetchOutcome, Route, Strategy};
pub use sync::{BACKGROUND_SYNC_TAG, SyncReport};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use url::Url;

use swcache_core::{AppConfig, AssetManifest, BucketNames, CacheStore, Error};

use crate::fetch::Network;

/// Worker settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: Url,
    pub buckets: BucketNames,
    pub manifest: AssetManifest,
    /// Notification title.
    pub store_name: String,
    pub api_prefix: String,
}

impl WorkerConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            buckets: BucketNames::new(&config.app_name, &config.version),
            manifest: AssetManifest::from_config(config),
            store_name: config.store_name.clone(),
            api_prefix: config.api_prefix.clone(),
        })
    }
}

/// One deployed version of the worker.
pub struct ServiceWorker {
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    config: WorkerConfig,
    state: Mutex<LifecycleState>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
    revalidations: TaskTracker,
}

impl ServiceWorker {
    pub fn new(store: Arc<dyn CacheStore>, network: Arc<dyn Network>, config: WorkerConfig) -> Self {
        Self {
            store,
            network,
            config,
            state: Mutex::new(LifecycleState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
            revalidations: TaskTracker::new(),
        }
    }

    /// Build a worker straight from application configuration.
    pub fn from_app_config(
        store: Arc<dyn CacheStore>, network: Arc<dyn Network>, config: &AppConfig,
    ) -> Result<Self, Error> {
        Ok(Self::new(store, network, WorkerConfig::from_app(config)?))
    }

    pub fn buckets(&self) -> &BucketNames {
        &self.config.buckets
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.config.manifest
    }

    pub fn origin(&self) -> &Url {
        &self.config.origin
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.lock().await
    }

    async fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.lock().await;
        let previous = *state;
        tracing::debug!(from = %previous, to = %next, "worker state transition");
        *state = next;
    }

    /// Whether activation was requested without waiting for clients to close.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Whether open pages are controlled by this worker.
    pub fn controls_clients(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Wait until every background revalidation spawned so far has finished.
    pub async fn settle(&self) {
        self.revalidations.close();
        self.revalidations.wait().await;
        self.revalidations.reopen();
    }
}
