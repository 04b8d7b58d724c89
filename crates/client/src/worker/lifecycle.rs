//! Install and activate.

use std::sync::atomic::Ordering;

use futures_util::future::try_join_all;
use serde::Serialize;

use swcache_core::{Error, Request};

use super::ServiceWorker;

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this version never activates.
    Redundant,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub bucket: String,
    pub cached: usize,
    /// Install asked to skip the waiting phase.
    pub activate_immediately: bool,
}

/// Outcome of an activation.
#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
    pub clients_claimed: bool,
}

impl ServiceWorker {
    /// Populate the static bucket with every manifest asset.
    ///
    /// Every asset must be fetched with an ok status before anything is
    /// written; the batch is then stored in one transaction. A failed
    /// reinstall of an activated worker leaves it activated.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let previous = self.state().await;
        self.set_state(LifecycleState::Installing).await;

        match self.precache().await {
            Ok(cached) => {
                self.skip_waiting.store(true, Ordering::SeqCst);
                self.set_state(LifecycleState::Installed).await;
                tracing::info!(bucket = %self.config.buckets.static_bucket, cached, "worker installed");
                Ok(InstallReport {
                    bucket: self.config.buckets.static_bucket.clone(),
                    cached,
                    activate_immediately: true,
                })
            }
            Err(e) => {
                let next = if previous == LifecycleState::Activated {
                    LifecycleState::Activated
                } else {
                    LifecycleState::Redundant
                };
                self.set_state(next).await;
                tracing::error!(error = %e, state = %next, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let bucket = &self.config.buckets.static_bucket;
        self.store.open(bucket).await.map_err(|e| Error::InstallFailed(e.to_string()))?;

        let requests = self
            .config
            .manifest
            .static_assets()
            .iter()
            .map(|asset| {
                asset
                    .resolve(&self.config.origin)
                    .map(Request::get)
                    .ok_or_else(|| Error::InstallFailed(format!("unresolvable asset: {}", asset.as_str())))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = requests.into_iter().map(|request| async move {
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {}", request.url, e)))?;
            if !response.is_ok() {
                return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
            }
            Ok((request, response))
        });
        let entries = try_join_all(fetches).await?;

        self.store
            .put_all(bucket, &entries)
            .await
            .map_err(|e| Error::InstallFailed(e.to_string()))?;
        Ok(entries.len())
    }

    /// Purge stale buckets and take control of open pages.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let current = self.state().await;
        if !matches!(current, LifecycleState::Installed | LifecycleState::Activated) {
            return Err(Error::Lifecycle(format!("cannot activate a worker in state {current}")));
        }

        self.set_state(LifecycleState::Activating).await;
        let (deleted, retained) = match self.clean_stale_buckets().await {
            Ok(result) => result,
            Err(e) => {
                self.set_state(current).await;
                return Err(e);
            }
        };
        self.clients_claimed.store(true, Ordering::SeqCst);
        self.set_state(LifecycleState::Activated).await;

        tracing::info!(deleted = deleted.len(), "worker activated");
        Ok(ActivationReport { deleted, retained, clients_claimed: true })
    }

    /// Request activation without waiting; an installed worker activates now.
    pub async fn skip_waiting(&self) -> Result<Option<ActivationReport>, Error> {
        self.skip_waiting.store(true, Ordering::SeqCst);
        if self.state().await == LifecycleState::Installed {
            return self.activate().await.map(Some);
        }
        Ok(None)
    }

    /// Delete every bucket that does not belong to the current version.
    pub async fn clean_stale_buckets(&self) -> Result<(Vec<String>, Vec<String>), Error> {
        let mut deleted = Vec::new();
        let mut retained = Vec::new();
        for name in self.store.bucket_names().await? {
            if self.config.buckets.is_current(&name) {
                retained.push(name);
                continue;
            }
            if self.store.delete_bucket(&name).await? {
                tracing::info!(bucket = %name, "deleted stale bucket");
                deleted.push(name);
            }
        }
        Ok((deleted, retained))
    }
}
