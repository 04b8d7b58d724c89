//! Background sync and connectivity signals.

use serde::Serialize;

use swcache_core::{Error, Request};

use super::ServiceWorker;

/// The only sync tag the worker registers and handles.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Result of refreshing the static bucket.
#[derive(Debug, Clone, Default, Serialize, schemars::JsonSchema)]
pub struct SyncReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
}

impl ServiceWorker {
    /// Handle a sync event; tags other than [`BACKGROUND_SYNC_TAG`] are ignored.
    pub async fn handle_sync(&self, tag: &str) -> Result<Option<SyncReport>, Error> {
        if tag != BACKGROUND_SYNC_TAG {
            tracing::debug!(tag, "ignoring sync tag");
            return Ok(None);
        }
        self.refresh_static_bucket().await.map(Some)
    }

    /// Re-fetch every entry of the static bucket and overwrite it with ok
    /// responses. Per-URL failures are logged and skipped.
    pub async fn refresh_static_bucket(&self) -> Result<SyncReport, Error> {
        let bucket = &self.config.buckets.static_bucket;
        let mut report = SyncReport::default();

        for request in self.store.keys(bucket).await? {
            let url = request.url.to_string();
            match self.network.fetch(&request).await {
                Ok(response) if response.is_ok() => match self.store.put(bucket, &request, &response).await {
                    Ok(()) => report.refreshed.push(url),
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "failed to store refreshed entry");
                        report.failed.push(url);
                    }
                },
                Ok(response) => {
                    tracing::warn!(%url, status = response.status, "refresh returned non-ok status");
                    report.failed.push(url);
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "refresh fetch failed");
                    report.failed.push(url);
                }
            }
        }

        tracing::info!(refreshed = report.refreshed.len(), failed = report.failed.len(), "background sync done");
        Ok(report)
    }

    /// React to the host going online or offline. Coming online registers
    /// and runs the background sync.
    pub async fn connectivity_changed(&self, online: bool) -> Result<Option<SyncReport>, Error> {
        if !online {
            tracing::info!("went offline");
            return Ok(None);
        }
        tracing::info!(tag = BACKGROUND_SYNC_TAG, "back online, registering sync");
        self.handle_sync(BACKGROUND_SYNC_TAG).await
    }

    /// Probe `HEAD <api_prefix>health`; any failure counts as offline.
    pub async fn check_connectivity(&self) -> bool {
        let path = format!("{}health", self.config.api_prefix);
        let Ok(url) = self.config.origin.join(&path) else {
            return false;
        };
        let request = Request::new("HEAD", url).with_header("cache-control", "no-cache");
        match self.network.fetch(&request).await {
            Ok(response) => response.is_ok(),
            Err(e) => {
                tracing::debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }
}
