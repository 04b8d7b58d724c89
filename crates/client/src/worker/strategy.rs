//! The three caching recipes.
//!
//! Strategy functions only fail on cache-store errors; network failures are
//! recovered here with a cached entry or a synthesized 503.

use std::sync::Arc;

use tokio::task::JoinHandle;

use swcache_core::{CacheStore, Error, Request, Response};

use super::ServiceWorker;

impl ServiceWorker {
    /// Serve from `bucket`; only go to the network on a miss.
    pub(crate) async fn cache_first(&self, bucket: &str, request: &Request) -> Result<Response, Error> {
        if let Some(cached) = self.store.match_request(bucket, request).await? {
            tracing::debug!(url = %request.url, bucket, "cache hit");
            return Ok(cached);
        }
        tracing::debug!(url = %request.url, bucket, "cache miss");

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    write_back(self.store.as_ref(), bucket, request, &response).await;
                }
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "fetch failed");
                Ok(Response::service_unavailable("Network error"))
            }
        }
    }

    /// Prefer the network; fall back to `bucket` when it is unreachable.
    pub(crate) async fn network_first(&self, bucket: &str, request: &Request) -> Result<Response, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    write_back(self.store.as_ref(), bucket, request, &response).await;
                }
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "network unavailable, trying cache");
                match self.store.match_request(bucket, request).await? {
                    Some(cached) => Ok(cached),
                    None => Ok(Response::service_unavailable("Content unavailable offline")),
                }
            }
        }
    }

    /// Answer from `bucket` at once when possible and refresh it in the
    /// background either way.
    pub(crate) async fn stale_while_revalidate(&self, bucket: &str, request: &Request) -> Result<Response, Error> {
        let cached = self.store.match_request(bucket, request).await?;
        let refresh = self.spawn_revalidation(bucket, request.clone());

        if let Some(cached) = cached {
            tracing::debug!(url = %request.url, bucket, "serving stale entry");
            return Ok(cached);
        }

        match refresh.await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Ok(Response::service_unavailable("Network error")),
            Err(e) => {
                tracing::error!(url = %request.url, error = %e, "revalidation task failed");
                Ok(Response::service_unavailable("Network error"))
            }
        }
    }

    /// Fetch on the worker's task tracker and store an ok result. Resolves
    /// to `None` when the network is unreachable.
    fn spawn_revalidation(&self, bucket: &str, request: Request) -> JoinHandle<Option<Response>> {
        let store = Arc::clone(&self.store);
        let network = Arc::clone(&self.network);
        let bucket = bucket.to_string();

        self.revalidations.spawn(async move {
            match network.fetch(&request).await {
                Ok(response) => {
                    if response.is_ok() {
                        write_back(store.as_ref(), &bucket, &request, &response).await;
                    }
                    Some(response)
                }
                Err(e) => {
                    tracing::debug!(url = %request.url, error = %e, "revalidation fetch failed");
                    None
                }
            }
        })
    }
}

/// Store a copy of a live response; failures are logged only.
async fn write_back(store: &dyn CacheStore, bucket: &str, request: &Request, response: &Response) {
    if let Err(e) = store.put(bucket, request, response).await {
        tracing::warn!(url = %request.url, bucket, error = %e, "failed to cache response");
    }
}
