//! Request classification and dispatch.

use serde::Serialize;

use swcache_core::{AssetClass, Request, Response};

use super::ServiceWorker;

/// Caching recipe applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::CacheFirst => write!(f, "cache-first"),
            Strategy::NetworkFirst => write!(f, "network-first"),
            Strategy::StaleWhileRevalidate => write!(f, "stale-while-revalidate"),
        }
    }
}

/// Which of the current version's buckets a strategy works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Static,
    Dynamic,
}

/// A routing table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct Route {
    pub strategy: Strategy,
    pub bucket: BucketKind,
}

impl Route {
    /// The routing table.
    pub const fn for_class(class: AssetClass) -> Route {
        match class {
            AssetClass::Static => Route { strategy: Strategy::CacheFirst, bucket: BucketKind::Static },
            AssetClass::Dynamic | AssetClass::Api => {
                Route { strategy: Strategy::NetworkFirst, bucket: BucketKind::Dynamic }
            }
            AssetClass::Other => Route { strategy: Strategy::StaleWhileRevalidate, bucket: BucketKind::Dynamic },
        }
    }

    /// Body of the 503 returned when neither network nor cache can answer.
    pub const fn fallback_message(&self) -> &'static str {
        match self.strategy {
            Strategy::NetworkFirst => "Content unavailable offline",
            Strategy::CacheFirst | Strategy::StaleWhileRevalidate => "Network error",
        }
    }
}

/// Result of intercepting one request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Respond { response: Response, class: AssetClass, route: Route },
    /// Not intercepted; the caller performs the request itself.
    Passthrough,
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond { response, .. } => Some(response),
            FetchOutcome::Passthrough => None,
        }
    }
}

impl ServiceWorker {
    fn bucket_name(&self, kind: BucketKind) -> &str {
        match kind {
            BucketKind::Static => &self.config.buckets.static_bucket,
            BucketKind::Dynamic => &self.config.buckets.dynamic_bucket,
        }
    }

    /// Classify a request; `None` for requests that are not intercepted.
    pub fn route(&self, request: &Request) -> Option<(AssetClass, Route)> {
        if !request.is_get() {
            return None;
        }
        let class = self.config.manifest.classify(&request.url);
        Some((class, Route::for_class(class)))
    }

    /// Answer an intercepted request. Never fails: cache-store errors are
    /// logged and turned into a 503.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        let Some((class, route)) = self.route(request) else {
            tracing::debug!(method = %request.method, url = %request.url, "passing through");
            return FetchOutcome::Passthrough;
        };

        let bucket = self.bucket_name(route.bucket);
        let result = match route.strategy {
            Strategy::CacheFirst => self.cache_first(bucket, request).await,
            Strategy::NetworkFirst => self.network_first(bucket, request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(bucket, request).await,
        };

        let response = result.unwrap_or_else(|e| {
            tracing::error!(url = %request.url, strategy = %route.strategy, error = %e, "cache failure");
            Response::service_unavailable(route.fallback_message())
        });

        tracing::debug!(
            url = %request.url,
            strategy = %route.strategy,
            status = response.status,
            source = %response.source,
            "fetch handled"
        );
        FetchOutcome::Respond { response, class, route }
    }
}
