//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::borrow::Cow;
use std::sync::Arc;

use crate::tools::cache::{CacheDeleteParams, CacheListParams, delete_impl, list_impl};
use crate::tools::cart::{CartUpdateParams, cart_get_impl, cart_update_impl};
use crate::tools::worker::{
    ConnectivityParams, FetchParams, MessageParams, NotificationClickParams, PushParams, SyncParams,
    activate_impl, connectivity_impl, fetch_impl, install_impl, message_impl, notification_click_impl, push_impl,
    sync_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_client::catalog::fallback_catalog;
use swcache_client::{Catalog, ServiceWorker, try_load_catalog};
use swcache_core::CacheDb;
use tokio::sync::{Mutex, OnceCell};

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    worker: Arc<ServiceWorker>,
    db: Arc<CacheDb>,
    catalog: Arc<OnceCell<Catalog>>,
    cart_lock: Arc<Mutex<()>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwCacheServer {
    /// Create a new server handler.
    pub fn new(worker: Arc<ServiceWorker>, db: Arc<CacheDb>) -> Self {
        Self {
            worker,
            db,
            catalog: Arc::new(OnceCell::new()),
            cart_lock: Arc::new(Mutex::new(())),
            tool_router: Self::tool_router(),
        }
    }

    /// Install and, when requested, activate the worker at startup.
    ///
    /// A failed install leaves the worker redundant: requests then bypass it.
    pub async fn boot(&self) {
        match self.worker.install().await {
            Ok(report) if report.activate_immediately => {
                if let Err(e) = self.worker.activate().await {
                    tracing::error!(error = %e, "activation failed");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "worker not installed, serving from network only"),
        }
    }

    /// The loaded catalog. Only a successful load is kept; until then each
    /// call retries and falls back to the built-in catalog.
    async fn catalog(&self) -> Cow<'_, Catalog> {
        match self.catalog.get_or_try_init(|| try_load_catalog(&self.worker)).await {
            Ok(catalog) => Cow::Borrowed(catalog),
            Err(e) => {
                tracing::warn!(error = %e, "catalog unavailable, using fallback");
                Cow::Owned(fallback_catalog())
            }
        }
    }

    #[tool(description = "Install the worker: precache every static asset into the current static bucket.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the worker: delete buckets of other versions and claim clients.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Deliver a page request to the worker.
    ///
    /// Static assets are cache-first, dynamic assets and API calls network-first,
    /// everything else stale-while-revalidate. Non-GET requests pass through.
    #[tool(description = "Fetch a URL as a controlled page would. Returns status, headers, body and where the response came from.")]
    async fn sw_fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message. Returns the notification to display.")]
    async fn sw_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a notification click. Returns the window to open, if any.")]
    async fn sw_notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        notification_click_impl(&self.worker, params.0).await
    }

    #[tool(description = "Post a page message to the worker (SKIP_WAITING, GET_VERSION).")]
    async fn sw_message(&self, params: Parameters<MessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Fire a background sync event. The background-sync tag refreshes the static bucket.")]
    async fn sw_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Signal that the host went online or offline. Going online runs background sync.")]
    async fn sw_connectivity(&self, params: Parameters<ConnectivityParams>) -> Result<CallToolResult, McpError> {
        connectivity_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache buckets with entry counts, or the entries of one bucket.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.db, self.worker.buckets(), params.0).await
    }

    #[tool(description = "Delete a cache bucket and all of its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.db, self.worker.buckets(), params.0).await
    }

    #[tool(description = "Get the cart and wishlist with item count and total.")]
    async fn cart_get(&self) -> Result<CallToolResult, McpError> {
        cart_get_impl(self.db.as_ref()).await
    }

    #[tool(
        description = "Update the cart or wishlist: add, remove, update_quantity, toggle_wishlist, clear or checkout."
    )]
    async fn cart_update(&self, params: Parameters<CartUpdateParams>) -> Result<CallToolResult, McpError> {
        let catalog = self.catalog().await;
        let _guard = self.cart_lock.lock().await;
        cart_update_impl(self.db.as_ref(), &catalog, params.0).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cart::CartUpdateKind;
    use crate::tools::testing::server_worker;

    #[tokio::test]
    async fn test_all_tools_registered() {
        let (worker, db, _) = server_worker().await;
        let server = SwCacheServer::new(Arc::new(worker), db);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "cache_delete",
                "cache_list",
                "cart_get",
                "cart_update",
                "sw_activate",
                "sw_connectivity",
                "sw_fetch",
                "sw_install",
                "sw_message",
                "sw_notification_click",
                "sw_push",
                "sw_sync",
            ]
        );
    }

    #[tokio::test]
    async fn test_boot_activates_worker() {
        let (worker, db, network) = server_worker().await;
        network.respond("http://shop.test/index.html", 200, "<html></html>");
        let server = SwCacheServer::new(Arc::new(worker), db);

        server.boot().await;
        assert!(server.worker.controls_clients());
    }

    #[tokio::test]
    async fn test_failed_boot_leaves_worker_uncontrolling() {
        let (worker, db, _) = server_worker().await;
        let server = SwCacheServer::new(Arc::new(worker), db);

        server.boot().await;
        assert!(!server.worker.controls_clients());
    }

    #[tokio::test]
    async fn test_catalog_retried_after_failed_load() {
        let (worker, db, network) = server_worker().await;
        let server = SwCacheServer::new(Arc::new(worker), db);

        assert!(server.catalog().await.find("levis-501").is_none());
        assert!(server.catalog.get().is_none());

        network.respond(
            "http://shop.test/data/products.json",
            200,
            r#"{"products": [{"id": "levis-501", "title": "Levi's 501", "price": 45.0}]}"#,
        );
        let params = CartUpdateParams {
            action: CartUpdateKind::Add,
            product_id: Some("levis-501".into()),
            quantity: None,
        };
        assert!(server.cart_update(Parameters(params)).await.is_ok());
        assert!(server.catalog.get().is_some());
    }
}
