//! Host events delivered to the worker: lifecycle, fetch, push, click,
//! message, sync and connectivity.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::fetch::resolve;
use swcache_client::worker::{ActivationReport, InstallReport, MessageOutcome, Route, SyncReport};
use swcache_client::{FetchOutcome, LifecycleState, ServiceWorker};
use swcache_core::{AssetClass, Error, Request, Response, ResponseSource};

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Site path (`/styles/main.css`) or absolute URL.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push payload text.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Action id of the clicked button; absent when the body was clicked.
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageParams {
    /// Message type, e.g. `SKIP_WAITING` or `GET_VERSION`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectivityParams {
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct InstallOutput {
    pub install: InstallReport,
    /// Present when install triggered an immediate activation.
    pub activation: Option<ActivationReport>,
    pub state: LifecycleState,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FetchOutput {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_bytes: usize,
    pub source: ResponseSource,
    /// Whether the worker handled the request.
    pub intercepted: bool,
    pub class: Option<AssetClass>,
    pub route: Option<Route>,
}

impl FetchOutput {
    fn new(request: &Request, response: Response, intercepted: Option<(AssetClass, Route)>) -> Self {
        Self {
            url: request.url.to_string(),
            method: request.method.clone(),
            status: response.status,
            status_text: response.status_text.clone(),
            body: response.text(),
            body_bytes: response.body.len(),
            headers: response.headers,
            source: response.source,
            intercepted: intercepted.is_some(),
            class: intercepted.map(|(class, _)| class),
            route: intercepted.map(|(_, route)| route),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SyncOutput {
    pub tag: String,
    /// Absent when the tag is not handled.
    pub report: Option<SyncReport>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConnectivityOutput {
    pub online: bool,
    /// Result of the `HEAD /api/health` probe, run when going online.
    pub reachable: Option<bool>,
    pub sync: Option<SyncReport>,
}

/// Run install, then activate at once when install asked to skip waiting.
pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let install = worker.install().await?;
    let activation = if install.activate_immediately { Some(worker.activate().await?) } else { None };
    json_result(&InstallOutput { install, activation, state: worker.state().await })
}

pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    json_result(&worker.activate().await?)
}

/// Deliver a page request. Until the worker controls clients, requests go
/// straight to the network.
pub async fn fetch_impl(worker: &ServiceWorker, params: FetchParams) -> Result<CallToolResult, McpError> {
    let url = resolve(worker.origin(), &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request::new(&params.method, url);

    if worker.controls_clients()
        && let FetchOutcome::Respond { response, class, route } = worker.handle_fetch(&request).await
    {
        return json_result(&FetchOutput::new(&request, response, Some((class, route))));
    }

    let response = worker.network().fetch(&request).await?;
    json_result(&FetchOutput::new(&request, response, None))
}

pub async fn push_impl(worker: &ServiceWorker, params: PushParams) -> Result<CallToolResult, McpError> {
    json_result(&worker.push(params.data.as_deref()))
}

pub async fn notification_click_impl(
    worker: &ServiceWorker, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    json_result(&worker.notification_click(params.action.as_deref()))
}

pub async fn message_impl(worker: &ServiceWorker, params: MessageParams) -> Result<CallToolResult, McpError> {
    let payload = serde_json::json!({ "type": params.kind });
    let outcome: MessageOutcome = worker.handle_message(&payload).await?;
    json_result(&outcome)
}

pub async fn sync_impl(worker: &ServiceWorker, params: SyncParams) -> Result<CallToolResult, McpError> {
    let report = worker.handle_sync(&params.tag).await?;
    json_result(&SyncOutput { tag: params.tag, report })
}

pub async fn connectivity_impl(
    worker: &ServiceWorker, params: ConnectivityParams,
) -> Result<CallToolResult, McpError> {
    let reachable = if params.online { Some(worker.check_connectivity().await) } else { None };
    let sync = worker.connectivity_changed(params.online).await?;
    json_result(&ConnectivityOutput { online: params.online, reachable, sync })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, server_worker};

    #[tokio::test]
    async fn test_fetch_passes_through_before_activation() {
        let (worker, _, network) = server_worker().await;
        network.respond("http://shop.test/about", 200, "about us");

        let result = fetch_impl(&worker, FetchParams { url: "/about".into(), method: "GET".into() })
            .await
            .unwrap();
        let value = output(&result);
        assert_eq!(value["intercepted"], false);
        assert_eq!(value["body"], "about us");
        assert_eq!(value["source"], "network");
    }

    #[tokio::test]
    async fn test_install_activates_and_intercepts() {
        let (worker, _, network) = server_worker().await;
        network.respond("http://shop.test/index.html", 200, "<html></html>");

        let value = output(&install_impl(&worker).await.unwrap());
        assert_eq!(value["install"]["cached"], 1);
        assert_eq!(value["state"], "activated");
        assert!(value["activation"]["clients_claimed"].as_bool().unwrap());

        let result = fetch_impl(&worker, FetchParams { url: "/index.html".into(), method: "get".into() })
            .await
            .unwrap();
        let value = output(&result);
        assert_eq!(value["intercepted"], true);
        assert_eq!(value["source"], "cache");
        assert_eq!(value["route"]["strategy"], "cache_first");
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_scheme() {
        let (worker, _, _) = server_worker().await;
        let result = fetch_impl(&worker, FetchParams { url: "ftp://shop.test/x".into(), method: "GET".into() }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_message_get_version() {
        let (worker, _, _) = server_worker().await;
        let value = output(&message_impl(&worker, MessageParams { kind: "GET_VERSION".into() }).await.unwrap());
        assert_eq!(value["outcome"], "version");
        assert_eq!(value["version"], "shop-static-v2");
    }

    #[tokio::test]
    async fn test_push_and_click() {
        let (worker, _, _) = server_worker().await;
        let value = output(&push_impl(&worker, PushParams { data: None }).await.unwrap());
        assert_eq!(value["body"], "New drop available!");

        let params = NotificationClickParams { action: Some("explore".into()) };
        let value = output(&notification_click_impl(&worker, params).await.unwrap());
        assert_eq!(value["kind"], "open_window");
        assert_eq!(value["url"], "/#new-arrivals");
    }

    #[tokio::test]
    async fn test_sync_unknown_tag() {
        let (worker, _, _) = server_worker().await;
        let value = output(&sync_impl(&worker, SyncParams { tag: "other".into() }).await.unwrap());
        assert!(value["report"].is_null());
    }
}
