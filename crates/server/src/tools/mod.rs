//! MCP tool implementations.
//!
//! This module contains all tools exposed by the swcache server.

pub mod cache;
pub mod cart;
pub mod worker;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use swcache_core::Error;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use rmcp::model::CallToolResult;
    use swcache_client::{Network, ServiceWorker};
    use swcache_core::{AppConfig, CacheDb, Error, Request, Response};

    /// Canned responses keyed by URL; anything else is a 404.
    #[derive(Default)]
    pub struct StubNetwork {
        responses: Mutex<HashMap<String, (u16, String)>>,
    }

    impl StubNetwork {
        pub fn respond(&self, url: &str, status: u16, body: &str) {
            self.responses.lock().unwrap().insert(url.to_string(), (status, body.to_string()));
        }
    }

    #[async_trait::async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            let found = self.responses.lock().unwrap().get(request.url.as_str()).cloned();
            Ok(match found {
                Some((status, body)) => Response::new(status, body),
                None => Response::new(404, "not found"),
            })
        }
    }

    pub async fn server_worker() -> (ServiceWorker, Arc<CacheDb>, Arc<StubNetwork>) {
        let config = AppConfig {
            app_name: "shop".into(),
            version: "2".into(),
            origin: "http://shop.test".into(),
            static_assets: vec!["/index.html".into()],
            ..Default::default()
        };
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let network = Arc::new(StubNetwork::default());
        let worker = ServiceWorker::from_app_config(db.clone(), network.clone(), &config).unwrap();
        (worker, db, network)
    }

    /// Parse the JSON text of the first content item.
    pub fn output(result: &CallToolResult) -> serde_json::Value {
        let content = serde_json::to_value(&result.content[0]).unwrap();
        let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
