//! Product catalog loading.
//!
//! The catalog is requested through the worker like any page request, so it
//! benefits from the same caching. When it cannot be read a built-in
//! single-product catalog is used instead.

use serde::{Deserialize, Serialize};

use swcache_core::{Error, Request};
use swcache_core::state::Product;

use crate::worker::{FetchOutcome, ServiceWorker};

pub const CATALOG_PATH: &str = "/data/products.json";

/// A lookbook look, referencing catalog products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Look {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Catalog {
    pub products: Vec<Product>,
    #[serde(default)]
    pub lookbook: Vec<Look>,
}

impl Catalog {
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Load the catalog through the worker.
///
/// # Errors
///
/// Returns an error when the catalog response is not ok or cannot be parsed.
pub async fn try_load_catalog(worker: &ServiceWorker) -> Result<Catalog, Error> {
    let url = worker.origin().join(CATALOG_PATH).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request::get(url);

    let response = match worker.handle_fetch(&request).await {
        FetchOutcome::Respond { response, .. } => response,
        FetchOutcome::Passthrough => worker.network().fetch(&request).await?,
    };
    if !response.is_ok() {
        return Err(Error::Network(format!("catalog unavailable: status {}", response.status)));
    }

    let catalog = serde_json::from_slice::<Catalog>(&response.body)
        .map_err(|e| Error::CorruptEntry(format!("unreadable catalog: {e}")))?;
    tracing::debug!(products = catalog.products.len(), source = %response.source, "catalog loaded");
    Ok(catalog)
}

/// Load the catalog through the worker, falling back to the built-in one.
pub async fn load_catalog(worker: &ServiceWorker) -> Catalog {
    try_load_catalog(worker).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using fallback catalog");
        fallback_catalog()
    })
}

/// The built-in catalog used when `/data/products.json` cannot be read.
pub fn fallback_catalog() -> Catalog {
    let product = Product {
        id: "nike-air-max-90".into(),
        title: "Nike Air Max 90".into(),
        brand: "Nike".into(),
        category: "90s-sports".into(),
        price: 89.99,
        original_price: Some(120.00),
        condition: Some("Excellent".into()),
        size: Some("UK 9".into()),
        description: Some("Classic Nike Air Max 90 in excellent condition.".into()),
        images: vec!["/assets/products/nike-air-max-90-1.jpg".into()],
        tags: vec!["sneakers".into(), "retro".into(), "sport".into(), "nike".into()],
        is_new: true,
        in_stock: true,
        sizes: vec!["UK 7".into(), "UK 8".into(), "UK 9".into(), "UK 10".into()],
        colors: vec!["White/Black".into()],
        year: Some(1990),
    };
    Catalog { products: vec![product], lookbook: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::*;

    const CATALOG_URL: &str = "http://shop.test/data/products.json";

    #[tokio::test]
    async fn test_load_catalog_from_network() {
        let (worker, _, network) = worker_with(&[CATALOG_PATH]).await;
        network.route(
            CATALOG_URL,
            200,
            r#"{
                "products": [
                    {"id": "levis-501", "title": "Levi's 501", "price": 45.0, "isNew": true},
                    {"id": "carhartt-jacket", "title": "Carhartt Detroit", "price": 120.0, "inStock": false}
                ],
                "lookbook": [{"id": "look-1", "title": "Workwear", "products": ["carhartt-jacket"]}]
            }"#,
        );

        let catalog = load_catalog(&worker).await;
        assert_eq!(catalog.products.len(), 2);
        assert!(catalog.find("levis-501").unwrap().is_new);
        assert!(!catalog.find("carhartt-jacket").unwrap().in_stock);
        assert_eq!(catalog.lookbook[0].products, vec!["carhartt-jacket"]);
        assert!(catalog.find("nike-air-max-90").is_none());
    }

    #[tokio::test]
    async fn test_load_catalog_falls_back() {
        let (worker, _, network) = worker_with(&[CATALOG_PATH]).await;
        network.set_offline(true);
        assert_eq!(load_catalog(&worker).await, fallback_catalog());

        network.set_offline(false);
        network.route(CATALOG_URL, 200, "not json");
        let catalog = load_catalog(&worker).await;
        assert!(catalog.find("nike-air-max-90").is_some());
    }

    #[tokio::test]
    async fn test_try_load_catalog_reports_failures() {
        let (worker, _, network) = worker_with(&[CATALOG_PATH]).await;
        network.route(CATALOG_URL, 404, "missing");
        assert!(matches!(try_load_catalog(&worker).await, Err(Error::Network(_))));

        network.route(CATALOG_URL, 200, "not json");
        assert!(matches!(try_load_catalog(&worker).await, Err(Error::CorruptEntry(_))));
    }
}
