//! Storefront cart and wishlist tools.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::Catalog;
use swcache_core::Error;
use swcache_core::state::{CartAction, StatePersistence, StoreState, reduce};

use super::json_result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartUpdateKind {
    /// Add one unit of `product_id`.
    Add,
    Remove,
    /// Set `quantity` for `product_id`; zero or less removes it.
    UpdateQuantity,
    ToggleWishlist,
    Clear,
    /// Check that the cart can be checked out.
    Checkout,
}

/// Parameters for the cart_update tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CartUpdateParams {
    pub action: CartUpdateKind,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Cart state with its derived totals.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CartOutput {
    #[serde(flatten)]
    pub state: StoreState,
    pub item_count: u64,
    pub total: f64,
    pub wishlist_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout: Option<String>,
}

impl CartOutput {
    fn new(state: StoreState) -> Self {
        Self {
            item_count: state.item_count(),
            total: state.total(),
            wishlist_count: state.wishlist_count(),
            state,
            checkout: None,
        }
    }
}

fn product_id(params: &CartUpdateParams) -> Result<String, Error> {
    params
        .product_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("product_id is required for {:?}", params.action)))
}

fn to_action(params: &CartUpdateParams, catalog: &Catalog) -> Result<CartAction, Error> {
    let action = match params.action {
        CartUpdateKind::Add => {
            let id = product_id(params)?;
            let product = catalog
                .find(&id)
                .cloned()
                .ok_or_else(|| Error::InvalidInput(format!("unknown product: {id}")))?;
            CartAction::AddToCart(product)
        }
        CartUpdateKind::Remove => CartAction::RemoveFromCart(product_id(params)?),
        CartUpdateKind::UpdateQuantity => {
            let quantity = params
                .quantity
                .ok_or_else(|| Error::InvalidInput("quantity is required for update_quantity".into()))?;
            CartAction::UpdateQuantity { id: product_id(params)?, quantity }
        }
        CartUpdateKind::ToggleWishlist => CartAction::ToggleWishlist(product_id(params)?),
        CartUpdateKind::Clear => CartAction::ClearCart,
        CartUpdateKind::Checkout => {
            return Err(Error::InvalidInput("checkout does not change the cart".into()));
        }
    };
    Ok(action)
}

pub async fn cart_get_impl(store: &dyn StatePersistence) -> Result<CallToolResult, McpError> {
    json_result(&CartOutput::new(store.load().await?))
}

/// Apply one update and persist the result. Callers serialize updates.
pub async fn cart_update_impl(
    store: &dyn StatePersistence, catalog: &Catalog, params: CartUpdateParams,
) -> Result<CallToolResult, McpError> {
    let state = store.load().await?;

    if params.action == CartUpdateKind::Checkout {
        state.ensure_checkout_ready()?;
        let mut output = CartOutput::new(state);
        output.checkout = Some("Redirecting to checkout...".into());
        return json_result(&output);
    }

    let next = reduce(&state, to_action(&params, catalog)?);
    store.save(&next).await?;
    tracing::debug!(action = ?params.action, items = next.item_count(), "cart updated");
    json_result(&CartOutput::new(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output;
    use swcache_client::catalog::fallback_catalog;
    use swcache_core::CacheDb;

    fn params(action: CartUpdateKind, product_id: Option<&str>, quantity: Option<i64>) -> CartUpdateParams {
        CartUpdateParams { action, product_id: product_id.map(str::to_string), quantity }
    }

    #[tokio::test]
    async fn test_add_update_and_persist() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let catalog = fallback_catalog();

        for _ in 0..2 {
            cart_update_impl(&db, &catalog, params(CartUpdateKind::Add, Some("nike-air-max-90"), None))
                .await
                .unwrap();
        }
        let value = output(&cart_get_impl(&db).await.unwrap());
        assert_eq!(value["item_count"], 2);
        assert_eq!(value["cart"][0]["quantity"], 2);
        assert!((value["total"].as_f64().unwrap() - 179.98).abs() < 1e-9);

        let update = params(CartUpdateKind::UpdateQuantity, Some("nike-air-max-90"), Some(0));
        let value = output(&cart_update_impl(&db, &catalog, update).await.unwrap());
        assert_eq!(value["item_count"], 0);
        assert!(db.load().await.unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = cart_update_impl(&db, &fallback_catalog(), params(CartUpdateKind::Add, Some("ghost"), None)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_product_id() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = cart_update_impl(&db, &fallback_catalog(), params(CartUpdateKind::Remove, None, None)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_toggle_wishlist() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let catalog = fallback_catalog();
        let toggle = || params(CartUpdateKind::ToggleWishlist, Some("levis-501"), None);

        let value = output(&cart_update_impl(&db, &catalog, toggle()).await.unwrap());
        assert_eq!(value["wishlist"][0], "levis-501");
        let value = output(&cart_update_impl(&db, &catalog, toggle()).await.unwrap());
        assert_eq!(value["wishlist_count"], 0);
    }

    #[tokio::test]
    async fn test_checkout_requires_items() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let catalog = fallback_catalog();
        let checkout = || params(CartUpdateKind::Checkout, None, None);

        assert!(cart_update_impl(&db, &catalog, checkout()).await.is_err());

        cart_update_impl(&db, &catalog, params(CartUpdateKind::Add, Some("nike-air-max-90"), None))
            .await
            .unwrap();
        let value = output(&cart_update_impl(&db, &catalog, checkout()).await.unwrap());
        assert_eq!(value["checkout"], "Redirecting to checkout...");
        assert_eq!(value["item_count"], 1);
    }
}
