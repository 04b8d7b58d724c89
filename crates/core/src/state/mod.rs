//! Storefront cart and wishlist state.
//!
//! State transitions are pure: [`reduce`] takes the current state and an
//! action and returns the next state. Persisting the result is the caller's
//! job, through a [`StatePersistence`] adapter.

pub mod persist;

pub use persist::StatePersistence;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A catalog product as published in `/data/products.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub year: Option<u16>,
}

fn default_in_stock() -> bool {
    true
}

/// A product snapshot in the cart with its quantity (always >= 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

/// Cart and wishlist, both in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreState {
    pub cart: Vec<CartItem>,
    /// Product ids, unique.
    pub wishlist: Vec<String>,
}

/// Every state transition the storefront performs.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit of a product.
    AddToCart(Product),
    RemoveFromCart(String),
    /// Set the quantity; zero or less removes the item.
    UpdateQuantity { id: String, quantity: i64 },
    /// Add the id to the wishlist, or remove it if present.
    ToggleWishlist(String),
    ClearCart,
}

/// Apply an action to a state, returning the next state.
pub fn reduce(state: &StoreState, action: CartAction) -> StoreState {
    let mut next = state.clone();
    match action {
        CartAction::AddToCart(product) => match next.cart.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity += 1,
            None => next.cart.push(CartItem { product, quantity: 1 }),
        },
        CartAction::RemoveFromCart(id) => next.cart.retain(|item| item.product.id != id),
        CartAction::UpdateQuantity { id, quantity } => {
            if quantity <= 0 {
                next.cart.retain(|item| item.product.id != id);
            } else if let Some(item) = next.cart.iter_mut().find(|item| item.product.id == id) {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        }
        CartAction::ToggleWishlist(id) => match next.wishlist.iter().position(|w| *w == id) {
            Some(index) => {
                next.wishlist.remove(index);
            }
            None => next.wishlist.push(id),
        },
        CartAction::ClearCart => next.cart.clear(),
    }
    next
}

impl StoreState {
    /// Total number of units in the cart.
    pub fn item_count(&self) -> u64 {
        self.cart.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of price times quantity.
    pub fn total(&self) -> f64 {
        self.cart
            .iter()
            .map(|item| item.product.price * f64::from(item.quantity))
            .sum()
    }

    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    pub fn is_wishlisted(&self, id: &str) -> bool {
        self.wishlist.iter().any(|w| w == id)
    }

    /// Checkout requires at least one item.
    pub fn ensure_checkout_ready(&self) -> Result<(), Error> {
        if self.cart.is_empty() {
            return Err(Error::InvalidInput("cart is empty".into()));
        }
        Ok(())
    }
}
