//! Durable storage for storefront state.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_rusqlite::{params, rusqlite};

use super::{CartItem, StoreState};
use crate::Error;
use crate::cache::CacheDb;

pub const CART_KEY: &str = "storefront.cart";
pub const WISHLIST_KEY: &str = "storefront.wishlist";

/// Load and save adapter for [`StoreState`].
#[async_trait::async_trait]
pub trait StatePersistence: Send + Sync {
    /// Restore the last saved state; missing or unreadable values load empty.
    async fn load(&self) -> Result<StoreState, Error>;

    async fn save(&self, state: &StoreState) -> Result<(), Error>;
}

impl CacheDb {
    /// Raw JSON stored under a key.
    pub async fn kv_get(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result =
                    conn.query_row("SELECT value_json FROM kv_store WHERE key = ?1", params![key], |row| row.get(0));
                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store raw JSON under a key, replacing the previous value.
    pub async fn kv_put(&self, key: &str, value_json: &str) -> Result<(), Error> {
        let key = key.to_string();
        let value_json = value_json.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_store (key, value_json, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value_json = excluded.value_json,
                        updated_at = excluded.updated_at",
                    params![key, value_json, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn load_value<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, Error> {
        match self.kv_get(key).await? {
            Some(json) => Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "discarding unreadable stored state");
                T::default()
            })),
            None => Ok(T::default()),
        }
    }

    async fn save_value<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), Error> {
        let json = serde_json::to_string(value)?;
        self.kv_put(key, &json).await
    }
}

#[async_trait::async_trait]
impl StatePersistence for CacheDb {
    async fn load(&self) -> Result<StoreState, Error> {
        let cart: Vec<CartItem> = self.load_value(CART_KEY).await?;
        let wishlist: Vec<String> = self.load_value(WISHLIST_KEY).await?;
        Ok(StoreState { cart, wishlist })
    }

    async fn save(&self, state: &StoreState) -> Result<(), Error> {
        self.save_value(CART_KEY, &state.cart).await?;
        self.save_value(WISHLIST_KEY, &state.wishlist).await
    }
}
