//! cache_delete tool implementation.
//!
//! Deletes a whole bucket and its entries.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{BucketNames, CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    pub bucket: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub bucket: String,
    /// False when no such bucket existed.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(
    cache: &CacheDb, current: &BucketNames, params: CacheDeleteParams,
) -> Result<CallToolResult, McpError> {
    if params.bucket.trim().is_empty() {
        return Err(Error::InvalidInput("bucket name must not be empty".into()).into());
    }
    if current.is_current(&params.bucket) {
        tracing::warn!(bucket = %params.bucket, "deleting a bucket of the running version");
    }

    let deleted = cache.delete_bucket(&params.bucket).await?;
    json_result(&CacheDeleteOutput { bucket: params.bucket, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output;

    #[tokio::test]
    async fn test_delete_bucket() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.open_bucket("shop-static-v1").await.unwrap();
        let names = BucketNames::new("shop", "2");

        let params = CacheDeleteParams { bucket: "shop-static-v1".into() };
        let value = output(&delete_impl(&cache, &names, params).await.unwrap());
        assert_eq!(value["deleted"], true);
        assert!(cache.bucket_names().await.unwrap().is_empty());

        let params = CacheDeleteParams { bucket: "shop-static-v1".into() };
        let value = output(&delete_impl(&cache, &names, params).await.unwrap());
        assert_eq!(value["deleted"], false);
    }

    #[tokio::test]
    async fn test_delete_empty_name() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheDeleteParams { bucket: " ".into() };
        assert!(delete_impl(&cache, &BucketNames::new("shop", "2"), params).await.is_err());
    }
}
