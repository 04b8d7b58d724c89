//! cache_list tool implementation.
//!
//! Lists buckets with their entry counts, or the entries of one bucket.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{BucketNames, CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// List the entries of this bucket instead of all buckets.
    #[serde(default)]
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BucketSummary {
    pub name: String,
    pub entries: u64,
    /// Whether the bucket belongs to the running version.
    pub current: bool,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub buckets: Vec<BucketSummary>,
    /// Entry URLs, oldest first; only when a bucket was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,
}

async fn summarize(cache: &CacheDb, current: &BucketNames, name: String) -> Result<BucketSummary, Error> {
    let entries = cache.entry_count(&name).await?;
    Ok(BucketSummary { current: current.is_current(&name), name, entries })
}

/// Implementation of the cache_list tool.
pub async fn list_impl(
    cache: &CacheDb, current: &BucketNames, params: CacheListParams,
) -> Result<CallToolResult, McpError> {
    let output = match params.bucket {
        Some(name) => {
            if !cache.has_bucket(&name).await? {
                return Err(Error::InvalidInput(format!("unknown bucket: {name}")).into());
            }
            let entries = cache
                .entry_keys(&name)
                .await?
                .into_iter()
                .map(|request| request.url.to_string())
                .collect();
            CacheListOutput { buckets: vec![summarize(cache, current, name).await?], entries: Some(entries) }
        }
        None => {
            let mut buckets = Vec::new();
            for name in cache.bucket_names().await? {
                buckets.push(summarize(cache, current, name).await?);
            }
            CacheListOutput { buckets, entries: None }
        }
    };

    json_result(&output)
}
