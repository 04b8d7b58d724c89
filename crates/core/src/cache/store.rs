//! Cache store abstraction consumed by the worker.
//!
//! The worker only needs named buckets of request -> response entries; the
//! trait keeps strategies independent of the SQLite backend.

use super::connection::CacheDb;
use crate::Error;
use crate::http::{Request, Response};

/// Named, persistent request -> response buckets.
///
/// Each single get or put is atomic; `put_all` is atomic over its batch.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the bucket if missing.
    async fn open(&self, bucket: &str) -> Result<(), Error>;

    async fn has(&self, bucket: &str) -> Result<bool, Error>;

    /// Names of every existing bucket.
    async fn bucket_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a whole bucket. Returns false if it did not exist.
    async fn delete_bucket(&self, bucket: &str) -> Result<bool, Error>;

    async fn match_request(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error>;

    async fn put(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Write every entry or none.
    async fn put_all(&self, bucket: &str, entries: &[(Request, Response)]) -> Result<(), Error>;

    async fn delete(&self, bucket: &str, request: &Request) -> Result<bool, Error>;

    /// Requests currently stored in the bucket.
    async fn keys(&self, bucket: &str) -> Result<Vec<Request>, Error>;
}

#[async_trait::async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, bucket: &str) -> Result<(), Error> {
        self.open_bucket(bucket).await
    }

    async fn has(&self, bucket: &str) -> Result<bool, Error> {
        self.has_bucket(bucket).await
    }

    async fn bucket_names(&self) -> Result<Vec<String>, Error> {
        CacheDb::bucket_names(self).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<bool, Error> {
        CacheDb::delete_bucket(self, bucket).await
    }

    async fn match_request(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.match_entry(bucket, request).await
    }

    async fn put(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_entry(bucket, request, response).await
    }

    async fn put_all(&self, bucket: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        self.put_entries(bucket, entries).await
    }

    async fn delete(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        self.delete_entry(bucket, request).await
    }

    async fn keys(&self, bucket: &str) -> Result<Vec<Request>, Error> {
        self.entry_keys(bucket).await
    }
}
