//! Registry abstraction
//!
//! The resolution service only talks to storage through [`UrlRegistry`], so
//! the durable sea-orm backend and the in-memory backend are interchangeable.

use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::UrlRecord;

#[async_trait]
pub trait UrlRegistry: Send + Sync {
    async fn find_by_original_url(&self, url: &str) -> Result<Option<UrlRecord>>;

    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>>;

    /// Insert a new record.
    ///
    /// Fails with `AlreadyExists` without writing anything if either the
    /// short code or the original URL is already stored.
    async fn insert(&self, record: UrlRecord) -> Result<()>;

    /// Atomically add one click and return the new count.
    ///
    /// Concurrent calls on the same code observe distinct, strictly
    /// increasing values. Returns `None` (and mutates nothing) when the code
    /// is unknown.
    async fn increment_click(&self, code: &str) -> Result<Option<u64>>;

    /// All records, in creation order
    async fn list_all(&self) -> Result<Vec<UrlRecord>>;

    async fn count(&self) -> Result<u64>;

    fn backend_name(&self) -> &str;

    /// Release underlying resources (connection pools). Default: nothing to do.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
