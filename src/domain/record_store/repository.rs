//! Record store traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::domain::cache_entry::{CacheEntry, CacheEntryId, NewCacheEntry};
use crate::domain::DomainError;

/// Entry point to the cache entry table
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn RecordTransaction>, DomainError>;

    /// Every committed entry, ordered by id
    async fn list_all(&self) -> Result<Vec<CacheEntry>, DomainError>;

    /// Number of committed entries
    async fn count(&self) -> Result<usize, DomainError>;
}

/// Unit of work against the cache entry table.
///
/// Dropping a transaction without committing discards its changes.
#[async_trait]
pub trait RecordTransaction: Send {
    /// Insert a new entry and return it with its generated id.
    ///
    /// The id is known immediately; the row becomes visible to others only on commit.
    async fn insert(&mut self, entry: NewCacheEntry) -> Result<CacheEntry, DomainError>;

    /// Point lookup, seeing this transaction's own changes
    async fn get(&mut self, id: CacheEntryId) -> Result<Option<CacheEntry>, DomainError>;

    /// Increment `usage_count` and refresh `updated_at`
    async fn record_hit(&mut self, id: CacheEntryId, at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Ids of entries whose `updated_at` is strictly before `cutoff`
    async fn find_stale_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CacheEntryId>, DomainError>;

    /// Ids of the `limit` entries with the lowest `usage_count`, ties by lowest id
    async fn find_lowest_usage(&mut self, limit: usize) -> Result<Vec<CacheEntryId>, DomainError>;

    /// Delete entries, returning how many existed
    async fn delete(&mut self, ids: &[CacheEntryId]) -> Result<usize, DomainError>;

    /// Make every change visible
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discard every change
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
