//! In-memory record store implementation

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::cache_entry::{CacheEntry, CacheEntryId, NewCacheEntry};
use crate::domain::record_store::{RecordStore, RecordTransaction};
use crate::domain::DomainError;

type Table = BTreeMap<CacheEntryId, CacheEntry>;

/// In-memory record store
///
/// Suitable for development and tests. Transactions buffer their writes and
/// apply them under the table lock on commit. Ids come from a sequence and are
/// never reused, even when the inserting transaction rolls back.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    table: Arc<RwLock<Table>>,
    sequence: Arc<AtomicI64>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the last-update timestamp of a committed entry
    #[cfg(test)]
    pub async fn set_updated_at(&self, id: CacheEntryId, at: DateTime<Utc>) -> bool {
        match self.table.write().await.get_mut(&id) {
            Some(entry) => {
                entry.set_updated_at(at);
                true
            }
            None => false,
        }
    }

    /// Fetch a committed entry
    #[cfg(test)]
    pub async fn committed(&self, id: CacheEntryId) -> Option<CacheEntry> {
        self.table.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn begin(&self) -> Result<Box<dyn RecordTransaction>, DomainError> {
        Ok(Box::new(InMemoryRecordTransaction {
            table: Arc::clone(&self.table),
            sequence: Arc::clone(&self.sequence),
            written: BTreeMap::new(),
            deleted: BTreeSet::new(),
        }))
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, DomainError> {
        Ok(self.table.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.len())
    }
}

/// Buffered unit of work over [`InMemoryRecordStore`]
#[derive(Debug)]
struct InMemoryRecordTransaction {
    table: Arc<RwLock<Table>>,
    sequence: Arc<AtomicI64>,
    /// Rows inserted or modified by this transaction
    written: Table,
    /// Committed rows deleted by this transaction
    deleted: BTreeSet<CacheEntryId>,
}

impl InMemoryRecordTransaction {
    /// Committed rows with this transaction's changes applied
    async fn view(&self) -> Table {
        let mut rows: Table = self
            .table
            .read()
            .await
            .iter()
            .filter(|(id, _)| !self.deleted.contains(id))
            .map(|(id, entry)| (*id, entry.clone()))
            .collect();

        rows.extend(self.written.iter().map(|(id, entry)| (*id, entry.clone())));
        rows
    }
}

#[async_trait]
impl RecordTransaction for InMemoryRecordTransaction {
    async fn insert(&mut self, entry: NewCacheEntry) -> Result<CacheEntry, DomainError> {
        let id = CacheEntryId::new(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = entry.with_id(id);

        self.written.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&mut self, id: CacheEntryId) -> Result<Option<CacheEntry>, DomainError> {
        if self.deleted.contains(&id) {
            return Ok(None);
        }

        if let Some(entry) = self.written.get(&id) {
            return Ok(Some(entry.clone()));
        }

        Ok(self.table.read().await.get(&id).cloned())
    }

    async fn record_hit(&mut self, id: CacheEntryId, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut entry = self
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Cache entry '{}' not found", id)))?;

        entry.record_hit(at);
        self.written.insert(id, entry);
        Ok(())
    }

    async fn find_stale_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CacheEntryId>, DomainError> {
        Ok(self
            .view()
            .await
            .values()
            .filter(|entry| entry.updated_at() < cutoff)
            .map(|entry| entry.id())
            .collect())
    }

    async fn find_lowest_usage(&mut self, limit: usize) -> Result<Vec<CacheEntryId>, DomainError> {
        let mut rows: Vec<(i64, CacheEntryId)> = self
            .view()
            .await
            .values()
            .map(|entry| (entry.usage_count(), entry.id()))
            .collect();

        rows.sort();
        Ok(rows.into_iter().take(limit).map(|(_, id)| id).collect())
    }

    async fn delete(&mut self, ids: &[CacheEntryId]) -> Result<usize, DomainError> {
        let mut deleted = 0;

        for id in ids {
            if self.get(*id).await?.is_none() {
                continue;
            }

            self.written.remove(id);
            self.deleted.insert(*id);
            deleted += 1;
        }

        Ok(deleted)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        for id in &self.deleted {
            table.remove(id);
        }

        table.extend(self.written);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}
