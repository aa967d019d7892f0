//! Collaborators with switchable failures for engine tests

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::cache_entry::{CacheEntry, CacheEntryId, NewCacheEntry};
use crate::domain::record_store::{RecordStore, RecordTransaction};
use crate::domain::vector_index::{Neighbor, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::record_store::InMemoryRecordStore;
use crate::infrastructure::vector_index::FlatIndex;

#[derive(Debug, Default)]
pub struct IndexFaults {
    save: AtomicBool,
}

impl IndexFaults {
    pub fn fail_save(&self, fail: bool) {
        self.save.store(fail, Ordering::SeqCst);
    }
}

/// Flat index whose `save` can be made to fail
#[derive(Debug)]
pub struct FaultyIndex {
    inner: FlatIndex,
    faults: Arc<IndexFaults>,
}

impl FaultyIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: FlatIndex::new(dimensions),
            faults: Arc::default(),
        }
    }

    pub fn faults(&self) -> Arc<IndexFaults> {
        Arc::clone(&self.faults)
    }
}

impl VectorIndex for FaultyIndex {
    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn ids(&self) -> Vec<CacheEntryId> {
        self.inner.ids()
    }

    fn add(&mut self, id: CacheEntryId, vector: &[f32]) -> Result<(), DomainError> {
        self.inner.add(id, vector)
    }

    fn remove(&mut self, id: CacheEntryId) -> bool {
        self.inner.remove(id)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        self.inner.search(query, k)
    }

    fn rebuild(&mut self, pairs: Vec<(CacheEntryId, Vec<f32>)>) -> Result<(), DomainError> {
        self.inner.rebuild(pairs)
    }

    fn save(&self, path: &Path) -> Result<(), DomainError> {
        if self.faults.save.load(Ordering::SeqCst) {
            return Err(DomainError::storage("Disk full"));
        }

        self.inner.save(path)
    }

    fn load(&mut self, path: &Path) -> Result<(), DomainError> {
        self.inner.load(path)
    }
}

#[derive(Debug, Default)]
pub struct StoreFaults {
    commit: AtomicBool,
    stale_scan: AtomicBool,
    usage_scan: AtomicBool,
}

impl StoreFaults {
    pub fn fail_commit(&self, fail: bool) {
        self.commit.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stale_scan(&self, fail: bool) {
        self.stale_scan.store(fail, Ordering::SeqCst);
    }

    pub fn fail_usage_scan(&self, fail: bool) {
        self.usage_scan.store(fail, Ordering::SeqCst);
    }
}

/// In-memory record store whose transactions can be made to fail
#[derive(Debug, Clone)]
pub struct FaultyRecordStore {
    inner: InMemoryRecordStore,
    faults: Arc<StoreFaults>,
}

impl FaultyRecordStore {
    pub fn new(inner: InMemoryRecordStore) -> Self {
        Self {
            inner,
            faults: Arc::default(),
        }
    }

    pub fn faults(&self) -> Arc<StoreFaults> {
        Arc::clone(&self.faults)
    }
}

#[async_trait]
impl RecordStore for FaultyRecordStore {
    async fn begin(&self) -> Result<Box<dyn RecordTransaction>, DomainError> {
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin().await?,
            faults: Arc::clone(&self.faults),
        }))
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, DomainError> {
        self.inner.list_all().await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.inner.count().await
    }
}

struct FaultyTransaction {
    inner: Box<dyn RecordTransaction>,
    faults: Arc<StoreFaults>,
}

#[async_trait]
impl RecordTransaction for FaultyTransaction {
    async fn insert(&mut self, entry: NewCacheEntry) -> Result<CacheEntry, DomainError> {
        self.inner.insert(entry).await
    }

    async fn get(&mut self, id: CacheEntryId) -> Result<Option<CacheEntry>, DomainError> {
        self.inner.get(id).await
    }

    async fn record_hit(&mut self, id: CacheEntryId, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.inner.record_hit(id, at).await
    }

    async fn find_stale_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CacheEntryId>, DomainError> {
        if self.faults.stale_scan.load(Ordering::SeqCst) {
            return Err(DomainError::storage("Connection reset during scan"));
        }

        self.inner.find_stale_before(cutoff).await
    }

    async fn find_lowest_usage(&mut self, limit: usize) -> Result<Vec<CacheEntryId>, DomainError> {
        if self.faults.usage_scan.load(Ordering::SeqCst) {
            return Err(DomainError::storage("Connection reset during scan"));
        }

        self.inner.find_lowest_usage(limit).await
    }

    async fn delete(&mut self, ids: &[CacheEntryId]) -> Result<usize, DomainError> {
        self.inner.delete(ids).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        if self.faults.commit.load(Ordering::SeqCst) {
            self.inner.rollback().await?;
            return Err(DomainError::storage("Commit rejected"));
        }

        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.inner.rollback().await
    }
}
