//! Cache engine keeping the vector index and the record store consistent
//!
//! Every id held by the index names exactly one committed cache entry and the
//! other way around. All operations run under one lock so that no caller ever
//! observes the two sides mid-change.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::cache_entry::{CacheEntryId, CacheScope, NewCacheEntry};
use crate::domain::embedding::Embedder;
use crate::domain::record_store::RecordStore;
use crate::domain::semantic_cache::{
    CacheHit, LookupOptions, LookupOutcome, MissReason, ReclaimParams, ReclaimReport,
    SemanticCacheConfig, StoredAnswer, SweepOutcome,
};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::vector_index::{distance_to_similarity, Neighbor, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_evictions, record_lookup, record_store, set_vector_count, StoreStatus,
};

/// Index candidate that cleared the similarity threshold
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: CacheEntryId,
    distance: f32,
    similarity: f32,
}

/// Highest-similarity candidate at or above `threshold`.
///
/// Ties go to the smaller distance, then the lower id.
fn best_candidate(neighbors: &[Neighbor], threshold: f32) -> Option<Candidate> {
    neighbors
        .iter()
        .map(|n| Candidate {
            id: n.id,
            distance: n.distance,
            similarity: distance_to_similarity(n.distance),
        })
        .filter(|c| c.similarity >= threshold)
        .min_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then(a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
                .then(a.id.cmp(&b.id))
        })
}

/// Semantic response cache over an injected embedder, index and record store
#[derive(Debug)]
pub struct CacheEngine {
    embedder: Arc<dyn Embedder>,
    records: Arc<dyn RecordStore>,
    users: Arc<dyn UserRepository>,
    index: Mutex<Box<dyn VectorIndex>>,
    config: SemanticCacheConfig,
}

impl CacheEngine {
    /// Assemble an engine without touching the index file
    pub fn new(
        embedder: Arc<dyn Embedder>,
        records: Arc<dyn RecordStore>,
        users: Arc<dyn UserRepository>,
        index: Box<dyn VectorIndex>,
        config: SemanticCacheConfig,
    ) -> Result<Self, DomainError> {
        let normalized = config.clone().normalized();
        if normalized.top_k != config.top_k
            || normalized.similarity_threshold != config.similarity_threshold
        {
            warn!(
                top_k = normalized.top_k,
                similarity_threshold = normalized.similarity_threshold,
                "Cache lookup settings out of range, clamped"
            );
        }
        let config = normalized;

        if embedder.dimensions() != config.dimensions {
            return Err(DomainError::configuration(format!(
                "Embedder '{}' produces {} dimensions, cache expects {}",
                embedder.model(),
                embedder.dimensions(),
                config.dimensions
            )));
        }

        if index.dimensions() != config.dimensions {
            return Err(DomainError::configuration(format!(
                "Vector index holds {} dimensions, cache expects {}",
                index.dimensions(),
                config.dimensions
            )));
        }

        Ok(Self {
            embedder,
            records,
            users,
            index: Mutex::new(index),
            config,
        })
    }

    /// Assemble an engine and rebuild its index from the record store
    pub async fn bootstrap(
        embedder: Arc<dyn Embedder>,
        records: Arc<dyn RecordStore>,
        users: Arc<dyn UserRepository>,
        index: Box<dyn VectorIndex>,
        config: SemanticCacheConfig,
    ) -> Result<Self, DomainError> {
        let engine = Self::new(embedder, records, users, index, config)?;
        engine.rebuild_index().await?;
        Ok(engine)
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Number of vectors currently held by the index
    pub async fn vector_count(&self) -> usize {
        self.index.lock().await.count()
    }

    /// Stored entry count and indexed vector count, read under one lock
    /// acquisition so no write lands between them
    pub async fn consistency(&self) -> Result<(usize, usize), DomainError> {
        let index = self.index.lock().await;
        let stored = self.records.count().await?;
        Ok((stored, index.count()))
    }

    #[cfg(test)]
    async fn index_ids(&self) -> Vec<CacheEntryId> {
        self.index.lock().await.ids()
    }

    async fn index_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.config.index_path)
            .await
            .unwrap_or(false)
    }

    /// Replace the index content with every stored entry and persist it
    pub async fn rebuild_index(&self) -> Result<usize, DomainError> {
        let mut index = self.index.lock().await;
        self.rebuild_locked(&mut **index).await
    }

    async fn rebuild_locked(&self, index: &mut dyn VectorIndex) -> Result<usize, DomainError> {
        let entries = self.records.list_all().await?;

        let pairs = entries
            .iter()
            .map(|entry| Ok((entry.id(), entry.embedding()?)))
            .collect::<Result<Vec<_>, DomainError>>()?;

        index.rebuild(pairs)?;
        index.save(&self.config.index_path)?;

        let count = index.count();
        set_vector_count(count);
        info!(
            vectors = count,
            path = %self.config.index_path.display(),
            "Rebuilt vector index from record store"
        );

        Ok(count)
    }

    /// Serve `query` from cache for `user_id`.
    ///
    /// Misses are reported in the outcome; errors are reserved for unknown
    /// users and failing collaborators.
    pub async fn lookup(
        &self,
        query: &str,
        user_id: UserId,
        options: LookupOptions,
    ) -> Result<LookupOutcome, DomainError> {
        let user = self.users.require(user_id).await?;
        let index = self.index.lock().await;

        let outcome = if self.index_file_exists().await {
            self.lookup_locked(&**index, query, &user, options).await?
        } else {
            debug!(path = %self.config.index_path.display(), "No index file, cache is empty");
            LookupOutcome::Miss(MissReason::IndexUnavailable)
        };

        record_lookup(&outcome);
        Ok(outcome)
    }

    async fn lookup_locked(
        &self,
        index: &dyn VectorIndex,
        query: &str,
        user: &User,
        options: LookupOptions,
    ) -> Result<LookupOutcome, DomainError> {
        let threshold = options
            .threshold
            .unwrap_or(self.config.similarity_threshold);
        let k = options.k.unwrap_or(self.config.top_k);

        let embedding = self.embedder.embed(query).await?;
        let neighbors = index.search(&embedding, k)?;

        let Some(best) = best_candidate(&neighbors, threshold) else {
            debug!(
                user_id = %user.id(),
                candidates = neighbors.len(),
                threshold,
                "No candidate cleared the similarity threshold"
            );
            return Ok(LookupOutcome::Miss(MissReason::BelowThreshold));
        };

        let mut tx = self.records.begin().await?;

        let Some(entry) = tx.get(best.id).await? else {
            warn!(
                entry_id = %best.id,
                similarity = best.similarity,
                "Index holds a vector without a cache entry"
            );
            tx.rollback().await?;
            return Ok(LookupOutcome::Miss(MissReason::Divergence));
        };

        if !entry.is_visible_to(user) {
            debug!(
                entry_id = %entry.id(),
                user_id = %user.id(),
                scope = %entry.scope(),
                "Best candidate is not visible to the user"
            );
            tx.rollback().await?;
            return Ok(LookupOutcome::Miss(MissReason::NotVisible));
        }

        tx.record_hit(entry.id(), Utc::now()).await?;
        tx.commit().await?;

        debug!(
            entry_id = %entry.id(),
            user_id = %user.id(),
            similarity = best.similarity,
            "Cache hit"
        );

        Ok(LookupOutcome::Hit(CacheHit {
            entry_id: entry.id(),
            content: entry.content().to_string(),
            similarity: best.similarity,
        }))
    }

    /// Record `answer` as the response to `query` under `scope`
    /// (`"global"` or `"user"`)
    pub async fn store(
        &self,
        query: &str,
        answer: &str,
        user_id: UserId,
        scope: &str,
    ) -> Result<StoredAnswer, DomainError> {
        let result = self.store_inner(query, answer, user_id, scope).await;

        match &result {
            Ok(_) => record_store(StoreStatus::Stored),
            Err(e) if e.is_rejection() => record_store(StoreStatus::Rejected),
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to store answer");
                record_store(StoreStatus::Failed);
            }
        }

        result
    }

    async fn store_inner(
        &self,
        query: &str,
        answer: &str,
        user_id: UserId,
        scope: &str,
    ) -> Result<StoredAnswer, DomainError> {
        let user = self.users.require(user_id).await?;
        let scope: CacheScope = scope.parse()?;

        let mut guard = self.index.lock().await;
        let index: &mut dyn VectorIndex = &mut **guard;

        if !self.index_file_exists().await {
            warn!("Index file missing, rebuilding before insert");
            self.rebuild_locked(index).await?;
        }

        let embedding = self.embedder.embed(query).await?;

        let mut tx = self.records.begin().await?;
        let entry = tx
            .insert(NewCacheEntry::new(&user, scope, &embedding, answer, Utc::now()))
            .await?;
        let id = entry.id();

        index.add(id, &embedding)?;

        if let Err(e) = index.save(&self.config.index_path) {
            index.remove(id);
            if let Err(rollback_err) = tx.rollback().await {
                warn!(entry_id = %id, error = %rollback_err, "Rollback after index save failure failed");
            }
            return Err(e);
        }

        if let Err(e) = tx.commit().await {
            index.remove(id);
            if let Err(save_err) = index.save(&self.config.index_path) {
                warn!(
                    entry_id = %id,
                    error = %save_err,
                    "Index file still lists an uncommitted entry until the next rebuild"
                );
            }
            return Err(e);
        }

        set_vector_count(index.count());
        info!(entry_id = %id, user_id = %user_id, scope = %scope, "Stored answer");

        Ok(StoredAnswer {
            entry_id: id,
            content: entry.content().to_string(),
            scope,
        })
    }

    /// Run the idle sweep and then the capacity sweep.
    ///
    /// Each sweep commits on its own; a failing sweep is reported without
    /// stopping the other.
    pub async fn reclaim(&self, params: ReclaimParams) -> ReclaimReport {
        let mut guard = self.index.lock().await;

        let idle = self.sweep_idle(&mut **guard, params.idle_days).await;
        let idle = sweep_outcome("idle", idle);

        let capacity = self.sweep_capacity(&mut **guard, params.max_vectors).await;
        let capacity = sweep_outcome("capacity", capacity);

        let report = ReclaimReport { idle, capacity };
        info!(
            idle_evicted = report.idle.evicted(),
            capacity_evicted = report.capacity.evicted(),
            rebuilt = report.rebuilt(),
            vectors = guard.count(),
            "Reclaim finished"
        );

        report
    }

    /// Reclaim with the configured limits
    pub async fn reclaim_default(&self) -> ReclaimReport {
        self.reclaim(ReclaimParams::new(
            self.config.max_vectors,
            self.config.idle_days,
        ))
        .await
    }

    async fn sweep_idle(
        &self,
        index: &mut dyn VectorIndex,
        idle_days: u32,
    ) -> Result<usize, DomainError> {
        let cutoff = Utc::now() - Duration::days(i64::from(idle_days));

        let mut tx = self.records.begin().await?;
        let stale = tx.find_stale_before(cutoff).await?;

        if stale.is_empty() {
            tx.rollback().await?;
            return Ok(0);
        }

        let deleted = tx.delete(&stale).await?;
        tx.commit().await?;

        self.rebuild_after_delete(index, &stale).await?;
        Ok(deleted)
    }

    async fn sweep_capacity(
        &self,
        index: &mut dyn VectorIndex,
        max_vectors: usize,
    ) -> Result<usize, DomainError> {
        let count = index.count();

        if count <= max_vectors {
            return Ok(0);
        }

        let mut tx = self.records.begin().await?;
        let victims = tx.find_lowest_usage(count - max_vectors).await?;

        if victims.is_empty() {
            tx.rollback().await?;
            warn!(vectors = count, "Index is over capacity but the store is empty, resyncing");
            self.rebuild_locked(index).await?;
            return Ok(0);
        }

        let deleted = tx.delete(&victims).await?;
        tx.commit().await?;

        self.rebuild_after_delete(index, &victims).await?;
        Ok(deleted)
    }

    /// Rebuild after a committed delete. If the rebuild fails the deleted ids
    /// are dropped from the in-memory index so it still mirrors the store.
    async fn rebuild_after_delete(
        &self,
        index: &mut dyn VectorIndex,
        deleted: &[CacheEntryId],
    ) -> Result<(), DomainError> {
        if let Err(e) = self.rebuild_locked(index).await {
            for id in deleted {
                index.remove(*id);
            }
            set_vector_count(index.count());
            return Err(e);
        }

        Ok(())
    }
}

fn sweep_outcome(sweep: &'static str, result: Result<usize, DomainError>) -> SweepOutcome {
    match result {
        Ok(0) => SweepOutcome::Unchanged,
        Ok(count) => {
            record_evictions(sweep, count);
            info!(sweep, evicted = count, "Evicted cache entries");
            SweepOutcome::Evicted { count }
        }
        Err(e) => {
            error!(sweep, error = %e, "Sweep failed");
            SweepOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}
