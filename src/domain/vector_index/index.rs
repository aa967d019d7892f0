//! Vector index trait and types

use std::fmt::Debug;
use std::path::Path;

use crate::domain::cache_entry::CacheEntryId;
use crate::domain::DomainError;

/// One search result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: CacheEntryId,
    /// Squared Euclidean distance to the query
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: CacheEntryId, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// In-memory nearest-neighbor index backed by a single file.
///
/// Not safe for concurrent mutation; callers serialize access.
pub trait VectorIndex: Send + Sync + Debug {
    /// Length of every vector held
    fn dimensions(&self) -> usize;

    /// Number of vectors held
    fn count(&self) -> usize;

    /// Ids of every vector held, ascending
    fn ids(&self) -> Vec<CacheEntryId>;

    /// Add a vector under `id`, replacing any vector already stored there
    fn add(&mut self, id: CacheEntryId, vector: &[f32]) -> Result<(), DomainError>;

    /// Remove the vector stored under `id`, returning whether one existed
    fn remove(&mut self, id: CacheEntryId) -> bool;

    /// The `k` nearest vectors to `query`, closest first
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError>;

    /// Replace the whole content with `pairs` in one pass
    fn rebuild(&mut self, pairs: Vec<(CacheEntryId, Vec<f32>)>) -> Result<(), DomainError>;

    /// Write the index to `path`
    fn save(&self, path: &Path) -> Result<(), DomainError>;

    /// Replace the content with what is stored at `path`
    fn load(&mut self, path: &Path) -> Result<(), DomainError>;
}
