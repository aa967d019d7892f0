//! Semantic cache configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the cache engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// File the vector index is persisted to
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Embedding dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Minimum similarity (0.0 to 1.0) for a candidate to count as a hit
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Candidates fetched from the index per lookup
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Vector count above which the capacity sweep evicts
    #[serde(default = "default_max_vectors")]
    pub max_vectors: usize,

    /// Entries not updated for this many days are evicted by the idle sweep
    #[serde(default = "default_idle_days")]
    pub idle_days: u32,
}

fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        return default_similarity_threshold();
    }

    threshold.clamp(0.0, 1.0)
}

fn default_index_path() -> PathBuf {
    PathBuf::from("semantic_cache.index")
}

fn default_dimensions() -> usize {
    1024
}

fn default_similarity_threshold() -> f32 {
    0.90
}

fn default_top_k() -> usize {
    5
}

fn default_max_vectors() -> usize {
    10_000
}

fn default_idle_days() -> u32 {
    7
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            dimensions: default_dimensions(),
            similarity_threshold: default_similarity_threshold(),
            top_k: default_top_k(),
            max_vectors: default_max_vectors(),
            idle_days: default_idle_days(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index file path
    pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = path.into();
        self
    }

    /// Set the embedding dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = clamp_threshold(threshold);
        self
    }

    /// Set how many candidates a lookup considers
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k.max(1);
        self
    }

    /// Apply the builder bounds to values that were deserialized directly:
    /// threshold within [0, 1], at least one candidate
    pub fn normalized(self) -> Self {
        let threshold = self.similarity_threshold;
        let top_k = self.top_k;
        self.with_similarity_threshold(threshold).with_top_k(top_k)
    }

    /// Set the capacity limit
    pub fn with_max_vectors(mut self, max: usize) -> Self {
        self.max_vectors = max;
        self
    }

    /// Set the idle period
    pub fn with_idle_days(mut self, days: u32) -> Self {
        self.idle_days = days;
        self
    }
}
