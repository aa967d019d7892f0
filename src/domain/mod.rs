//! Domain layer - Core cache entities and capability traits

pub mod cache_entry;
pub mod embedding;
pub mod error;
pub mod record_store;
pub mod semantic_cache;
pub mod user;
pub mod vector_index;

pub use cache_entry::{CacheEntry, CacheEntryId, CacheScope, NewCacheEntry};
pub use embedding::Embedder;
pub use error::DomainError;
pub use record_store::{RecordStore, RecordTransaction};
pub use semantic_cache::{
    CacheHit, LookupOptions, LookupOutcome, MissReason, ReclaimParams, ReclaimReport,
    SemanticCacheConfig, StoredAnswer, SweepOutcome,
};
pub use user::{User, UserId, UserRepository};
pub use vector_index::{distance_to_similarity, Neighbor, VectorIndex};
