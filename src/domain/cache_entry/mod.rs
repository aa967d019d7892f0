//! Cache entry domain model
//!
//! A cache entry's id doubles as its key in the vector index, so every
//! adapter that creates or deletes entries must keep both sides in step.

mod codec;
mod entity;

pub use codec::{decode_embedding, encode_embedding};
pub use entity::{CacheEntry, CacheEntryId, CacheScope, NewCacheEntry};
