//! Vector index capability
//!
//! Nearest-neighbor structure over embeddings, keyed by cache entry id.

mod index;
mod similarity;

pub use index::{Neighbor, VectorIndex};
pub use similarity::distance_to_similarity;
