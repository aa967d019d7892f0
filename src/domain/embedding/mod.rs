//! Embedder capability
//!
//! Maps text to a fixed-dimension, unit-normalized vector.

mod provider;
mod vector;

pub use provider::Embedder;
pub use vector::l2_normalize;

#[cfg(test)]
pub use provider::mock::KeywordEmbedder;
