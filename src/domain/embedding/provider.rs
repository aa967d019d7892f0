//! Embedder trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Text to vector mapping used for every cache lookup and insert.
///
/// Implementations must be deterministic for a given model and return vectors
/// of exactly `dimensions()` unit-normalized components.
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Length of every returned vector
    fn dimensions(&self) -> usize;

    /// Model identifier, for logs
    fn model(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::domain::embedding::l2_normalize;

    const STOP_WORDS: &[&str] = &[
        "a", "an", "the", "of", "is", "are", "what", "which", "who", "in", "on", "to", "me",
        "tell", "please", "does",
    ];

    /// Deterministic bag-of-keywords embedder.
    ///
    /// Lowercases, strips possessive `'s`, drops stop words and hashes each
    /// remaining word into one bucket, so rephrasings that share their
    /// keywords land on the same vector.
    #[derive(Debug)]
    pub struct KeywordEmbedder {
        dimensions: usize,
        failing: AtomicBool,
    }

    impl KeywordEmbedder {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                failing: AtomicBool::new(false),
            }
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn keywords(text: &str) -> Vec<String> {
            text.to_lowercase()
                .split(|c: char| !(c.is_alphanumeric() || c == '\''))
                .map(|word| {
                    let word = word.trim_matches('\'');
                    word.strip_suffix("'s").unwrap_or(word).to_string()
                })
                .filter(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
                .collect()
        }

        fn bucket(&self, word: &str) -> usize {
            // FNV-1a
            let hash = word.bytes().fold(0xcbf29ce484222325_u64, |acc, b| {
                (acc ^ b as u64).wrapping_mul(0x100000001b3)
            });
            (hash % self.dimensions as u64) as usize
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DomainError::embedding("Mock embedder configured to fail"));
            }

            let mut vector = vec![0.0; self.dimensions];

            for word in Self::keywords(text) {
                vector[self.bucket(&word)] += 1.0;
            }

            l2_normalize(&mut vector);
            Ok(vector)
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn model(&self) -> &str {
            "mock-keywords"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn dot(a: &[f32], b: &[f32]) -> f32 {
            a.iter().zip(b).map(|(x, y)| x * y).sum()
        }

        #[tokio::test]
        async fn test_rephrasing_embeds_identically() {
            let embedder = KeywordEmbedder::new(64);

            let a = embedder.embed("capital of Malta?").await.unwrap();
            let b = embedder.embed("What's Malta's capital?").await.unwrap();

            assert!(dot(&a, &b) > 0.99);
        }

        #[tokio::test]
        async fn test_vectors_are_unit_length() {
            let embedder = KeywordEmbedder::new(32);
            let vector = embedder.embed("rust ownership rules").await.unwrap();

            assert_eq!(vector.len(), 32);
            assert!((dot(&vector, &vector) - 1.0).abs() < 1e-5);
        }

        #[tokio::test]
        async fn test_failing_embedder() {
            let embedder = KeywordEmbedder::new(8);
            embedder.set_failing(true);

            assert!(embedder.embed("anything").await.is_err());
        }
    }
}
