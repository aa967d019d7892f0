//! Semantic Response Cache
//!
//! Serves previously computed answers to queries that are semantically close
//! to ones already answered:
//! - Embedding-based lookup with per-user and per-language visibility
//! - A vector index kept consistent with the record store across crashes
//! - Idle and capacity reclaim on a schedule or on demand

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::Embedder;
use infrastructure::embedding::{HttpClient, OpenAiEmbedder};
use infrastructure::semantic_cache::CacheEngine;
use infrastructure::storage::StorageFactory;
use infrastructure::vector_index::FlatIndex;
use tracing::info;

/// Wire the cache engine from configuration.
///
/// The index is rebuilt from the record store before the engine is returned.
pub async fn build_engine(
    config: &AppConfig,
) -> anyhow::Result<Arc<CacheEngine>> {
    let backends = StorageFactory::create(&config.storage).await?;
    let embedder = create_embedder(config)?;

    info!(
        model = embedder.model(),
        dimensions = config.cache.dimensions,
        index_path = %config.cache.index_path.display(),
        "Bootstrapping semantic cache"
    );

    let engine = CacheEngine::bootstrap(
        embedder,
        Arc::clone(&backends.records),
        Arc::clone(&backends.users),
        Box::new(FlatIndex::new(config.cache.dimensions)),
        config.cache.clone(),
    )
    .await?;

    Ok(Arc::new(engine))
}

fn create_embedder(config: &AppConfig) -> anyhow::Result<Arc<dyn Embedder>> {
    let embedding = &config.embedding;
    let client = HttpClient::with_timeout(Duration::from_secs(embedding.timeout_secs))?;

    let mut embedder = OpenAiEmbedder::new(client, &embedding.model, config.cache.dimensions)
        .with_base_url(&embedding.base_url);

    match embedding.api_key() {
        Some(key) => embedder = embedder.with_api_key(key),
        None => info!(
            env = %embedding.api_key_env,
            "No embedding API key set, sending unauthenticated requests"
        ),
    }

    Ok(Arc::new(embedder))
}
