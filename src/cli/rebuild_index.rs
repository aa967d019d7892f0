//! Rebuild-index command

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    // Bootstrapping already rebuilds and persists the index
    let engine = crate::build_engine(&config).await?;

    info!(
        vectors = engine.vector_count().await,
        path = %config.cache.index_path.display(),
        "Index rebuild complete"
    );

    Ok(())
}
