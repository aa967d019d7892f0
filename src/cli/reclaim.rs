//! Reclaim command - one maintenance pass from the command line

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::ReclaimParams;
use crate::infrastructure::logging;

#[derive(Args, Debug, Clone, Default)]
pub struct ReclaimArgs {
    /// Capacity bound; defaults to `cache.max_vectors`
    #[arg(long)]
    pub max_vectors: Option<usize>,

    /// Idle bound in days; defaults to `cache.idle_days`
    #[arg(long)]
    pub idle_days: Option<u32>,
}

impl ReclaimArgs {
    fn params(&self, config: &AppConfig) -> ReclaimParams {
        ReclaimParams::new(
            self.max_vectors.unwrap_or(config.cache.max_vectors),
            self.idle_days.unwrap_or(config.cache.idle_days),
        )
    }
}

pub async fn run(args: ReclaimArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    let engine = crate::build_engine(&config).await?;
    let report = engine.reclaim(args.params(&config)).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.idle.is_failed() || report.capacity.is_failed() {
        anyhow::bail!("Reclaim finished with a failed sweep");
    }

    info!(evicted = report.total_evicted(), "Reclaim complete");
    Ok(())
}
