//! Periodic cache maintenance

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::infrastructure::semantic_cache::CacheEngine;

/// When the background reclaim runs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub enabled: bool,
    /// Delay between startup and the first run
    pub initial_delay_secs: u64,
    /// Delay between runs
    pub interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_secs: 120,
            interval_secs: 86_400,
        }
    }
}

/// Background task calling [`CacheEngine::reclaim`] on a fixed cadence.
///
/// The task is aborted when the scheduler is dropped.
#[derive(Debug)]
pub struct MaintenanceScheduler {
    handle: JoinHandle<()>,
}

impl MaintenanceScheduler {
    /// Start from configuration
    pub fn start(engine: Arc<CacheEngine>, config: &MaintenanceConfig) -> Self {
        Self::spawn(
            engine,
            Duration::from_secs(config.initial_delay_secs),
            Duration::from_secs(config.interval_secs.max(1)),
        )
    }

    pub fn spawn(engine: Arc<CacheEngine>, initial_delay: Duration, period: Duration) -> Self {
        info!(
            initial_delay_secs = initial_delay.as_secs(),
            interval_secs = period.as_secs(),
            "Starting cache maintenance scheduler"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let report = engine.reclaim_default().await;

                if report.idle.is_failed() || report.capacity.is_failed() {
                    warn!(?report, "Scheduled reclaim finished with a failed sweep");
                } else {
                    info!(evicted = report.total_evicted(), "Scheduled reclaim finished");
                }
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the task and wait for it to wind down
    pub async fn shutdown(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
