//! Prometheus metrics infrastructure

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::domain::semantic_cache::LookupOutcome;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("semantic_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

fn lookup_label(outcome: &LookupOutcome) -> &'static str {
    match outcome {
        LookupOutcome::Hit(_) => "hit",
        LookupOutcome::Miss(reason) => reason.as_str(),
    }
}

/// Count one lookup by outcome
pub fn record_lookup(outcome: &LookupOutcome) {
    counter!("semantic_cache_lookups_total", "outcome" => lookup_label(outcome)).increment(1);
}

/// How a store attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Stored,
    Rejected,
    Failed,
}

impl StoreStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Count one store attempt
pub fn record_store(status: StoreStatus) {
    counter!("semantic_cache_stores_total", "status" => status.as_str()).increment(1);
}

/// Count entries evicted by a sweep
pub fn record_evictions(sweep: &'static str, count: usize) {
    if count > 0 {
        counter!("semantic_cache_evictions_total", "sweep" => sweep).increment(count as u64);
    }
}

/// Current number of vectors in the index
pub fn set_vector_count(count: usize) {
    gauge!("semantic_cache_vectors").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache_entry::CacheEntryId;
    use crate::domain::semantic_cache::{CacheHit, MissReason};

    #[test]
    fn test_lookup_labels() {
        let hit = LookupOutcome::Hit(CacheHit {
            entry_id: CacheEntryId::new(1),
            content: "Valletta".into(),
            similarity: 1.0,
        });

        assert_eq!(lookup_label(&hit), "hit");
        assert_eq!(
            lookup_label(&LookupOutcome::Miss(MissReason::BelowThreshold)),
            "below_threshold"
        );
    }

    #[test]
    fn test_store_status_labels() {
        assert_eq!(StoreStatus::Stored.as_str(), "stored");
        assert_eq!(StoreStatus::Rejected.as_str(), "rejected");
        assert_eq!(StoreStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_store(StoreStatus::Stored);
        record_evictions("idle", 3);
        set_vector_count(10);
    }
}
