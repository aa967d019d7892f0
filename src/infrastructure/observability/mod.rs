//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_evictions, record_lookup, record_store,
    set_vector_count, PrometheusMetrics, StoreStatus,
};
