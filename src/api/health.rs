//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

/// Health response with optional component checks
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Returns 200 while the process is up
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness: the record store answers and the index mirrors it
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let check = check_cache(&state).await;

    let overall_status = check.status;
    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_cache(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state.engine.consistency().await {
        Ok((stored, indexed)) => {
            if stored == indexed {
                (HealthStatus::Healthy, None)
            } else {
                (
                    HealthStatus::Degraded,
                    Some(format!("{} stored entries, {} indexed vectors", stored, indexed)),
                )
            }
        }
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };

    HealthCheck {
        name: "semantic_cache".to_string(),
        status,
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{test_state, test_state_with_records};
    use crate::domain::record_store::RecordStore;
    use crate::domain::user::UserId;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
    }

    #[tokio::test]
    async fn test_cache_check_healthy_when_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;
        state
            .engine
            .store("capital of Malta?", "Valletta", UserId::new(1), "global")
            .await
            .unwrap();

        let check = check_cache(&state).await;
        assert_eq!(check.status, HealthStatus::Healthy);
        assert!(check.message.is_none());
    }

    #[tokio::test]
    async fn test_cache_check_degraded_on_divergence() {
        let dir = tempfile::tempdir().unwrap();
        let (state, records) = test_state_with_records(&dir).await;
        let stored = state
            .engine
            .store("capital of Malta?", "Valletta", UserId::new(1), "global")
            .await
            .unwrap();

        let mut tx = records.begin().await.unwrap();
        tx.delete(&[stored.entry_id]).await.unwrap();
        tx.commit().await.unwrap();

        let check = check_cache(&state).await;
        assert_eq!(check.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_cache_check_stays_healthy_during_concurrent_stores() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let writers: Vec<_> = (0..20)
            .map(|i| {
                let engine = state.engine.clone();
                tokio::spawn(async move {
                    engine
                        .store(&format!("topic {}", i), "answer", UserId::new(1), "user")
                        .await
                        .unwrap();
                })
            })
            .collect();

        for _ in 0..20 {
            let check = check_cache(&state).await;
            assert_eq!(check.status, HealthStatus::Healthy, "{:?}", check.message);
            tokio::task::yield_now().await;
        }

        for writer in writers {
            writer.await.unwrap();
        }
        assert_eq!(check_cache(&state).await.status, HealthStatus::Healthy);
    }
}
