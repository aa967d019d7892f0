//! Reclaim and rebuild on demand

use axum::{extract::State, http::StatusCode};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MaintenanceRequest, MaintenanceResponse, RebuildResponse};
use crate::domain::semantic_cache::ReclaimParams;

/// Run both sweeps. Responds 500 with the report when a sweep failed.
pub async fn run_maintenance(
    State(state): State<AppState>,
    request: Option<Json<MaintenanceRequest>>,
) -> (StatusCode, Json<MaintenanceResponse>) {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let config = state.engine.config();

    let params = ReclaimParams::new(
        request.max_vectors.unwrap_or(config.max_vectors),
        request.idle_days.unwrap_or(config.idle_days),
    );

    let report = state.engine.reclaim(params).await;
    let status = if report.idle.is_failed() || report.capacity.is_failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(report.into()))
}

pub async fn rebuild_index(
    State(state): State<AppState>,
) -> Result<Json<RebuildResponse>, ApiError> {
    let vectors = state.engine.rebuild_index().await?;
    Ok(Json(RebuildResponse { vectors }))
}
