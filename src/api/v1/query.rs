//! `POST /v1/query`

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest, QueryResponse};
use crate::domain::semantic_cache::LookupOptions;
use crate::domain::user::UserId;

/// Serve a cached answer; a miss is a 200 with `hit: false`
pub async fn submit_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query must not be empty").with_param("query"));
    }

    let mut options = LookupOptions::default();
    if let Some(threshold) = request.threshold {
        options = options.with_threshold(threshold);
    }
    if let Some(k) = request.k {
        options = options.with_k(k);
    }

    let outcome = state
        .engine
        .lookup(&request.query, UserId::new(request.user_id), options)
        .await?;

    debug!(user_id = request.user_id, hit = outcome.is_hit(), "Query served");
    Ok(Json(outcome.into()))
}
