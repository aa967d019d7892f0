//! `POST /v1/answers`

use axum::{extract::State, http::StatusCode};

use crate::api::state::AppState;
use crate::api::types::{AnswerRequest, AnswerResponse, ApiError, Json};
use crate::domain::user::UserId;

pub async fn record_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query must not be empty").with_param("query"));
    }

    let stored = state
        .engine
        .store(
            &request.query,
            &request.answer,
            UserId::new(request.user_id),
            &request.scope,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}
