//! Cache endpoints

mod answers;
mod query;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::submit_query))
        .route("/answers", post(answers::record_answer))
}
