//! Maintenance endpoints

mod maintenance;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/maintenance", post(maintenance::run_maintenance))
        .route("/index/rebuild", post(maintenance::rebuild_index))
}
