//! System routes (/api/v1/health, /api/v1/ready)

use axum::{routing::get, Router};

use crate::api::controller::system::SystemController;
use crate::app_state::AppState;

pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(SystemController::health))
        .route("/ready", get(SystemController::ready))
}
