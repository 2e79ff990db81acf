use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::errors::AppError;

/// Build the main application router
pub fn app_router(request_timeout: Duration) -> Router<AppState> {
    // Costs, Metrics and System subrouters live under /api/v1
    let api_v1 = Router::new()
        .nest("/costs", crate::api::routes::cost_routes::cost_routes())
        .nest("/metrics", crate::api::routes::metrics_routes::metrics_routes())
        .merge(crate::api::routes::system_routes::system_routes());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1)
        .fallback(handler_404)
        // Dropping a timed-out request future abandons its in-flight backend calls
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

async fn root() -> &'static str {
    "Server is running!"
}

async fn health_check() -> &'static str {
    "OK"
}

async fn handler_404() -> AppError {
    AppError::NotFound("The requested resource was not found".to_string())
}
