//! Metrics routes (e.g., /api/v1/metrics/*)

use axum::{routing::get, Router};

use crate::api::controller::metric::MetricsController;
use crate::app_state::AppState;

/// Build the router for metrics endpoints under /api/v1/metrics
pub fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/prometheus", get(MetricsController::get_prometheus_metrics))
        .route("/cluster", get(MetricsController::get_cluster_metrics))
        .route("/resource-usage", get(MetricsController::get_resource_usage))
}
