//! Cost routes (e.g., /api/v1/costs/*)

use axum::{routing::get, Router};

use crate::api::controller::cost::CostController;
use crate::app_state::AppState;

pub fn cost_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(CostController::get_cost_overview))
        .route("/namespaces", get(CostController::get_namespace_costs))
        .route("/pods", get(CostController::get_pod_costs))
        .route("/nodes", get(CostController::get_node_costs))
        .route("/history", get(CostController::get_cost_history))
}
