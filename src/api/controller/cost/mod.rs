//! Cost controller: connects routes to the cost engine

use axum::extract::{Query, State};
use axum::Json;
use validator::Validate;

use crate::api::dto::cost_dto::{
    CostHistoryQuery, NamespaceCostsResponse, NodeCostsResponse, PodCostQuery, PodCostsResponse,
};
use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::cost::model::{CostHistory, CostOverview};
use crate::errors::AppError;

pub struct CostController;

impl CostController {
    pub async fn get_cost_overview(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<CostOverview>>, AppError> {
        to_json(state.cost_service.overview().await)
    }

    pub async fn get_namespace_costs(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<NamespaceCostsResponse>>, AppError> {
        to_json(state.cost_service.namespace_costs().await.map(NamespaceCostsResponse::from))
    }

    pub async fn get_pod_costs(
        State(state): State<AppState>,
        Query(q): Query<PodCostQuery>,
    ) -> Result<Json<ApiResponse<PodCostsResponse>>, AppError> {
        q.validate()?;
        let namespace = q.namespace();

        to_json(
            state
                .cost_service
                .pod_costs(namespace)
                .await
                .map(|pods| PodCostsResponse::new(namespace, pods)),
        )
    }

    pub async fn get_node_costs(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<NodeCostsResponse>>, AppError> {
        to_json(state.cost_service.node_costs().await.map(NodeCostsResponse::from))
    }

    pub async fn get_cost_history(
        State(state): State<AppState>,
        Query(q): Query<CostHistoryQuery>,
    ) -> Result<Json<ApiResponse<CostHistory>>, AppError> {
        q.validate()?;
        let window = q.into_window()?;

        Ok(Json(ApiResponse::ok(state.cost_service.cost_history(&window).await)))
    }
}
