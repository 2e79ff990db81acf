//! Metrics controller: raw usage views, no cost applied

use axum::extract::{Query, State};
use axum::Json;
use validator::Validate;

use crate::api::dto::metrics_dto::UsageScopeQuery;
use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::metric::model::{ClusterMetrics, PromMetrics, ResourceUsage};
use crate::errors::AppError;

pub struct MetricsController;

impl MetricsController {
    pub async fn get_prometheus_metrics(
        State(state): State<AppState>,
        Query(q): Query<UsageScopeQuery>,
    ) -> Result<Json<ApiResponse<PromMetrics>>, AppError> {
        q.validate()?;
        to_json(state.metric_service.prometheus_metrics(q.namespace(), q.pod()).await)
    }

    pub async fn get_cluster_metrics(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<ClusterMetrics>>, AppError> {
        to_json(state.metric_service.cluster_metrics().await)
    }

    pub async fn get_resource_usage(
        State(state): State<AppState>,
        Query(q): Query<UsageScopeQuery>,
    ) -> Result<Json<ApiResponse<ResourceUsage>>, AppError> {
        q.validate()?;
        let usage = state.metric_service.resource_usage(q.namespace(), q.pod()).await;
        Ok(Json(ApiResponse::ok(usage)))
    }
}
