//! System controller: liveness and readiness

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::app_state::AppState;
use crate::domain::system::service::health_service::{self, HealthStatus};

pub struct SystemController;

impl SystemController {
    pub async fn health() -> Json<ApiResponse<HealthStatus>> {
        Json(ApiResponse::ok(health_service::health()))
    }

    /// 503 until both the cluster API and Prometheus answer.
    pub async fn ready(
        State(state): State<AppState>,
    ) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
        let status = health_service::readiness(&state.metric_service).await;
        let code = if status.is_ready() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            code,
            Json(ApiResponse {
                is_successful: status.is_ready(),
                data: status,
            }),
        )
    }
}
