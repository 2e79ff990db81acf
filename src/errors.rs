use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("K8s API error: {0}")]
    K8sApiError(String),

    #[error("Metrics backend error: {0}")]
    MetricsApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::K8sApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::MetricsApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Failure of a top-level inventory enumeration (namespaces, pods, nodes).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    #[error("inventory unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a single metrics backend query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("query transport error: {0}")]
    Transport(String),

    #[error("query failed with status {0}")]
    Status(u16),

    #[error("query rejected by backend: {0}")]
    Backend(String),

    #[error("query response could not be decoded: {0}")]
    Decode(String),
}

/// Failure of a cost computation for one entity or one aggregate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CostError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("invalid cost scope: {0}")]
    InvalidScope(String),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError::K8sApiError(err.to_string())
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::MetricsApiError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidQuery(err.to_string())
    }
}

impl From<CostError> for AppError {
    fn from(err: CostError) -> Self {
        match err {
            CostError::Inventory(e) => e.into(),
            CostError::InvalidScope(scope) => AppError::InvalidQuery(scope),
        }
    }
}
