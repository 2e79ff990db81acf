pub mod cost_dto;
pub mod metrics_dto;

use serde::Serialize;

/// Envelope of every successful API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub is_successful: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            is_successful: true,
            data,
        }
    }
}
