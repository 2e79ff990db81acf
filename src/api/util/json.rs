use axum::Json;

use crate::api::dto::ApiResponse;
use crate::errors::AppError;

pub fn to_json<T: serde::Serialize, E: Into<AppError>>(
    result: Result<T, E>,
) -> Result<Json<ApiResponse<T>>, AppError> {
    match result {
        Ok(value) => Ok(Json(ApiResponse::ok(value))),
        Err(err) => Err(err.into()),
    }
}
