//! HTTP mapping for the service error taxonomy. Every failure body is
//! `{"detail": "..."}` so clients handle one shape.

use crate::application::pricing::PricingError;
use crate::domain::errors::ApiError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// Wrapper so handlers can return `Result<_, ErrorResponse>` and use `?`
/// on both repository and pricing errors.
pub struct ErrorResponse {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::Input { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnknownSeries { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Repository { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!("Request failed: {err:#}");
        }
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<PricingError> for ErrorResponse {
    fn from(err: PricingError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: err.to_string(),
        }
    }
}
