use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use cardio_core::CardioError;

/// Wire-level wrapper mapping domain errors onto HTTP statuses.
///
/// `Unavailable` is deliberately distinct from `Inference` so clients can
/// tell "not ready" (503) from "bad input" (400).
pub struct ApiError(pub CardioError);

impl From<CardioError> for ApiError {
    fn from(e: CardioError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CardioError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CardioError::Artifact(_) | CardioError::Inference { .. } => StatusCode::BAD_REQUEST,
            CardioError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            CardioError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
