pub mod api;
pub mod capture;
pub mod irrigation;
pub mod pump;

pub use api::ApiError;
pub use irrigation::IrrigationError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

/// HTTP status for errors raised by the core crate.
pub trait StatusCodeExt {
    fn status_code(&self) -> StatusCode;
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::PumpError(e) => (e.status_code(), e.to_string()),
            ApiError::CaptureError(e) => (e.status_code(), e.to_string()),
            ApiError::IrrigationError(e) => (e.status_code(), e.to_string()),
            ApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        // Upstream failures get an id so operators can find them in the logs.
        if status.is_server_error() {
            let error_id = Uuid::new_v4();
            tracing::error!(error_id = ?error_id, "Request failed: {}", self);
            error_obj["error_id"] = json!(error_id.to_string());
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
