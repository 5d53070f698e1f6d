use agrisight_core::models::CaptureJob;
use agrisight_core::{CancelOutcome, CaptureOrchestrator};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::configs::{CROP_TYPES, is_supported_crop};
use crate::errors::ApiError;

#[derive(Clone)]
pub struct ScanState {
    pub orchestrator: CaptureOrchestrator,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CaptureRequest {
    /// Crop category, defaults to the configured one
    #[serde(default)]
    pub category: Option<String>,
}

pub fn capture_router(scan_state: ScanState) -> Router {
    Router::new()
        .route("/api/capture", get(get_current_capture).post(trigger_capture))
        .route("/api/capture/cancel", post(cancel_capture))
        .route("/api/crops", get(get_crop_types))
        .with_state(scan_state)
}

#[utoipa::path(
    post,
    path = "/api/capture",
    tag = "capture",
    request_body = CaptureRequest,
    responses(
        (status = 200, description = "Capture analysed", body = CaptureJob),
        (status = 400, description = "Unsupported crop category"),
        (status = 409, description = "A capture is already running or was cancelled"),
        (status = 422, description = "The classifier rejected the image"),
        (status = 502, description = "Camera, gallery or classifier unreachable"),
        (status = 504, description = "No new image appeared after the capture")
    )
)]
pub async fn trigger_capture(
    State(state): State<ScanState>,
    Json(body): Json<CaptureRequest>,
) -> Result<Json<CaptureJob>, ApiError> {
    let category = body
        .category
        .unwrap_or_else(|| state.orchestrator.config().default_category.clone());

    if !is_supported_crop(&category) {
        return Err(ApiError::InvalidRequest(format!(
            "Unsupported crop type '{category}'"
        )));
    }

    Ok(Json(state.orchestrator.trigger(&category).await?))
}

#[utoipa::path(
    post,
    path = "/api/capture/cancel",
    tag = "capture",
    responses(
        (status = 200, description = "Cancel outcome", body = CancelOutcome)
    )
)]
pub async fn cancel_capture(State(state): State<ScanState>) -> Json<CancelOutcome> {
    Json(state.orchestrator.cancel().await)
}

#[utoipa::path(
    get,
    path = "/api/capture",
    tag = "capture",
    responses(
        (status = 200, description = "Active capture job, or null when idle", body = Option<CaptureJob>)
    )
)]
pub async fn get_current_capture(State(state): State<ScanState>) -> Json<Option<CaptureJob>> {
    Json(state.orchestrator.current().await)
}

#[utoipa::path(
    get,
    path = "/api/crops",
    tag = "capture",
    responses(
        (status = 200, description = "Supported crop categories", body = Vec<String>)
    )
)]
pub async fn get_crop_types() -> Json<&'static [&'static str]> {
    Json(CROP_TYPES)
}
