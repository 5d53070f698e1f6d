use agrisight_core::AutoCaptureScheduler;
use agrisight_core::models::ScheduleConfig;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::configs::is_supported_crop;
use crate::errors::ApiError;

#[derive(Clone)]
pub struct ScheduleState {
    pub scheduler: AutoCaptureScheduler,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateScheduleRequest {
    /// Seconds between captures, 0 disables
    pub interval_seconds: u64,
    /// Crop category for scheduled captures
    #[serde(default)]
    pub category: Option<String>,
}

pub fn schedule_router(schedule_state: ScheduleState) -> Router {
    Router::new()
        .route("/api/schedule", get(get_schedule).put(update_schedule))
        .with_state(schedule_state)
}

#[utoipa::path(
    get,
    path = "/api/schedule",
    tag = "schedule",
    responses(
        (status = 200, description = "Current auto-capture schedule", body = ScheduleConfig)
    )
)]
pub async fn get_schedule(State(state): State<ScheduleState>) -> Json<ScheduleConfig> {
    Json(state.scheduler.config().await)
}

#[utoipa::path(
    put,
    path = "/api/schedule",
    tag = "schedule",
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Schedule replaced", body = ScheduleConfig),
        (status = 400, description = "Unsupported crop category")
    )
)]
pub async fn update_schedule(
    State(state): State<ScheduleState>,
    Json(body): Json<UpdateScheduleRequest>,
) -> Result<Json<ScheduleConfig>, ApiError> {
    if let Some(category) = body.category {
        if !is_supported_crop(&category) {
            return Err(ApiError::InvalidRequest(format!(
                "Unsupported crop type '{category}'"
            )));
        }
        state.scheduler.set_category(category).await;
    }

    Ok(Json(state.scheduler.set_interval(body.interval_seconds).await))
}
