use std::sync::Arc;

use agrisight_core::models::{CaptureJob, PumpStatus, ScheduleConfig};
use agrisight_core::ports::CameraDevice;
use agrisight_core::{AutoCaptureScheduler, CaptureOrchestrator, PumpController};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone)]
pub struct StatusState {
    pub camera: Arc<dyn CameraDevice>,
    pub pump: PumpController,
    pub orchestrator: CaptureOrchestrator,
    pub scheduler: AutoCaptureScheduler,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceStatus {
    /// Whether the board answered the health check
    pub connected: bool,
    pub device_address: String,
    pub pump: PumpStatus,
    pub schedule: ScheduleConfig,
    pub capture: Option<CaptureJob>,
}

pub fn status_router(status_state: StatusState) -> Router {
    Router::new()
        .route("/api/status", get(get_device_status))
        .with_state(status_state)
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "Device health and controller state", body = DeviceStatus)
    )
)]
pub async fn get_device_status(State(state): State<StatusState>) -> Json<DeviceStatus> {
    let connected = match state.camera.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Device health check failed");
            false
        }
    };

    Json(DeviceStatus {
        connected,
        device_address: state.camera.address().to_string(),
        pump: state.pump.status().await,
        schedule: state.scheduler.config().await,
        capture: state.orchestrator.current().await,
    })
}
