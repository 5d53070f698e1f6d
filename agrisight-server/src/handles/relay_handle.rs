use agrisight_core::PumpController;
use agrisight_core::models::{PumpAction, PumpState, PumpStatus, RelayAction};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct RelayState {
    pub pump: PumpController,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelayRequest {
    /// `on`, `off` or `status`
    pub action: RelayAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelayResponse {
    pub success: bool,
    pub state: PumpState,
}

pub fn relay_router(relay_state: RelayState) -> Router {
    Router::new()
        .route("/api/relay", post(control_relay))
        .route("/api/pump", get(get_pump_status))
        .with_state(relay_state)
}

#[utoipa::path(
    post,
    path = "/api/relay",
    tag = "pump",
    request_body = RelayRequest,
    responses(
        (status = 200, description = "Command confirmed by the relay", body = RelayResponse),
        (status = 409, description = "Another pump command is still pending"),
        (status = 502, description = "Relay unreachable or refused the command")
    )
)]
pub async fn control_relay(
    State(state): State<RelayState>,
    Json(body): Json<RelayRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    let pump_state = match body.action {
        RelayAction::Status => state.pump.query().await?,
        RelayAction::On => state.pump.command(PumpAction::On).await?.state,
        RelayAction::Off => state.pump.command(PumpAction::Off).await?.state,
    };

    Ok(Json(RelayResponse {
        success: true,
        state: pump_state,
    }))
}

#[utoipa::path(
    get,
    path = "/api/pump",
    tag = "pump",
    responses(
        (status = 200, description = "Last confirmed pump state", body = PumpStatus)
    )
)]
pub async fn get_pump_status(State(state): State<RelayState>) -> Json<PumpStatus> {
    Json(state.pump.status().await)
}
