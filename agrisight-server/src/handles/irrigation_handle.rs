use std::sync::Arc;

use agrisight_core::models::SensorSnapshot;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::services::{IrrigationAdvice, IrrigationAdvisor, IrrigationRun};

#[derive(Clone)]
pub struct IrrigationState {
    pub advisor: Arc<IrrigationAdvisor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    pub moisture: f32,
    pub temperature: f32,
    pub humidity: f32,
}

pub fn irrigation_router(irrigation_state: IrrigationState) -> Router {
    Router::new()
        .route("/api/irrigation/recommendation", post(get_recommendation))
        .route("/api/irrigation/apply", post(apply_irrigation))
        .with_state(irrigation_state)
}

#[utoipa::path(
    post,
    path = "/api/irrigation/recommendation",
    tag = "irrigation",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Recommendation adjusted for live weather", body = IrrigationAdvice)
    )
)]
pub async fn get_recommendation(
    State(state): State<IrrigationState>,
    Json(body): Json<RecommendationRequest>,
) -> Json<IrrigationAdvice> {
    let sensor = SensorSnapshot::new(body.moisture, body.temperature, body.humidity);
    Json(state.advisor.advise(&sensor).await)
}

#[utoipa::path(
    post,
    path = "/api/irrigation/apply",
    tag = "irrigation",
    responses(
        (status = 200, description = "Recommendation evaluated and acted on", body = IrrigationRun),
        (status = 404, description = "No sensor reading recorded yet"),
        (status = 409, description = "Another pump command is still pending"),
        (status = 502, description = "Sensor history or relay unreachable")
    )
)]
pub async fn apply_irrigation(
    State(state): State<IrrigationState>,
) -> Result<Json<IrrigationRun>, ApiError> {
    Ok(Json(state.advisor.apply().await?))
}
