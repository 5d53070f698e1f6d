use agrisight_core::PumpError;
use axum::http::StatusCode;

use super::StatusCodeExt;

#[derive(Debug, thiserror::Error)]
pub enum IrrigationError {
    #[error("Sensor history unavailable: {0}")]
    SensorsUnavailable(String),

    #[error("No sensor reading recorded yet")]
    NoReading,

    #[error("Pump error: {0}")]
    Pump(#[from] PumpError),
}

impl StatusCodeExt for IrrigationError {
    fn status_code(&self) -> StatusCode {
        match self {
            IrrigationError::SensorsUnavailable(_) => StatusCode::BAD_GATEWAY,
            IrrigationError::NoReading => StatusCode::NOT_FOUND,
            IrrigationError::Pump(e) => e.status_code(),
        }
    }
}
