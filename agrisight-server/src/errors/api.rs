use agrisight_core::{CaptureError, PumpError};

use super::IrrigationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Pump error: {0}")]
    PumpError(#[from] PumpError),

    #[error("Capture error: {0}")]
    CaptureError(#[from] CaptureError),

    #[error("Irrigation error: {0}")]
    IrrigationError(#[from] IrrigationError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
