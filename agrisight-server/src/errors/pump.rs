use agrisight_core::PumpError;
use axum::http::StatusCode;

use super::StatusCodeExt;

impl StatusCodeExt for PumpError {
    fn status_code(&self) -> StatusCode {
        match self {
            PumpError::DeviceUnreachable(_) => StatusCode::BAD_GATEWAY,
            PumpError::CommandRejected(_) => StatusCode::BAD_GATEWAY,
            PumpError::Busy => StatusCode::CONFLICT,
        }
    }
}
