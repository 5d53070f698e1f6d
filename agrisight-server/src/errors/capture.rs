use agrisight_core::CaptureError;
use axum::http::StatusCode;

use super::StatusCodeExt;

impl StatusCodeExt for CaptureError {
    fn status_code(&self) -> StatusCode {
        match self {
            CaptureError::Busy => StatusCode::CONFLICT,
            CaptureError::Cancelled => StatusCode::CONFLICT,
            CaptureError::DeviceUnreachable(_) => StatusCode::BAD_GATEWAY,
            CaptureError::StoreUnreachable(_) => StatusCode::BAD_GATEWAY,
            CaptureError::AnalysisUnreachable(_) => StatusCode::BAD_GATEWAY,
            CaptureError::TimedOut => StatusCode::GATEWAY_TIMEOUT,
            CaptureError::AnalysisRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}
