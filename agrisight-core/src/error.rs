use serde::{Deserialize, Serialize};

use crate::models::PumpAction;

/// Failure talking to a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Unexpected status code {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PumpError {
    #[error("Pump device unreachable: {0}")]
    DeviceUnreachable(String),

    #[error("Pump rejected command '{0}'")]
    CommandRejected(PumpAction),

    #[error("Another pump command is still pending")]
    Busy,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum CaptureError {
    #[error("A capture is already in progress")]
    Busy,

    #[error("Camera unreachable: {0}")]
    DeviceUnreachable(String),

    #[error("Artifact store unreachable: {0}")]
    StoreUnreachable(String),

    #[error("No new image appeared after the capture")]
    TimedOut,

    #[error("Analysis rejected: {0}")]
    AnalysisRejected(String),

    #[error("Analysis service unreachable: {0}")]
    AnalysisUnreachable(String),

    #[error("Capture cancelled")]
    Cancelled,
}
