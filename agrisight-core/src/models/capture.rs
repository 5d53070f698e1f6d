use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CaptureError;

/// An image stored by the dashboard, newest first in listings.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub image_path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Detected disease label, or a healthy label
    pub disease: String,
    /// Classifier confidence in 0..1
    pub confidence: f32,
    pub description: String,
}

/// What the classification service answered for one artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Classified(Classification),
    /// The service understood the request and refused it.
    Rejected(String),
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Triggering,
    AwaitingArtifact,
    Analyzing,
    Complete,
    Failed,
    TimedOut,
}

impl CaptureState {
    /// States in which cancelling ends the job right away.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            CaptureState::Triggering | CaptureState::AwaitingArtifact
        )
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureJob {
    pub id: Uuid,
    pub state: CaptureState,
    /// Camera the job was triggered on
    pub device_address: String,
    /// Crop category submitted for classification
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub triggered_at: OffsetDateTime,
    pub artifact: Option<Artifact>,
    pub analysis: Option<Classification>,
    pub error: Option<CaptureError>,
}

impl CaptureJob {
    pub fn new(device_address: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: CaptureState::Triggering,
            device_address: device_address.into(),
            category: category.into(),
            triggered_at: OffsetDateTime::now_utc(),
            artifact: None,
            analysis: None,
            error: None,
        }
    }
}
