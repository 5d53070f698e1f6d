//! Contracts for the remote collaborators the core drives.
//!
//! Implementations live in the server crate (HTTP) and in the test suites (in-memory).

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{AnalysisOutcome, Artifact, PumpRequest, PumpResponse, SensorSnapshot, WeatherSnapshot};

#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Address reported on capture jobs.
    fn address(&self) -> &str;

    /// Asks the camera to take and upload one picture. Any 2xx answer counts as accepted.
    async fn trigger_capture(&self) -> Result<(), TransportError>;

    /// Health check of the board.
    async fn ping(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stored artifacts, newest first.
    async fn list_artifacts(&self) -> Result<Vec<Artifact>, TransportError>;
}

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(
        &self,
        artifact_id: i64,
        category: &str,
    ) -> Result<AnalysisOutcome, TransportError>;
}

#[async_trait]
pub trait PumpDevice: Send + Sync {
    async fn send(&self, request: PumpRequest) -> Result<PumpResponse, TransportError>;
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> Result<WeatherSnapshot, TransportError>;
}

#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Most recent complete reading, if any was ever recorded.
    async fn latest(&self) -> Result<Option<SensorSnapshot>, TransportError>;
}
