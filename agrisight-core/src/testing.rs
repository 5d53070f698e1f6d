//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::TransportError;
use crate::models::*;
use crate::ports::{AnalysisClient, ArtifactStore, CameraDevice, PumpDevice};

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Default)]
pub struct MockCamera {
    pub triggers: AtomicUsize,
    pub unreachable: bool,
    pub delay: Duration,
}

impl MockCamera {
    pub fn triggers(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    fn address(&self) -> &str {
        "192.168.4.1"
    }

    async fn trigger_capture(&self) -> Result<(), TransportError> {
        self.triggers.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        if self.unreachable {
            return Err(TransportError::Http("connection refused".to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), TransportError> {
        if self.unreachable {
            return Err(TransportError::Http("connection refused".to_string()));
        }
        Ok(())
    }
}

#[derive(Default, Clone, Copy)]
pub enum Gallery {
    /// One artifact stored after the trigger.
    #[default]
    Fresh,
    /// Only an artifact older than the trigger.
    Stale,
    Empty,
    Unreachable,
}

#[derive(Default)]
pub struct MockStore {
    pub gallery: Gallery,
    pub listings: AtomicUsize,
}

impl MockStore {
    pub fn with(gallery: Gallery) -> Self {
        Self {
            gallery,
            ..Default::default()
        }
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

pub fn artifact(id: i64, timestamp: OffsetDateTime) -> Artifact {
    Artifact {
        id,
        image_path: format!("uploads/scan_{id}.jpg"),
        timestamp,
        disease: None,
        confidence: None,
    }
}

#[async_trait]
impl ArtifactStore for MockStore {
    async fn list_artifacts(&self) -> Result<Vec<Artifact>, TransportError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        let now = OffsetDateTime::now_utc();
        match self.gallery {
            Gallery::Fresh => Ok(vec![
                artifact(7, now + time::Duration::seconds(1)),
                artifact(6, now - time::Duration::hours(1)),
            ]),
            Gallery::Stale => Ok(vec![artifact(6, now - time::Duration::hours(1))]),
            Gallery::Empty => Ok(Vec::new()),
            Gallery::Unreachable => Err(TransportError::Status(503)),
        }
    }
}

pub struct MockAnalysis {
    pub outcome: Result<AnalysisOutcome, TransportError>,
    pub delay: Duration,
    pub requests: Mutex<Vec<(i64, String)>>,
}

impl MockAnalysis {
    pub fn classifying(disease: &str) -> Self {
        Self::answering(Ok(AnalysisOutcome::Classified(Classification {
            disease: disease.to_string(),
            confidence: 0.92,
            description: "Leaf spots consistent with infection".to_string(),
        })))
    }

    pub fn answering(outcome: Result<AnalysisOutcome, TransportError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<(i64, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisClient for MockAnalysis {
    async fn analyze(
        &self,
        artifact_id: i64,
        category: &str,
    ) -> Result<AnalysisOutcome, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((artifact_id, category.to_string()));
        pause(self.delay).await;
        self.outcome.clone()
    }
}

/// Relay that follows its script, then confirms every request.
#[derive(Default)]
pub struct MockPump {
    pub script: Mutex<VecDeque<Result<PumpResponse, TransportError>>>,
    pub requests: Mutex<Vec<RelayAction>>,
    pub reported: Mutex<Option<PumpAction>>,
    pub delay: Duration,
}

impl MockPump {
    pub fn scripted(responses: Vec<Result<PumpResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<RelayAction> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn unreachable() -> Result<PumpResponse, TransportError> {
    Err(TransportError::Http("timed out".to_string()))
}

#[async_trait]
impl PumpDevice for MockPump {
    async fn send(&self, request: PumpRequest) -> Result<PumpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.action);
        pause(self.delay).await;

        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return response;
        }

        let mut reported = self.reported.lock().unwrap();
        match request.action {
            RelayAction::On => *reported = Some(PumpAction::On),
            RelayAction::Off => *reported = Some(PumpAction::Off),
            RelayAction::Status => {}
        }
        Ok(PumpResponse {
            success: true,
            state: *reported,
        })
    }
}
