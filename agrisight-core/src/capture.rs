//! One-at-a-time capture pipeline: trigger the camera, wait for the upload to
//! land in the artifact store, then have it classified.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast, watch};
use uuid::Uuid;

use crate::error::CaptureError;
use crate::models::{AnalysisOutcome, Artifact, CaptureJob, CaptureState, Classification};
use crate::ports::{AnalysisClient, ArtifactStore, CameraDevice};

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Time the camera gets to upload before the store is checked.
    pub grace_period: Duration,
    pub default_category: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(3_000),
            default_category: "general".to_string(),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "job", rename_all = "snake_case")]
pub enum CancelOutcome {
    /// The job ended immediately.
    Cancelled(CaptureJob),
    /// The job is being analysed; its result will be discarded.
    Advisory(CaptureJob),
    NothingToCancel,
}

struct ActiveJob {
    job: CaptureJob,
    cancel: watch::Sender<bool>,
    cancel_requested: bool,
}

struct Shared {
    camera: Arc<dyn CameraDevice>,
    store: Arc<dyn ArtifactStore>,
    analysis: Arc<dyn AnalysisClient>,
    config: CaptureConfig,
    active: Mutex<Option<ActiveJob>>,
    sender: broadcast::Sender<CaptureJob>,
}

#[derive(Clone)]
pub struct CaptureOrchestrator {
    inner: Arc<Shared>,
}

impl CaptureOrchestrator {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        store: Arc<dyn ArtifactStore>,
        analysis: Arc<dyn AnalysisClient>,
        config: CaptureConfig,
    ) -> Self {
        let (sender, _) = broadcast::channel(32);

        Self {
            inner: Arc::new(Shared {
                camera,
                store,
                analysis,
                config,
                active: Mutex::new(None),
                sender,
            }),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.inner.config
    }

    /// Every job that reaches a terminal state, including cancelled ones.
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureJob> {
        self.inner.sender.subscribe()
    }

    pub async fn current(&self) -> Option<CaptureJob> {
        self.inner
            .active
            .lock()
            .await
            .as_ref()
            .map(|active| active.job.clone())
    }

    /// Runs one capture to completion. Only a `Complete` job is returned as `Ok`.
    ///
    /// The pipeline runs on its own task, so the job still reaches a terminal
    /// state and frees the orchestrator when the caller goes away.
    pub async fn trigger(&self, category: &str) -> Result<CaptureJob, CaptureError> {
        let (job, cancelled) = self.begin(category).await?;
        tracing::info!(job_id = %job.id, category, "Capture triggered");

        let job_id = job.id;
        let orchestrator = self.clone();
        match tokio::spawn(async move { orchestrator.run(job, cancelled).await }).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(%job_id, error = %e, "Capture task failed");
                self.conclude(job_id, Err(CaptureError::Cancelled)).await
            }
        }
    }

    async fn run(
        &self,
        job: CaptureJob,
        mut cancelled: watch::Receiver<bool>,
    ) -> Result<CaptureJob, CaptureError> {
        if let Err(e) = self.inner.camera.trigger_capture().await {
            return self
                .conclude(job.id, Err(CaptureError::DeviceUnreachable(e.to_string())))
                .await;
        }

        self.advance(job.id, CaptureState::AwaitingArtifact, None)
            .await?;
        tokio::select! {
            _ = tokio::time::sleep(self.inner.config.grace_period) => {}
            _ = cancellation(&mut cancelled) => return Err(CaptureError::Cancelled),
        }

        let artifacts = match self.inner.store.list_artifacts().await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                return self
                    .conclude(job.id, Err(CaptureError::StoreUnreachable(e.to_string())))
                    .await;
            }
        };
        let Some(artifact) = newest_after(artifacts, job.triggered_at) else {
            return self.conclude(job.id, Err(CaptureError::TimedOut)).await;
        };

        let artifact_id = artifact.id;
        self.advance(job.id, CaptureState::Analyzing, Some(artifact))
            .await?;

        let outcome = match self.inner.analysis.analyze(artifact_id, &job.category).await {
            Ok(AnalysisOutcome::Classified(classification)) => Ok(classification),
            Ok(AnalysisOutcome::Rejected(message)) => Err(CaptureError::AnalysisRejected(message)),
            Err(e) => Err(CaptureError::AnalysisUnreachable(e.to_string())),
        };
        self.conclude(job.id, outcome).await
    }

    pub async fn cancel(&self) -> CancelOutcome {
        let mut active = self.inner.active.lock().await;

        match active.take() {
            Some(slot) if slot.job.state.is_cancellable() => {
                let _ = slot.cancel.send(true);
                let mut job = slot.job;
                job.state = CaptureState::Failed;
                job.error = Some(CaptureError::Cancelled);
                drop(active);

                tracing::info!(job_id = %job.id, "Capture cancelled");
                self.publish(&job);
                CancelOutcome::Cancelled(job)
            }
            Some(mut slot) => {
                slot.cancel_requested = true;
                let job = slot.job.clone();
                *active = Some(slot);

                tracing::info!(job_id = %job.id, "Cancel requested during analysis");
                CancelOutcome::Advisory(job)
            }
            None => CancelOutcome::NothingToCancel,
        }
    }

    async fn begin(&self, category: &str) -> Result<(CaptureJob, watch::Receiver<bool>), CaptureError> {
        let mut active = self.inner.active.lock().await;
        if let Some(slot) = active.as_ref() {
            tracing::debug!(job_id = %slot.job.id, "Capture already in progress");
            return Err(CaptureError::Busy);
        }

        let job = CaptureJob::new(self.inner.camera.address(), category);
        let (cancel, cancelled) = watch::channel(false);
        *active = Some(ActiveJob {
            job: job.clone(),
            cancel,
            cancel_requested: false,
        });

        Ok((job, cancelled))
    }

    /// Moves the job forward if it is still the active one.
    async fn advance(
        &self,
        job_id: Uuid,
        state: CaptureState,
        artifact: Option<Artifact>,
    ) -> Result<(), CaptureError> {
        let mut active = self.inner.active.lock().await;
        match active.as_mut() {
            Some(slot) if slot.job.id == job_id => {
                slot.job.state = state;
                if artifact.is_some() {
                    slot.job.artifact = artifact;
                }
                tracing::debug!(%job_id, ?state, "Capture advanced");
                Ok(())
            }
            _ => Err(CaptureError::Cancelled),
        }
    }

    /// Ends the job, frees the orchestrator and publishes the terminal job.
    async fn conclude(
        &self,
        job_id: Uuid,
        outcome: Result<Classification, CaptureError>,
    ) -> Result<CaptureJob, CaptureError> {
        let slot = {
            let mut active = self.inner.active.lock().await;
            match active.take_if(|slot| slot.job.id == job_id) {
                Some(slot) => slot,
                None => return Err(CaptureError::Cancelled),
            }
        };

        let outcome = if slot.cancel_requested {
            Err(CaptureError::Cancelled)
        } else {
            outcome
        };

        let mut job = slot.job;
        match &outcome {
            Ok(classification) => {
                job.state = CaptureState::Complete;
                job.analysis = Some(classification.clone());
            }
            Err(e) => {
                job.state = match e {
                    CaptureError::TimedOut => CaptureState::TimedOut,
                    _ => CaptureState::Failed,
                };
                job.error = Some(e.clone());
            }
        }

        tracing::info!(job_id = %job.id, state = ?job.state, error = ?job.error, "Capture finished");
        self.publish(&job);

        outcome.map(|_| job)
    }

    fn publish(&self, job: &CaptureJob) {
        let _ = self.inner.sender.send(job.clone());
    }
}

/// Resolves once the job is cancelled or its slot is gone.
async fn cancellation(cancelled: &mut watch::Receiver<bool>) {
    let _ = cancelled.wait_for(|flag| *flag).await;
}

fn newest_after(artifacts: Vec<Artifact>, triggered_at: OffsetDateTime) -> Option<Artifact> {
    artifacts
        .into_iter()
        .filter(|artifact| artifact.timestamp > triggered_at)
        .max_by_key(|artifact| artifact.timestamp)
}
