use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::capture::CaptureOrchestrator;
use crate::error::CaptureError;
use crate::models::ScheduleConfig;

struct SchedulerState {
    config: ScheduleConfig,
    category: String,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    orchestrator: CaptureOrchestrator,
    state: Mutex<SchedulerState>,
}

/// Periodically triggers captures. At most one timer is armed at any time.
#[derive(Clone)]
pub struct AutoCaptureScheduler {
    inner: Arc<Shared>,
}

impl AutoCaptureScheduler {
    pub fn new(orchestrator: CaptureOrchestrator, category: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Shared {
                orchestrator,
                state: Mutex::new(SchedulerState {
                    config: ScheduleConfig::default(),
                    category: category.into(),
                    generation: 0,
                    timer: None,
                }),
            }),
        }
    }

    pub async fn config(&self) -> ScheduleConfig {
        self.inner.state.lock().await.config
    }

    pub async fn set_category(&self, category: impl Into<String>) {
        self.inner.state.lock().await.category = category.into();
    }

    /// Replaces the current timer. `0` disables automatic capture.
    pub async fn set_interval(&self, seconds: u64) -> ScheduleConfig {
        let mut state = self.inner.state.lock().await;

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.config = ScheduleConfig::every(seconds);

        if seconds == 0 {
            tracing::info!("Auto-capture disabled");
            return state.config;
        }

        let generation = state.generation;
        let scheduler = self.clone();
        state.timer = Some(tokio::spawn(async move {
            scheduler
                .run(generation, Duration::from_secs(seconds))
                .await
        }));

        tracing::info!(interval_seconds = seconds, "Auto-capture armed");
        state.config
    }

    async fn run(self, generation: u64, period: Duration) {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let category = {
                let state = self.inner.state.lock().await;
                if state.generation != generation {
                    return;
                }
                state.category.clone()
            };

            let orchestrator = self.inner.orchestrator.clone();
            tokio::spawn(async move {
                match orchestrator.trigger(&category).await {
                    Ok(job) => {
                        tracing::info!(job_id = %job.id, "Scheduled capture complete")
                    }
                    Err(CaptureError::Busy) => {
                        tracing::debug!("Capture still running, skipping scheduled tick")
                    }
                    Err(e) => tracing::warn!(error = %e, "Scheduled capture failed"),
                }
            });
        }
    }
}
