//! Actuator state machine for the irrigation pump.
//!
//! The controller is the only place that talks to the relay. It keeps the last
//! state the device confirmed, lets one command be in flight at a time and
//! switches the pump off on its own when it has been running for longer than
//! the safety timeout.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::error::PumpError;
use crate::models::{PendingCommand, PumpAction, PumpRequest, PumpResponse, PumpState, PumpStatus};
use crate::ports::PumpDevice;

#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Longest time the pump may run before it is forced off.
    pub safety_timeout: Duration,
    /// Delay between attempts when the forced shutoff fails.
    pub shutoff_retry: Duration,
}

/// Floor for `shutoff_retry`, so a failing relay is not hammered.
pub const MIN_SHUTOFF_RETRY: Duration = Duration::from_secs(1);

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            safety_timeout: Duration::from_millis(300_000),
            shutoff_retry: Duration::from_millis(5_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Operator,
    SafetyTimer(u64),
}

struct SafetyTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ControllerState {
    status: PumpStatus,
    safety_timer: Option<SafetyTimer>,
    generation: u64,
}

impl ControllerState {
    fn owns_timer(&self, generation: u64) -> bool {
        self.safety_timer
            .as_ref()
            .is_some_and(|timer| timer.generation == generation)
    }

    fn disarm_safety_timer(&mut self, origin: Origin) {
        self.status.run_id = None;
        if let Some(timer) = self.safety_timer.take() {
            // The timer's own shutoff lets its task finish normally.
            if origin != Origin::SafetyTimer(timer.generation) {
                timer.handle.abort();
            }
            tracing::debug!(generation = timer.generation, "Safety timer disarmed");
        }
    }
}

struct Shared {
    device: Arc<dyn PumpDevice>,
    config: PumpConfig,
    state: Mutex<ControllerState>,
    sender: broadcast::Sender<PumpStatus>,
}

#[derive(Clone)]
pub struct PumpController {
    inner: Arc<Shared>,
}

impl PumpController {
    pub fn new(device: Arc<dyn PumpDevice>, mut config: PumpConfig) -> Self {
        let (sender, _) = broadcast::channel(32);

        if config.shutoff_retry < MIN_SHUTOFF_RETRY {
            tracing::warn!(
                configured = ?config.shutoff_retry,
                minimum = ?MIN_SHUTOFF_RETRY,
                "Shutoff retry too short, using the minimum"
            );
            config.shutoff_retry = MIN_SHUTOFF_RETRY;
        }

        Self {
            inner: Arc::new(Shared {
                device,
                config,
                state: Mutex::new(ControllerState::default()),
                sender,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PumpStatus> {
        self.inner.sender.subscribe()
    }

    pub async fn status(&self) -> PumpStatus {
        self.inner.state.lock().await.status
    }

    /// Asks the relay for its state. A failed query never changes the stored state.
    pub async fn query(&self) -> Result<PumpState, PumpError> {
        let response = self
            .inner
            .device
            .send(PumpRequest::status())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Pump status query failed");
                PumpError::DeviceUnreachable(e.to_string())
            })?;

        let reported = match response {
            PumpResponse {
                success: true,
                state: Some(reported),
            } => reported,
            _ => {
                return Err(PumpError::DeviceUnreachable(
                    "Pump did not report its state".to_string(),
                ));
            }
        };

        let mut state = self.inner.state.lock().await;
        if state.status.pending_command.is_some() {
            tracing::debug!(%reported, "Command in flight, ignoring status report");
            return Ok(reported.into());
        }

        state.status.state = reported.into();
        state.status.last_confirmed_at = Some(OffsetDateTime::now_utc());
        match reported {
            // Found running without a timer, e.g. after a restart.
            PumpAction::On if state.safety_timer.is_none() => self.arm_safety_timer(&mut state),
            PumpAction::Off => state.disarm_safety_timer(Origin::Operator),
            PumpAction::On => {}
        }
        self.publish(state.status);

        Ok(reported.into())
    }

    pub async fn command(&self, action: PumpAction) -> Result<PumpStatus, PumpError> {
        self.dispatch(action, Origin::Operator).await
    }

    /// Runs the exchange on its own task. A caller that goes away mid-command
    /// cannot leave the command pending or an `On` without its safety timer.
    async fn dispatch(
        &self,
        action: PumpAction,
        origin: Origin,
    ) -> Result<PumpStatus, PumpError> {
        let controller = self.clone();

        tokio::spawn(async move { controller.issue(action, origin).await })
            .await
            .map_err(|e| {
                tracing::error!(%action, error = %e, "Pump command task failed");
                PumpError::DeviceUnreachable(e.to_string())
            })?
    }

    async fn issue(&self, action: PumpAction, origin: Origin) -> Result<PumpStatus, PumpError> {
        {
            let mut state = self.inner.state.lock().await;

            if let Origin::SafetyTimer(generation) = origin {
                if !state.owns_timer(generation) || state.status.state != PumpState::On {
                    tracing::debug!(generation, "Safety timer superseded, skipping shutoff");
                    return Ok(state.status);
                }
                tracing::warn!(generation, "Safety timeout reached, switching pump off");
            }

            if let Some(pending) = state.status.pending_command {
                tracing::debug!(%action, pending = %pending.action, "Pump busy");
                return Err(PumpError::Busy);
            }

            state.status.pending_command = Some(PendingCommand {
                action,
                issued_at: OffsetDateTime::now_utc(),
            });
        }

        tracing::info!(%action, ?origin, "Sending pump command");
        let response = self.inner.device.send(action.into()).await;

        let mut state = self.inner.state.lock().await;
        state.status.pending_command = None;

        let result = match response {
            Ok(PumpResponse { success: true, .. }) => {
                state.status.state = action.into();
                state.status.last_confirmed_at = Some(OffsetDateTime::now_utc());
                match action {
                    PumpAction::On => self.arm_safety_timer(&mut state),
                    PumpAction::Off => state.disarm_safety_timer(origin),
                }
                tracing::info!(%action, "Pump command confirmed");
                Ok(state.status)
            }
            Ok(_) => {
                tracing::warn!(%action, "Pump rejected command");
                Err(PumpError::CommandRejected(action))
            }
            Err(e) => {
                tracing::warn!(%action, error = %e, "Pump unreachable");
                Err(PumpError::DeviceUnreachable(e.to_string()))
            }
        };
        self.publish(state.status);

        result
    }

    fn arm_safety_timer(&self, state: &mut ControllerState) {
        if let Some(previous) = state.safety_timer.take() {
            previous.handle.abort();
        }

        state.generation += 1;
        let generation = state.generation;
        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.enforce_shutoff(generation).await });

        state.safety_timer = Some(SafetyTimer { generation, handle });
        state.status.run_id = Some(generation);
        tracing::debug!(
            generation,
            timeout = ?self.inner.config.safety_timeout,
            "Safety timer armed"
        );
    }

    async fn enforce_shutoff(self, generation: u64) {
        tokio::time::sleep(self.inner.config.safety_timeout).await;

        loop {
            match self
                .dispatch(PumpAction::Off, Origin::SafetyTimer(generation))
                .await
            {
                Ok(_) => return,
                Err(e) => {
                    tracing::error!(
                        generation,
                        error = %e,
                        retry_in = ?self.inner.config.shutoff_retry,
                        "Safety shutoff failed"
                    );
                    tokio::time::sleep(self.inner.config.shutoff_retry).await;
                }
            }
        }
    }

    fn publish(&self, status: PumpStatus) {
        // No subscribers is fine.
        let _ = self.inner.sender.send(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelayAction;
    use crate::testing::{MockPump, unreachable};

    fn controller(device: &Arc<MockPump>) -> PumpController {
        PumpController::new(device.clone(), PumpConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_confirms_reported_state() {
        let device = Arc::new(MockPump::default());
        *device.reported.lock().unwrap() = Some(PumpAction::Off);
        let pump = controller(&device);

        assert_eq!(pump.status().await.state, PumpState::Unknown);
        assert_eq!(pump.query().await, Ok(PumpState::Off));

        let status = pump.status().await;
        assert_eq!(status.state, PumpState::Off);
        assert!(status.last_confirmed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_query_keeps_state() {
        let device = Arc::new(MockPump::scripted(vec![unreachable()]));
        let pump = controller(&device);

        assert!(matches!(
            pump.query().await,
            Err(PumpError::DeviceUnreachable(_))
        ));

        let status = pump.status().await;
        assert_eq!(status.state, PumpState::Unknown);
        assert_eq!(status.last_confirmed_at, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safety_shutoff_after_timeout() {
        let device = Arc::new(MockPump::default());
        let pump = controller(&device);

        let status = pump.command(PumpAction::On).await.unwrap();
        assert_eq!(status.state, PumpState::On);

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(pump.status().await.state, PumpState::On);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(pump.status().await.state, PumpState::Off);
        assert_eq!(device.requests(), vec![RelayAction::On, RelayAction::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_off_cancels_safety_timer() {
        let device = Arc::new(MockPump::default());
        let pump = controller(&device);

        pump.command(PumpAction::On).await.unwrap();
        tokio::time::sleep(Duration::from_secs(100)).await;
        pump.command(PumpAction::Off).await.unwrap();
        tokio::time::sleep(Duration::from_secs(400)).await;

        assert_eq!(device.requests(), vec![RelayAction::On, RelayAction::Off]);
        assert_eq!(pump.status().await.state, PumpState::Off);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_timer_does_not_fire() {
        let device = Arc::new(MockPump::default());
        let pump = controller(&device);

        pump.command(PumpAction::On).await.unwrap();
        tokio::time::sleep(Duration::from_secs(100)).await;
        pump.command(PumpAction::Off).await.unwrap();
        tokio::time::sleep(Duration::from_secs(100)).await;
        pump.command(PumpAction::On).await.unwrap();

        // The first timer would have expired at 300s.
        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(pump.status().await.state, PumpState::On);
        assert_eq!(device.requests().len(), 3);

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(pump.status().await.state, PumpState::Off);
        assert_eq!(
            device.requests(),
            vec![
                RelayAction::On,
                RelayAction::Off,
                RelayAction::On,
                RelayAction::Off
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_command_while_pending_is_busy() {
        let device = Arc::new(MockPump {
            delay: Duration::from_secs(1),
            ..Default::default()
        });
        let pump = controller(&device);

        let first = tokio::spawn({
            let pump = pump.clone();
            async move { pump.command(PumpAction::On).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            pump.status().await.pending_command.map(|p| p.action),
            Some(PumpAction::On)
        );
        assert_eq!(pump.command(PumpAction::Off).await, Err(PumpError::Busy));

        let status = first.await.unwrap().unwrap();
        assert_eq!(status.state, PumpState::On);
        assert_eq!(status.pending_command, None);
        assert_eq!(device.requests(), vec![RelayAction::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_command_keeps_last_state() {
        let device = Arc::new(MockPump::scripted(vec![unreachable()]));
        let pump = controller(&device);

        assert!(matches!(
            pump.command(PumpAction::On).await,
            Err(PumpError::DeviceUnreachable(_))
        ));
        assert_eq!(pump.status().await.state, PumpState::Unknown);

        // No implicit retry and no timer armed.
        tokio::time::sleep(Duration::from_secs(400)).await;
        assert_eq!(device.requests(), vec![RelayAction::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_command() {
        let device = Arc::new(MockPump::scripted(vec![Ok(PumpResponse {
            success: false,
            state: None,
        })]));
        let pump = controller(&device);

        assert_eq!(
            pump.command(PumpAction::On).await,
            Err(PumpError::CommandRejected(PumpAction::On))
        );
        assert_eq!(pump.status().await.pending_command, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safety_shutoff_retries_until_confirmed() {
        let device = Arc::new(MockPump::scripted(vec![
            Ok(PumpResponse {
                success: true,
                state: Some(PumpAction::On),
            }),
            unreachable(),
            unreachable(),
        ]));
        let pump = controller(&device);

        pump.command(PumpAction::On).await.unwrap();
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(pump.status().await.state, PumpState::On);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(pump.status().await.state, PumpState::Off);
        assert_eq!(
            device.requests(),
            vec![
                RelayAction::On,
                RelayAction::Off,
                RelayAction::Off,
                RelayAction::Off
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_reporting_on_arms_safety_timer() {
        let device = Arc::new(MockPump::default());
        *device.reported.lock().unwrap() = Some(PumpAction::On);
        let pump = controller(&device);

        assert_eq!(pump.query().await, Ok(PumpState::On));
        tokio::time::sleep(Duration::from_secs(301)).await;

        assert_eq!(pump.status().await.state, PumpState::Off);
        assert_eq!(device.requests(), vec![RelayAction::Status, RelayAction::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_command_still_completes() {
        let device = Arc::new(MockPump {
            delay: Duration::from_secs(2),
            ..Default::default()
        });
        let pump = controller(&device);
        pump.command(PumpAction::On).await.unwrap();

        let caller = tokio::spawn({
            let pump = pump.clone();
            async move { pump.command(PumpAction::Off).await }
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
        caller.abort();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let status = pump.status().await;
        assert_eq!(status.pending_command, None);
        assert_eq!(status.state, PumpState::Off);
        assert_eq!(status.run_id, None);

        let status = pump.command(PumpAction::On).await.unwrap();
        assert_eq!(status.state, PumpState::On);
        assert_eq!(
            device.requests(),
            vec![RelayAction::On, RelayAction::Off, RelayAction::On]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_on_still_arms_safety_timer() {
        let device = Arc::new(MockPump {
            delay: Duration::from_secs(2),
            ..Default::default()
        });
        let pump = controller(&device);

        let caller = tokio::spawn({
            let pump = pump.clone();
            async move { pump.command(PumpAction::On).await }
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
        caller.abort();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let status = pump.status().await;
        assert_eq!(status.state, PumpState::On);
        assert!(status.run_id.is_some());

        // Armed at 2s, fires at 302s, confirmed at 304s.
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(pump.status().await.state, PumpState::Off);
        assert_eq!(device.requests(), vec![RelayAction::On, RelayAction::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_report_keeps_run_id() {
        let device = Arc::new(MockPump::default());
        let pump = controller(&device);

        let run_id = pump.command(PumpAction::On).await.unwrap().run_id;
        assert!(run_id.is_some());

        assert_eq!(pump.query().await, Ok(PumpState::On));
        assert_eq!(pump.status().await.run_id, run_id);

        pump.command(PumpAction::Off).await.unwrap();
        assert_eq!(pump.status().await.run_id, None);

        let next = pump.command(PumpAction::On).await.unwrap().run_id;
        assert!(next.is_some());
        assert_ne!(next, run_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_shutoff_retry_uses_minimum() {
        let device = Arc::new(MockPump::scripted(vec![
            Ok(PumpResponse {
                success: true,
                state: Some(PumpAction::On),
            }),
            unreachable(),
            unreachable(),
        ]));
        let pump = PumpController::new(
            device.clone(),
            PumpConfig {
                safety_timeout: Duration::from_secs(10),
                shutoff_retry: Duration::ZERO,
            },
        );

        pump.command(PumpAction::On).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(device.requests(), vec![RelayAction::On, RelayAction::Off]);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(device.requests().len(), 3);
        assert_eq!(pump.status().await.state, PumpState::On);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(device.requests().len(), 4);
        assert_eq!(pump.status().await.state, PumpState::Off);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_changes_are_published() {
        let device = Arc::new(MockPump::default());
        let pump = controller(&device);
        let mut receiver = pump.subscribe();

        pump.command(PumpAction::On).await.unwrap();

        let published = receiver.recv().await.unwrap();
        assert_eq!(published.state, PumpState::On);
        assert_eq!(published.pending_command, None);
    }
}
