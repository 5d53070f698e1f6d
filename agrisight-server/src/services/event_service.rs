use agrisight_core::models::{CaptureJob, PumpStatus};
use agrisight_core::{CaptureOrchestrator, PumpController};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::{Receiver, Sender};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServiceEvent {
    PumpStatus(PumpStatus),
    CaptureFinished(CaptureJob),
}

/// Republishes pump and capture updates on the dashboard event channel.
pub fn forward_events(
    pump: &PumpController,
    capture: &CaptureOrchestrator,
    sender: Sender<ServiceEvent>,
) {
    tokio::spawn(relay(pump.subscribe(), sender.clone(), ServiceEvent::PumpStatus));
    tokio::spawn(relay(capture.subscribe(), sender, ServiceEvent::CaptureFinished));
}

async fn relay<T: Clone + Send + 'static>(
    mut receiver: Receiver<T>,
    sender: Sender<ServiceEvent>,
    wrap: fn(T) -> ServiceEvent,
) {
    loop {
        match receiver.recv().await {
            Ok(update) => {
                // Nobody listening is fine.
                let _ = sender.send(wrap(update));
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event forwarder lagged behind");
            }
            Err(RecvError::Closed) => return,
        }
    }
}
