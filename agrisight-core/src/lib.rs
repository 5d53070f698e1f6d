pub mod capture;
pub mod engine;
pub mod error;
pub mod models;
pub mod ports;
pub mod pump;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use capture::{CancelOutcome, CaptureConfig, CaptureOrchestrator};
pub use error::{CaptureError, PumpError, TransportError};
pub use pump::{PumpConfig, PumpController};
pub use scheduler::AutoCaptureScheduler;
