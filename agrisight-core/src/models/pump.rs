use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A state change the operator (or the safety timer) can ask of the pump.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpAction {
    On,
    Off,
}

impl PumpAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PumpAction::On => "on",
            PumpAction::Off => "off",
        }
    }
}

impl fmt::Display for PumpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpState {
    Off,
    On,
    #[default]
    Unknown,
}

impl From<PumpAction> for PumpState {
    fn from(action: PumpAction) -> Self {
        match action {
            PumpAction::On => PumpState::On,
            PumpAction::Off => PumpState::Off,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommand {
    pub action: PumpAction,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpStatus {
    /// Last state confirmed by the device
    pub state: PumpState,
    /// When the device last confirmed `state`
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_confirmed_at: Option<OffsetDateTime>,
    /// Command sent to the device and not yet answered
    pub pending_command: Option<PendingCommand>,
    /// Identifies the current run while the pump is on. Status reports leave it alone.
    #[serde(default)]
    pub run_id: Option<u64>,
}

/// Wire action understood by the relay firmware.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayAction {
    On,
    Off,
    Status,
}

impl From<PumpAction> for RelayAction {
    fn from(action: PumpAction) -> Self {
        match action {
            PumpAction::On => RelayAction::On,
            PumpAction::Off => RelayAction::Off,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpRequest {
    pub action: RelayAction,
}

impl PumpRequest {
    pub fn status() -> Self {
        Self {
            action: RelayAction::Status,
        }
    }
}

impl From<PumpAction> for PumpRequest {
    fn from(action: PumpAction) -> Self {
        Self {
            action: action.into(),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpResponse {
    pub success: bool,
    /// State reported by the device, when it reports one
    #[serde(default)]
    pub state: Option<PumpAction>,
}
