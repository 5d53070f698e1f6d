use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between automatic captures, 0 when disabled
    pub interval_seconds: u64,
    pub enabled: bool,
}

impl ScheduleConfig {
    pub fn every(interval_seconds: u64) -> Self {
        Self {
            interval_seconds,
            enabled: interval_seconds > 0,
        }
    }
}
