use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Whether the pump should run
    pub should_irrigate: bool,
    /// Run time in milliseconds, never above five minutes
    pub duration_ms: u32,
    /// Rule that produced the decision
    pub reason: String,
    /// Weather adjustments and advisories, in the order they were applied
    pub weather_considerations: Vec<String>,
}
