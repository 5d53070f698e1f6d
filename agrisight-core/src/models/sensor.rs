use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Moisture below this level raises a low-moisture alert on merged readings.
pub const LOW_MOISTURE_ALERT: f32 = 20.0;

/// Value the field firmware reports for a probe it could not read.
const MISSING_READING: f32 = -1.0;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Soil moisture percentage
    pub moisture: f32,
    /// Air temperature in Celsius
    pub temperature: f32,
    /// Relative humidity percentage
    pub humidity: f32,
    /// Time the reading was taken
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
}

impl SensorSnapshot {
    pub fn new(moisture: f32, temperature: f32, humidity: f32) -> Self {
        Self {
            moisture,
            temperature,
            humidity,
            captured_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A possibly incomplete reading as reported by a field probe.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Soil moisture percentage
    #[serde(default)]
    pub moisture: Option<f32>,
    /// Air temperature in Celsius
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Relative humidity percentage
    #[serde(default)]
    pub humidity: Option<f32>,
}

impl SensorReading {
    /// Fills every field this reading lacks (absent or reported as `-1`) from `previous`.
    pub fn merge_into(&self, previous: &SensorReading) -> SensorReading {
        SensorReading {
            moisture: pick(self.moisture, previous.moisture),
            temperature: pick(self.temperature, previous.temperature),
            humidity: pick(self.humidity, previous.humidity),
        }
    }

    pub fn low_moisture_alert(&self) -> bool {
        self.moisture.is_some_and(|moisture| moisture < LOW_MOISTURE_ALERT)
    }

    /// Returns a snapshot only when every field is known.
    pub fn to_snapshot(&self, captured_at: OffsetDateTime) -> Option<SensorSnapshot> {
        Some(SensorSnapshot {
            moisture: self.moisture?,
            temperature: self.temperature?,
            humidity: self.humidity?,
            captured_at,
        })
    }
}

fn pick(incoming: Option<f32>, previous: Option<f32>) -> Option<f32> {
    match incoming {
        Some(value) if value != MISSING_READING => Some(value),
        _ => previous,
    }
}
