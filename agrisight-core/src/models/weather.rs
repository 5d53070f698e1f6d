use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature in Celsius
    pub temperature: f32,
    /// Relative humidity percentage
    pub humidity: f32,
    /// Free-text conditions, e.g. "light rain"
    pub description: String,
    /// Wind speed in m/s
    #[serde(alias = "windSpeed")]
    pub wind_speed: f32,
    /// Barometric pressure in hPa
    #[serde(default)]
    pub pressure: Option<f32>,
}

impl WeatherSnapshot {
    /// Case-insensitive match against the conditions description.
    pub fn mentions(&self, keyword: &str) -> bool {
        self.description.to_lowercase().contains(keyword)
    }
}

/// Human-readable summary of the current weather for growers.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAdvice {
    pub current_conditions: String,
    pub advice: Vec<String>,
}
