use std::env;
use std::time::Duration;

use agrisight_core::{CaptureConfig, PumpConfig};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// The ESP32 board carrying the camera and the pump relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Device {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Dashboard backend holding the gallery, sensor history and classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pump {
    pub safety_timeout_ms: u64,
    pub shutoff_retry_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub grace_period_ms: u64,
    pub default_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub device: Device,
    pub dashboard: Dashboard,
    pub weather: Option<Weather>,
    pub pump: Pump,
    pub capture: Capture,
    pub schedule: Schedule,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("AGRISIGHT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

impl From<&Pump> for PumpConfig {
    fn from(pump: &Pump) -> Self {
        Self {
            safety_timeout: Duration::from_millis(pump.safety_timeout_ms),
            shutoff_retry: Duration::from_millis(pump.shutoff_retry_ms),
        }
    }
}

impl From<&Capture> for CaptureConfig {
    fn from(capture: &Capture) -> Self {
        Self {
            grace_period: Duration::from_millis(capture.grace_period_ms),
            default_category: capture.default_category.clone(),
        }
    }
}
