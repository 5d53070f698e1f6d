use std::sync::Arc;
use std::time::Duration;

use agrisight_core::PumpController;
use agrisight_core::engine;
use agrisight_core::models::{
    PumpAction, PumpState, PumpStatus, Recommendation, SensorSnapshot, WeatherAdvice, WeatherSnapshot,
};
use agrisight_core::ports::{SensorSource, WeatherSource};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::IrrigationError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IrrigationAdvice {
    pub recommendation: Recommendation,
    /// Present when live weather could be fetched
    pub weather: Option<WeatherAdvice>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IrrigationRun {
    pub recommendation: Recommendation,
    /// Whether the pump was switched on
    pub started: bool,
    pub pump: PumpStatus,
}

/// Combines live sensor and weather data into recommendations and acts on them.
pub struct IrrigationAdvisor {
    sensors: Arc<dyn SensorSource>,
    weather: Option<Arc<dyn WeatherSource>>,
    pump: PumpController,
}

impl IrrigationAdvisor {
    pub fn new(
        sensors: Arc<dyn SensorSource>,
        weather: Option<Arc<dyn WeatherSource>>,
        pump: PumpController,
    ) -> Self {
        Self {
            sensors,
            weather,
            pump,
        }
    }

    /// Weather failures are logged and the evaluation goes on without it.
    async fn current_weather(&self) -> Option<WeatherSnapshot> {
        let source = self.weather.as_ref()?;
        match source.current().await {
            Ok(weather) => Some(weather),
            Err(e) => {
                tracing::warn!(error = %e, "Weather unavailable, evaluating without it");
                None
            }
        }
    }

    pub async fn advise(&self, sensor: &SensorSnapshot) -> IrrigationAdvice {
        let weather = self.current_weather().await;

        IrrigationAdvice {
            recommendation: engine::evaluate(sensor, weather.as_ref()),
            weather: weather.as_ref().map(engine::interpret_weather),
        }
    }

    pub async fn latest_reading(&self) -> Result<SensorSnapshot, IrrigationError> {
        self.sensors
            .latest()
            .await
            .map_err(|e| IrrigationError::SensorsUnavailable(e.to_string()))?
            .ok_or(IrrigationError::NoReading)
    }

    /// Evaluates the latest reading and runs the pump for the recommended time.
    pub async fn apply(&self) -> Result<IrrigationRun, IrrigationError> {
        let sensor = self.latest_reading().await?;
        let recommendation = self.advise(&sensor).await.recommendation;

        if !recommendation.should_irrigate || recommendation.duration_ms == 0 {
            tracing::info!(reason = %recommendation.reason, "No irrigation needed");
            return Ok(IrrigationRun {
                recommendation,
                started: false,
                pump: self.pump.status().await,
            });
        }

        let status = self.pump.command(PumpAction::On).await?;
        tracing::info!(
            duration_ms = recommendation.duration_ms,
            reason = %recommendation.reason,
            "Irrigation started"
        );
        self.stop_after(
            Duration::from_millis(u64::from(recommendation.duration_ms)),
            status.run_id,
        );

        Ok(IrrigationRun {
            recommendation,
            started: true,
            pump: status,
        })
    }

    /// Switches the pump off after `duration`, unless the run it started has ended.
    fn stop_after(&self, duration: Duration, run_id: Option<u64>) {
        let pump = self.pump.clone();

        tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let status = pump.status().await;
            if status.state != PumpState::On || run_id.is_none() || status.run_id != run_id {
                tracing::debug!("Pump changed since irrigation started, leaving it alone");
                return;
            }

            match pump.command(PumpAction::Off).await {
                Ok(_) => tracing::info!("Irrigation finished"),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Could not stop irrigation, the safety timer will switch the pump off"
                ),
            }
        });
    }
}
