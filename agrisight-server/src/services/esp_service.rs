use agrisight_core::TransportError;
use agrisight_core::models::{PumpAction, PumpRequest, PumpResponse, RelayAction};
use agrisight_core::ports::{CameraDevice, PumpDevice};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{decode_failed, expect_success, http_client, request_failed};
use crate::configs::Device;

#[derive(Debug, Deserialize)]
struct RelayStatus {
    state: PumpAction,
}

/// HTTP client for the ESP32 board: camera trigger, relay and health check.
pub struct EspService {
    client: Client,
    base_url: String,
}

impl EspService {
    pub fn new(device: &Device) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(device.timeout_ms)?,
            base_url: device.base_url(),
        })
    }

    async fn switch_relay(&self, action: PumpAction) -> Result<PumpResponse, TransportError> {
        let response = self
            .client
            .post(format!("{}/relay/{}", self.base_url, action))
            .send()
            .await
            .map_err(request_failed)?;

        let success = response.status().is_success();
        if !success {
            tracing::warn!(%action, status = %response.status(), "Relay refused command");
        }

        Ok(PumpResponse {
            success,
            state: success.then_some(action),
        })
    }

    async fn relay_status(&self) -> Result<PumpResponse, TransportError> {
        let response = self
            .client
            .get(format!("{}/relay/status", self.base_url))
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            return Ok(PumpResponse {
                success: false,
                state: None,
            });
        }

        let status: RelayStatus = response.json().await.map_err(decode_failed)?;
        Ok(PumpResponse {
            success: true,
            state: Some(status.state),
        })
    }
}

#[async_trait]
impl CameraDevice for EspService {
    fn address(&self) -> &str {
        &self.base_url
    }

    async fn trigger_capture(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .post(format!("{}/capture", self.base_url))
            .send()
            .await
            .map_err(request_failed)?;

        expect_success(response)?;
        tracing::debug!(device = %self.base_url, "Camera capture triggered");
        Ok(())
    }

    async fn ping(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(request_failed)?;

        expect_success(response).map(|_| ())
    }
}

#[async_trait]
impl PumpDevice for EspService {
    async fn send(&self, request: PumpRequest) -> Result<PumpResponse, TransportError> {
        match request.action {
            RelayAction::On => self.switch_relay(PumpAction::On).await,
            RelayAction::Off => self.switch_relay(PumpAction::Off).await,
            RelayAction::Status => self.relay_status().await,
        }
    }
}
