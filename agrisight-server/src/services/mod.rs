pub mod dashboard_service;
pub mod esp_service;
pub mod event_service;
pub mod irrigation_service;
pub mod weather_service;

pub use dashboard_service::DashboardService;
pub use esp_service::EspService;
pub use event_service::{ServiceEvent, forward_events};
pub use irrigation_service::{IrrigationAdvice, IrrigationAdvisor, IrrigationRun};
pub use weather_service::WeatherService;

use std::time::Duration;

use agrisight_core::TransportError;
use reqwest::{Client, Response};

pub(crate) fn http_client(timeout_ms: u64) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .connect_timeout(Duration::from_millis(timeout_ms.min(5_000)))
        .build()
}

pub(crate) fn request_failed(error: reqwest::Error) -> TransportError {
    match error.status() {
        Some(status) => TransportError::Status(status.as_u16()),
        None => TransportError::Http(error.to_string()),
    }
}

pub(crate) fn expect_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status(status.as_u16()))
    }
}

pub(crate) fn decode_failed(error: reqwest::Error) -> TransportError {
    TransportError::Decode(error.to_string())
}
