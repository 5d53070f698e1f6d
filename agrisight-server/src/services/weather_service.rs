use agrisight_core::TransportError;
use agrisight_core::models::WeatherSnapshot;
use agrisight_core::ports::WeatherSource;
use async_trait::async_trait;
use reqwest::Client;

use super::{decode_failed, expect_success, http_client, request_failed};
use crate::configs::Weather;

pub struct WeatherService {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl WeatherService {
    pub fn new(weather: &Weather) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(weather.timeout_ms)?,
            base_url: weather.base_url.trim_end_matches('/').to_string(),
            latitude: weather.latitude,
            longitude: weather.longitude,
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherService {
    async fn current(&self) -> Result<WeatherSnapshot, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/weather", self.base_url))
            .query(&[("lat", self.latitude), ("lon", self.longitude)])
            .send()
            .await
            .map_err(request_failed)?;

        expect_success(response)?
            .json()
            .await
            .map_err(decode_failed)
    }
}
