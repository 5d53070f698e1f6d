use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agrisight_core::models::*;
use agrisight_core::ports::*;
use agrisight_core::{CaptureConfig, PumpConfig, TransportError};
use agrisight_server::app::{Collaborators, Components, create_router};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use serde_json::Value;
use time::OffsetDateTime;

pub struct MockCamera {
    pub reachable: AtomicBool,
    pub triggers: AtomicUsize,
}

#[async_trait]
impl CameraDevice for MockCamera {
    fn address(&self) -> &str {
        "http://192.168.4.1:80"
    }

    async fn trigger_capture(&self) -> Result<(), TransportError> {
        self.triggers.fetch_add(1, Ordering::SeqCst);
        self.ping().await
    }

    async fn ping(&self) -> Result<(), TransportError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TransportError::Http("connection refused".to_string()))
        }
    }
}

pub struct MockRelay {
    pub reachable: AtomicBool,
    pub state: Mutex<PumpAction>,
    pub requests: Mutex<Vec<RelayAction>>,
}

impl MockRelay {
    pub fn requests(&self) -> Vec<RelayAction> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PumpDevice for MockRelay {
    async fn send(&self, request: PumpRequest) -> Result<PumpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.action);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(TransportError::Http("timed out".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        match request.action {
            RelayAction::On => *state = PumpAction::On,
            RelayAction::Off => *state = PumpAction::Off,
            RelayAction::Status => {}
        }
        Ok(PumpResponse {
            success: true,
            state: Some(*state),
        })
    }
}

/// Always holds one image uploaded just after the capture.
pub struct MockGallery;

#[async_trait]
impl ArtifactStore for MockGallery {
    async fn list_artifacts(&self) -> Result<Vec<Artifact>, TransportError> {
        Ok(vec![Artifact {
            id: 12,
            image_path: "static/uploads/scan_12.jpg".to_string(),
            timestamp: OffsetDateTime::now_utc() + time::Duration::seconds(1),
            disease: None,
            confidence: None,
        }])
    }
}

pub struct MockClassifier;

#[async_trait]
impl AnalysisClient for MockClassifier {
    async fn analyze(
        &self,
        _artifact_id: i64,
        _category: &str,
    ) -> Result<AnalysisOutcome, TransportError> {
        Ok(AnalysisOutcome::Classified(Classification {
            disease: "Healthy".to_string(),
            confidence: 0.97,
            description: "No visible symptoms".to_string(),
        }))
    }
}

#[derive(Default)]
pub struct MockSensors {
    pub reading: Mutex<Option<SensorSnapshot>>,
}

#[async_trait]
impl SensorSource for MockSensors {
    async fn latest(&self) -> Result<Option<SensorSnapshot>, TransportError> {
        Ok(*self.reading.lock().unwrap())
    }
}

/// Fails until a forecast is set.
#[derive(Default)]
pub struct MockWeather {
    pub forecast: Mutex<Option<WeatherSnapshot>>,
}

#[async_trait]
impl WeatherSource for MockWeather {
    async fn current(&self) -> Result<WeatherSnapshot, TransportError> {
        self.forecast
            .lock()
            .unwrap()
            .clone()
            .ok_or(TransportError::Status(503))
    }
}

pub struct MockApp {
    pub router: Router,
    pub components: Components,
    pub camera: Arc<MockCamera>,
    pub relay: Arc<MockRelay>,
    pub sensors: Arc<MockSensors>,
    pub weather: Arc<MockWeather>,
}

impl MockApp {
    pub fn new() -> Self {
        let camera = Arc::new(MockCamera {
            reachable: AtomicBool::new(true),
            triggers: AtomicUsize::new(0),
        });
        let relay = Arc::new(MockRelay {
            reachable: AtomicBool::new(true),
            state: Mutex::new(PumpAction::Off),
            requests: Mutex::new(Vec::new()),
        });
        let sensors = Arc::new(MockSensors::default());
        let weather = Arc::new(MockWeather::default());

        let components = Components::new(
            Collaborators {
                camera: camera.clone(),
                pump_device: relay.clone(),
                store: Arc::new(MockGallery),
                analysis: Arc::new(MockClassifier),
                sensors: sensors.clone(),
                weather: Some(weather.clone() as Arc<dyn WeatherSource>),
            },
            PumpConfig::default(),
            CaptureConfig {
                grace_period: Duration::ZERO,
                default_category: "general".to_string(),
            },
        );
        let router = create_router(&components);

        Self {
            router,
            components,
            camera,
            relay,
            sensors,
            weather,
        }
    }

    pub fn set_weather(&self, description: &str, wind_speed: f32) {
        *self.weather.forecast.lock().unwrap() = Some(WeatherSnapshot {
            temperature: 22.0,
            humidity: 65.0,
            description: description.to_string(),
            wind_speed,
            pressure: Some(1012.0),
        });
    }

    pub fn set_reading(&self, moisture: f32, temperature: f32, humidity: f32) {
        *self.sensors.reading.lock().unwrap() =
            Some(SensorSnapshot::new(moisture, temperature, humidity));
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
