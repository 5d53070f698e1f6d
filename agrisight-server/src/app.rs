use std::sync::Arc;

use agrisight_core::ports::{
    AnalysisClient, ArtifactStore, CameraDevice, PumpDevice, SensorSource, WeatherSource,
};
use agrisight_core::{
    AutoCaptureScheduler, CaptureConfig, CaptureOrchestrator, PumpConfig, PumpController,
};
use anyhow::Context;
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::configs::Settings;
use crate::handles::*;
use crate::services::{
    DashboardService, EspService, IrrigationAdvisor, ServiceEvent, WeatherService, forward_events,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        control_relay,
        get_pump_status,
        trigger_capture,
        cancel_capture,
        get_current_capture,
        get_crop_types,
        get_schedule,
        update_schedule,
        get_recommendation,
        apply_irrigation,
        get_device_status,
    ),
    tags(
        (name = "pump", description = "Pump relay control"),
        (name = "capture", description = "Camera capture and classification"),
        (name = "schedule", description = "Automatic capture schedule"),
        (name = "irrigation", description = "Irrigation recommendations"),
        (name = "status", description = "Device health")
    )
)]
pub struct ApiDoc;

/// Remote systems the controllers drive.
pub struct Collaborators {
    pub camera: Arc<dyn CameraDevice>,
    pub pump_device: Arc<dyn PumpDevice>,
    pub store: Arc<dyn ArtifactStore>,
    pub analysis: Arc<dyn AnalysisClient>,
    pub sensors: Arc<dyn SensorSource>,
    pub weather: Option<Arc<dyn WeatherSource>>,
}

impl Collaborators {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let esp = Arc::new(
            EspService::new(&settings.device).context("Failed to build device client")?,
        );
        let dashboard = Arc::new(
            DashboardService::new(&settings.dashboard)
                .context("Failed to build dashboard client")?,
        );
        let weather = match &settings.weather {
            Some(weather) => Some(Arc::new(
                WeatherService::new(weather).context("Failed to build weather client")?,
            ) as Arc<dyn WeatherSource>),
            None => None,
        };

        Ok(Self {
            camera: esp.clone(),
            pump_device: esp,
            store: dashboard.clone(),
            analysis: dashboard.clone(),
            sensors: dashboard,
            weather,
        })
    }
}

/// The long-lived controllers shared by every route.
pub struct Components {
    pub camera: Arc<dyn CameraDevice>,
    pub pump: PumpController,
    pub orchestrator: CaptureOrchestrator,
    pub scheduler: AutoCaptureScheduler,
    pub advisor: Arc<IrrigationAdvisor>,
    pub events: broadcast::Sender<ServiceEvent>,
}

impl Components {
    pub fn new(
        collaborators: Collaborators,
        pump_config: PumpConfig,
        capture_config: CaptureConfig,
    ) -> Self {
        let (events, _receiver) = broadcast::channel(100);

        let pump = PumpController::new(collaborators.pump_device, pump_config);
        let default_category = capture_config.default_category.clone();
        let orchestrator = CaptureOrchestrator::new(
            collaborators.camera.clone(),
            collaborators.store,
            collaborators.analysis,
            capture_config,
        );
        let scheduler = AutoCaptureScheduler::new(orchestrator.clone(), default_category);
        let advisor = Arc::new(IrrigationAdvisor::new(
            collaborators.sensors,
            collaborators.weather,
            pump.clone(),
        ));

        forward_events(&pump, &orchestrator, events.clone());

        Self {
            camera: collaborators.camera,
            pump,
            orchestrator,
            scheduler,
            advisor,
            events,
        }
    }
}

pub fn create_router(components: &Components) -> Router {
    Router::new()
        .merge(relay_router(RelayState {
            pump: components.pump.clone(),
        }))
        .merge(capture_router(ScanState {
            orchestrator: components.orchestrator.clone(),
        }))
        .merge(schedule_router(ScheduleState {
            scheduler: components.scheduler.clone(),
        }))
        .merge(irrigation_router(IrrigationState {
            advisor: components.advisor.clone(),
        }))
        .merge(status_router(StatusState {
            camera: components.camera.clone(),
            pump: components.pump.clone(),
            orchestrator: components.orchestrator.clone(),
            scheduler: components.scheduler.clone(),
        }))
        .merge(sse_router(SSEState {
            sender: components.events.clone(),
        }))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let collaborators = Collaborators::from_settings(settings)?;
    let components = Components::new(
        collaborators,
        (&settings.pump).into(),
        (&settings.capture).into(),
    );

    match components.pump.query().await {
        Ok(state) => tracing::info!(?state, "Pump state confirmed"),
        Err(e) => tracing::warn!(error = %e, "Pump state unknown at startup"),
    }

    if settings.schedule.interval_seconds > 0 {
        components
            .scheduler
            .set_interval(settings.schedule.interval_seconds)
            .await;
    }

    Ok(create_router(&components))
}
