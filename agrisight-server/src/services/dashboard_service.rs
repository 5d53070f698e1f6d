use agrisight_core::TransportError;
use agrisight_core::models::{AnalysisOutcome, Artifact, Classification, SensorReading, SensorSnapshot};
use agrisight_core::ports::{AnalysisClient, ArtifactStore, SensorSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use super::{decode_failed, expect_success, http_client, request_failed};
use crate::configs::Dashboard;

#[derive(Debug, Deserialize)]
struct GalleryRow {
    id: i64,
    image_path: String,
    timestamp: String,
    #[serde(default)]
    disease: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    scan_id: i64,
    crop_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnalyzeResponse {
    Failure { error: String },
    Success(Classification),
}

#[derive(Debug, Deserialize)]
struct SensorRow {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(flatten)]
    reading: SensorReading,
}

/// Client for the dashboard backend: gallery, classifier and sensor history.
pub struct DashboardService {
    client: Client,
    base_url: String,
}

impl DashboardService {
    pub fn new(dashboard: &Dashboard) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(dashboard.timeout_ms)?,
            base_url: dashboard.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ArtifactStore for DashboardService {
    async fn list_artifacts(&self) -> Result<Vec<Artifact>, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/gallery", self.base_url))
            .send()
            .await
            .map_err(request_failed)?;
        let rows: Vec<GalleryRow> = expect_success(response)?
            .json()
            .await
            .map_err(decode_failed)?;

        Ok(rows.into_iter().filter_map(into_artifact).collect())
    }
}

#[async_trait]
impl AnalysisClient for DashboardService {
    async fn analyze(
        &self,
        artifact_id: i64,
        category: &str,
    ) -> Result<AnalysisOutcome, TransportError> {
        let response = self
            .client
            .post(format!("{}/api/analyze", self.base_url))
            .json(&AnalyzeRequest {
                scan_id: artifact_id,
                crop_type: category,
            })
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let body = response.bytes().await.map_err(request_failed)?;
        parse_analysis(status.as_u16(), &body)
    }
}

#[async_trait]
impl SensorSource for DashboardService {
    async fn latest(&self) -> Result<Option<SensorSnapshot>, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/sensors", self.base_url))
            .send()
            .await
            .map_err(request_failed)?;
        let rows: Vec<SensorRow> = expect_success(response)?
            .json()
            .await
            .map_err(decode_failed)?;

        Ok(latest_snapshot(&rows))
    }
}

fn into_artifact(row: GalleryRow) -> Option<Artifact> {
    let Some(timestamp) = parse_timestamp(&row.timestamp) else {
        tracing::warn!(id = row.id, timestamp = %row.timestamp, "Skipping gallery row with unreadable timestamp");
        return None;
    };

    Some(Artifact {
        id: row.id,
        image_path: row.image_path,
        timestamp,
        disease: row.disease,
        confidence: row.confidence,
    })
}

/// Accepts RFC 3339 or the naive `YYYY-MM-DD HH:MM:SS[.ffffff]` form SQLite stores, read as UTC.
fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(timestamp);
    }

    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
        )
    })
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}

fn parse_analysis(status: u16, body: &[u8]) -> Result<AnalysisOutcome, TransportError> {
    let success = (200..300).contains(&status);

    match serde_json::from_slice::<AnalyzeResponse>(body) {
        Ok(AnalyzeResponse::Failure { error }) => Ok(AnalysisOutcome::Rejected(error)),
        _ if !success => Err(TransportError::Status(status)),
        Ok(AnalyzeResponse::Success(classification)) => {
            Ok(AnalysisOutcome::Classified(classification))
        }
        Err(e) => Err(TransportError::Decode(e.to_string())),
    }
}

/// Rows arrive newest first; fields the newest row lacks come from older rows.
fn latest_snapshot(rows: &[SensorRow]) -> Option<SensorSnapshot> {
    let newest = rows.first()?;
    let merged = rows
        .iter()
        .rev()
        .fold(SensorReading::default(), |merged, row| row.reading.merge_into(&merged));

    if merged.low_moisture_alert() {
        tracing::warn!(moisture = ?merged.moisture, "Low soil moisture");
    }

    let captured_at = newest
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_else(OffsetDateTime::now_utc);
    merged.to_snapshot(captured_at)
}
