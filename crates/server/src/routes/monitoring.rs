use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use service::build_risk::BuildRiskAssessment;
use service::monitoring::{IncidentPrediction, MetricPoint};

use crate::observability::{ANOMALIES_DETECTED_TOTAL, METRIC_SAMPLES_TOTAL};
use crate::state::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
    pub metric_name: String,
    pub metric_value: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[utoipa::path(
    post, path = "/api/ai/detect-anomaly", tag = "monitoring",
    request_body = crate::openapi::MetricSampleDoc,
    responses((status = 200, body = crate::openapi::AnomalyVerdictDoc))
)]
pub async fn detect_anomaly(State(state): State<AppState>, Json(sample): Json<MetricSample>) -> Json<AnomalyVerdict> {
    let point = MetricPoint::now(sample.name.clone(), sample.value);
    let timestamp = point.timestamp.timestamp_millis();
    let is_anomaly = state.monitoring.lock().await.detector.detect(point);
    METRIC_SAMPLES_TOTAL.inc();
    if is_anomaly {
        ANOMALIES_DETECTED_TOTAL.inc();
    }
    Json(AnomalyVerdict {
        is_anomaly,
        metric_name: sample.name,
        metric_value: sample.value,
        timestamp,
    })
}

#[utoipa::path(
    post, path = "/api/ai/assess-build-risk", tag = "monitoring",
    request_body = crate::openapi::ChangeSetDoc,
    responses((status = 200, body = crate::openapi::BuildRiskAssessmentDoc))
)]
pub async fn assess_build_risk(
    State(state): State<AppState>,
    Json(changes): Json<BTreeMap<String, u32>>,
) -> Json<BuildRiskAssessment> {
    Json(state.build_risk.assess_random(&changes))
}

/// Feed a sample to both the detector and the incident predictor.
#[utoipa::path(
    post, path = "/api/monitoring/metrics", tag = "monitoring",
    request_body = crate::openapi::MetricSampleDoc,
    responses((status = 202, description = "Accepted"))
)]
pub async fn submit_metric(State(state): State<AppState>, Json(sample): Json<MetricSample>) -> StatusCode {
    let is_anomaly = state.monitoring.lock().await.observe(&sample.name, sample.value);
    METRIC_SAMPLES_TOTAL.inc();
    if is_anomaly {
        ANOMALIES_DETECTED_TOTAL.inc();
    }
    info!(metric = %sample.name, value = sample.value, anomaly = is_anomaly, "metric accepted");
    StatusCode::ACCEPTED
}

#[utoipa::path(
    get, path = "/api/monitoring/incidents", tag = "monitoring",
    responses((status = 200, body = [crate::openapi::IncidentPredictionDoc]))
)]
pub async fn incidents(State(state): State<AppState>) -> Json<Vec<IncidentPrediction>> {
    Json(state.monitoring.lock().await.predictor.predict())
}
