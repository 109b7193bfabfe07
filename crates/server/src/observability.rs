use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static ENTITY_OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "taskdesk_entity_operations_total",
        "Entity operations handled, by entity and operation",
        &["entity", "op"]
    )
    .expect("register entity_operations_total")
});

pub static METRIC_SAMPLES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "taskdesk_metric_samples_total",
        "Metric samples submitted for analysis"
    )
    .expect("register metric_samples_total")
});

pub static ANOMALIES_DETECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "taskdesk_anomalies_detected_total",
        "Samples flagged as anomalous"
    )
    .expect("register anomalies_detected_total")
});

pub static INCIDENTS_PREDICTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "taskdesk_incidents_predicted_total",
        "Incident predictions produced by scans"
    )
    .expect("register incidents_predicted_total")
});

pub fn record_op(entity: &str, op: &str) {
    ENTITY_OPS_TOTAL.with_label_values(&[entity, op]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

pub async fn metrics_handler() -> impl IntoResponse {
    let (status, body) = encode_metrics();
    (status, [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        record_op("task", "create");
        ANOMALIES_DETECTED_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("taskdesk_entity_operations_total"));
        assert!(body.contains("taskdesk_anomalies_detected_total"));
    }
}
