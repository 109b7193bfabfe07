//! In-process metric analysis: threshold anomaly detection and trend-based
//! incident forecasting. Both keep bounded per-metric histories, capped in
//! the number of distinct metric names as well as in points per name.

pub mod anomaly;
pub mod collector;
pub mod history;
pub mod incident;

use configs::MonitoringConfig;

pub use anomaly::AnomalyDetector;
pub use collector::{collect_once, CollectStats, MetricSource, SystemSampler};
pub use history::{MetricBook, MetricHistory, MetricPoint};
pub use incident::{IncidentPrediction, IncidentPredictor, Severity};

/// Owner of the detector and the predictor; callers serialize access.
#[derive(Debug, Default)]
pub struct MonitoringContext {
    pub detector: AnomalyDetector,
    pub predictor: IncidentPredictor,
}

impl MonitoringContext {
    pub fn from_config(cfg: &MonitoringConfig) -> Self {
        Self {
            detector: AnomalyDetector::new(cfg.anomaly_history_capacity, cfg.anomaly_warmup, cfg.max_metrics),
            predictor: IncidentPredictor::new(cfg.incident_history_capacity, cfg.max_metrics),
        }
    }

    /// Feed a sample to both analyzers; returns the anomaly verdict.
    pub fn observe(&mut self, name: &str, value: f64) -> bool {
        self.predictor.record(name, value);
        self.detector.detect(MetricPoint::now(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_feeds_both_histories() {
        let mut ctx = MonitoringContext::from_config(&MonitoringConfig::default());
        for i in 0..12 {
            assert!(!ctx.observe("cpu", 50.0 + i as f64));
        }
        assert_eq!(ctx.detector.history("cpu").map(|h| h.len()), Some(12));
        assert_eq!(ctx.predictor.metric_count(), 1);
    }

    #[test]
    fn observe_caps_distinct_names_from_config() {
        let cfg = MonitoringConfig {
            max_metrics: 16,
            ..MonitoringConfig::default()
        };
        let mut ctx = MonitoringContext::from_config(&cfg);
        for i in 0..50_000 {
            ctx.observe(&format!("client_metric_{i}"), 1.0);
        }
        assert_eq!(ctx.predictor.metric_count(), 16);
        assert_eq!(ctx.detector.metric_count(), 16);
    }
}
