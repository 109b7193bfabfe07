use tracing::{debug, warn};

use super::history::{MetricBook, MetricHistory, MetricPoint, DEFAULT_MAX_METRICS};

/// Points compared against when scoring a new value.
pub const BASELINE_WINDOW: usize = 10;
/// Deviation, in standard deviations, that counts as an anomaly.
pub const Z_THRESHOLD: f64 = 3.0;

/// Fixed-threshold detector over per-metric histories.
#[derive(Debug)]
pub struct AnomalyDetector {
    histories: MetricBook,
    warmup: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(1000, 30, DEFAULT_MAX_METRICS)
    }
}

impl AnomalyDetector {
    /// `warmup` is clamped so the baseline window always has enough points,
    /// and `capacity` so a history can hold a full warm-up.
    pub fn new(capacity: usize, warmup: usize, max_metrics: usize) -> Self {
        let warmup = warmup.max(BASELINE_WINDOW + 1);
        Self {
            histories: MetricBook::new(capacity.max(warmup), max_metrics),
            warmup,
        }
    }

    /// Record `point` and score it against the preceding window.
    pub fn detect(&mut self, point: MetricPoint) -> bool {
        let name = point.name.clone();
        let value = point.value;
        let history = self.histories.push(point);
        if history.len() < self.warmup {
            return false;
        }

        let baseline = history.baseline_values(BASELINE_WINDOW);
        let (mean, stddev) = mean_stddev(&baseline);
        let deviation = (value - mean).abs();
        let anomaly = deviation > Z_THRESHOLD * stddev;
        debug!(metric = %name, value, mean, stddev, anomaly, "anomaly_scored");
        if anomaly {
            warn!(metric = %name, value, mean, "anomaly detected");
        }
        anomaly
    }

    pub fn history(&self, name: &str) -> Option<&MetricHistory> {
        self.histories.get(name)
    }

    /// Number of distinct metric names tracked.
    pub fn metric_count(&self) -> usize {
        self.histories.len()
    }
}

/// Population mean and standard deviation; `(0, 0)` for an empty slice.
pub fn mean_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
