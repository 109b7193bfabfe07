use serde::Serialize;
use tracing::{info, warn};

use super::history::{MetricBook, MetricHistory, MetricPoint, DEFAULT_MAX_METRICS};

/// Minimum history before a metric is considered.
pub const MIN_POINTS: usize = 10;
/// Trailing points used for the trend.
pub const TREND_WINDOW: usize = 5;
/// ETA reported when the metric is not rising.
pub const ETA_NOT_RISING: u32 = 99;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPrediction {
    pub metric_name: String,
    pub current_value: f64,
    pub average_change_rate: f64,
    pub predicted_incident: String,
    pub severity: Severity,
    /// Minutes until the threshold is crossed; `None` when there is no threshold.
    pub eta_minutes: Option<u32>,
    pub recommended_action: String,
}

/// Which family a metric name belongs to, by substring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MetricKind {
    Memory,
    Cpu,
    Latency,
    Response,
    Errors,
    Other,
}

impl MetricKind {
    fn of(name: &str) -> Self {
        if name.contains("memory") {
            Self::Memory
        } else if name.contains("cpu") {
            Self::Cpu
        } else if name.contains("latency") {
            Self::Latency
        } else if name.contains("response") {
            Self::Response
        } else if name.contains("error") || name.contains("failure") {
            Self::Errors
        } else {
            Self::Other
        }
    }

    fn is_concerning(self, avg_change: f64, last: f64) -> bool {
        match self {
            Self::Memory | Self::Cpu => avg_change > 5.0 && last > 70.0,
            Self::Latency | Self::Response => avg_change > 10.0,
            Self::Errors => avg_change > 0.0 && last > 0.0,
            Self::Other => avg_change.abs() > 20.0,
        }
    }
}

/// Trend-based incident forecaster over per-metric histories.
#[derive(Debug)]
pub struct IncidentPredictor {
    histories: MetricBook,
}

impl Default for IncidentPredictor {
    fn default() -> Self {
        Self::new(100, DEFAULT_MAX_METRICS)
    }
}

impl IncidentPredictor {
    pub fn new(capacity: usize, max_metrics: usize) -> Self {
        Self {
            histories: MetricBook::new(capacity, max_metrics),
        }
    }

    pub fn record(&mut self, name: &str, value: f64) {
        self.histories.push(MetricPoint::now(name, value));
    }

    pub fn metric_count(&self) -> usize {
        self.histories.len()
    }

    pub fn history(&self, name: &str) -> Option<&MetricHistory> {
        self.histories.get(name)
    }

    /// Scan every metric with enough history; results are ordered by metric name.
    pub fn predict(&self) -> Vec<IncidentPrediction> {
        let predictions: Vec<_> = self
            .histories
            .iter()
            .filter(|(_, h)| h.len() >= MIN_POINTS)
            .filter_map(|(name, h)| analyze(name, &h.tail_values(TREND_WINDOW)))
            .collect();
        for p in &predictions {
            warn!(
                metric = %p.metric_name,
                severity = ?p.severity,
                eta_minutes = ?p.eta_minutes,
                current = p.current_value,
                rate = p.average_change_rate,
                "incident predicted: {}", p.predicted_incident
            );
        }
        if !predictions.is_empty() {
            info!(count = predictions.len(), "incident scan finished");
        }
        predictions
    }
}

/// Mean of consecutive differences; zero for fewer than two values.
pub fn average_change(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum: f64 = values.windows(2).map(|w| w[1] - w[0]).sum();
    sum / (values.len() - 1) as f64
}

/// Whole minutes until `last` reaches `threshold` at `avg_change` per point.
pub fn eta_minutes(last: f64, avg_change: f64, threshold: f64) -> u32 {
    if avg_change <= 0.0 {
        return ETA_NOT_RISING;
    }
    let remaining = threshold - last;
    if remaining <= 0.0 {
        return 0;
    }
    (remaining / avg_change).ceil() as u32
}

fn analyze(name: &str, recent: &[f64]) -> Option<IncidentPrediction> {
    let last = *recent.last()?;
    let avg = average_change(recent);
    let kind = MetricKind::of(name);
    if !kind.is_concerning(avg, last) {
        return None;
    }

    let (incident, severity, threshold, action) = match kind {
        MetricKind::Memory => (
            "Potential memory leak",
            Severity::Medium,
            Some(90.0),
            "Review recent code changes affecting memory usage",
        ),
        MetricKind::Cpu => (
            "CPU saturation approaching",
            Severity::High,
            Some(95.0),
            "Scale up resources or identify CPU-intensive processes",
        ),
        MetricKind::Latency => (
            "Performance degradation",
            Severity::Medium,
            Some(last * 2.0),
            "Check database queries and external service calls",
        ),
        MetricKind::Response | MetricKind::Errors | MetricKind::Other => {
            ("Anomalous behavior detected", Severity::Low, None, "Monitor the situation")
        }
    };

    Some(IncidentPrediction {
        metric_name: name.to_string(),
        current_value: last,
        average_change_rate: avg,
        predicted_incident: incident.to_string(),
        severity,
        eta_minutes: threshold.map(|t| eta_minutes(last, avg, t)),
        recommended_action: action.to_string(),
    })
}
