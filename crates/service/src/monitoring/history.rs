use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Distinct metric names tracked by default before the stalest one is dropped.
pub const DEFAULT_MAX_METRICS: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    pub fn now(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded ring buffer of metric points; the oldest point is evicted when full.
#[derive(Clone, Debug)]
pub struct MetricHistory {
    points: VecDeque<MetricPoint>,
    capacity: usize,
}

impl MetricHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, point: MetricPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&MetricPoint> {
        self.points.back()
    }

    /// Values of the last `n` points, oldest first.
    pub fn tail_values(&self, n: usize) -> Vec<f64> {
        let skip = self.points.len().saturating_sub(n);
        self.points.iter().skip(skip).map(|p| p.value).collect()
    }

    /// Values of the `n` points before the newest one, oldest first.
    pub fn baseline_values(&self, n: usize) -> Vec<f64> {
        let end = self.points.len().saturating_sub(1);
        let start = end.saturating_sub(n);
        self.points.range(start..end).map(|p| p.value).collect()
    }
}

#[derive(Clone, Debug)]
struct Slot {
    touched: u64,
    history: MetricHistory,
}

/// Histories keyed by metric name, bounded both per name (`capacity` points)
/// and in the number of names (`max_metrics`). When a new name arrives at the
/// limit, the least recently written name is dropped.
#[derive(Clone, Debug)]
pub struct MetricBook {
    slots: BTreeMap<String, Slot>,
    capacity: usize,
    max_metrics: usize,
    tick: u64,
}

impl MetricBook {
    pub fn new(capacity: usize, max_metrics: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            capacity,
            max_metrics: max_metrics.max(1),
            tick: 0,
        }
    }

    /// Append `point` to its history and return that history.
    pub fn push(&mut self, point: MetricPoint) -> &MetricHistory {
        self.tick += 1;
        if !self.slots.contains_key(&point.name) && self.slots.len() >= self.max_metrics {
            self.evict_stalest();
        }
        let capacity = self.capacity;
        let slot = self.slots.entry(point.name.clone()).or_insert_with(|| Slot {
            touched: 0,
            history: MetricHistory::with_capacity(capacity),
        });
        slot.touched = self.tick;
        slot.history.push(point);
        &slot.history
    }

    fn evict_stalest(&mut self) {
        let stalest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.touched)
            .map(|(name, _)| name.clone());
        if let Some(name) = stalest {
            self.slots.remove(&name);
            warn!(
                metric = %name,
                max_metrics = self.max_metrics,
                "metric limit reached, dropping stalest history"
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricHistory> {
        self.slots.get(name).map(|slot| &slot.history)
    }

    /// Number of distinct names currently tracked.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max_metrics(&self) -> usize {
        self.max_metrics
    }

    /// Histories ordered by metric name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricHistory)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), &slot.history))
    }
}
