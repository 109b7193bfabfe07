use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use super::MonitoringContext;

/// Anything that can produce a batch of named samples on demand.
pub trait MetricSource: Send {
    fn sample(&mut self) -> Vec<(String, f64)>;
}

/// Process and host metrics read through `sysinfo`.
pub struct SystemSampler {
    sys: System,
    pid: Pid,
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys,
            pid: Pid::from_u32(std::process::id()),
        }
    }
}

impl MetricSource for SystemSampler {
    fn sample(&mut self) -> Vec<(String, f64)> {
        self.sys.refresh_memory();
        self.sys.refresh_cpu_all();
        self.sys.refresh_processes(ProcessesToUpdate::Some(&[self.pid]));

        let mut out = Vec::with_capacity(6);
        let total = self.sys.total_memory();
        if total > 0 {
            let used = self.sys.used_memory() as f64 / total as f64 * 100.0;
            out.push(("system_memory_used_percent".to_string(), used));
        }
        out.push(("system_load".to_string(), System::load_average().one));
        out.push(("available_processors".to_string(), self.sys.cpus().len() as f64));
        out.push(("system_cpu_usage".to_string(), f64::from(self.sys.global_cpu_usage())));
        match self.sys.process(self.pid) {
            Some(process) => {
                out.push(("process_memory_mb".to_string(), process.memory() as f64 / 1024.0 / 1024.0));
                if let Some(tasks) = process.tasks() {
                    out.push(("thread_count".to_string(), tasks.len() as f64));
                }
            }
            None => warn!(pid = %self.pid, "own process missing from sysinfo snapshot"),
        }
        out
    }
}

/// Outcome of one collection round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub samples: usize,
    pub anomalies: usize,
}

/// Pull one batch from `source` and feed every sample to both analyzers.
pub fn collect_once(ctx: &mut MonitoringContext, source: &mut dyn MetricSource) -> CollectStats {
    let mut stats = CollectStats::default();
    for (name, value) in source.sample() {
        if !value.is_finite() {
            debug!(metric = %name, "skipping non-finite sample");
            continue;
        }
        stats.samples += 1;
        if ctx.observe(&name, value) {
            stats.anomalies += 1;
            warn!(metric = %name, value, "collected metric is anomalous");
        }
    }
    info!(samples = stats.samples, anomalies = stats.anomalies, "system metrics collected");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use configs::MonitoringConfig;

    struct Fixed(Vec<(String, f64)>);

    impl MetricSource for Fixed {
        fn sample(&mut self) -> Vec<(String, f64)> {
            self.0.clone()
        }
    }

    #[test]
    fn collect_once_feeds_both_analyzers() {
        let mut ctx = MonitoringContext::from_config(&MonitoringConfig::default());
        let mut src = Fixed(vec![("thread_count".into(), 12.0), ("system_load".into(), 0.5)]);
        let stats = collect_once(&mut ctx, &mut src);
        assert_eq!(
            stats,
            CollectStats {
                samples: 2,
                anomalies: 0
            }
        );
        assert_eq!(ctx.detector.history("thread_count").map(|h| h.len()), Some(1));
        assert_eq!(ctx.predictor.history("system_load").map(|h| h.len()), Some(1));
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut ctx = MonitoringContext::default();
        let mut src = Fixed(vec![("system_load".into(), f64::NAN), ("ok".into(), 1.0)]);
        let stats = collect_once(&mut ctx, &mut src);
        assert_eq!(stats.samples, 1);
        assert!(ctx.predictor.history("system_load").is_none());
    }

    #[test]
    fn system_sampler_reports_own_memory() {
        let mut sampler = SystemSampler::new();
        let samples = sampler.sample();
        let mem = samples
            .iter()
            .find(|(name, _)| name == "process_memory_mb")
            .map(|(_, v)| *v)
            .expect("process memory sampled");
        assert!(mem > 0.0);
        assert!(samples.iter().any(|(name, _)| name == "system_load"));
    }
}
