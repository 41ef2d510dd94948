//! In-process counters and latency histograms.
//!
//! Nothing is exported automatically. Hosts read a [`MetricsSnapshot`] (the
//! CLI prints it for `:stats`).

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Samples kept per histogram; the oldest are dropped first
const MAX_SAMPLES: usize = 4096;

static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// The process-wide registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

#[derive(Default)]
struct Series {
    counters: BTreeMap<String, u64>,
    histograms: BTreeMap<String, VecDeque<f64>>,
}

/// Named counters and sample histograms behind one lock.
pub struct MetricsRegistry {
    series: Mutex<Series>,
    started: Instant,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            series: Mutex::new(Series::default()),
            started: Instant::now(),
        }
    }

    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    pub fn increment_by(&self, name: &str, value: u64) {
        let mut series = self.series.lock().unwrap_or_else(|e| e.into_inner());
        let counter = series.counters.entry(name.to_string()).or_insert(0);
        *counter = counter.saturating_add(value);
    }

    /// Current value of a counter; 0 if it was never incremented
    pub fn counter(&self, name: &str) -> u64 {
        let series = self.series.lock().unwrap_or_else(|e| e.into_inner());
        series.counters.get(name).copied().unwrap_or(0)
    }

    /// Add one sample to a histogram
    pub fn histogram(&self, name: &str, value: f64) {
        let mut series = self.series.lock().unwrap_or_else(|e| e.into_inner());
        let samples = series.histograms.entry(name.to_string()).or_default();
        if samples.len() == MAX_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    /// Consistent copy of every series
    pub fn snapshot(&self) -> MetricsSnapshot {
        let series = self.series.lock().unwrap_or_else(|e| e.into_inner());
        MetricsSnapshot {
            session_id: crate::session_id().to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
            counters: series.counters.clone(),
            histograms: series
                .histograms
                .iter()
                .map(|(name, samples)| (name.clone(), HistogramStats::from_samples(samples)))
                .collect(),
        }
    }

    /// [`MetricsRegistry::snapshot`] as a JSON value
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// Point-in-time view of the registry, keys sorted.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub session_id: String,
    pub uptime_secs: u64,
    pub counters: BTreeMap<String, u64>,
    pub histograms: BTreeMap<String, HistogramStats>,
}

/// Summary of one histogram's retained samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl HistogramStats {
    fn from_samples(samples: &VecDeque<f64>) -> Self {
        let mut sorted: Vec<f64> = samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                p50: 0.0,
                p95: 0.0,
                p99: 0.0,
            };
        };

        Self {
            count: sorted.len(),
            min,
            max,
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
        }
    }
}

/// Nearest-rank percentile of a non-empty sorted slice
fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Records elapsed milliseconds into a histogram when stopped or dropped.
pub struct Timer {
    name: &'static str,
    started: Instant,
    done: bool,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            started: Instant::now(),
            done: false,
        }
    }

    /// Record now and return the elapsed time
    pub fn stop(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.done {
            self.done = true;
            metrics().histogram(self.name, elapsed.as_secs_f64() * 1000.0);
        }
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment("search.requests");
        registry.increment_by("search.requests", 4);

        assert_eq!(registry.counter("search.requests"), 5);
        assert_eq!(registry.counter("search.failed"), 0);
    }

    #[test]
    fn test_histogram_stats() {
        let samples: VecDeque<f64> = (1..=10).rev().map(f64::from).collect();
        let stats = HistogramStats::from_samples(&samples);

        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.mean, 5.5);
        assert_eq!(stats.p50, 5.0);
        assert_eq!(stats.p99, 10.0);
    }

    #[test]
    fn test_empty_histogram_stats() {
        let stats = HistogramStats::from_samples(&VecDeque::new());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.p95, 0.0);
    }

    #[test]
    fn test_histogram_keeps_latest_samples() {
        let registry = MetricsRegistry::new();
        for i in 0..(MAX_SAMPLES + 10) {
            registry.histogram("search.latency_ms", i as f64);
        }

        let stats = registry.snapshot().histograms["search.latency_ms"];
        assert_eq!(stats.count, MAX_SAMPLES);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, (MAX_SAMPLES + 9) as f64);
    }

    #[test]
    fn test_export_json_shape() {
        let registry = MetricsRegistry::new();
        registry.increment("search.hits");
        registry.histogram("search.latency_ms", 0.5);

        let json = registry.export_json();
        assert_eq!(json["counters"]["search.hits"], 1);
        assert_eq!(json["histograms"]["search.latency_ms"]["count"], 1);
        assert_eq!(json["session_id"], crate::session_id());
    }

    #[test]
    fn test_timer_records_once() {
        let name = "test.timer_records_once";
        let timer = Timer::start(name);
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.stop() >= Duration::from_millis(5));

        let stats = metrics().snapshot().histograms[name];
        assert_eq!(stats.count, 1);
    }
}
