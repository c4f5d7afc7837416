//! Run metrics
//!
//! The collector is fed after every fetch attempt in both phases and hands out snapshots.
//! Nothing here gates scraping.

use crate::crawler::FetchStatus;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of samples kept for the rolling latency and interval statistics
pub const HISTORY_WINDOW: usize = 1000;

const ENTROPY_BINS: usize = 10;

/// Rate-limit count at which that component of the risk score saturates
const RATE_LIMIT_SATURATION: f64 = 5.0;

/// Snapshot of the counters for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetrics {
    pub requests_made: u64,
    pub successful: u64,
    pub failed: u64,
    pub rate_limited: u64,

    /// Seconds taken by the most recent request
    pub last_response_time: f64,

    /// Rolling mean over the last `HISTORY_WINDOW` requests, in seconds
    pub average_response_time: f64,

    /// Heuristic in `[0, 1]`; higher means the traffic looks more automated
    pub detection_risk_score: f64,

    /// Normalized Shannon entropy of inter-request intervals, in `[0, 1]`
    pub pattern_entropy: f64,
}

impl RunMetrics {
    /// Returns `successful / requests_made`, or 0 before the first request
    pub fn success_rate(&self) -> f64 {
        if self.requests_made == 0 {
            0.0
        } else {
            self.successful as f64 / self.requests_made as f64
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.requests_made == 0 {
            0.0
        } else {
            self.failed as f64 / self.requests_made as f64
        }
    }
}

/// Accumulates `RunMetrics` from fetch attempts
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: RunMetrics,
    latencies: VecDeque<f64>,
    intervals: VecDeque<f64>,
    last_start: Option<Instant>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fetch attempt that has just completed
    ///
    /// # Arguments
    ///
    /// * `status` - Classification of the attempt
    /// * `elapsed` - Time from sending the request to the final byte or error
    pub fn record(&mut self, status: FetchStatus, elapsed: Duration) {
        let now = Instant::now();
        let started = now.checked_sub(elapsed).unwrap_or(now);
        self.record_at(status, started, elapsed);
    }

    fn record_at(&mut self, status: FetchStatus, started: Instant, elapsed: Duration) {
        let m = &mut self.metrics;
        m.requests_made += 1;
        match status {
            FetchStatus::Success => m.successful += 1,
            FetchStatus::RateLimited => {
                m.failed += 1;
                m.rate_limited += 1;
            }
            FetchStatus::NotFound | FetchStatus::NetworkError => m.failed += 1,
        }

        let secs = elapsed.as_secs_f64();
        m.last_response_time = secs;
        push_bounded(&mut self.latencies, secs);
        m.average_response_time = mean(&self.latencies);

        if let Some(previous) = self.last_start {
            let interval = started.saturating_duration_since(previous).as_secs_f64();
            push_bounded(&mut self.intervals, interval);
        }
        self.last_start = Some(started);

        self.metrics.pattern_entropy = pattern_entropy(&self.intervals);
        self.metrics.detection_risk_score = detection_risk(&self.metrics, &self.intervals);
    }

    /// Returns the current counters
    pub fn snapshot(&self) -> RunMetrics {
        self.metrics.clone()
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Clears all counters and history
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn push_bounded(buffer: &mut VecDeque<f64>, value: f64) {
    if buffer.len() == HISTORY_WINDOW {
        buffer.pop_front();
    }
    buffer.push_back(value);
}

fn mean(values: &VecDeque<f64>) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Shannon entropy of the intervals over 10 equal-width bins, divided by `ln(10)`
fn pattern_entropy(intervals: &VecDeque<f64>) -> f64 {
    if intervals.len() < 2 {
        return 0.0;
    }

    let min = intervals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / ENTROPY_BINS as f64;
    if width <= 0.0 {
        return 0.0;
    }

    let mut bins = [0usize; ENTROPY_BINS];
    for value in intervals {
        let idx = (((value - min) / width) as usize).min(ENTROPY_BINS - 1);
        bins[idx] += 1;
    }

    let total = intervals.len() as f64;
    let entropy: f64 = bins
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.ln()
        })
        .sum();

    (entropy / (ENTROPY_BINS as f64).ln()).clamp(0.0, 1.0)
}

/// `0.4 * regularity + 0.4 * failure_rate + 0.2 * rate-limit pressure`, clamped to `[0, 1]`
///
/// Regularity is `1 - min(cv, 1)` of the inter-request intervals and counts as zero until
/// two intervals exist.
fn detection_risk(metrics: &RunMetrics, intervals: &VecDeque<f64>) -> f64 {
    let regularity = if intervals.len() < 2 {
        0.0
    } else {
        let avg = mean(intervals);
        if avg <= 0.0 {
            0.0
        } else {
            let variance =
                intervals.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / intervals.len() as f64;
            let cv = variance.sqrt() / avg;
            1.0 - cv.min(1.0)
        }
    };

    let pressure = (metrics.rate_limited as f64 / RATE_LIMIT_SATURATION).min(1.0);
    (0.4 * regularity + 0.4 * metrics.failure_rate() + 0.2 * pressure).clamp(0.0, 1.0)
}

/// Prints run metrics to stdout in a formatted manner
pub fn print_metrics(metrics: &RunMetrics) {
    println!("=== Run Metrics ===\n");

    println!("Requests:");
    println!("  Total: {}", metrics.requests_made);
    println!("  Successful: {}", metrics.successful);
    println!("  Failed: {}", metrics.failed);
    println!("  Rate limited: {}", metrics.rate_limited);
    println!("  Success rate: {:.1}%", metrics.success_rate() * 100.0);
    println!();

    println!("Latency:");
    println!("  Last: {:.3}s", metrics.last_response_time);
    println!("  Average: {:.3}s", metrics.average_response_time);
    println!();

    println!("Patterns:");
    println!("  Detection risk: {:.2}", metrics.detection_risk_score);
    println!("  Pattern entropy: {:.2}", metrics.pattern_entropy);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_series(collector: &mut MetricsCollector, gaps_ms: &[u64], status: FetchStatus) {
        let base = Instant::now();
        let mut at = base;
        collector.record_at(status, at, Duration::from_millis(50));
        for gap in gaps_ms {
            at += Duration::from_millis(*gap);
            collector.record_at(status, at, Duration::from_millis(50));
        }
    }

    #[test]
    fn test_counters() {
        let mut collector = MetricsCollector::new();
        collector.record(FetchStatus::Success, Duration::from_millis(100));
        collector.record(FetchStatus::NotFound, Duration::from_millis(300));
        collector.record(FetchStatus::RateLimited, Duration::from_millis(200));
        collector.record(FetchStatus::NetworkError, Duration::from_millis(400));

        let m = collector.snapshot();
        assert_eq!(m.requests_made, 4);
        assert_eq!(m.successful, 1);
        assert_eq!(m.failed, 3);
        assert_eq!(m.rate_limited, 1);
        assert!(m.successful + m.failed <= m.requests_made);
        assert!((m.last_response_time - 0.4).abs() < 1e-9);
        assert!((m.average_response_time - 0.25).abs() < 1e-9);
        assert!((m.success_rate() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let mut collector = MetricsCollector::new();
        for _ in 0..HISTORY_WINDOW {
            collector.record(FetchStatus::Success, Duration::from_secs(10));
        }
        for _ in 0..HISTORY_WINDOW {
            collector.record(FetchStatus::Success, Duration::from_secs(1));
        }
        assert_eq!(collector.latencies.len(), HISTORY_WINDOW);
        assert!((collector.metrics().average_response_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_regular_intervals_have_zero_entropy_and_high_risk() {
        let mut collector = MetricsCollector::new();
        record_series(&mut collector, &[1000; 20], FetchStatus::Success);

        let m = collector.snapshot();
        assert_eq!(m.pattern_entropy, 0.0);
        // Perfect regularity, no failures
        assert!((m.detection_risk_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_spread_intervals_raise_entropy() {
        let mut collector = MetricsCollector::new();
        let gaps: Vec<u64> = (0..10).map(|i| 1000 + i * 500).collect();
        record_series(&mut collector, &gaps, FetchStatus::Success);

        let m = collector.snapshot();
        assert!(m.pattern_entropy > 0.9, "entropy {}", m.pattern_entropy);
        assert!(m.pattern_entropy <= 1.0);
        assert!(m.detection_risk_score < 0.4);
    }

    #[test]
    fn test_rate_limits_push_risk_up() {
        let mut collector = MetricsCollector::new();
        record_series(&mut collector, &[1000; 5], FetchStatus::RateLimited);

        let m = collector.snapshot();
        assert_eq!(m.rate_limited, 6);
        assert!((m.detection_risk_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut collector = MetricsCollector::new();
        collector.record(FetchStatus::Success, Duration::from_millis(10));
        collector.reset();
        assert_eq!(collector.snapshot(), RunMetrics::default());
    }
}
