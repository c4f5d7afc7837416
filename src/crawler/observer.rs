//! Callbacks from the running worker to whoever controls it

use crate::output::RunMetrics;

/// Receives progress, metric snapshots and operator messages from a run
///
/// Every method defaults to doing nothing, so observers implement only what they display.
/// Callbacks run on the worker task and should return quickly.
pub trait RunObserver: Send + Sync {
    /// Discovery progress in percent
    fn crawl_progress(&self, _percent: f64, _message: &str) {}

    /// Extraction progress in percent
    fn extract_progress(&self, _percent: f64, _message: &str) {}

    /// Metrics after a request
    fn metrics(&self, _metrics: &RunMetrics) {}

    /// Phase changes and other status lines
    fn status(&self, _message: &str) {}

    /// Conditions the operator should act on
    fn warning(&self, _message: &str) {}
}

/// Observer that ignores every callback
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Observer that renders callbacks as log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn crawl_progress(&self, percent: f64, message: &str) {
        tracing::info!("[discovery {:5.1}%] {}", percent, message);
    }

    fn extract_progress(&self, percent: f64, message: &str) {
        tracing::info!("[extraction {:5.1}%] {}", percent, message);
    }

    fn metrics(&self, metrics: &RunMetrics) {
        tracing::debug!(
            "requests={} ok={} failed={} avg={:.3}s risk={:.2} entropy={:.2}",
            metrics.requests_made,
            metrics.successful,
            metrics.failed,
            metrics.average_response_time,
            metrics.detection_risk_score,
            metrics.pattern_entropy
        );
    }

    fn status(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}
