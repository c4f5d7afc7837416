//! The worker's shared context for both phases

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::pacer::Pacer;
use crate::output::{MetricsCollector, RunMetrics};
use crate::stealth::{StealthProfile, StealthScheduler};
use crate::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One HTTP client, one scheduler, one metrics collector and the cancellation token
///
/// Both engines borrow the session in turn, so pacing and metrics carry over from discovery
/// into extraction. Every request goes through here and is counted exactly once.
pub struct Session {
    fetcher: Fetcher,
    pacer: Pacer,
    metrics: MetricsCollector,
    cancel: CancellationToken,
}

impl Session {
    /// Builds the session for a run
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `profile` - The resolved stealth profile
    /// * `cancel` - Token the controller uses to stop the run
    pub fn new(config: &Config, profile: StealthProfile, cancel: CancellationToken) -> Result<Self> {
        let time_unit = Duration::from_millis(config.pacing.time_unit_ms);
        let fetcher = Fetcher::new(&config.target)?;
        let pacer = Pacer::new(
            StealthScheduler::new(time_unit),
            profile,
            config.pacing.clone(),
        )
        .with_work_rest_cycling(config.stealth.work_rest_cycling)
        .with_test_mode(config.run.is_test_run());

        Ok(Self::from_parts(fetcher, pacer, cancel))
    }

    pub fn from_parts(fetcher: Fetcher, pacer: Pacer, cancel: CancellationToken) -> Self {
        Self {
            fetcher,
            pacer,
            metrics: MetricsCollector::new(),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns a snapshot of the metrics so far
    pub fn metrics(&self) -> RunMetrics {
        self.metrics.snapshot()
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetches and classifies the candidate page for `id`
    pub async fn fetch_candidate(&mut self, id: u64) -> Result<FetchOutcome> {
        let headers = self.pacer.request_headers();
        let outcome = self.fetcher.fetch_candidate(id, headers).await?;
        self.metrics.record(outcome.status, outcome.elapsed);
        Ok(outcome)
    }

    /// Fetches a confirmed profile page
    pub async fn fetch_page(&mut self, url: &str) -> FetchOutcome {
        let headers = self.pacer.request_headers();
        let outcome = self.fetcher.fetch_page(url, headers).await;
        self.metrics.record(outcome.status, outcome.elapsed);
        outcome
    }

    /// Waits before the next request; false if cancelled meanwhile
    pub async fn pause(&mut self) -> bool {
        self.pacer.pause(&self.cancel).await
    }

    /// Waits out the rate-limit cooldown; false if cancelled meanwhile
    pub async fn cooldown(&mut self) -> bool {
        self.pacer.cooldown(&self.cancel).await
    }
}
