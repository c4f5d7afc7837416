//! Waits between requests
//!
//! The pacer owns the session's scheduler and profile. It applies the inter-request delay,
//! the optional work/rest cycle and the rate-limit cooldown. Every wait ends early when the
//! run is cancelled; the engines then stop at their next iteration boundary.

use crate::config::PacingConfig;
use crate::stealth::{StealthProfile, StealthScheduler};
use reqwest::header::HeaderMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub struct Pacer {
    scheduler: StealthScheduler,
    profile: StealthProfile,
    pacing: PacingConfig,
    work_rest_cycling: bool,
    test_mode: bool,
    work_started: Instant,
}

impl Pacer {
    pub fn new(scheduler: StealthScheduler, profile: StealthProfile, pacing: PacingConfig) -> Self {
        Self {
            scheduler,
            profile,
            pacing,
            work_rest_cycling: false,
            test_mode: false,
            work_started: Instant::now(),
        }
    }

    /// Enables the work/rest cycle between requests
    pub fn with_work_rest_cycling(mut self, enabled: bool) -> Self {
        self.work_rest_cycling = enabled;
        self
    }

    /// Replaces the profile delay with the short fixed test window
    pub fn with_test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    pub fn profile(&self) -> &StealthProfile {
        &self.profile
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    /// Counts a request and returns the headers to send with it
    pub fn request_headers(&mut self) -> HeaderMap {
        self.scheduler.record_request();
        self.scheduler.headers_for(&self.profile)
    }

    /// Draws the delay before the next request
    pub fn next_delay(&mut self) -> Duration {
        if self.test_mode {
            self.scheduler
                .delay_between(self.pacing.test_delay_min, self.pacing.test_delay_max)
        } else {
            let count = self.scheduler.request_count();
            self.scheduler.delay_for(&self.profile, count)
        }
    }

    /// Waits before the next request, taking a break when the work period is over
    ///
    /// Returns false if the wait was cut short by cancellation.
    pub async fn pause(&mut self, cancel: &CancellationToken) -> bool {
        let delay = self.next_delay();
        tracing::debug!("Waiting {:.2}s before next request", delay.as_secs_f64());
        if !sleep_or_cancel(delay, cancel).await {
            return false;
        }

        if self.work_rest_cycling
            && self
                .scheduler
                .should_take_break(&self.profile, self.work_started.elapsed())
        {
            let rest = self.scheduler.break_duration(&self.profile);
            tracing::info!("Work period over, resting for {:.0}s", rest.as_secs_f64());
            let rested = sleep_or_cancel(rest, cancel).await;
            self.work_started = Instant::now();
            return rested;
        }

        true
    }

    /// Waits out the fixed cooldown after an HTTP 429
    pub async fn cooldown(&mut self, cancel: &CancellationToken) -> bool {
        let cooldown = self.scheduler.units(self.pacing.rate_limit_cooldown);
        tracing::warn!("Rate limited, cooling down for {:.0}s", cooldown.as_secs_f64());
        sleep_or_cancel(cooldown, cancel).await
    }
}

/// Sleeps for `duration` unless `cancel` fires first; returns true if the sleep completed
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
    }
}
