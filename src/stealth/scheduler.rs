//! Request pacing for the stealth layer
//!
//! The scheduler decides how long the worker waits between requests, when it takes a
//! work/rest break, and which headers accompany each request. All durations are computed in
//! abstract time units and scaled to wall-clock time once, so a 1 ms unit makes a whole run
//! execute in test time.

use crate::stealth::headers::{browser_headers, random_agent};
use crate::stealth::StealthProfile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use reqwest::header::HeaderMap;
use std::time::{Duration, Instant};

/// Seconds per minute; work and rest cycles are configured in minutes of time units
const UNITS_PER_MINUTE: f64 = 60.0;

/// Shortest delay the scheduler hands out, in time units
const MIN_DELAY_UNITS: f64 = 1.0;

/// Jitter standard deviation as a fraction of the base delay
const JITTER_RATIO: f64 = 0.1;

/// Largest relative stretch or shrink a pattern break applies to the base delay
const PATTERN_SPREAD: f64 = 0.5;

/// Pacing state for one worker session
///
/// Owns its random source, the request counter, the pinned user-agent and the current
/// work-period target. There is exactly one scheduler per session.
pub struct StealthScheduler {
    rng: StdRng,
    time_unit: Duration,
    request_count: u64,
    last_request: Option<Instant>,
    work_target: Option<Duration>,
    pinned_agent: Option<(&'static str, Instant)>,
}

impl StealthScheduler {
    /// Creates a scheduler seeded from system entropy
    ///
    /// # Arguments
    ///
    /// * `time_unit` - Wall-clock length of one time unit
    pub fn new(time_unit: Duration) -> Self {
        Self::from_rng(StdRng::from_entropy(), time_unit)
    }

    /// Creates a deterministic scheduler for tests and reproducible runs
    pub fn with_seed(time_unit: Duration, seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), time_unit)
    }

    fn from_rng(rng: StdRng, time_unit: Duration) -> Self {
        Self {
            rng,
            time_unit,
            request_count: 0,
            last_request: None,
            work_target: None,
            pinned_agent: None,
        }
    }

    /// Returns the wall-clock length of one time unit
    pub fn time_unit(&self) -> Duration {
        self.time_unit
    }

    /// Converts a number of time units to wall-clock time, saturating at `Duration::MAX`
    pub fn units(&self, units: f64) -> Duration {
        let secs = self.time_unit.as_secs_f64() * units.max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Computes the wait before the next request
    ///
    /// The base delay is uniform over the profile's window. With probability
    /// `pattern_randomness` it is stretched or shrunk by up to half, which breaks up the
    /// rhythm without moving the mean. It is then scaled by the progressive slow-down for
    /// `request_count` and perturbed by Gaussian jitter. The result is floored at one time
    /// unit.
    pub fn delay_for(&mut self, profile: &StealthProfile, request_count: u64) -> Duration {
        let mut base = self.uniform(profile.min_delay, profile.max_delay);
        if self.rng.gen::<f64>() < profile.pattern_randomness {
            base *= self.uniform(1.0 - PATTERN_SPREAD, 1.0 + PATTERN_SPREAD);
        }
        let progressive = 1.0 + (request_count as f64 / 1000.0) * profile.progressive_rate;

        let jitter = match Normal::new(0.0, base * JITTER_RATIO) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        };

        let units = (base * progressive + jitter).max(MIN_DELAY_UNITS);
        self.units(units)
    }

    /// Draws a wait uniformly from a fixed window of time units
    pub fn delay_between(&mut self, min_units: f64, max_units: f64) -> Duration {
        let units = self.uniform(min_units, max_units).max(MIN_DELAY_UNITS);
        self.units(units)
    }

    /// Builds the header set for the next request
    ///
    /// The user-agent is drawn fresh for every call unless the profile pins agents for an
    /// interval of time units, in which case the current agent is kept until it expires.
    pub fn headers_for(&mut self, profile: &StealthProfile) -> HeaderMap {
        let agent = self.next_agent(profile);
        browser_headers(&mut self.rng, agent, profile.header_variation)
    }

    fn next_agent(&mut self, profile: &StealthProfile) -> &'static str {
        let Some(pin_units) = profile.ua_rotation else {
            return random_agent(&mut self.rng);
        };
        let interval = self.units(pin_units);

        let now = Instant::now();
        match self.pinned_agent {
            Some((agent, since)) if now.duration_since(since) < interval => agent,
            _ => {
                let agent = random_agent(&mut self.rng);
                tracing::debug!("Rotating user-agent to {}", agent);
                self.pinned_agent = Some((agent, now));
                agent
            }
        }
    }

    /// Returns true once the active time exceeds this work period's target
    ///
    /// The target is drawn the first time it is needed and kept until the next break.
    pub fn should_take_break(&mut self, profile: &StealthProfile, active_time: Duration) -> bool {
        let target = match self.work_target {
            Some(target) => target,
            None => {
                let minutes = self.uniform(profile.work_cycle.0, profile.work_cycle.1);
                let target = self.units(minutes * UNITS_PER_MINUTE);
                tracing::debug!("Work period target: {:.1} minutes", minutes);
                self.work_target = Some(target);
                target
            }
        };

        active_time >= target
    }

    /// Draws the length of a break and starts a new work period
    pub fn break_duration(&mut self, profile: &StealthProfile) -> Duration {
        self.work_target = None;
        let minutes = self.uniform(profile.rest_cycle.0, profile.rest_cycle.1);
        self.units(minutes * UNITS_PER_MINUTE)
    }

    /// Records that a request was sent
    pub fn record_request(&mut self) {
        self.request_count += 1;
        self.last_request = Some(Instant::now());
    }

    /// Returns the number of requests sent this session
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Returns when the last request was sent
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if min < max {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }
}
