//! Discovery phase
//!
//! The crawl engine walks the identifier range, confirms which identifiers resolve to
//! profile pages, and keeps the resumable `CrawlState` current:
//! - `New` discards persisted state and starts at the range start
//! - `Resume` continues from the last processed identifier
//! - State is persisted at the end of every run, stopped or not

use crate::config::{RunConfig, RunMode};
use crate::crawler::fetcher::FetchStatus;
use crate::crawler::observer::RunObserver;
use crate::crawler::session::Session;
use crate::state::{CrawlState, PhaseState};
use crate::storage::StateStore;
use crate::{HarvestError, Result};

/// Default number of identifiers between checkpoints during a test run
pub const DEFAULT_TEST_CHECKPOINT: u64 = 5;

/// What a discovery run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// `Completed` or `Stopped`
    pub outcome: PhaseState,

    /// Every confirmed profile URL, including those from earlier runs, sorted
    pub discovered: Vec<String>,

    /// Identifiers fetched in this run
    pub processed: u64,

    pub last_processed_id: u64,
}

/// Drives the discovery loop
pub struct CrawlEngine {
    run: RunConfig,
    checkpoint_every: u64,
    state: PhaseState,
}

impl CrawlEngine {
    pub fn new(run: RunConfig) -> Self {
        Self {
            run,
            checkpoint_every: DEFAULT_TEST_CHECKPOINT,
            state: PhaseState::Idle,
        }
    }

    /// Sets how often a test run persists its state
    pub fn with_checkpoint_every(mut self, every: u64) -> Self {
        self.checkpoint_every = every.max(1);
        self
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    /// Runs discovery to completion or cancellation
    ///
    /// # Arguments
    ///
    /// * `session` - Shared fetcher, pacer and metrics
    /// * `store` - Where the crawl state is loaded from and persisted to
    /// * `observer` - Receives progress, metrics and warnings
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The phase completed or was stopped
    /// * `Err(HarvestError::RangeMismatch)` - Saved progress lies beyond the range end
    /// * `Err(HarvestError)` - An unexpected error; the phase is `Failed`
    pub async fn run(
        &mut self,
        session: &mut Session,
        store: &mut dyn StateStore,
        observer: &dyn RunObserver,
    ) -> Result<CrawlReport> {
        self.state = self.state.transition(PhaseState::Running)?;
        observer.status("Discovery started");

        match self.sweep(session, store, observer).await {
            Ok(report) => {
                self.state = self.state.transition(report.outcome)?;
                observer.status(&format!(
                    "Discovery {}: {} profiles confirmed",
                    report.outcome,
                    report.discovered.len()
                ));
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Discovery failed: {}", e);
                self.state = self.state.transition(PhaseState::Failed)?;
                Err(e)
            }
        }
    }

    async fn sweep(
        &mut self,
        session: &mut Session,
        store: &mut dyn StateStore,
        observer: &dyn RunObserver,
    ) -> Result<CrawlReport> {
        let mut crawl_state = self.initial_state(store, observer)?;

        let start = crawl_state.last_processed_id;
        let bound = self.run.upper_bound();
        let total = if start <= bound { bound - start + 1 } else { 0 };
        let test_mode = self.run.is_test_run();

        tracing::info!(
            "Probing IDs {} to {} ({} candidates, {} already confirmed)",
            start,
            bound,
            total,
            crawl_state.discovered_count()
        );

        let mut processed = 0u64;
        let mut stopped = false;

        for id in start..=bound {
            if session.is_cancelled() {
                tracing::info!("Discovery stopped before ID {}", id);
                stopped = true;
                break;
            }

            let outcome = session.fetch_candidate(id).await?;
            match outcome.status {
                FetchStatus::Success => {
                    if crawl_state.confirm(outcome.url.clone()) {
                        tracing::info!("Confirmed profile: {}", outcome.url);
                    }
                }
                FetchStatus::RateLimited => {
                    observer.warning(&format!(
                        "Rate limited at ID {}; cooling down before continuing",
                        id
                    ));
                    session.cooldown().await;
                }
                FetchStatus::NotFound => {}
                FetchStatus::NetworkError => {
                    tracing::warn!(
                        "ID {}: {}",
                        id,
                        outcome.error.as_deref().unwrap_or("network error")
                    );
                }
            }

            crawl_state.advance(id);
            processed += 1;
            observer.metrics(&session.metrics());

            if processed < total {
                let percent = processed as f64 / total as f64 * 100.0;
                observer.crawl_progress(percent, &format!("Processed ID {}", id));
            }

            if test_mode && processed % self.checkpoint_every == 0 {
                store.save(&crawl_state)?;
            }

            if id < bound {
                session.pause().await;
            }
        }

        store.save(&crawl_state)?;

        let outcome = if stopped {
            PhaseState::Stopped
        } else {
            observer.crawl_progress(100.0, "Discovery complete");
            PhaseState::Completed
        };

        Ok(CrawlReport {
            outcome,
            discovered: crawl_state.discovered_urls(),
            processed,
            last_processed_id: crawl_state.last_processed_id,
        })
    }

    fn initial_state(
        &self,
        store: &mut dyn StateStore,
        observer: &dyn RunObserver,
    ) -> Result<CrawlState> {
        match self.run.mode {
            RunMode::New => {
                store.clear()?;
                tracing::info!("Starting a new discovery run at ID {}", self.run.range_start);
                Ok(CrawlState::fresh(self.run.range_start))
            }
            RunMode::Resume => match store.load()? {
                Some(state) if state.last_processed_id > self.run.range_end => {
                    let error = HarvestError::RangeMismatch {
                        last_id: state.last_processed_id,
                        range_end: self.run.range_end,
                    };
                    observer.warning(&error.to_string());
                    Err(error)
                }
                Some(state) => {
                    tracing::info!(
                        "Resuming at ID {} with {} confirmed profiles",
                        state.last_processed_id,
                        state.discovered_count()
                    );
                    Ok(state)
                }
                None => {
                    tracing::info!(
                        "No saved progress found; starting at ID {}",
                        self.run.range_start
                    );
                    Ok(CrawlState::fresh(self.run.range_start))
                }
            },
        }
    }
}
