//! Crawler module: the background worker and its two phases
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching and page classification
//! - Pacing between requests
//! - The discovery engine over the identifier range
//! - The pipeline running discovery, extraction and output in sequence

mod coordinator;
mod fetcher;
mod observer;
mod pacer;
mod session;

pub use coordinator::{CrawlEngine, CrawlReport, DEFAULT_TEST_CHECKPOINT};
pub use fetcher::{build_http_client, FetchOutcome, FetchStatus, Fetcher};
pub use observer::{NullObserver, RunObserver, TracingObserver};
pub use pacer::{sleep_or_cancel, Pacer};
pub use session::Session;

pub(crate) use fetcher::parse_selector;

use crate::config::{resolve_stealth_profile, Config};
use crate::extract::ExtractionEngine;
use crate::output::{ResultSink, RunMetrics, WrittenFiles, XlsxWriter};
use crate::state::PhaseState;
use crate::storage::JsonStateStore;
use crate::Result;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Outcome of a full harvest
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub discovery: PhaseState,

    /// `None` when extraction never started
    pub extraction: Option<PhaseState>,

    /// Confirmed profile URLs, including those from resumed runs
    pub discovered: usize,

    pub records: usize,
    pub failures: usize,

    /// Spreadsheets written, if any
    pub files: Option<WrittenFiles>,

    pub metrics: RunMetrics,
}

/// Runs a complete harvest
///
/// 1. Resolve the stealth profile and build the session
/// 2. Run discovery over the identifier range
/// 3. Extract every confirmed profile
/// 4. Write the dataset and the failure list
///
/// A stopped discovery skips extraction. An empty discovered set ends the run with a
/// warning. A stopped extraction still writes what it gathered.
///
/// # Arguments
///
/// * `config` - The validated run configuration
/// * `cancel` - Token the controller cancels to stop at the next iteration boundary
/// * `observer` - Receives progress, metrics and warnings
///
/// # Example
///
/// ```no_run
/// use firm_harvest::config::load_config;
/// use firm_harvest::crawler::{run_harvest, TracingObserver};
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_harvest(&config, CancellationToken::new(), &TracingObserver).await?;
/// println!("{} records", summary.records);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    cancel: CancellationToken,
    observer: &dyn RunObserver,
) -> Result<HarvestSummary> {
    let profile = resolve_stealth_profile(&config.stealth)?;
    tracing::info!(
        "Stealth profile {} (level {}): delay {}-{} units, backoff {}, pattern randomness {}, header variation {}",
        profile.name,
        profile.level,
        profile.min_delay,
        profile.max_delay,
        profile.backoff_factor,
        profile.pattern_randomness,
        profile.header_variation
    );

    let save_dir = Path::new(&config.output.save_directory);
    let mut session = Session::new(config, profile, cancel)?;
    let mut store = JsonStateStore::in_directory(save_dir);

    let mut discovery = CrawlEngine::new(config.run.clone())
        .with_checkpoint_every(config.pacing.test_checkpoint_every);
    let crawl = discovery.run(&mut session, &mut store, observer).await?;

    let mut summary = HarvestSummary {
        discovery: crawl.outcome,
        extraction: None,
        discovered: crawl.discovered.len(),
        records: 0,
        failures: 0,
        files: None,
        metrics: session.metrics(),
    };

    if crawl.outcome == PhaseState::Stopped {
        observer.status("Discovery was stopped; skipping extraction");
        return Ok(summary);
    }

    if crawl.discovered.is_empty() {
        observer.warning("No profiles were discovered; nothing to extract");
        return Ok(summary);
    }

    let writer = XlsxWriter::new(save_dir, config.output.file_name.clone());
    let mut extraction = ExtractionEngine::new(&config.extraction.ranking_year)?
        .with_checkpoints(Box::new(writer.clone()), config.extraction.checkpoint_every);
    let report = extraction
        .extract_batch(&mut session, &crawl.discovered, observer)
        .await?;

    let files = writer.write(&report.records, &report.failures)?;
    observer.status(&format!("Results saved to {}", files.records.display()));

    summary.extraction = Some(report.outcome);
    summary.records = report.records.len();
    summary.failures = report.failures.len();
    summary.files = Some(files);
    summary.metrics = session.metrics();
    Ok(summary)
}
