//! Extraction phase
//!
//! Fetches every confirmed profile page again and maps its markup onto `FirmRecord`.
//! A page that cannot be fetched becomes a failure entry; a page that can be fetched always
//! yields a record, however sparse.

use crate::crawler::{FetchStatus, RunObserver, Session};
use crate::extract::record::FirmRecord;
use crate::extract::rules::Extractor;
use crate::output::{FailedUrl, ResultSink};
use crate::state::PhaseState;
use crate::Result;
use scraper::Html;

/// What an extraction run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    /// `Completed` or `Stopped`
    pub outcome: PhaseState,
    pub records: Vec<FirmRecord>,
    pub failures: Vec<FailedUrl>,
}

/// Drives the extraction loop
pub struct ExtractionEngine {
    extractor: Extractor,
    checkpoint: Option<(Box<dyn ResultSink>, usize)>,
    state: PhaseState,
}

impl ExtractionEngine {
    /// Creates an engine reading ranks for `ranking_year`
    pub fn new(ranking_year: &str) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(ranking_year)?,
            checkpoint: None,
            state: PhaseState::Idle,
        })
    }

    /// Writes interim results to `sink` every `every` URLs; 0 disables checkpoints
    pub fn with_checkpoints(mut self, sink: Box<dyn ResultSink>, every: usize) -> Self {
        self.checkpoint = if every == 0 { None } else { Some((sink, every)) };
        self
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    /// Parses a fetched page into a record
    ///
    /// Pure function of its inputs: the same page always yields the same record.
    pub fn parse_record(&self, url: &str, html: &str) -> FirmRecord {
        let document = Html::parse_document(html);
        let record = self.extractor.extract(url, &document);

        let missing = record.missing_fields().len();
        if missing > 0 {
            tracing::debug!("{}: {} of 10 fields missing", url, missing);
        }
        record
    }

    /// Fetches one profile page and extracts its record
    ///
    /// Only transport errors fail; any HTTP status with a body is parsed.
    pub async fn extract(
        &self,
        session: &mut Session,
        url: &str,
    ) -> std::result::Result<FirmRecord, FailedUrl> {
        self.fetch_and_parse(session, url).await.1
    }

    async fn fetch_and_parse(
        &self,
        session: &mut Session,
        url: &str,
    ) -> (FetchStatus, std::result::Result<FirmRecord, FailedUrl>) {
        let outcome = session.fetch_page(url).await;
        let status = outcome.status;

        let body = match (status, outcome.body) {
            (FetchStatus::NetworkError, _) | (_, None) => {
                let error = outcome
                    .error
                    .unwrap_or_else(|| "no response body".to_string());
                return (status, Err(FailedUrl::new(url, error)));
            }
            (_, Some(body)) => body,
        };

        if status != FetchStatus::Success {
            tracing::warn!(
                "{} returned HTTP {}; parsing anyway",
                url,
                outcome.http_status.unwrap_or_default()
            );
        }

        (status, Ok(self.parse_record(url, &body)))
    }

    /// Extracts every URL in order, paced like discovery
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionReport)` - Records and failures gathered before completion or stop
    /// * `Err(HarvestError)` - An unexpected error; the phase is `Failed`
    pub async fn extract_batch(
        &mut self,
        session: &mut Session,
        urls: &[String],
        observer: &dyn RunObserver,
    ) -> Result<ExtractionReport> {
        self.state = self.state.transition(PhaseState::Running)?;
        observer.status(&format!("Extraction started for {} profiles", urls.len()));

        let total = urls.len();
        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut stopped = false;

        for (index, url) in urls.iter().enumerate() {
            if session.is_cancelled() {
                tracing::info!("Extraction stopped before {}", url);
                stopped = true;
                break;
            }

            let (status, result) = self.fetch_and_parse(session, url).await;
            match result {
                Ok(record) => {
                    tracing::info!(
                        "Extracted {}",
                        record.firm_name.as_deref().unwrap_or(url.as_str())
                    );
                    records.push(record);
                }
                Err(failure) => {
                    tracing::warn!("Failed to extract {}: {}", failure.url, failure.error);
                    failures.push(failure);
                }
            }

            let done = index + 1;
            observer.metrics(&session.metrics());
            if done < total {
                let percent = done as f64 / total as f64 * 100.0;
                observer.extract_progress(percent, &format!("Processed {}", url));
            }

            if let Some((sink, every)) = &self.checkpoint {
                if done % *every == 0 {
                    if let Err(e) = sink.write_interim(&records, &failures) {
                        observer.warning(&format!("Interim checkpoint failed: {}", e));
                    }
                }
            }

            if status == FetchStatus::RateLimited {
                observer.warning(&format!("Rate limited at {}; cooling down", url));
                session.cooldown().await;
            }

            if done < total {
                session.pause().await;
            }
        }

        let outcome = if stopped {
            PhaseState::Stopped
        } else {
            observer.extract_progress(100.0, "Extraction complete");
            PhaseState::Completed
        };
        self.state = self.state.transition(outcome)?;
        observer.status(&format!(
            "Extraction {}: {} records, {} failures",
            outcome,
            records.len(),
            failures.len()
        ));

        Ok(ExtractionReport {
            outcome,
            records,
            failures,
        })
    }
}
