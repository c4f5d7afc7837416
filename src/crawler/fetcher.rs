//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for both phases, including:
//! - Building the shared HTTP client with the configured timeout
//! - Fetching candidate pages by identifier and classifying them
//! - Fetching confirmed profile pages for extraction
//!
//! Requests are never retried here; the engines decide what a failed attempt means.

use crate::config::TargetConfig;
use crate::url::TargetTemplate;
use crate::{HarvestError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::fmt;
use std::time::{Duration, Instant};

/// Class names logged for every candidate page, to reconstruct classification decisions
const DIAGNOSTIC_PATTERNS: [&str; 4] = [
    ".page-title",
    ".overview-title",
    ".survey-name-firms",
    ".firms-para",
];

/// Classification of one fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// HTTP 200 and, for candidates, the profile marker is present
    Success,

    /// Any other non-429 response, including a 200 without the marker
    NotFound,

    /// HTTP 429
    RateLimited,

    /// Timeout, connection failure or unreadable body
    NetworkError,
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one request
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub url: String,

    /// HTTP status code, absent on transport errors
    pub http_status: Option<u16>,

    /// Page body, absent on transport errors
    pub body: Option<String>,

    /// Transport error description
    pub error: Option<String>,

    pub elapsed: Duration,
}

/// Builds the HTTP client shared by both phases
///
/// Compression is negotiated by the client itself, so callers never set Accept-Encoding.
///
/// # Arguments
///
/// * `config` - The target configuration carrying the request timeout
pub fn build_http_client(config: &TargetConfig) -> std::result::Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues requests against the remote directory
pub struct Fetcher {
    client: Client,
    template: TargetTemplate,
    marker: Selector,
    diagnostics: Vec<(&'static str, Selector)>,
}

impl Fetcher {
    /// Creates a fetcher with its own client
    pub fn new(config: &TargetConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Self::with_client(client, config)
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &TargetConfig) -> Result<Self> {
        let template = TargetTemplate::new(&config.url_template)?;
        let marker = parse_selector(&config.marker_selector)?;
        let diagnostics = DIAGNOSTIC_PATTERNS
            .iter()
            .map(|pattern| Ok((*pattern, parse_selector(pattern)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            template,
            marker,
            diagnostics,
        })
    }

    /// Returns the profile URL for an identifier
    pub fn candidate_url(&self, id: u64) -> Result<String> {
        Ok(self.template.build(id)?.to_string())
    }

    /// Fetches the page for `id` and decides whether it is a profile
    ///
    /// # Classification
    ///
    /// | Response | Status |
    /// |----------|--------|
    /// | 200 with marker | Success |
    /// | 200 without marker | NotFound |
    /// | 429 | RateLimited |
    /// | any other status | NotFound |
    /// | timeout, connection or body error | NetworkError |
    pub async fn fetch_candidate(&self, id: u64, headers: HeaderMap) -> Result<FetchOutcome> {
        let url = self.candidate_url(id)?;
        let mut outcome = self.fetch_page(&url, headers).await;

        if outcome.status == FetchStatus::Success {
            let body = outcome.body.as_deref().unwrap_or_default();
            if !self.has_marker(body) {
                tracing::debug!("ID {}: HTTP 200 without profile marker", id);
                outcome.status = FetchStatus::NotFound;
            }
        }

        tracing::info!(
            "ID {}: {} (HTTP {}, {:.2}s)",
            id,
            outcome.status,
            outcome
                .http_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            outcome.elapsed.as_secs_f64()
        );

        Ok(outcome)
    }

    /// Fetches a page, classifying only by HTTP status
    pub async fn fetch_page(&self, url: &str, headers: HeaderMap) -> FetchOutcome {
        let started = Instant::now();
        tracing::debug!("GET {}", url);

        let response = match self.client.get(url).headers(headers).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = describe_error(&e);
                tracing::warn!("Request to {} failed: {}", url, error);
                return FetchOutcome {
                    status: FetchStatus::NetworkError,
                    url: url.to_string(),
                    http_status: None,
                    body: None,
                    error: Some(error),
                    elapsed: started.elapsed(),
                };
            }
        };

        let code = response.status();
        let status = match code {
            StatusCode::OK => FetchStatus::Success,
            StatusCode::TOO_MANY_REQUESTS => FetchStatus::RateLimited,
            _ => FetchStatus::NotFound,
        };

        match response.text().await {
            Ok(body) => FetchOutcome {
                status,
                url: url.to_string(),
                http_status: Some(code.as_u16()),
                body: Some(body),
                error: None,
                elapsed: started.elapsed(),
            },
            Err(e) => {
                let error = describe_error(&e);
                tracing::warn!("Reading body of {} failed: {}", url, error);
                FetchOutcome {
                    status: FetchStatus::NetworkError,
                    url: url.to_string(),
                    http_status: Some(code.as_u16()),
                    body: None,
                    error: Some(error),
                    elapsed: started.elapsed(),
                }
            }
        }
    }

    fn has_marker(&self, body: &str) -> bool {
        let document = Html::parse_document(body);

        if tracing::enabled!(tracing::Level::DEBUG) {
            for (pattern, selector) in &self.diagnostics {
                let count = document.select(selector).count();
                tracing::debug!("  pattern {}: {} element(s)", pattern, count);
            }
        }

        document.select(&self.marker).next().is_some()
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timeout: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
