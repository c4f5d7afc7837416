//! Shared fixtures for the integration tests

use firm_harvest::config::{parse_config, Config};
use firm_harvest::crawler::RunObserver;
use firm_harvest::output::RunMetrics;
use std::path::Path;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A profile page carrying the marker and every extracted field
pub const PROFILE_PAGE: &str = r##"<html><body>
    <h1 class="page-title left">Example &amp; Partners LLP</h1>
    <div class="rankings">
        <p class="survey-name-firms">Am Law 200</p>
        <p class="date-firms">2024</p><p class="rank-firms">#12</p>
    </div>
    <div class="rankings">
        <p class="survey-name-firms">NLJ 500</p>
        <p class="date-firms">2024</p><p class="rank-firms">#20</p>
    </div>
    <div class="row">
        <div class="col-md-6"><p class="overview-title">Equity Partners:</p></div>
        <div class="col-md-6">210</div>
        <div class="col-md-6"><p class="overview-title">Non-Equity Partners:</p></div>
        <div class="col-md-6">95</div>
        <div class="col-md-6"><p class="overview-title">Total Revenue:</p></div>
        <div class="col-md-6">$1,250,000,000</div>
        <div class="col-md-6"><p class="overview-title">Profit Per Equity Partner:</p></div>
        <div class="col-md-6">$2,100,000</div>
        <div class="col-md-6"><p class="overview-title">Revenue Per Lawyer:</p></div>
        <div class="col-md-6">$1,050,000</div>
        <div class="col-md-6"><p class="overview-title">Total Headcount*:</p></div>
        <div class="col-md-6">1,190</div>
    </div>
    <p class="firms-para">A full-service firm.</p>
</body></html>"##;

/// A 200 page the directory serves for unknown identifiers
pub const EMPTY_PAGE: &str = "<html><body><h1>Firm not found</h1></body></html>";

/// Builds a fast test configuration against `server`
pub fn create_test_config(server: &MockServer, dir: &Path, mode: &str, start: u64, end: u64) -> Config {
    let toml = format!(
        r#"
[run]
mode = "{mode}"
range-start = {start}
range-end = {end}

[target]
url-template = "{uri}/profile/?id={{id}}"
request-timeout-secs = 5

[stealth]
level = 1

[pacing]
time-unit-ms = 1

[output]
save-directory = "{dir}"
file-name = "firms"
log-directory = "{dir}/logs"
profiles-directory = "{dir}/profiles"
"#,
        mode = mode,
        start = start,
        end = end,
        uri = server.uri(),
        dir = dir.display(),
    );
    parse_config(&toml).expect("test config should be valid")
}

/// Returns the candidate URL the crawler builds for `id`
pub fn candidate_url(server: &MockServer, id: u64) -> String {
    format!("{}/profile/?id={}", server.uri(), id)
}

/// Serves the full profile page for `id`
pub async fn mount_profile(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path("/profile/"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_PAGE))
        .mount(server)
        .await;
}

/// Serves a page without the marker for `id`
pub async fn mount_empty(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path("/profile/"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
        .mount(server)
        .await;
}

/// Observer that records every callback, optionally cancelling on the first warning
#[derive(Default)]
pub struct RecordingObserver {
    pub crawl_progress: Mutex<Vec<f64>>,
    pub extract_progress: Mutex<Vec<f64>>,
    pub warnings: Mutex<Vec<String>>,
    pub snapshots: Mutex<Vec<RunMetrics>>,
    cancel_on_warning: Option<CancellationToken>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_on_warning(token: CancellationToken) -> Self {
        Self {
            cancel_on_warning: Some(token),
            ..Self::default()
        }
    }

    pub fn crawl_percents(&self) -> Vec<f64> {
        self.crawl_progress.lock().unwrap().clone()
    }

    pub fn extract_percents(&self) -> Vec<f64> {
        self.extract_progress.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

impl RunObserver for RecordingObserver {
    fn crawl_progress(&self, percent: f64, _message: &str) {
        self.crawl_progress.lock().unwrap().push(percent);
    }

    fn extract_progress(&self, percent: f64, _message: &str) {
        self.extract_progress.lock().unwrap().push(percent);
    }

    fn metrics(&self, metrics: &RunMetrics) {
        self.snapshots.lock().unwrap().push(metrics.clone());
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
        if let Some(token) = &self.cancel_on_warning {
            token.cancel();
        }
    }
}
