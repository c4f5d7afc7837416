use serde::Deserialize;

/// Main configuration structure for Firm-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub stealth: StealthConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Whether the discovery phase starts over or picks up persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    New,
    Resume,
}

/// Identifier range and run mode
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub mode: RunMode,

    /// First identifier to probe on a fresh run
    #[serde(rename = "range-start")]
    pub range_start: u64,

    /// Last identifier of the configured range (inclusive)
    #[serde(rename = "range-end")]
    pub range_end: u64,

    /// Short validation run: used as the upper bound instead of `range-end`
    #[serde(rename = "test-count", default)]
    pub test_count: Option<u64>,
}

impl RunConfig {
    /// Returns the identifier the loop stops at (inclusive)
    pub fn upper_bound(&self) -> u64 {
        self.test_count.unwrap_or(self.range_end)
    }

    /// Returns true when this is a short validation run
    pub fn is_test_run(&self) -> bool {
        self.test_count.is_some()
    }
}

/// Remote directory settings
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Profile page URL with an `{id}` placeholder
    #[serde(rename = "url-template", default = "default_url_template")]
    pub url_template: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Element whose presence confirms a profile page
    #[serde(rename = "marker-selector", default = "default_marker")]
    pub marker_selector: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            request_timeout_secs: default_timeout(),
            marker_selector: default_marker(),
        }
    }
}

/// Stealth profile selection
#[derive(Debug, Clone, Deserialize)]
pub struct StealthConfig {
    /// Built-in aggressiveness level (1 = aggressive .. 4 = ultra-conservative)
    #[serde(default = "default_level")]
    pub level: u8,

    /// Optional JSON profile with custom settings
    #[serde(default)]
    pub profile: Option<String>,

    /// Whether the engines consult the work/rest cycle between requests
    #[serde(rename = "work-rest-cycling", default)]
    pub work_rest_cycling: bool,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            profile: None,
            work_rest_cycling: false,
        }
    }
}

/// Time-unit scaling and fixed pacing constants
///
/// Every delay the scheduler produces is expressed in time units; one unit is one second
/// in production.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(rename = "time-unit-ms", default = "default_time_unit")]
    pub time_unit_ms: u64,

    /// Cooldown after an HTTP 429, in time units
    #[serde(rename = "rate-limit-cooldown", default = "default_cooldown")]
    pub rate_limit_cooldown: f64,

    #[serde(rename = "test-delay-min", default = "default_test_delay_min")]
    pub test_delay_min: f64,

    #[serde(rename = "test-delay-max", default = "default_test_delay_max")]
    pub test_delay_max: f64,

    /// Persist crawl state every N identifiers during a test run
    #[serde(rename = "test-checkpoint-every", default = "default_test_checkpoint")]
    pub test_checkpoint_every: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: default_time_unit(),
            rate_limit_cooldown: default_cooldown(),
            test_delay_min: default_test_delay_min(),
            test_delay_max: default_test_delay_max(),
            test_checkpoint_every: default_test_checkpoint(),
        }
    }
}

/// Extraction phase settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Survey year whose rank is read from the rankings blocks
    #[serde(rename = "ranking-year", default = "default_ranking_year")]
    pub ranking_year: String,

    /// Write interim spreadsheets every N URLs (0 disables)
    #[serde(rename = "checkpoint-every", default)]
    pub checkpoint_every: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ranking_year: default_ranking_year(),
            checkpoint_every: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the crawl state file and the spreadsheets
    #[serde(rename = "save-directory")]
    pub save_directory: String,

    /// Spreadsheet name without extension
    #[serde(rename = "file-name")]
    pub file_name: String,

    #[serde(rename = "profiles-directory", default = "default_profiles_dir")]
    pub profiles_directory: String,

    #[serde(rename = "log-directory", default = "default_log_dir")]
    pub log_directory: String,
}

fn default_url_template() -> String {
    "https://www.law.com/americanlawyer/law-firm-profile/?id={id}".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_marker() -> String {
    "h1.page-title.left".to_string()
}

fn default_level() -> u8 {
    2
}

fn default_time_unit() -> u64 {
    1000
}

fn default_cooldown() -> f64 {
    60.0
}

fn default_test_delay_min() -> f64 {
    1.0
}

fn default_test_delay_max() -> f64 {
    3.0
}

fn default_test_checkpoint() -> u64 {
    5
}

fn default_ranking_year() -> String {
    "2024".to_string()
}

fn default_profiles_dir() -> String {
    "profiles".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}
