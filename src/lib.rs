//! Firm-Harvest: a paced directory sweeper and profile extractor
//!
//! This crate probes a numeric identifier space on a remote directory, confirms which
//! identifiers resolve to firm profile pages, and then extracts a fixed record schema from
//! every confirmed page. Requests are paced by a stealth scheduler, and the discovery phase
//! can be interrupted and resumed without losing confirmed URLs.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod stealth;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Firm-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error(
        "Last processed ID ({last_id}) is beyond the configured range end ({range_end})"
    )]
    RangeMismatch { last_id: u64, range_end: u64 },

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PhaseState,
        to: state::PhaseState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse profile JSON: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL template is missing the {{id}} placeholder: {0}")]
    MissingPlaceholder(String),

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Firm-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_harvest, CrawlEngine, HarvestSummary, Session};
pub use extract::{ExtractionEngine, FirmRecord};
pub use state::{CrawlState, PhaseState};
pub use stealth::{StealthLevel, StealthProfile, StealthScheduler};
