//! Configuration module for Firm-Harvest
//!
//! This module handles loading, parsing, and validating the TOML run configuration, plus
//! the JSON stealth profiles an operator can save and load.
//!
//! # Example
//!
//! ```no_run
//! use firm_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Stealth level: {}", config.stealth.level);
//! ```

mod parser;
pub mod profile;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractionConfig, OutputConfig, PacingConfig, RunConfig, RunMode, StealthConfig,
    TargetConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use profile::{load_profile, ProfileSettings};

use crate::stealth::{StealthLevel, StealthProfile};
use crate::ConfigError;
use std::path::Path;

/// Resolves the stealth profile a run uses
///
/// The configured level selects a built-in profile; when a profile file is configured its
/// settings replace the level's knobs.
pub fn resolve_stealth_profile(config: &StealthConfig) -> Result<StealthProfile, ConfigError> {
    let level = StealthLevel::from_number(config.level).ok_or_else(|| {
        ConfigError::Validation(format!("unknown stealth level {}", config.level))
    })?;

    match &config.profile {
        Some(path) => {
            let settings = load_profile(Path::new(path))?;
            tracing::info!("Using custom stealth profile from {}", path);
            settings.to_stealth_profile(level)
        }
        None => Ok(StealthProfile::for_level(level)),
    }
}
