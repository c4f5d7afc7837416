use crate::config::types::{
    Config, ExtractionConfig, OutputConfig, PacingConfig, RunConfig, StealthConfig, TargetConfig,
};
use crate::url::TargetTemplate;
use crate::ConfigError;
use scraper::Selector;

/// Longest fixed wait (cooldown or test delay) the pacing section may configure, in time units
const MAX_PACING_UNITS: f64 = 3600.0;

/// Longest time unit, in milliseconds
const MAX_TIME_UNIT_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_run_config(&config.run)?;
    validate_target_config(&config.target)?;
    validate_stealth_config(&config.stealth)?;
    validate_pacing_config(&config.pacing)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the identifier range
fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.range_start > config.range_end {
        return Err(ConfigError::Validation(format!(
            "range-start ({}) must not exceed range-end ({})",
            config.range_start, config.range_end
        )));
    }

    if let Some(test_count) = config.test_count {
        if test_count < config.range_start {
            tracing::warn!(
                "test-count ({}) is below range-start ({}); a fresh test run will probe nothing",
                test_count,
                config.range_start
            );
        }
    }

    Ok(())
}

/// Validates the remote directory settings
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    TargetTemplate::new(&config.url_template)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url-template: {}", e)))?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Selector::parse(&config.marker_selector).map_err(|e| {
        ConfigError::Validation(format!(
            "marker-selector '{}' is not a valid CSS selector: {}",
            config.marker_selector, e
        ))
    })?;

    Ok(())
}

/// Validates the stealth level
fn validate_stealth_config(config: &StealthConfig) -> Result<(), ConfigError> {
    if !(1..=4).contains(&config.level) {
        return Err(ConfigError::Validation(format!(
            "stealth level must be between 1 and 4, got {}",
            config.level
        )));
    }

    if let Some(profile) = &config.profile {
        if profile.trim().is_empty() {
            return Err(ConfigError::Validation(
                "stealth profile path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates time scaling and the fixed pacing windows
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if !(1..=MAX_TIME_UNIT_MS).contains(&config.time_unit_ms) {
        return Err(ConfigError::Validation(format!(
            "time-unit-ms must be between 1 and {}, got {}",
            MAX_TIME_UNIT_MS, config.time_unit_ms
        )));
    }

    if !(1.0..=MAX_PACING_UNITS).contains(&config.rate_limit_cooldown) {
        return Err(ConfigError::Validation(format!(
            "rate-limit-cooldown must be between 1 and {} time units, got {}",
            MAX_PACING_UNITS, config.rate_limit_cooldown
        )));
    }

    if !(config.test_delay_min > 0.0
        && config.test_delay_min <= config.test_delay_max
        && config.test_delay_max <= MAX_PACING_UNITS)
    {
        return Err(ConfigError::Validation(format!(
            "test delay window must satisfy 0 < min <= max <= {}, got {}..{}",
            MAX_PACING_UNITS, config.test_delay_min, config.test_delay_max
        )));
    }

    if config.test_checkpoint_every < 1 {
        return Err(ConfigError::Validation(
            "test-checkpoint-every must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates extraction settings
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    let year = &config.ranking_year;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::Validation(format!(
            "ranking-year must be a four digit year, got '{}'",
            year
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.save_directory.is_empty() {
        return Err(ConfigError::Validation(
            "save-directory cannot be empty".to_string(),
        ));
    }

    validate_file_name(&config.file_name)?;

    if config.profiles_directory.is_empty() {
        return Err(ConfigError::Validation(
            "profiles-directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Spreadsheet names are joined onto the save directory, so path separators are refused
fn validate_file_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "file-name cannot be empty".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "file-name must not contain path separators, got '{}'",
            name
        )));
    }

    if name.ends_with(".xlsx") {
        return Err(ConfigError::Validation(format!(
            "file-name is given without extension, got '{}'",
            name
        )));
    }

    Ok(())
}
