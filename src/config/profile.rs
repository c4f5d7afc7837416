//! Custom stealth profiles stored as JSON
//!
//! A profile file carries nine numeric settings. Profiles live in a profiles directory as
//! `<name>.json`; every save also drops an `auto_<timestamp>.json` copy, which listings skip.

use crate::stealth::{StealthLevel, StealthProfile};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const AUTO_PREFIX: &str = "auto_";

/// Longest delay window edge a profile may configure (seconds)
const MAX_DELAY_SECS: f64 = 3600.0;

/// Longest work, rest or pinning period a profile may configure (minutes)
const MAX_CYCLE_MINUTES: f64 = 24.0 * 60.0;

/// Largest slow-down per thousand requests, in percent
const MAX_PROGRESSIVE_PERCENT: f64 = 1000.0;

/// The nine operator-facing pacing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettings {
    /// Midpoint of the inter-request delay window (seconds)
    pub base_delay: f64,
    /// Width of the delay window (seconds)
    pub delay_variation: f64,
    /// Slow-down per thousand requests, in percent
    pub progressive_increase: f64,
    /// Upper bound of a work period (minutes)
    pub work_duration: f64,
    /// Upper bound of a rest period (minutes)
    pub rest_duration: f64,
    /// Width of the work and rest windows (minutes)
    pub cycle_variation: f64,
    /// Pattern randomness, in percent
    pub request_randomization: f64,
    /// Minutes a user-agent stays pinned; 0 rotates on every request
    pub ua_frequency: f64,
    /// Header variation, in percent
    pub header_variation: f64,
}

impl ProfileSettings {
    /// Derives slider-style settings from a built-in level
    pub fn from_level(level: StealthLevel) -> Self {
        let profile = StealthProfile::for_level(level);
        Self {
            base_delay: (profile.min_delay + profile.max_delay) / 2.0,
            delay_variation: profile.max_delay - profile.min_delay,
            progressive_increase: profile.progressive_rate * 100.0,
            work_duration: profile.work_cycle.1,
            rest_duration: profile.rest_cycle.1,
            cycle_variation: profile.work_cycle.1 - profile.work_cycle.0,
            request_randomization: profile.pattern_randomness * 100.0,
            ua_frequency: 0.0,
            header_variation: profile.header_variation * 100.0,
        }
    }

    /// Converts the settings into a custom profile on top of `level`
    ///
    /// The level keeps its backoff factor; every other knob comes from the settings.
    pub fn to_stealth_profile(&self, level: StealthLevel) -> Result<StealthProfile, ConfigError> {
        self.validate()?;
        let base = StealthProfile::for_level(level);

        let half = self.delay_variation / 2.0;
        let ua_rotation = if self.ua_frequency > 0.0 {
            Some(self.ua_frequency * 60.0)
        } else {
            None
        };

        Ok(StealthProfile {
            level,
            name: "Custom",
            min_delay: self.base_delay - half,
            max_delay: self.base_delay + half,
            work_cycle: (self.work_duration - self.cycle_variation, self.work_duration),
            rest_cycle: (
                (self.rest_duration - self.cycle_variation).max(0.0),
                self.rest_duration,
            ),
            backoff_factor: base.backoff_factor,
            pattern_randomness: self.request_randomization / 100.0,
            header_variation: self.header_variation / 100.0,
            progressive_rate: self.progressive_increase / 100.0,
            ua_rotation,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            self.base_delay,
            self.delay_variation,
            self.progressive_increase,
            self.work_duration,
            self.rest_duration,
            self.cycle_variation,
            self.request_randomization,
            self.ua_frequency,
            self.header_variation,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Validation(
                "profile settings must be finite and non-negative".to_string(),
            ));
        }

        if self.delay_variation <= 0.0 || self.base_delay - self.delay_variation / 2.0 < 0.0 {
            return Err(ConfigError::Validation(format!(
                "delay window {} ± {} must be non-empty and non-negative",
                self.base_delay,
                self.delay_variation / 2.0
            )));
        }

        if self.cycle_variation <= 0.0 || self.cycle_variation >= self.work_duration {
            return Err(ConfigError::Validation(format!(
                "cycle_variation ({}) must be positive and below work_duration ({})",
                self.cycle_variation, self.work_duration
            )));
        }

        if self.rest_duration <= 0.0 {
            return Err(ConfigError::Validation(
                "rest_duration must be positive".to_string(),
            ));
        }

        if self.base_delay + self.delay_variation / 2.0 > MAX_DELAY_SECS {
            return Err(ConfigError::Validation(format!(
                "delay window must end within {}s",
                MAX_DELAY_SECS
            )));
        }

        if self.work_duration > MAX_CYCLE_MINUTES
            || self.rest_duration > MAX_CYCLE_MINUTES
            || self.ua_frequency > MAX_CYCLE_MINUTES
        {
            return Err(ConfigError::Validation(format!(
                "work_duration, rest_duration and ua_frequency must not exceed {} minutes",
                MAX_CYCLE_MINUTES
            )));
        }

        if self.progressive_increase > MAX_PROGRESSIVE_PERCENT {
            return Err(ConfigError::Validation(format!(
                "progressive_increase must not exceed {}",
                MAX_PROGRESSIVE_PERCENT
            )));
        }

        if self.request_randomization > 100.0 || self.header_variation > 100.0 {
            return Err(ConfigError::Validation(
                "percentages must not exceed 100".to_string(),
            ));
        }

        Ok(())
    }
}

/// Loads profile settings from a JSON file
pub fn load_profile(path: &Path) -> Result<ProfileSettings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Saves settings as `<name>.json` plus a timestamped `auto_` copy
///
/// Returns the path of the named profile.
pub fn save_profile(
    dir: &Path,
    name: &str,
    settings: &ProfileSettings,
) -> Result<PathBuf, ConfigError> {
    validate_profile_name(name)?;
    std::fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(settings)?;
    let path = profile_path(dir, name);
    std::fs::write(&path, &json)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    std::fs::write(dir.join(format!("{}{}.json", AUTO_PREFIX, timestamp)), &json)?;

    tracing::info!("Saved profile '{}' to {}", name, path.display());
    Ok(path)
}

/// Lists named profiles in `dir`, skipping automatic copies
pub fn list_profiles(dir: &Path) -> Result<Vec<String>, ConfigError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if !stem.starts_with(AUTO_PREFIX) {
                names.push(stem.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

/// Deletes a named profile; returns whether a file was removed
pub fn delete_profile(dir: &Path, name: &str) -> Result<bool, ConfigError> {
    validate_profile_name(name)?;
    let path = profile_path(dir, name);
    if path.exists() {
        std::fs::remove_file(&path)?;
        tracing::info!("Deleted profile '{}'", name);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Returns the file a named profile is stored in
pub fn profile_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

fn validate_profile_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty()
        || name.starts_with(AUTO_PREFIX)
        || !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "invalid profile name '{}'",
            name
        )));
    }
    Ok(())
}
