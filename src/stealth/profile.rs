//! Built-in stealth levels and the profile type the scheduler consumes

use std::fmt;

/// Aggressiveness level, ordered by increasing caution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StealthLevel {
    Aggressive = 1,
    Moderate = 2,
    Conservative = 3,
    UltraConservative = 4,
}

impl StealthLevel {
    /// Maps the configured level number onto a level
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Aggressive),
            2 => Some(Self::Moderate),
            3 => Some(Self::Conservative),
            4 => Some(Self::UltraConservative),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Moderate => "Moderate",
            Self::Conservative => "Conservative",
            Self::UltraConservative => "Ultra-Conservative",
        }
    }

    /// Returns all levels from least to most cautious
    pub fn all() -> [Self; 4] {
        [
            Self::Aggressive,
            Self::Moderate,
            Self::Conservative,
            Self::UltraConservative,
        ]
    }
}

impl Default for StealthLevel {
    fn default() -> Self {
        Self::Moderate
    }
}

impl fmt::Display for StealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

/// Pacing parameters for one run
///
/// Delays are in time units, cycles in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct StealthProfile {
    pub level: StealthLevel,
    pub name: &'static str,
    pub min_delay: f64,
    pub max_delay: f64,
    pub work_cycle: (f64, f64),
    pub rest_cycle: (f64, f64),
    pub backoff_factor: f64,
    pub pattern_randomness: f64,
    pub header_variation: f64,
    /// Slow-down added per thousand requests
    pub progressive_rate: f64,
    /// Time units a user-agent stays pinned; `None` rotates on every request
    pub ua_rotation: Option<f64>,
}

impl StealthProfile {
    /// Returns the built-in profile for a level
    pub fn for_level(level: StealthLevel) -> Self {
        let (min_delay, max_delay, work_cycle, rest_cycle, backoff, pattern, header) = match level
        {
            StealthLevel::Aggressive => (5.0, 15.0, (30.0, 90.0), (10.0, 20.0), 1.5, 0.2, 0.3),
            StealthLevel::Moderate => (10.0, 30.0, (45.0, 120.0), (15.0, 30.0), 2.0, 0.4, 0.5),
            StealthLevel::Conservative => {
                (20.0, 60.0, (60.0, 180.0), (20.0, 45.0), 2.5, 0.6, 0.7)
            }
            StealthLevel::UltraConservative => {
                (30.0, 120.0, (90.0, 240.0), (30.0, 60.0), 3.0, 0.8, 0.9)
            }
        };

        Self {
            level,
            name: level.name(),
            min_delay,
            max_delay,
            work_cycle,
            rest_cycle,
            backoff_factor: backoff,
            pattern_randomness: pattern,
            header_variation: header,
            progressive_rate: 0.1,
            ua_rotation: None,
        }
    }

    /// Checks the window invariants the scheduler relies on
    pub fn is_valid(&self) -> bool {
        self.min_delay >= 0.0
            && self.min_delay < self.max_delay
            && self.work_cycle.0 < self.work_cycle.1
            && self.rest_cycle.0 < self.rest_cycle.1
            && (0.0..=1.0).contains(&self.header_variation)
            && (0.0..=1.0).contains(&self.pattern_randomness)
    }
}

impl Default for StealthProfile {
    fn default() -> Self {
        Self::for_level(StealthLevel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_number() {
        assert_eq!(StealthLevel::from_number(1), Some(StealthLevel::Aggressive));
        assert_eq!(
            StealthLevel::from_number(4),
            Some(StealthLevel::UltraConservative)
        );
        assert_eq!(StealthLevel::from_number(0), None);
        assert_eq!(StealthLevel::from_number(5), None);
    }

    #[test]
    fn test_builtin_profiles_are_valid() {
        for level in StealthLevel::all() {
            let profile = StealthProfile::for_level(level);
            assert!(profile.is_valid(), "{} is invalid", level);
            assert_eq!(profile.level.number(), level as u8);
        }
    }

    #[test]
    fn test_levels_increase_in_caution() {
        let profiles: Vec<_> = StealthLevel::all()
            .into_iter()
            .map(StealthProfile::for_level)
            .collect();

        for pair in profiles.windows(2) {
            assert!(pair[0].level < pair[1].level);
            assert!(pair[0].min_delay < pair[1].min_delay);
            assert!(pair[0].max_delay < pair[1].max_delay);
            assert!(pair[0].backoff_factor < pair[1].backoff_factor);
        }
    }

    #[test]
    fn test_default_is_moderate() {
        let profile = StealthProfile::default();
        assert_eq!(profile.level, StealthLevel::Moderate);
        assert_eq!(profile.min_delay, 10.0);
        assert_eq!(profile.max_delay, 30.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", StealthLevel::UltraConservative),
            "4 (Ultra-Conservative)"
        );
    }
}
