//! Phase lifecycle definitions

use crate::HarvestError;
use std::fmt;

/// Lifecycle states of a discovery or extraction phase
///
/// A phase starts `Idle`, moves to `Running`, and ends in exactly one of the terminal
/// states. Any other move is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseState {
    /// Created, not yet started
    Idle,

    /// Iterating
    Running,

    // ===== Terminal States =====
    /// Ran to the end of its input
    Completed,

    /// Cancelled at an iteration boundary
    Stopped,

    /// Aborted by an unexpected error
    Failed,
}

impl PhaseState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if the phase ran to natural completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn can_transition_to(&self, next: PhaseState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Stopped)
                | (Self::Running, Self::Failed)
        )
    }

    /// Moves to `next`, or reports the invalid transition
    pub fn transition(self, next: PhaseState) -> Result<PhaseState, HarvestError> {
        if self.can_transition_to(next) {
            tracing::debug!("Phase {} -> {}", self, next);
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Running,
            Self::Completed,
            Self::Stopped,
            Self::Failed,
        ]
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
