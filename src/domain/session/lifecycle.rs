//! Recording session state machine

use std::fmt;
use thiserror::Error;

use super::controls::ControlState;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
        }
    }

    /// Enabled flags of the start/stop controls in this state
    pub const fn controls(&self) -> ControlState {
        match self {
            Self::Idle => ControlState::idle(),
            Self::Recording => ControlState::recording(),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Session lifecycle entity.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> IDLE (stop)
///
/// There is no terminal state; the cycle can repeat indefinitely.
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    /// Create a new lifecycle in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check that `start` would succeed, without transitioning
    pub fn can_start(&self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start recording".to_string(),
            });
        }
        Ok(())
    }

    /// Transition from IDLE to RECORDING
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        self.can_start()?;
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to IDLE
    pub fn stop(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Recording {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "stop recording".to_string(),
            });
        }
        self.state = SessionState::Idle;
        Ok(())
    }
}
