//! Start/stop control state

use std::fmt;

/// Enabled flags of the two trigger controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlState {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl ControlState {
    /// Start enabled, stop disabled
    pub const fn idle() -> Self {
        Self {
            start_enabled: true,
            stop_enabled: false,
        }
    }

    /// Start disabled, stop enabled
    pub const fn recording() -> Self {
        Self {
            start_enabled: false,
            stop_enabled: true,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::idle()
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |enabled: bool| if enabled { "enabled" } else { "disabled" };
        write!(
            f,
            "start {}, stop {}",
            flag(self.start_enabled),
            flag(self.stop_enabled)
        )
    }
}
