//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default safety limit for a daemon recording (1 hour)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 60 * 60;

/// Value object representing a recording time limit.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default max duration for daemon mode
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse strings such as "45s", "10m", "1h", "1h30m" or "2m30s".
    /// Units must appear in descending order and at most once each.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut total_secs: u64 = 0;
        let mut current_num = String::new();
        // Index into UNITS of the last unit seen, enforces h > m > s ordering
        let mut last_unit: Option<usize> = None;

        const UNITS: [(char, u64); 3] = [('h', 3600), ('m', 60), ('s', 1)];

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                current_num.push(ch);
                continue;
            }

            let idx = UNITS
                .iter()
                .position(|(unit, _)| *unit == ch)
                .ok_or_else(invalid)?;
            if current_num.is_empty() || last_unit.is_some_and(|last| idx <= last) {
                return Err(invalid());
            }

            let value: u64 = current_num.parse().map_err(|_| invalid())?;
            total_secs = value
                .checked_mul(UNITS[idx].1)
                .and_then(|v| total_secs.checked_add(v))
                .ok_or_else(invalid)?;
            current_num.clear();
            last_unit = Some(idx);
        }

        if !current_num.is_empty() || last_unit.is_none() || total_secs == 0 {
            return Err(invalid());
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        let mut out = String::new();
        if hours > 0 {
            out.push_str(&format!("{}h", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}m", minutes));
        }
        if seconds > 0 || out.is_empty() {
            out.push_str(&format!("{}s", seconds));
        }
        write!(f, "{}", out)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_max_duration()
    }
}
