//! `[observe]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [observe]
//! debounce_ms = 300   # Quiet period before an update pass runs
//! ```
//!
//! An adapter may carry its own `debounce_ms`, which takes precedence.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub const DEBOUNCE_RANGE: RangeInclusive<u64> = 50..=5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserveSettings {
    /// Trailing-edge debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ObserveSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl ObserveSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_debounce("observe.debounce_ms", self.debounce_ms)
    }
}

/// Range check shared by `[observe]` and per-platform overrides.
pub fn check_debounce(field: &str, ms: u64) -> Result<(), ConfigError> {
    if !DEBOUNCE_RANGE.contains(&ms) {
        return Err(ConfigError::Validation(format!(
            "{field} must be within {}..={} (got {ms})",
            DEBOUNCE_RANGE.start(),
            DEBOUNCE_RANGE.end(),
        )));
    }
    Ok(())
}
