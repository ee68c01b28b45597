//! Runtime configuration for a machine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a [`Machine`](super::Machine).
///
/// Deserializes from partial input; missing fields take their defaults.
///
/// ```rust
/// use tandem::MachineConfig;
/// use std::time::Duration;
///
/// let config = MachineConfig::default().with_tick_interval(Duration::from_millis(100));
/// assert_eq!(config.tick_interval(), Duration::from_millis(100));
/// assert_eq!(config.max_resolution_steps, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Period of the timer clock in milliseconds. One tick per period.
    pub tick_interval_ms: u64,
    /// Upper bound on autonomous transitions fired by a single re-check.
    /// Zero is treated as one.
    pub max_resolution_steps: usize,
    /// Number of fired transitions kept in the history.
    pub history_limit: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            max_resolution_steps: 64,
            history_limit: 256,
        }
    }
}

impl MachineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Step bound used by autonomous resolution, at least one.
    pub fn resolution_limit(&self) -> usize {
        self.max_resolution_steps.max(1)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_resolution_steps(mut self, steps: usize) -> Self {
        self.max_resolution_steps = steps;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}
