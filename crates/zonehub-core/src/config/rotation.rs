//! Rotation timer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Longest accepted rotation period: one week.
pub const MAX_PERIOD_MINUTES: u64 = 7 * 24 * 60;

/// Rotation timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Minutes between automatic rotations.
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u64,
}

impl RotationConfig {
    /// The rotation period as a std duration.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_minutes.saturating_mul(60))
    }

    /// The rotation period as a chrono duration, for wall-clock arithmetic.
    pub fn chrono_period(&self) -> chrono::Duration {
        // Bounded by MAX_PERIOD_MINUTES, so the cast is lossless.
        chrono::Duration::minutes(self.period_minutes.min(MAX_PERIOD_MINUTES) as i64)
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            period_minutes: default_period_minutes(),
        }
    }
}

fn default_period_minutes() -> u64 {
    120
}
