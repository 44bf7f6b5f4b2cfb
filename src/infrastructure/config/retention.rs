//! Retention window for provisional records.

use chrono::Duration;
use serde::Deserialize;

/// How long provisional offers and bids wait for their funding
/// transaction before `prune` reclaims them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub provisional_hours: u32,
}

impl RetentionConfig {
    #[must_use]
    pub fn provisional_window(&self) -> Duration {
        Duration::hours(i64::from(self.provisional_hours))
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { provisional_hours: 1 }
    }
}
