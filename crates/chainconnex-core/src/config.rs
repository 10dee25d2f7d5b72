//! Background loop configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing for the chain-head polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadTrackerConfig {
    /// Pause between successful polls (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause after a failed poll (milliseconds).
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// A head younger than this is reported as fully synced.
    #[serde(default = "default_sync_threshold_secs")]
    pub sync_threshold_secs: u64,
}

impl Default for HeadTrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            sync_threshold_secs: default_sync_threshold_secs(),
        }
    }
}

impl HeadTrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Timing for the owned-address polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}

impl PollerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

fn default_poll_interval_ms() -> u64 { 1_000 }
fn default_retry_interval_ms() -> u64 { 2_000 }
fn default_sync_threshold_secs() -> u64 { 30 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: HeadTrackerConfig = serde_json::from_str(r#"{"poll_interval_ms": 250}"#).unwrap();
        assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
        assert_eq!(cfg.retry_interval_ms, 2_000);
        assert_eq!(cfg.sync_threshold_secs, 30);
    }
}
