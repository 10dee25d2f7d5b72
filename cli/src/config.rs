//! `chainconnex --config <path>` file format.

use std::path::Path;

use anyhow::{Context, Result};
use chainconnex_core::{HeadTrackerConfig, PollerConfig};
use chainconnex_observability::LogConfig;
use serde::{Deserialize, Serialize};

/// Top-level CLI configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnexConfig {
    #[serde(default)]
    pub head_tracker: HeadTrackerConfig,
    #[serde(default)]
    pub owned_addresses: PollerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ConnexConfig {
    /// Load from a JSON file; a missing path yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config file '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_default_independently() {
        let cfg: ConnexConfig =
            serde_json::from_str(r#"{"head_tracker": {"poll_interval_ms": 100}}"#).unwrap();
        assert_eq!(cfg.head_tracker.poll_interval_ms, 100);
        assert_eq!(cfg.head_tracker.sync_threshold_secs, 30);
        assert_eq!(cfg.owned_addresses.retry_interval_ms, 2_000);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = ConnexConfig::load(Some(Path::new("/nonexistent/chainconnex.json"))).unwrap();
        assert_eq!(cfg.head_tracker.poll_interval_ms, 1_000);
    }
}
