use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Host timer cadence driving the dispatch loop.
    pub tick_interval_ms: u64,
    pub loop_playback: bool,
    pub playback_rate: f64,
    pub autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5,
            loop_playback: true,
            playback_rate: 1.0,
            autoplay: true,
        }
    }
}

impl PlayerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let ron_string = fs::read_to_string(path)?;
        Self::from_ron(&ron_string)
    }

    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = PlayerConfig::from_ron("(loop_playback: false)").unwrap();
        assert!(!config.loop_playback);
        assert_eq!(config.tick_interval_ms, 5);
        assert_eq!(config.playback_rate, 1.0);
        assert!(config.autoplay);
    }

    #[test]
    fn test_tick_interval_never_zero() {
        let config = PlayerConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
