use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::frame::{FrameLayout, MAX_BRIGHTNESS};
use crate::topology::TREE_LEDS;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub transport: TransportConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    pub port: String,
    pub baud_rate: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TreeConfig {
    #[serde(default = "default_led_count")]
    pub led_count: usize,
    /// Brightness level applied to every LED at startup (0..=31)
    #[serde(default = "default_brightness")]
    pub brightness: u32,
    /// Flush after every write instead of waiting for `commit`
    #[serde(default)]
    pub autocommit: bool,
}

impl TreeConfig {
    /// Check the values against the tree's fixed geometry
    pub fn validate(&self) -> Result<()> {
        if self.led_count != TREE_LEDS {
            return Err(TreeError::Configuration(format!(
                "tree has {} LEDs, configured {}",
                TREE_LEDS, self.led_count
            )));
        }
        if self.brightness > MAX_BRIGHTNESS {
            return Err(TreeError::Configuration(format!(
                "default brightness {} above {}",
                self.brightness, MAX_BRIGHTNESS
            )));
        }
        FrameLayout::new(self.led_count).validate()
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            led_count: default_led_count(),
            brightness: default_brightness(),
            autocommit: false,
        }
    }
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_led_count() -> usize {
    TREE_LEDS
}

fn default_brightness() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config: Config = serde_json::from_str(
            r#"{ "transport": { "port": "/dev/ttyUSB0", "baud_rate": 115200 } }"#,
        )
        .unwrap();
        assert_eq!(config.transport.timeout_ms, 1000);
        assert_eq!(config.tree.led_count, 25);
        assert_eq!(config.tree.brightness, 1);
        assert!(!config.tree.autocommit);
        assert!(config.tree.validate().is_ok());
    }

    #[test]
    fn test_parse_tree_section() {
        let config: Config = serde_json::from_str(
            r#"{
                "transport": { "port": "COM3", "baud_rate": 921600, "timeout_ms": 250 },
                "tree": { "brightness": 12, "autocommit": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.transport.timeout_ms, 250);
        assert_eq!(config.tree.brightness, 12);
        assert!(config.tree.autocommit);
    }

    #[test]
    fn test_validate_rejects_led_count() {
        let tree = TreeConfig {
            led_count: 50,
            ..TreeConfig::default()
        };
        assert!(matches!(tree.validate(), Err(TreeError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_brightness() {
        let tree = TreeConfig {
            brightness: 32,
            ..TreeConfig::default()
        };
        assert!(matches!(tree.validate(), Err(TreeError::Configuration(_))));
    }
}
