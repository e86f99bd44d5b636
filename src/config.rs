// Bus location, self-test timings, driver configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chassis::RegisterMap;

// I2C bus the board is wired to
pub const DEFAULT_BUS_PATH: &str = "/dev/i2c-5";

// Self-test: how long each motion step runs, and the pause after each stop
pub const SELF_TEST_HOLD: Duration = Duration::from_secs(2);
pub const SELF_TEST_SETTLE: Duration = Duration::from_secs(1);

// Self-test commands (M2 = left wheel, M4 = right wheel)
pub const SELF_TEST_PWM: [i32; 4] = [0, 1000, 0, 1000];
pub const SELF_TEST_SPEED: [i32; 4] = [0, 500, 0, 500];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Driver configuration, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub bus_path: String,
    // Use the in-memory bus instead of hardware
    pub simulate: bool,
    pub registers: RegisterMap,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            bus_path: DEFAULT_BUS_PATH.to_string(),
            simulate: false,
            registers: RegisterMap::default(),
        }
    }
}

impl DriverConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(DriverConfig::from_json("{}").unwrap(), DriverConfig::default());
    }

    #[test]
    fn test_nested_register_override() {
        let cfg = DriverConfig::from_json(
            r#"{"bus_path": "/dev/i2c-1", "registers": {"device_address": 40}}"#,
        )
        .unwrap();
        assert_eq!(cfg.bus_path, "/dev/i2c-1");
        assert!(!cfg.simulate);
        assert_eq!(cfg.registers.device_address, 40);
        assert_eq!(cfg.registers.battery_voltage, 0x08);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DriverConfig::load("/nonexistent/chassis.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let path = std::env::temp_dir().join(format!("chassis-cfg-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = DriverConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
