//! Simulator settings
//!
//! Layered with the `config` crate: struct defaults, then an optional
//! settings file, then `SERIAL_SIM__*` environment variables (nested keys
//! separated by `__`, e.g. `SERIAL_SIM__DETECTOR__WAIT_LIMIT=5000`).

use baud_rate::sim::ticks_per_bit;
use baud_rate::{BaudConfig, DetectorConfig};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::Level;

pub const ENV_PREFIX: &str = "SERIAL_SIM";

/// Errors while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Fixed rate used when detection fails
    pub baud: BaudConfig,

    pub detector: DetectorConfig,

    /// Rate the simulated peer transmits at
    pub peer_baud_rate: u32,

    /// Bytes the peer repeats while the detector listens
    pub calibration_pattern: String,

    /// Text the peer sends once the link is up; echoed back
    pub echo_message: String,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            baud: BaudConfig::default(),
            detector: DetectorConfig::default(),
            peer_baud_rate: 9600,
            calibration_pattern: "U".to_string(),
            echo_message: "hello from the simulated peer\r\n".to_string(),
        }
    }
}

impl SimSettings {
    pub fn log_level(&self) -> Result<Level, SettingsError> {
        self.log_level.parse().map_err(|_| SettingsError::Invalid {
            field: "log_level",
            reason: format!("unknown level {:?}", self.log_level),
        })
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.peer_baud_rate == 0 {
            return Err(SettingsError::Invalid {
                field: "peer_baud_rate",
                reason: "must be non-zero".to_string(),
            });
        }
        if ticks_per_bit(self.peer_baud_rate, self.baud.oscillator_hz) == 0 {
            return Err(SettingsError::Invalid {
                field: "peer_baud_rate",
                reason: format!(
                    "{} baud is faster than one bit per timer tick at {} Hz",
                    self.peer_baud_rate, self.baud.oscillator_hz
                ),
            });
        }
        if self.calibration_pattern.is_empty() {
            return Err(SettingsError::Invalid {
                field: "calibration_pattern",
                reason: "must contain at least one byte".to_string(),
            });
        }
        self.log_level()?;
        Ok(())
    }
}

/// Load settings from an optional file plus the environment
pub fn load_settings(path: Option<&Path>) -> Result<SimSettings, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let settings: SimSettings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
