//! Baud-rate configuration

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Oscillator cycles per timer tick (12T core)
pub const TIMER_TICK_DIVISOR: u32 = 12;

/// Timer overflows per serial bit in mode 1 with doubling off
pub const BAUD_CLOCK_DIVISOR: u32 = 32;

/// Crystal commonly fitted for exact standard baud rates
pub const DEFAULT_OSCILLATOR_HZ: u32 = 11_059_200;

pub const DEFAULT_BAUD_RATE: NonZeroU32 = match NonZeroU32::new(9600) {
    Some(rate) => rate,
    None => panic!("default baud rate must be non-zero"),
};

/// Upper bound on detection trials per call
pub const DEFAULT_MAX_TRIALS: u16 = 200;

/// Detection gives up once `t_max >= t_min * ratio`
pub const DEFAULT_NOISE_RATIO: u32 = 5;

/// Fewest captured low intervals that still yield a calibration
pub const DEFAULT_MIN_VALID_SAMPLES: u16 = 3;

/// Fixed baud-rate settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaudConfig {
    /// Oscillator frequency (Hz)
    pub oscillator_hz: u32,

    /// Target baud rate
    pub baud_rate: NonZeroU32,

    /// Baud-doubling mode bit
    pub double_rate: bool,
}

impl Default for BaudConfig {
    fn default() -> Self {
        Self {
            oscillator_hz: DEFAULT_OSCILLATOR_HZ,
            baud_rate: DEFAULT_BAUD_RATE,
            double_rate: true,
        }
    }
}

impl BaudConfig {
    /// Create a config for the given rate and crystal, doubling enabled
    pub fn new(baud_rate: NonZeroU32, oscillator_hz: u32) -> Self {
        Self {
            oscillator_hz,
            baud_rate,
            ..Default::default()
        }
    }

    /// Timer reload value for these settings
    pub fn reload_value(&self) -> u8 {
        crate::fixed::reload_value(self.baud_rate, self.oscillator_hz, self.double_rate)
    }
}

/// Auto-detection tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Trial ceiling per detection call
    pub max_trials: u16,

    /// Spread between longest and shortest interval that aborts detection
    pub noise_ratio: u32,

    /// Captured intervals required for success
    pub min_valid_samples: u16,

    /// Maximum line polls while waiting for the line to go high.
    /// `None` waits forever.
    pub wait_limit: Option<u32>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_trials: DEFAULT_MAX_TRIALS,
            noise_ratio: DEFAULT_NOISE_RATIO,
            min_valid_samples: DEFAULT_MIN_VALID_SAMPLES,
            wait_limit: None,
        }
    }
}

impl DetectorConfig {
    /// Default tuning with every line wait bounded to `polls`
    pub fn bounded(polls: u32) -> Self {
        Self {
            wait_limit: Some(polls),
            ..Default::default()
        }
    }

    /// Create strict config (tighter spread, more samples)
    pub fn strict() -> Self {
        Self {
            noise_ratio: 3,
            min_valid_samples: 8,
            ..Default::default()
        }
    }

    /// Create lenient config (wider spread allowed)
    pub fn lenient() -> Self {
        Self {
            noise_ratio: 8,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.max_trials, 200);
        assert_eq!(config.noise_ratio, 5);
        assert_eq!(config.min_valid_samples, 3);
        assert_eq!(config.wait_limit, None);

        let baud = BaudConfig::default();
        assert_eq!(baud.baud_rate.get(), 9600);
        assert!(baud.double_rate);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"wait_limit": 5000}"#).unwrap();
        assert_eq!(config, DetectorConfig::bounded(5000));

        let baud: BaudConfig = serde_json::from_str(r#"{"baud_rate": 19200}"#).unwrap();
        assert_eq!(baud.baud_rate.get(), 19200);
        assert_eq!(baud.oscillator_hz, DEFAULT_OSCILLATOR_HZ);
    }

    #[test]
    fn test_zero_baud_rate_rejected() {
        let result: Result<BaudConfig, _> = serde_json::from_str(r#"{"baud_rate": 0}"#);
        assert!(result.is_err());
    }
}
