//! Baud-Rate Configuration
//!
//! Derives the 8-bit auto-reload value for the timer that clocks the serial
//! peripheral, either from a known baud rate and oscillator frequency or by
//! timing the low intervals of incoming frames on the receive line.

mod config;
mod detector;
mod error;
mod fixed;
mod hardware;
pub mod sim;

pub use config::{
    BaudConfig, DetectorConfig, BAUD_CLOCK_DIVISOR, DEFAULT_BAUD_RATE, DEFAULT_MAX_TRIALS,
    DEFAULT_MIN_VALID_SAMPLES, DEFAULT_NOISE_RATIO, DEFAULT_OSCILLATOR_HZ, TIMER_TICK_DIVISOR,
};
pub use detector::{detect_baud, status_code, AutoBaudDetector, Calibration};
pub use error::BaudError;
pub use fixed::{baud_for_reload, configure_fixed_baud, reload_value};
pub use hardware::BaudHardware;
