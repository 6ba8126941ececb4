//! Baud Detection Error Types

use thiserror::Error;

/// Reasons automatic baud-rate detection can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BaudError {
    /// The measured bit interval needs a reload value the 8-bit timer cannot
    /// hold, or a low interval overflowed the 16-bit counter
    #[error("Baud rate too low: bit interval exceeds the timer reload range")]
    BaudTooLow,

    /// Too few usable low intervals were captured before the trial budget ran
    /// out or the noise check gave up
    #[error("Insufficient samples: only {valid_samples} valid low intervals captured")]
    InsufficientSamples { valid_samples: u16 },
}

impl BaudError {
    /// Legacy firmware status code (-1 too low, -2 too few samples)
    pub fn status_code(&self) -> i8 {
        match self {
            BaudError::BaudTooLow => -1,
            BaudError::InsufficientSamples { .. } => -2,
        }
    }
}
