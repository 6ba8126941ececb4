//! Ring Buffer Error Types

use thiserror::Error;

/// Errors returned by the `Result` flavoured push/pop calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// No free slot for another byte
    #[error("Ring buffer is full")]
    Full,

    /// No unread byte available
    #[error("Ring buffer is empty")]
    Empty,
}
