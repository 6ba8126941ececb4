//! Transport Error Types

use thiserror::Error;

/// Errors from the non-blocking transport calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Transmit buffer has no room; retry after the next interrupt
    #[error("Transmit buffer full")]
    BufferFull,

    /// Nothing received yet
    #[error("Receive buffer empty")]
    BufferEmpty,
}
