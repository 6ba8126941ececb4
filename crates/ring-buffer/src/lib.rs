//! Lock-Free Ring Buffer
//!
//! Fixed-capacity single-producer/single-consumer byte queue. One side
//! (typically an interrupt handler) pushes, the other side pops, and neither
//! needs a lock: each index has exactly one writer.

mod buffer;
mod error;

pub use buffer::RingBuffer;
pub use error::RingBufferError;
