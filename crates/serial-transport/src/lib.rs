//! Serial Transport
//!
//! Interrupt-driven byte transport for a single UART. The interrupt handler
//! and mainline code share one [`Transport`]: the handler fills the receive
//! ring and drains the transmit ring, mainline does the opposite through the
//! blocking and non-blocking calls. Baud-rate setup is re-exported from
//! `baud-rate` so the whole serial surface lives in one place.

mod error;
mod format;
mod hardware;
pub mod sim;
mod transport;

pub use error::TransportError;
pub use format::Writer;
pub use hardware::{InterruptEvents, SerialControl, SerialRegisters};
pub use transport::{ReceiveHook, Transport, BUFFER_CAPACITY};

pub use baud_rate::{
    configure_fixed_baud, detect_baud, status_code, AutoBaudDetector, BaudConfig, BaudError,
    BaudHardware, Calibration, DetectorConfig,
};
