//! UART access split by execution context

/// Sources raised by one serial interrupt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptEvents {
    /// A byte is waiting in the receive register
    pub receive_ready: bool,
    /// The transmit register can take another byte
    pub transmit_ready: bool,
}

impl InterruptEvents {
    pub const RECEIVE: Self = Self {
        receive_ready: true,
        transmit_ready: false,
    };

    pub const TRANSMIT: Self = Self {
        receive_ready: false,
        transmit_ready: true,
    };

    pub const BOTH: Self = Self {
        receive_ready: true,
        transmit_ready: true,
    };
}

/// Data registers, touched only from the interrupt handler
pub trait SerialRegisters {
    /// Read the received byte; clears the receive condition
    fn read_received_byte(&mut self) -> u8;

    /// Load the next byte to shift out
    fn write_transmit_byte(&mut self, byte: u8);
}

/// Control surface used from mainline code
pub trait SerialControl {
    /// Sleep until any interrupt fires
    fn enter_idle(&mut self);

    /// Raise a transmit-ready interrupt by hand to restart an idle transmitter
    fn trigger_transmit(&mut self);

    fn enable_serial_interrupt(&mut self);
}
