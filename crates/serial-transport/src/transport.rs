//! Interrupt-driven transport state and byte I/O

use crate::error::TransportError;
use crate::hardware::{InterruptEvents, SerialControl, SerialRegisters};
use ring_buffer::RingBuffer;
use std::sync::atomic::{fence, AtomicBool, Ordering};
use tracing::{debug, trace, warn};

/// Bytes buffered per direction
pub const BUFFER_CAPACITY: usize = 4;

/// Called from the interrupt handler with every received byte
pub type ReceiveHook = fn(u8);

/// Shared state between the serial interrupt handler and mainline code
///
/// The receive ring is produced by the handler and consumed by mainline;
/// the transmit ring the other way round. `tx_idle` records that the
/// handler found nothing to send, so the next queued byte has to restart
/// transmission by hand.
pub struct Transport<const N: usize = BUFFER_CAPACITY> {
    rx: RingBuffer<N>,
    tx: RingBuffer<N>,
    tx_idle: AtomicBool,
    rx_overflow: AtomicBool,
    receive_hook: Option<ReceiveHook>,
}

impl<const N: usize> Transport<N> {
    /// Create an idle transport, suitable for a `static`
    pub const fn new() -> Self {
        Self {
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            tx_idle: AtomicBool::new(true),
            rx_overflow: AtomicBool::new(false),
            receive_hook: None,
        }
    }

    /// Create a transport that reports each received byte to `hook`
    pub const fn with_receive_hook(hook: ReceiveHook) -> Self {
        Self {
            receive_hook: Some(hook),
            ..Self::new()
        }
    }

    /// Empty both buffers, mark the transmitter idle, clear the overflow
    /// latch and enable the serial interrupt.
    ///
    /// Must run while the serial interrupt is masked (at startup, or after
    /// baud detection which leaves it masked).
    pub fn init<C: SerialControl>(&self, ctl: &mut C) {
        self.rx.clear();
        self.tx.clear();
        self.tx_idle.store(true, Ordering::SeqCst);
        self.rx_overflow.store(false, Ordering::Relaxed);
        ctl.enable_serial_interrupt();
        debug!("Serial transport initialized");
    }

    /// Serial interrupt entry point: constant work per event, never blocks
    pub fn on_interrupt<R: SerialRegisters>(&self, events: InterruptEvents, regs: &mut R) {
        if events.receive_ready {
            let byte = regs.read_received_byte();
            if self.rx.try_push(byte) {
                trace!(byte, "rx");
            } else if !self.rx_overflow.swap(true, Ordering::Relaxed) {
                warn!("Receive buffer overflow, dropping bytes");
            }
            if let Some(hook) = self.receive_hook {
                hook(byte);
            }
        }

        if events.transmit_ready {
            match self.tx.try_pop() {
                Some(byte) => {
                    trace!(byte, "tx");
                    regs.write_transmit_byte(byte);
                }
                None => {
                    self.tx_idle.store(true, Ordering::SeqCst);
                    fence(Ordering::SeqCst);
                    // A byte queued after the pop above may have seen
                    // tx_idle still clear and skipped the restart.
                    if !self.tx.is_empty() && self.tx_idle.swap(false, Ordering::AcqRel) {
                        if let Some(byte) = self.tx.try_pop() {
                            regs.write_transmit_byte(byte);
                        }
                    }
                }
            }
        }
    }

    /// Queue a byte for transmission without waiting
    pub fn try_write<C: SerialControl>(&self, byte: u8, ctl: &mut C) -> Result<(), TransportError> {
        if !self.tx.try_push(byte) {
            return Err(TransportError::BufferFull);
        }
        self.restart_transmitter(ctl);
        Ok(())
    }

    /// Queue a byte, idling until the transmit buffer has room
    pub fn write_blocking<C: SerialControl>(&self, byte: u8, ctl: &mut C) {
        while !self.tx.try_push(byte) {
            ctl.enter_idle();
        }
        self.restart_transmitter(ctl);
    }

    fn restart_transmitter<C: SerialControl>(&self, ctl: &mut C) {
        fence(Ordering::SeqCst);
        if self.tx_idle.swap(false, Ordering::AcqRel) {
            ctl.trigger_transmit();
        }
    }

    /// Take the oldest received byte
    pub fn receive(&self) -> Result<u8, TransportError> {
        self.rx.try_pop().ok_or(TransportError::BufferEmpty)
    }

    /// Take the oldest received byte, if any
    pub fn try_read(&self) -> Option<u8> {
        self.rx.try_pop()
    }

    /// Wait (idling) for a received byte. There is no timeout.
    pub fn read_blocking<C: SerialControl>(&self, ctl: &mut C) -> u8 {
        loop {
            if let Some(byte) = self.rx.try_pop() {
                return byte;
            }
            ctl.enter_idle();
        }
    }

    pub fn rx_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Unsent bytes still queued
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Transmitter stopped for lack of data
    pub fn is_tx_idle(&self) -> bool {
        self.tx_idle.load(Ordering::Acquire)
    }

    /// A byte was dropped because the receive buffer was full
    pub fn receive_overflowed(&self) -> bool {
        self.rx_overflow.load(Ordering::Relaxed)
    }

    pub fn clear_receive_overflow(&self) {
        self.rx_overflow.store(false, Ordering::Relaxed);
    }

    /// Read and clear the overflow latch
    pub fn take_receive_overflow(&self) -> bool {
        self.rx_overflow.swap(false, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for Transport<N> {
    fn default() -> Self {
        Self::new()
    }
}
