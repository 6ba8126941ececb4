//! Single-threaded UART simulator
//!
//! Stands in for the serial peripheral on the host: every idle wait lets one
//! serial interrupt fire, and a manual transmit trigger fires one at once,
//! the way an 8051 takes the interrupt right after `TI` is set.

use crate::hardware::{InterruptEvents, SerialControl, SerialRegisters};
use crate::transport::{Transport, BUFFER_CAPACITY};
use std::collections::VecDeque;

/// Receive and transmit data registers backed by queues
#[derive(Debug, Default, Clone)]
pub struct SimRegisters {
    incoming: VecDeque<u8>,
    wire: Vec<u8>,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes arriving from the peer
    pub fn feed(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes);
    }

    pub fn has_incoming(&self) -> bool {
        !self.incoming.is_empty()
    }

    /// Bytes shifted out so far
    pub fn wire(&self) -> &[u8] {
        &self.wire
    }
}

impl SerialRegisters for SimRegisters {
    fn read_received_byte(&mut self) -> u8 {
        self.incoming.pop_front().unwrap_or_default()
    }

    fn write_transmit_byte(&mut self, byte: u8) {
        self.wire.push(byte);
    }
}

/// Simulated UART driving a [`Transport`]'s interrupt handler
pub struct SimUart<'t, const N: usize = BUFFER_CAPACITY> {
    transport: &'t Transport<N>,
    regs: SimRegisters,
    /// Transmit-ready flag (`TI`)
    tx_ready: bool,
    interrupts_enabled: bool,
    idle_waits: usize,
    idle_budget: Option<usize>,
}

impl<'t, const N: usize> SimUart<'t, N> {
    /// Create a UART with its interrupt masked until the transport's `init`
    pub fn new(transport: &'t Transport<N>) -> Self {
        Self {
            transport,
            regs: SimRegisters::new(),
            tx_ready: false,
            interrupts_enabled: false,
            idle_waits: 0,
            idle_budget: None,
        }
    }

    /// Panic after `waits` idle waits instead of spinning forever
    pub fn with_idle_budget(mut self, waits: usize) -> Self {
        self.idle_budget = Some(waits);
        self
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.regs.feed(bytes);
    }

    pub fn wire(&self) -> &[u8] {
        self.regs.wire()
    }

    /// Hand over the transmitted bytes and start a fresh capture
    pub fn take_wire(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.regs.wire)
    }

    pub fn idle_waits(&self) -> usize {
        self.idle_waits
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// Fire one serial interrupt if a source is pending
    pub fn step(&mut self) -> bool {
        if !self.interrupts_enabled {
            return false;
        }

        let events = InterruptEvents {
            receive_ready: self.regs.has_incoming(),
            transmit_ready: self.tx_ready,
        };
        if !events.receive_ready && !events.transmit_ready {
            return false;
        }

        self.tx_ready = false;
        let sent = self.regs.wire.len();
        self.transport.on_interrupt(events, &mut self.regs);
        // The byte just loaded raises TI again once shifted out
        if self.regs.wire.len() > sent {
            self.tx_ready = true;
        }
        true
    }

    /// Fire interrupts until nothing is pending; returns how many fired
    pub fn run_until_quiet(&mut self) -> usize {
        let mut fired = 0;
        while self.step() {
            fired += 1;
        }
        fired
    }
}

impl<const N: usize> SerialControl for SimUart<'_, N> {
    /// # Panics
    /// When an idle budget is set and exhausted.
    fn enter_idle(&mut self) {
        self.idle_waits += 1;
        if let Some(budget) = self.idle_budget {
            if self.idle_waits > budget {
                panic!("idle budget of {budget} waits exhausted");
            }
        }
        self.step();
    }

    fn trigger_transmit(&mut self) {
        self.tx_ready = true;
        self.step();
    }

    fn enable_serial_interrupt(&mut self) {
        self.interrupts_enabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_uart_fires_nothing() {
        let transport: Transport = Transport::new();
        let mut uart = SimUart::new(&transport);
        uart.feed(b"a");

        assert!(!uart.step());
        assert!(transport.rx_empty());
    }

    #[test]
    fn test_one_byte_per_interrupt() {
        let transport: Transport = Transport::new();
        let mut uart = SimUart::new(&transport);
        transport.init(&mut uart);
        uart.feed(b"ab");

        assert_eq!(uart.run_until_quiet(), 2);
        assert_eq!(transport.try_read(), Some(b'a'));
        assert_eq!(transport.try_read(), Some(b'b'));
    }
}
