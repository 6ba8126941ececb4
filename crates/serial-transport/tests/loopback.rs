//! End-to-end transport behaviour

use baud_rate::sim::{ticks_per_bit, SyntheticLine};
use serial_transport::sim::SimUart;
use serial_transport::{
    detect_baud, InterruptEvents, SerialControl, SerialRegisters, Transport,
};
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn echo_session() {
    let transport: Transport = Transport::new();
    let mut uart = SimUart::new(&transport);
    transport.init(&mut uart);

    let message = b"hello, serial";
    uart.feed(message);
    for _ in 0..message.len() {
        let byte = transport.read_blocking(&mut uart);
        transport.write_blocking(byte, &mut uart);
    }
    uart.run_until_quiet();

    assert_eq!(uart.wire(), message);
    assert!(!transport.receive_overflowed());
}

#[test]
fn detect_then_init() {
    let mut line = SyntheticLine::from_frames(b"U", ticks_per_bit(9600, 11_059_200)).repeating();
    let calibration = detect_baud(&mut line).unwrap();
    assert_eq!(calibration.reload, 250);
    assert!(!line.interrupts_enabled());

    let transport: Transport = Transport::new();
    let mut uart = SimUart::new(&transport);
    transport.init(&mut uart);
    transport.write_uint(u16::from(calibration.reload), &mut uart);
    uart.run_until_quiet();

    assert_eq!(uart.wire(), b"250");
}

#[test]
fn larger_buffers() {
    let transport: Transport<16> = Transport::new();
    let mut uart = SimUart::new(&transport);
    transport.init(&mut uart);

    uart.feed(&[7; 16]);
    uart.run_until_quiet();
    assert!(!transport.receive_overflowed());

    uart.feed(&[8]);
    uart.run_until_quiet();
    assert!(transport.receive_overflowed());
}

/// Transmit register drained by a separate "interrupt" thread
struct ThreadedRegisters {
    wire: Vec<u8>,
}

impl SerialRegisters for ThreadedRegisters {
    fn read_received_byte(&mut self) -> u8 {
        0
    }

    fn write_transmit_byte(&mut self, byte: u8) {
        self.wire.push(byte);
    }
}

struct ThreadedControl<'a> {
    trigger: &'a AtomicBool,
}

impl SerialControl for ThreadedControl<'_> {
    fn enter_idle(&mut self) {
        std::thread::yield_now();
    }

    fn trigger_transmit(&mut self) {
        self.trigger.store(true, Ordering::Release);
    }

    fn enable_serial_interrupt(&mut self) {}
}

#[test]
fn concurrent_transmit_never_stalls() {
    const TOTAL: usize = 50_000;
    let transport: Transport = Transport::new();
    let trigger = AtomicBool::new(false);
    let mut ctl = ThreadedControl { trigger: &trigger };
    transport.init(&mut ctl);

    let wire = std::thread::scope(|scope| {
        let handler = scope.spawn(|| {
            let mut regs = ThreadedRegisters { wire: Vec::new() };
            let mut tx_ready = false;
            while regs.wire.len() < TOTAL {
                if trigger.swap(false, Ordering::Acquire) {
                    tx_ready = true;
                }
                if tx_ready {
                    tx_ready = false;
                    let sent = regs.wire.len();
                    transport.on_interrupt(InterruptEvents::TRANSMIT, &mut regs);
                    tx_ready = regs.wire.len() > sent;
                } else {
                    std::hint::spin_loop();
                }
            }
            regs.wire
        });

        for i in 0..TOTAL {
            transport.write_blocking((i % 251) as u8, &mut ctl);
        }
        handler.join().unwrap()
    });

    assert_eq!(wire.len(), TOTAL);
    for (i, &byte) in wire.iter().enumerate() {
        assert_eq!(byte, (i % 251) as u8, "byte {i} out of order");
    }
}
