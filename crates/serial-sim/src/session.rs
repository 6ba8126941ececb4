//! One simulated bring-up: calibrate, then echo through the transport

use crate::settings::SimSettings;
use baud_rate::sim::{ticks_per_bit, SyntheticLine};
use baud_rate::{configure_fixed_baud, status_code, AutoBaudDetector};
use serial_transport::sim::SimUart;
use serial_transport::Transport;
use std::fmt::Write;
use tracing::{info, warn};

/// Outcome of [`run_session`]
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Reload value driving the bit clock
    pub reload: u8,
    /// `true` when the reload came from detection, `false` on fixed fallback
    pub detected: bool,
    /// Detection status code (0, -1 or -2)
    pub status: i8,
    /// Everything the transport put on the wire
    pub wire: Vec<u8>,
    /// Set when the receive side dropped bytes
    pub receive_overflowed: bool,
}

/// Calibrate against the simulated peer, falling back to the fixed rate on
/// failure, then echo the peer's message and report the link state.
pub fn run_session(settings: &SimSettings) -> SessionReport {
    let ticks = ticks_per_bit(settings.peer_baud_rate, settings.baud.oscillator_hz);
    let mut line =
        SyntheticLine::from_frames(settings.calibration_pattern.as_bytes(), ticks).repeating();
    info!(
        "Calibrating against a {} baud peer ({} ticks per bit)",
        settings.peer_baud_rate, ticks
    );

    let detection = AutoBaudDetector::new(settings.detector).detect(&mut line);
    let status = status_code(&detection);
    let (reload, detected) = match detection {
        Ok(calibration) => {
            info!(
                "Detected {} baud from {} samples",
                calibration.baud_rate(settings.baud.oscillator_hz),
                calibration.valid_samples
            );
            (calibration.reload, true)
        }
        Err(err) => {
            warn!("Detection failed ({}), using fixed {} baud", err, settings.baud.baud_rate);
            (configure_fixed_baud(&mut line, &settings.baud), false)
        }
    };

    let transport: Transport = Transport::new();
    let mut uart = SimUart::new(&transport);
    transport.init(&mut uart);

    transport.write_cstr(b"link up, reload=\0", &mut uart);
    transport.write_hex4(u16::from(reload), &mut uart);
    transport.write_char(b' ', &mut uart);
    transport.write_int(i16::from(status), &mut uart);
    transport.write_bytes(b"\r\n", &mut uart);

    let message = settings.echo_message.as_bytes();
    uart.feed(message);
    for _ in 0..message.len() {
        let byte = transport.read_blocking(&mut uart);
        transport.write_blocking(byte, &mut uart);
    }

    // fmt::Write on the transport never fails
    let _ = write!(transport.writer(&mut uart), "echoed {} bytes\r\n", message.len());
    uart.run_until_quiet();

    let receive_overflowed = transport.take_receive_overflow();
    if receive_overflowed {
        warn!("Receive overflow during echo");
    }

    SessionReport {
        reload,
        detected,
        status,
        wire: uart.take_wire(),
        receive_overflowed,
    }
}
