//! Fixed baud-rate timer setup

use crate::config::{BaudConfig, BAUD_CLOCK_DIVISOR, TIMER_TICK_DIVISOR};
use crate::hardware::BaudHardware;
use std::num::NonZeroU32;
use tracing::info;

/// Compute the 8-bit timer reload value for a baud rate
///
/// `256 - round(oscillator_hz * doubling / (baud_rate * 32 * 12))`, where
/// `doubling` is 2 with the baud-doubling bit set and 1 otherwise. Rates the
/// timer cannot reach wrap modulo 256 exactly like the hardware register.
pub fn reload_value(baud_rate: NonZeroU32, oscillator_hz: u32, double_rate: bool) -> u8 {
    let doubling: u64 = if double_rate { 2 } else { 1 };
    let divisor = u64::from(baud_rate.get()) * u64::from(BAUD_CLOCK_DIVISOR * TIMER_TICK_DIVISOR);
    let ticks = (u64::from(oscillator_hz) * doubling + divisor / 2) / divisor;
    0u8.wrapping_sub(ticks as u8)
}

/// Baud rate actually produced by a reload value
pub fn baud_for_reload(reload: u8, oscillator_hz: u32, double_rate: bool) -> u32 {
    let doubling: u64 = if double_rate { 2 } else { 1 };
    // Reload 0 counts the full 256 ticks per overflow
    let period = 256 - u64::from(reload);
    let divisor = period * u64::from(BAUD_CLOCK_DIVISOR * TIMER_TICK_DIVISOR);
    ((u64::from(oscillator_hz) * doubling) / divisor) as u32
}

/// Load the timer with the reload value for `config` and start it as the
/// serial bit clock. Returns the reload value applied.
pub fn configure_fixed_baud<H: BaudHardware>(hw: &mut H, config: &BaudConfig) -> u8 {
    let reload = config.reload_value();

    hw.set_baud_doubling(config.double_rate);
    hw.timer_init8(reload);
    hw.timer_start();

    info!(
        "Fixed baud rate {} at {} Hz, timer reload {:#04X}",
        config.baud_rate, config.oscillator_hz, reload
    );
    reload
}
