//! Automatic Baud-Rate Detection
//!
//! Times the low intervals on the receive line with the 16-bit counter over
//! repeated trials. The shortest interval is one bit period; scaled down by
//! 16 it is the number of timer ticks between overflows that the serial
//! peripheral needs in baud-doubling mode, i.e. `256 - reload`.

use crate::config::DetectorConfig;
use crate::error::BaudError;
use crate::fixed::baud_for_reload;
use crate::hardware::BaudHardware;
use tracing::{debug, info, warn};

/// Rounding offset added before scaling a raw count
const SAMPLE_ROUNDING: u32 = 8;

/// Raw counts per reload tick with baud doubling on
const SAMPLE_SHIFT: u32 = 4;

/// Successful calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Reload value loaded into the 8-bit timer
    pub reload: u8,
    /// Shortest scaled low interval
    pub t_min: u32,
    /// Longest scaled low interval
    pub t_max: u32,
    /// Low intervals captured
    pub valid_samples: u16,
    /// Trial loop stopped early on the noise check
    pub noise_abort: bool,
}

impl Calibration {
    /// Baud rate the calibrated timer produces on the given crystal
    pub fn baud_rate(&self, oscillator_hz: u32) -> u32 {
        baud_for_reload(self.reload, oscillator_hz, true)
    }
}

/// Running interval statistics for one detection call
#[derive(Debug, Clone, Copy)]
struct TrialStats {
    t_max: u32,
    t_min: u32,
    valid_samples: u16,
}

impl TrialStats {
    fn new() -> Self {
        Self {
            t_max: 0,
            t_min: u32::from(u16::MAX),
            valid_samples: 0,
        }
    }

    /// Fold one raw counter value into the statistics
    fn record(&mut self, raw_count: u16) {
        self.valid_samples = self.valid_samples.saturating_add(1);

        let mut t = (u32::from(raw_count) + SAMPLE_ROUNDING) >> SAMPLE_SHIFT;
        self.t_max = self.t_max.max(t);

        // Between one and two periods: several edges inside one bit, keep the
        // remainder past the shortest period.
        if t > self.t_min && t < self.t_min * 2 {
            t -= self.t_min;
        }
        self.t_min = self.t_min.min(t);
    }

    fn is_noisy(&self, ratio: u32) -> bool {
        self.t_max >= self.t_min.saturating_mul(ratio)
    }
}

/// Baud-rate detector driven by a [`DetectorConfig`]
#[derive(Debug, Clone, Default)]
pub struct AutoBaudDetector {
    config: DetectorConfig,
}

impl AutoBaudDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Measure the line, then load and start the bit-clock timer
    ///
    /// Leaves the timer and serial interrupts disabled; the caller enables
    /// them afterwards (normally through the transport's `init`).
    pub fn detect<H: BaudHardware>(&self, hw: &mut H) -> Result<Calibration, BaudError> {
        hw.disable_interrupts();
        hw.timer_init16();

        let mut stats = TrialStats::new();
        let mut noise_abort = false;

        for trial in 0..self.config.max_trials {
            if !self.wait_for_high(hw) {
                warn!(trial, "Receive line stuck low, ending detection early");
                break;
            }

            hw.timer_set16(0);
            hw.clear_timer_overflow();
            hw.timer_start();

            // Falling edge, or the counter range runs out first
            while hw.line_level() && !hw.timer_overflowed() {
                std::hint::spin_loop();
            }
            hw.timer_set16(0);
            if hw.timer_overflowed() {
                debug!(trial, "No falling edge within the counter range");
                continue;
            }

            let rose = self.wait_for_high(hw);
            hw.timer_stop();
            if !rose || hw.timer_overflowed() {
                warn!(trial, "Low interval longer than the 16-bit counter range");
                return Err(BaudError::BaudTooLow);
            }

            let raw_count = hw.timer_get16();
            stats.record(raw_count);
            debug!(
                trial,
                raw_count,
                t_min = stats.t_min,
                t_max = stats.t_max,
                "Captured low interval"
            );

            if stats.is_noisy(self.config.noise_ratio) {
                warn!(
                    trial,
                    t_min = stats.t_min,
                    t_max = stats.t_max,
                    "Interval spread too wide, aborting trials"
                );
                noise_abort = true;
                break;
            }
        }

        self.finish(hw, stats, noise_abort)
    }

    /// Poll until the line is high; `false` when the wait limit ran out
    fn wait_for_high<H: BaudHardware>(&self, hw: &mut H) -> bool {
        let mut polls: u32 = 0;
        loop {
            if hw.line_level() {
                return true;
            }
            if let Some(limit) = self.config.wait_limit {
                polls += 1;
                if polls >= limit {
                    return false;
                }
            }
            std::hint::spin_loop();
        }
    }

    fn finish<H: BaudHardware>(
        &self,
        hw: &mut H,
        stats: TrialStats,
        noise_abort: bool,
    ) -> Result<Calibration, BaudError> {
        if stats.t_min > u32::from(u8::MAX) {
            warn!(t_min = stats.t_min, "Bit interval beyond the 8-bit reload range");
            return Err(BaudError::BaudTooLow);
        }
        if stats.valid_samples < self.config.min_valid_samples {
            warn!(
                valid_samples = stats.valid_samples,
                "Too few low intervals to calibrate"
            );
            return Err(BaudError::InsufficientSamples {
                valid_samples: stats.valid_samples,
            });
        }

        let reload = 0u8.wrapping_sub(stats.t_min as u8);
        hw.set_baud_doubling(true);
        hw.timer_init8(reload);
        hw.timer_start();

        info!(
            "Baud rate detected from {} intervals, timer reload {:#04X}",
            stats.valid_samples, reload
        );

        Ok(Calibration {
            reload,
            t_min: stats.t_min,
            t_max: stats.t_max,
            valid_samples: stats.valid_samples,
            noise_abort,
        })
    }
}

/// Detect the baud rate with the default tuning
pub fn detect_baud<H: BaudHardware>(hw: &mut H) -> Result<Calibration, BaudError> {
    AutoBaudDetector::default().detect(hw)
}

/// Legacy status code for a detection result: 0, -1 or -2
pub fn status_code(result: &Result<Calibration, BaudError>) -> i8 {
    match result {
        Ok(_) => 0,
        Err(err) => err.status_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_for(raw_counts: &[u16]) -> TrialStats {
        let mut stats = TrialStats::new();
        for &raw in raw_counts {
            stats.record(raw);
        }
        stats
    }

    #[test]
    fn test_scaling_rounds_to_nearest_sixteenth() {
        let stats = stats_for(&[1592]);
        assert_eq!(stats.t_min, 100);
        let stats = stats_for(&[1607]);
        assert_eq!(stats.t_min, 100);
        let stats = stats_for(&[1608]);
        assert_eq!(stats.t_min, 101);
    }

    #[test]
    fn test_multi_bit_intervals_keep_minimum() {
        // One, two and three bit low runs
        let stats = stats_for(&[1600, 3200, 4800, 1600]);
        assert_eq!(stats.t_min, 100);
        assert_eq!(stats.t_max, 300);
        assert_eq!(stats.valid_samples, 4);
        assert!(!stats.is_noisy(5));
    }

    #[test]
    fn test_interval_between_one_and_two_periods_is_folded() {
        // 150 sits between t_min and 2 * t_min, leaving 50
        let stats = stats_for(&[1600, 2400]);
        assert_eq!(stats.t_min, 50);
        assert_eq!(stats.t_max, 150);
    }

    #[test]
    fn test_noise_ratio() {
        let stats = stats_for(&[1600, 8000]);
        assert_eq!(stats.t_max, 500);
        assert!(stats.is_noisy(5));
        assert!(!stats.is_noisy(6));
    }

    #[test]
    fn test_status_codes() {
        let ok = Ok(Calibration {
            reload: 250,
            t_min: 6,
            t_max: 6,
            valid_samples: 3,
            noise_abort: false,
        });
        assert_eq!(status_code(&ok), 0);
        assert_eq!(status_code(&Err(BaudError::BaudTooLow)), -1);
        assert_eq!(
            status_code(&Err(BaudError::InsufficientSamples { valid_samples: 1 })),
            -2
        );
    }
}
