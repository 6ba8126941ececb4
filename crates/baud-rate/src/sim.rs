//! Synthetic receive line and timer for host-side testing
//!
//! Time advances one `ticks_per_poll` step on every [`line_level`] call,
//! the only place the detector spins. The 16-bit counter is derived from the
//! same clock, so measured intervals are exact when `ticks_per_poll == 1`
//! and edges are seen at most one poll late otherwise.
//!
//! [`line_level`]: BaudHardware::line_level

use crate::config::TIMER_TICK_DIVISOR;
use crate::hardware::BaudHardware;

/// Counter mode currently selected on the simulated timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Free-running 16-bit counter
    Counter16,
    /// 8-bit auto-reload bit clock
    AutoReload8 { reload: u8 },
}

/// Timer ticks per serial bit for a peer at `baud_rate` (12T core)
///
/// Zero when the peer is faster than one bit per timer tick.
pub fn ticks_per_bit(baud_rate: u32, oscillator_hz: u32) -> u32 {
    let divisor = u64::from(TIMER_TICK_DIVISOR) * u64::from(baud_rate.max(1));
    (u64::from(oscillator_hz) / divisor) as u32
}

#[derive(Debug, Clone, Copy, Default)]
struct SimTimer {
    count: u32,
    running: bool,
    overflow: bool,
    last_sync: u64,
}

impl SimTimer {
    fn sync(&mut self, now: u64) {
        if self.running {
            let total = u64::from(self.count) + (now - self.last_sync);
            if total > u64::from(u16::MAX) {
                self.overflow = true;
            }
            self.count = (total & u64::from(u16::MAX)) as u32;
        }
        self.last_sync = now;
    }
}

/// Scripted receive line plus timer model implementing [`BaudHardware`]
#[derive(Debug, Clone)]
pub struct SyntheticLine {
    /// (level, duration in ticks)
    segments: Vec<(bool, u64)>,
    repeat: bool,
    ticks_per_poll: u64,
    now: u64,
    cursor: usize,
    segment_end: u64,
    exhausted: bool,
    timer: SimTimer,
    mode: Option<TimerMode>,
    baud_doubling: bool,
    interrupts_enabled: bool,
    polls: u64,
}

impl SyntheticLine {
    /// Line following `(level, ticks)` segments, then idling high
    pub fn from_segments(segments: &[(bool, u32)]) -> Self {
        let segments: Vec<(bool, u64)> = segments
            .iter()
            .filter(|(_, ticks)| *ticks > 0)
            .map(|&(level, ticks)| (level, u64::from(ticks)))
            .collect();
        let segment_end = segments.first().map_or(0, |&(_, ticks)| ticks);
        let exhausted = segments.is_empty();

        Self {
            segments,
            repeat: false,
            ticks_per_poll: 1,
            now: 0,
            cursor: 0,
            segment_end,
            exhausted,
            timer: SimTimer::default(),
            mode: None,
            baud_doubling: false,
            interrupts_enabled: true,
            polls: 0,
        }
    }

    /// Low pulses of the given lengths separated by `gap` ticks of idle
    pub fn from_low_intervals(intervals: &[u32], gap: u32) -> Self {
        let mut segments = vec![(true, gap)];
        for &ticks in intervals {
            segments.push((false, ticks));
            segments.push((true, gap));
        }
        Self::from_segments(&segments)
    }

    /// 8N1 frames, LSB first, with one idle bit between frames
    pub fn from_frames(bytes: &[u8], ticks_per_bit: u32) -> Self {
        let mut segments: Vec<(bool, u32)> = vec![(true, ticks_per_bit)];
        let mut push_bit = |level: bool| {
            if let Some((last, ticks)) = segments.last_mut() {
                if *last == level {
                    *ticks += ticks_per_bit;
                    return;
                }
            }
            segments.push((level, ticks_per_bit));
        };

        for &byte in bytes {
            push_bit(false);
            for bit in 0..8 {
                push_bit(byte & (1 << bit) != 0);
            }
            // Stop bit plus inter-frame idle
            push_bit(true);
            push_bit(true);
        }
        Self::from_segments(&segments)
    }

    /// Replay the script forever instead of idling after it
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Ticks that pass on every line poll
    pub fn with_ticks_per_poll(mut self, ticks: u32) -> Self {
        self.ticks_per_poll = u64::from(ticks.max(1));
        self
    }

    fn level(&mut self) -> bool {
        while !self.exhausted && self.now >= self.segment_end {
            self.cursor += 1;
            if self.cursor == self.segments.len() {
                if !self.repeat {
                    self.exhausted = true;
                    break;
                }
                self.cursor = 0;
            }
            self.segment_end += self.segments[self.cursor].1;
        }

        if self.exhausted {
            true
        } else {
            self.segments[self.cursor].0
        }
    }

    fn sync_timer(&mut self) {
        self.timer.sync(self.now);
    }

    /// Reload value of the last 8-bit timer setup
    pub fn reload(&self) -> Option<u8> {
        match self.mode {
            Some(TimerMode::AutoReload8 { reload }) => Some(reload),
            _ => None,
        }
    }

    pub fn timer_mode(&self) -> Option<TimerMode> {
        self.mode
    }

    pub fn timer_running(&self) -> bool {
        self.timer.running
    }

    pub fn baud_doubling(&self) -> bool {
        self.baud_doubling
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// Number of line polls so far
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Simulated time in ticks
    pub fn now(&self) -> u64 {
        self.now
    }
}

impl BaudHardware for SyntheticLine {
    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }

    fn line_level(&mut self) -> bool {
        self.now += self.ticks_per_poll;
        self.polls += 1;
        self.level()
    }

    fn timer_init16(&mut self) {
        self.sync_timer();
        self.timer.running = false;
        self.mode = Some(TimerMode::Counter16);
    }

    fn timer_set16(&mut self, value: u16) {
        self.sync_timer();
        self.timer.count = u32::from(value);
    }

    fn timer_get16(&mut self) -> u16 {
        self.sync_timer();
        self.timer.count as u16
    }

    fn timer_overflowed(&mut self) -> bool {
        self.sync_timer();
        self.timer.overflow
    }

    fn clear_timer_overflow(&mut self) {
        self.sync_timer();
        self.timer.overflow = false;
    }

    fn timer_start(&mut self) {
        self.sync_timer();
        self.timer.running = true;
    }

    fn timer_stop(&mut self) {
        self.sync_timer();
        self.timer.running = false;
    }

    fn set_baud_doubling(&mut self, enabled: bool) {
        self.baud_doubling = enabled;
    }

    fn timer_init8(&mut self, reload: u8) {
        self.sync_timer();
        self.timer.running = false;
        self.mode = Some(TimerMode::AutoReload8 { reload });
    }
}
