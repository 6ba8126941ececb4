//! Platform access needed for baud-rate configuration

/// Timer, receive line and interrupt control used by the configurator and
/// the detector.
///
/// Every method takes `&mut self` so implementations may model the passage
/// of time on each access.
pub trait BaudHardware {
    /// Mask the timer and serial interrupts so nothing perturbs measurement
    fn disable_interrupts(&mut self);

    /// Current level of the receive line (`true` = high / idle)
    fn line_level(&mut self) -> bool;

    /// Switch the timer to a stopped, free-running 16-bit counter
    fn timer_init16(&mut self);

    fn timer_set16(&mut self, value: u16);

    fn timer_get16(&mut self) -> u16;

    /// Latched counter overflow flag
    fn timer_overflowed(&mut self) -> bool;

    fn clear_timer_overflow(&mut self);

    fn timer_start(&mut self);

    fn timer_stop(&mut self);

    /// Set or clear the baud-doubling mode bit
    fn set_baud_doubling(&mut self, enabled: bool);

    /// Switch the timer to 8-bit auto-reload mode as the serial bit clock
    fn timer_init8(&mut self, reload: u8);
}
