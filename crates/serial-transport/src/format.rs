//! Text output over the blocking transmit path

use crate::hardware::SerialControl;
use crate::transport::Transport;
use std::fmt;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render `value` in decimal into the tail of `buf`, no leading zeros
fn decimal_digits(value: u16, buf: &mut [u8; 5]) -> &[u8] {
    let mut start = buf.len();
    let mut rest = value;
    loop {
        start -= 1;
        buf[start] = b'0' + (rest % 10) as u8;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    &buf[start..]
}

impl<const N: usize> Transport<N> {
    pub fn write_char<C: SerialControl>(&self, ch: u8, ctl: &mut C) {
        self.write_blocking(ch, ctl);
    }

    pub fn write_bytes<C: SerialControl>(&self, bytes: &[u8], ctl: &mut C) {
        for &byte in bytes {
            self.write_blocking(byte, ctl);
        }
    }

    /// Send up to (not including) the first zero byte
    pub fn write_cstr<C: SerialControl>(&self, s: &[u8], ctl: &mut C) {
        for &byte in s.iter().take_while(|&&b| b != 0) {
            self.write_blocking(byte, ctl);
        }
    }

    /// Unsigned decimal
    pub fn write_uint<C: SerialControl>(&self, value: u16, ctl: &mut C) {
        let mut buf = [0u8; 5];
        self.write_bytes(decimal_digits(value, &mut buf), ctl);
    }

    /// Signed decimal with a leading `-` for negatives
    pub fn write_int<C: SerialControl>(&self, value: i16, ctl: &mut C) {
        if value < 0 {
            self.write_blocking(b'-', ctl);
        }
        self.write_uint(value.unsigned_abs(), ctl);
    }

    /// Four uppercase hex digits
    pub fn write_hex4<C: SerialControl>(&self, value: u16, ctl: &mut C) {
        for shift in [12u16, 8, 4, 0] {
            let nibble = usize::from((value >> shift) & 0xF);
            self.write_blocking(HEX_DIGITS[nibble], ctl);
        }
    }

    /// `core::fmt` adapter over [`write_blocking`](Self::write_blocking)
    pub fn writer<'a, C: SerialControl>(&'a self, ctl: &'a mut C) -> Writer<'a, C, N> {
        Writer {
            transport: self,
            ctl,
        }
    }
}

/// Formatting sink that sends through a [`Transport`]
pub struct Writer<'a, C, const N: usize> {
    transport: &'a Transport<N>,
    ctl: &'a mut C,
}

impl<C: SerialControl, const N: usize> fmt::Write for Writer<'_, C, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.transport.write_bytes(s.as_bytes(), self.ctl);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimUart;
    use proptest::prelude::*;
    use std::fmt::Write;

    fn render(f: impl FnOnce(&Transport, &mut SimUart<'_>)) -> Vec<u8> {
        let transport: Transport = Transport::new();
        let mut uart = SimUart::new(&transport);
        transport.init(&mut uart);
        f(&transport, &mut uart);
        uart.run_until_quiet();
        uart.take_wire()
    }

    #[test]
    fn test_decimal_digits() {
        let mut buf = [0u8; 5];
        assert_eq!(decimal_digits(0, &mut buf), b"0");
        assert_eq!(decimal_digits(7, &mut buf), b"7");
        assert_eq!(decimal_digits(100, &mut buf), b"100");
        assert_eq!(decimal_digits(u16::MAX, &mut buf), b"65535");
    }

    #[test]
    fn test_write_uint_and_int() {
        assert_eq!(render(|t, u| t.write_uint(4096, u)), b"4096");
        assert_eq!(render(|t, u| t.write_int(-5, u)), b"-5");
        assert_eq!(render(|t, u| t.write_int(0, u)), b"0");
        assert_eq!(render(|t, u| t.write_int(i16::MIN, u)), b"-32768");
        assert_eq!(render(|t, u| t.write_int(i16::MAX, u)), b"32767");
    }

    #[test]
    fn test_write_hex4_is_fixed_width() {
        assert_eq!(render(|t, u| t.write_hex4(0x0A5F, u)), b"0A5F");
        assert_eq!(render(|t, u| t.write_hex4(0, u)), b"0000");
        assert_eq!(render(|t, u| t.write_hex4(0xFFFF, u)), b"FFFF");
    }

    #[test]
    fn test_write_cstr_stops_at_nul() {
        assert_eq!(render(|t, u| t.write_cstr(b"ok\0junk", u)), b"ok");
        assert_eq!(render(|t, u| t.write_cstr(b"no terminator", u)), b"no terminator");
        assert_eq!(render(|t, u| t.write_char(b'E', u)), b"E");
    }

    #[test]
    fn test_fmt_writer() {
        let wire = render(|t, u| {
            let mut out = t.writer(u);
            write!(out, "reload={:#04X} ok={}", 0xFA, true).unwrap();
        });
        assert_eq!(wire, b"reload=0xFA ok=true");
    }

    proptest! {
        #[test]
        fn int_matches_display(value in any::<i16>()) {
            let wire = render(|t, u| t.write_int(value, u));
            prop_assert_eq!(wire, value.to_string().into_bytes());
        }

        #[test]
        fn hex_matches_format(value in any::<u16>()) {
            let wire = render(|t, u| t.write_hex4(value, u));
            prop_assert_eq!(wire, format!("{value:04X}").into_bytes());
        }
    }
}
