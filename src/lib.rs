//! *Register-mapped serial control for the mojo modulator FPGA design*
//!
//! The FPGA listens on a serial port and decodes every two received bytes as a register write:
//! the first byte is the register address (0 to 127), the second is the value. Nothing is ever
//! sent back. This crate wraps any blocking
//! [embedded HAL](https://github.com/rust-embedded/embedded-hal) serial writer to send these
//! frames, and builds two small tools on top of it: a software PWM brightness ramp on the LED
//! register and a frequency tuning word encoder for the NCO registers.
//!
//! The writer is created by passing it a serial port. On a host this is usually a
//! [`transport::SerialTransport`], in tests any mock implementing the blocking serial write
//! trait will do.
//! ```
//! # use embedded_hal_mock::eh0::serial::Mock;
//! # use mojo_regs::*;
//! # let serial = Mock::<u8>::new(&[]);
//! let mut fpga = RegisterWriter::new(serial);
//! # fpga.destroy().done();
//! ```
//!
//! Writing a register sends exactly two bytes;
//! ```
//! # use embedded_hal_mock::eh0::serial::{Mock, Transaction};
//! # use mojo_regs::*;
//! # let serial = Mock::<u8>::new(&[Transaction::write_many([0x00, 0xa5])]);
//! # let mut fpga = RegisterWriter::new(serial);
//! fpga.write_register(0x00, 0xa5).unwrap();
//! # fpga.destroy().done();
//! ```
//!
//! The NCO is tuned by writing a 32 bit tuning word across four registers;
//! ```
//! # use embedded_hal_mock::eh0::serial::{Mock, Transaction};
//! # use mojo_regs::*;
//! # let serial = Mock::<u8>::new(&[
//! #     Transaction::write_many([8, 0xff]),
//! #     Transaction::write_many([9, 0xff]),
//! #     Transaction::write_many([10, 0xff]),
//! #     Transaction::write_many([11, 0x3f]),
//! # ]);
//! # let mut fpga = RegisterWriter::new(serial);
//! let setting = nco::set_nco_freq(&mut fpga, &config::NcoConfig::default(), 20e6).unwrap();
//! assert_eq!(setting.tuning_word, 0x3fff_ffff);
//! # fpga.destroy().done();
//! ```
//!
//! ## Register map
//! - `0`: LED byte, one bit per LED
//! - `8` to `11`: NCO tuning word, least significant byte first
//!
#![warn(missing_debug_implementations, missing_docs)]

pub mod cancel;
pub mod config;
pub mod counter;
mod encode;
pub mod logging;
pub mod nco;
pub mod pwm;
pub mod transport;

use core::fmt::{self, Debug, Display};
use embedded_hal::blocking::serial::Write;
use encode::encode_frame;
use tracing::debug;

pub use encode::MAX_ADDRESS;
pub use nco::FrequencyOutOfRange;

/// Register writer. Wraps a serial port to send register frames to the FPGA
#[derive(Debug)]
pub struct RegisterWriter<S>
where
    S: Write<u8>,
{
    serial: S,
}

impl<S, E> RegisterWriter<S>
where
    S: Write<u8, Error = E>,
{
    /// Construct a new register writer.
    /// serial is the opened serial port to use. Nothing is sent until the first write.
    pub fn new(serial: S) -> Self {
        RegisterWriter { serial }
    }

    /// Write `value` to the register at `address`.
    ///
    /// The frame is handed to the serial port as a whole, no acknowledgement is read back.
    /// Addresses above [`MAX_ADDRESS`] are rejected without touching the port.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error<E>> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }

        debug!("writing to address {} the value {:#04x}", address, value);
        let frame = encode_frame(address, value);
        self.serial.bwrite_all(&frame).map_err(Error::Transport)
    }

    /// Block until everything written so far has left the port
    pub fn flush(&mut self) -> Result<(), Error<E>> {
        self.serial.bflush().map_err(Error::Transport)
    }

    /// Destroy the register writer, return the wrapped serial port
    pub fn destroy(self) -> S {
        self.serial
    }
}

/// Errors returned by register writes and the tools built on them
#[derive(Debug, Clone, PartialEq)]
pub enum Error<E> {
    /// The serial port rejected the write
    Transport(E),
    /// Register address outside of `0..=MAX_ADDRESS`
    InvalidAddress(u8),
    /// Requested NCO frequency can't be represented at the configured sample rate
    FrequencyOutOfRange(FrequencyOutOfRange),
}

impl<E> From<FrequencyOutOfRange> for Error<E> {
    fn from(err: FrequencyOutOfRange) -> Self {
        Error::FrequencyOutOfRange(err)
    }
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "serial write failed: {}", err),
            Error::InvalidAddress(address) => write!(
                f,
                "register address {} is out of range (0..={})",
                address, MAX_ADDRESS
            ),
            Error::FrequencyOutOfRange(err) => Display::fmt(err, f),
        }
    }
}

impl<E: Debug + Display> std::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh0::serial::{Mock, Transaction};

    #[test]
    fn zero_write_is_two_zero_bytes() {
        let serial = Mock::<u8>::new(&[Transaction::write_many([0x00, 0x00])]);
        let mut fpga = RegisterWriter::new(serial);

        fpga.write_register(0, 0).unwrap();

        fpga.destroy().done();
    }

    #[test]
    fn frames_are_sent_in_call_order() {
        let serial = Mock::<u8>::new(&[
            Transaction::write_many([0x7f, 0x01]),
            Transaction::write_many([0x00, 0xff]),
            Transaction::flush(),
        ]);
        let mut fpga = RegisterWriter::new(serial);

        fpga.write_register(0x7f, 0x01).unwrap();
        fpga.write_register(0x00, 0xff).unwrap();
        fpga.flush().unwrap();

        fpga.destroy().done();
    }

    #[test]
    fn address_above_range_is_rejected_before_writing() {
        let serial = Mock::<u8>::new(&[]);
        let mut fpga = RegisterWriter::new(serial);

        assert!(matches!(
            fpga.write_register(0x80, 0x00),
            Err(Error::InvalidAddress(0x80))
        ));

        fpga.destroy().done();
    }

    #[test]
    fn errors_render_readable_messages() {
        let err: Error<&str> = Error::InvalidAddress(200);
        assert_eq!(
            err.to_string(),
            "register address 200 is out of range (0..=127)"
        );

        let err: Error<&str> = Error::Transport("port closed");
        assert_eq!(err.to_string(), "serial write failed: port closed");
    }
}
