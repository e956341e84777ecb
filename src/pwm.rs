//! Software PWM brightness ramp on the LED register.
//!
//! A free running counter cycles over `0..256`. Every LED gets a brightness level, and the LED
//! is lit on the counter values that are a multiple of that level's divisor. Writing the LED
//! byte as fast as the link allows turns the duty cycle into perceived brightness: level 1 is
//! lit four times per period, level 8 is always on.
//!
//! ```
//! use mojo_regs::pwm::{bits_to_byte, pwm_bit};
//!
//! assert!(pwm_bit(0, 1));
//! assert!(!pwm_bit(1, 1));
//! assert!(pwm_bit(1, 8));
//! assert_eq!(bits_to_byte([true, false, false, false, false, false, false, true]), 0x81);
//! ```

use embedded_hal::blocking::serial::Write;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::{Error, RegisterWriter};

/// Number of LEDs behind the LED register
pub const LED_COUNT: usize = 8;

/// Highest brightness level, always on
pub const MAX_LEVEL: u8 = 8;

/// Counter divisors for levels 1 to 7. Level 0 is always off, level 8 always on.
const DIVISORS: [u8; 7] = [64, 48, 24, 16, 10, 5, 3];

/// Counter divisor for `level`, `None` for the always off and always on levels
pub fn divisor(level: u8) -> Option<u8> {
    match level {
        1..=7 => Some(DIVISORS[level as usize - 1]),
        _ => None,
    }
}

/// Whether an LED at brightness `level` is lit at `counter`.
///
/// Levels above [`MAX_LEVEL`] behave like `MAX_LEVEL`.
pub fn pwm_bit(counter: u8, level: u8) -> bool {
    match divisor(level) {
        Some(d) => counter % d == 0,
        None => level > 0,
    }
}

/// Pack eight LED states into the LED byte, first entry in bit 0
pub fn bits_to_byte(bits: [bool; LED_COUNT]) -> u8 {
    bits.iter()
        .enumerate()
        .fold(0, |byte, (bit, &on)| byte | ((on as u8) << bit))
}

/// The LED byte for `counter` with LED `n` at brightness level `n + 1`
pub fn pwm_byte(counter: u8) -> u8 {
    let mut bits = [false; LED_COUNT];
    for (led, bit) in bits.iter_mut().enumerate() {
        *bit = pwm_bit(counter, led as u8 + 1);
    }
    bits_to_byte(bits)
}

/// Generator state
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PwmState {
    /// Writing the ramp
    Running,
    /// Cancelled, LEDs are switched off and no more frames are written
    ShuttingDown,
}

/// Writes the brightness ramp to the LED register until cancelled
#[derive(Debug)]
pub struct PwmGenerator {
    address: u8,
    counter: u8,
    state: PwmState,
}

impl PwmGenerator {
    /// New generator writing to the LED register at `address`, counter at 0
    pub fn new(address: u8) -> Self {
        Self {
            address,
            counter: 0,
            state: PwmState::Running,
        }
    }

    /// Current state
    pub fn state(&self) -> PwmState {
        self.state
    }

    /// Counter value the next step will use
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Write one LED byte and advance the counter. Returns the byte written.
    pub fn step<S, E>(&mut self, fpga: &mut RegisterWriter<S>) -> Result<u8, Error<E>>
    where
        S: Write<u8, Error = E>,
    {
        let byte = pwm_byte(self.counter);
        fpga.write_register(self.address, byte)?;
        self.counter = self.counter.wrapping_add(1);
        Ok(byte)
    }

    /// Run the ramp until `cancel` fires, then switch the LEDs off.
    ///
    /// The token is checked before every write. A failed write stops the loop and is returned
    /// as is, the LEDs are left in whatever state they were.
    pub fn run<S, E>(
        &mut self,
        fpga: &mut RegisterWriter<S>,
        cancel: &CancelToken,
    ) -> Result<(), Error<E>>
    where
        S: Write<u8, Error = E>,
    {
        info!("starting LED brightness ramp on register {}", self.address);
        while self.state == PwmState::Running {
            if cancel.is_cancelled() {
                return self.shutdown(fpga);
            }
            self.step(fpga)?;
        }
        Ok(())
    }

    /// Switch all LEDs off and stop. Does nothing if already shut down.
    pub fn shutdown<S, E>(&mut self, fpga: &mut RegisterWriter<S>) -> Result<(), Error<E>>
    where
        S: Write<u8, Error = E>,
    {
        if self.state == PwmState::ShuttingDown {
            return Ok(());
        }
        self.state = PwmState::ShuttingDown;
        info!("Shutting down..");
        fpga.write_register(self.address, 0x00)?;
        fpga.flush()?;
        debug!("LED register {} cleared", self.address);
        Ok(())
    }
}
