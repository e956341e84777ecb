//! Binary counter on the LEDs, mostly useful to check the wiring of each LED

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::serial::Write;
use tracing::info;

use crate::cancel::CancelToken;
use crate::{Error, RegisterWriter};

/// Default time each count stays on the LEDs, in milliseconds
pub const DEFAULT_STEP_MS: u16 = 10;

/// Counts from 0 to 255 on the LED register, then starts over
#[derive(Debug)]
pub struct BinaryCounter {
    address: u8,
    step_ms: u16,
    count: u8,
}

impl BinaryCounter {
    /// Counter on the LED register at `address`, holding each value for `step_ms`
    pub fn new(address: u8, step_ms: u16) -> Self {
        Self {
            address,
            step_ms,
            count: 0,
        }
    }

    /// Value the next step will show
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Show the current count and advance
    pub fn step<S, E>(&mut self, fpga: &mut RegisterWriter<S>) -> Result<u8, Error<E>>
    where
        S: Write<u8, Error = E>,
    {
        let shown = self.count;
        fpga.write_register(self.address, shown)?;
        self.count = self.count.wrapping_add(1);
        Ok(shown)
    }

    /// Count until `cancel` fires, then switch the LEDs off
    pub fn run<S, E, D>(
        &mut self,
        fpga: &mut RegisterWriter<S>,
        delay: &mut D,
        cancel: &CancelToken,
    ) -> Result<(), Error<E>>
    where
        S: Write<u8, Error = E>,
        D: DelayMs<u16>,
    {
        info!("counting on register {} every {} ms", self.address, self.step_ms);
        while !cancel.is_cancelled() {
            self.step(fpga)?;
            delay.delay_ms(self.step_ms);
        }
        fpga.write_register(self.address, 0x00)?;
        fpga.flush()
    }
}
