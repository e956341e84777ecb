//! NCO frequency tuning.
//!
//! The NCO output frequency is set by a 32 bit tuning word spread over four 8 bit registers.
//! The word is the target frequency as a fraction of the Nyquist frequency, halved and scaled to
//! the full `u32` range.

use core::fmt;
use embedded_hal::blocking::serial::Write;
use tracing::info;

use crate::config::NcoConfig;
use crate::{Error, RegisterWriter};

/// Full scale of the tuning word, `2^32 - 1`
const FULL_SCALE: f64 = u32::MAX as f64;

/// The requested frequency is negative or above the Nyquist frequency
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrequencyOutOfRange {
    /// Requested frequency in Hz
    pub frequency: f64,
    /// Half the sample rate, in Hz
    pub nyquist: f64,
}

impl fmt::Display for FrequencyOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frequency ({} Hz) can't be > 1/2 of the sample rate ({} Hz) or negative",
            self.frequency, self.nyquist
        )
    }
}

impl std::error::Error for FrequencyOutOfRange {}

/// Compute the tuning word for `frequency` at `sample_rate`, both in Hz
pub fn tuning_word(frequency: f64, sample_rate: f64) -> Result<u32, FrequencyOutOfRange> {
    let nyquist = sample_rate / 2.0;
    if !(0.0..=nyquist).contains(&frequency) {
        return Err(FrequencyOutOfRange { frequency, nyquist });
    }

    // non-negative, so truncation is floor
    Ok(((frequency / nyquist) / 2.0 * FULL_SCALE) as u32)
}

/// The frequency the NCO actually produces for `word` at `sample_rate`
pub fn achievable_frequency(word: u32, sample_rate: f64) -> f64 {
    word as f64 / FULL_SCALE * sample_rate
}

/// Split a tuning word into register bytes, least significant byte first
pub fn split_tuning_word(word: u32) -> [u8; 4] {
    word.to_le_bytes()
}

/// Reassemble a tuning word from its register bytes
pub fn join_tuning_word(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// What was programmed into the NCO
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NcoSetting {
    /// Frequency that was asked for, in Hz
    pub requested: f64,
    /// Tuning word written to the registers
    pub tuning_word: u32,
    /// Frequency the NCO produces with this word, in Hz
    pub achievable: f64,
    /// Register bytes, least significant first
    pub bytes: [u8; 4],
}

impl NcoSetting {
    /// Work out the register contents for `frequency` without touching the hardware
    pub fn compute(config: &NcoConfig, frequency: f64) -> Result<Self, FrequencyOutOfRange> {
        let word = tuning_word(frequency, config.sample_rate)?;
        Ok(Self {
            requested: frequency,
            tuning_word: word,
            achievable: achievable_frequency(word, config.sample_rate),
            bytes: split_tuning_word(word),
        })
    }
}

/// Program the NCO to `frequency` Hz.
///
/// Nothing is written if the frequency is out of range. The four bytes are written one register
/// at a time, byte 0 first. If a write fails the update stops there and the NCO is left with a
/// partially updated word.
pub fn set_nco_freq<S, E>(
    fpga: &mut RegisterWriter<S>,
    config: &NcoConfig,
    frequency: f64,
) -> Result<NcoSetting, Error<E>>
where
    S: Write<u8, Error = E>,
{
    let setting = NcoSetting::compute(config, frequency)?;

    info!(
        "setting nco to frequency {} (FTW: {:#010x})",
        setting.achievable, setting.tuning_word
    );
    info!(
        "new register value: {:#04x} {:#04x} {:#04x} {:#04x}",
        setting.bytes[3], setting.bytes[2], setting.bytes[1], setting.bytes[0]
    );

    for (&address, &byte) in config.registers.iter().zip(setting.bytes.iter()) {
        fpga.write_register(address, byte)?;
    }
    Ok(setting)
}
