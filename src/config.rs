//! Board configuration: serial link settings and the register map

use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::error;

use crate::MAX_ADDRESS;

/// Serial device the board enumerates as when nothing else is given
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Serial link settings
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    /// Path of the serial device
    pub device: String,
    /// Baud rate, the FPGA UART is fixed at 115200
    pub baud_rate: u32,
    /// Read/write timeout applied when the port is opened
    pub timeout: Duration,
    /// How long to wait after the final frame before the process exits
    pub drain_delay: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: 115_200,
            timeout: Duration::from_secs(1),
            drain_delay: Duration::from_secs(1),
        }
    }
}

impl SerialConfig {
    /// Settings for `device` with the default baud rate and timeouts
    pub fn new(device: impl Into<String>) -> Result<Self> {
        let device = device.into();
        if device.trim().is_empty() {
            error!("serial device path must not be empty");
            return Err(anyhow!("serial device path must not be empty"));
        }
        Ok(Self {
            device,
            ..Self::default()
        })
    }
}

/// NCO sample rate and the registers holding the tuning word
#[derive(Debug, Clone, PartialEq)]
pub struct NcoConfig {
    /// Sample rate of the NCO in Hz
    pub sample_rate: f64,
    /// Register addresses for tuning word bytes 0 (least significant) to 3
    pub registers: [u8; 4],
}

impl Default for NcoConfig {
    fn default() -> Self {
        Self {
            sample_rate: 80e6,
            registers: [8, 9, 10, 11],
        }
    }
}

impl NcoConfig {
    /// Validated NCO configuration
    pub fn new(sample_rate: f64, registers: [u8; 4]) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            error!("sample_rate must be a positive number of Hz");
            return Err(anyhow!("sample_rate must be a positive number of Hz"));
        }
        if let Some(address) = registers.iter().find(|&&address| address > MAX_ADDRESS) {
            error!("NCO register address {} is out of range", address);
            return Err(anyhow!(
                "NCO register address {} is out of range (0..={})",
                address,
                MAX_ADDRESS
            ));
        }
        Ok(Self {
            sample_rate,
            registers,
        })
    }

    /// Half the sample rate, the highest frequency the NCO can produce
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }
}

/// Everything the tools need to know about the board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Serial link settings
    pub serial: SerialConfig,
    /// Register driving the eight LEDs
    pub led_address: u8,
    /// NCO settings
    pub nco: NcoConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            led_address: 0,
            nco: NcoConfig::default(),
        }
    }
}
