//! Host side serial transport and delay for the register writer

use core::fmt;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::serial::Write;
use serialport::SerialPort;
use std::io;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

use crate::config::SerialConfig;

/// Byte stream to the FPGA, adapted to the embedded HAL blocking serial trait.
///
/// Normally wraps an opened serial port, but any [`io::Write`] works.
pub struct SerialTransport<P = Box<dyn SerialPort>> {
    device: String,
    port: P,
}

impl SerialTransport {
    /// Open the serial device described by `config`
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&config.device, config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|e| {
                error!("failed to open {}: {}", config.device, e);
                e
            })?;
        info!("port {} opened at {} baud", config.device, config.baud_rate);
        Ok(Self {
            device: config.device.clone(),
            port,
        })
    }
}

impl<P: io::Write> SerialTransport<P> {
    /// Wrap an already open byte stream
    pub fn from_port(device: impl Into<String>, port: P) -> Self {
        Self {
            device: device.into(),
            port,
        }
    }

    /// Name of the device this transport writes to
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Return the wrapped byte stream
    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: io::Write> Write<u8> for SerialTransport<P> {
    type Error = io::Error;

    fn bwrite_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
        self.port.write_all(buffer)
    }

    fn bflush(&mut self) -> Result<(), Self::Error> {
        self.port.flush()
    }
}

impl<P> fmt::Debug for SerialTransport<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

/// Delay provider backed by [`thread::sleep`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayMs<u16> for StdDelay {
    fn delay_ms(&mut self, ms: u16) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
