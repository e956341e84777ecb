//! Program the NCO to output a particular frequency.
//!
//! Usage: `set_nco_freq <serial_device> <frequency_hz>`

use anyhow::{anyhow, bail, Context, Result};
use mojo_regs::config::{BoardConfig, SerialConfig};
use mojo_regs::nco::{self, NcoSetting};
use mojo_regs::transport::SerialTransport;
use mojo_regs::RegisterWriter;
use tracing::info;

const USAGE: &str = "usage: set_nco_freq <serial_device> <frequency_hz>";

/// Board configuration and target frequency, checked before the port is touched
fn parse_args(args: &[String]) -> Result<(BoardConfig, f64)> {
    let (device, frequency) = match args {
        [device, frequency] => (device, frequency),
        _ => bail!("Wrong number of arguments. Got: {:?}\n{}", args, USAGE),
    };
    let frequency: f64 = frequency
        .parse()
        .map_err(|_| anyhow!("frequency ({}) is expected to be a number..", frequency))?;

    let config = BoardConfig {
        serial: SerialConfig::new(device.as_str())?,
        ..BoardConfig::default()
    };
    NcoSetting::compute(&config.nco, frequency)?;

    Ok((config, frequency))
}

fn main() -> Result<()> {
    mojo_regs::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, frequency) = parse_args(&args)?;

    let transport = SerialTransport::open(&config.serial)
        .with_context(|| format!("failed to open serial port {}", config.serial.device))?;
    let mut fpga = RegisterWriter::new(transport);

    let setting = nco::set_nco_freq(&mut fpga, &config.nco, frequency)?;
    fpga.flush()?;
    info!(
        "NCO set to {} Hz (requested {} Hz)",
        setting.achievable, setting.requested
    );
    Ok(())
}
