//! Blink the LEDs through the LED register until Ctrl-C.
//!
//! Usage: `run_leds [serial_device] [--counter]`
//!
//! By default runs the PWM brightness ramp, `--counter` shows a binary counter instead.

use anyhow::{bail, Context, Result};
use mojo_regs::cancel::CancelToken;
use mojo_regs::config::{BoardConfig, SerialConfig};
use mojo_regs::counter::{BinaryCounter, DEFAULT_STEP_MS};
use mojo_regs::pwm::PwmGenerator;
use mojo_regs::transport::{SerialTransport, StdDelay};
use mojo_regs::RegisterWriter;
use tokio::signal;
use tokio::time::sleep;
use tracing::{error, info};

const USAGE: &str = "usage: run_leds [serial_device] [--counter]";

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Pwm,
    Counter,
}

fn parse_args(args: &[String]) -> Result<(BoardConfig, Pattern)> {
    let mut config = BoardConfig::default();
    let mut pattern = Pattern::Pwm;
    let mut device = None;

    for arg in args {
        match arg.as_str() {
            "--counter" => pattern = Pattern::Counter,
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            path if device.is_none() => device = Some(path.to_string()),
            _ => bail!("Wrong number of arguments. Got: {:?}\n{}", args, USAGE),
        }
    }
    if let Some(device) = device {
        config.serial = SerialConfig::new(device)?;
    }
    Ok((config, pattern))
}

#[tokio::main]
async fn main() -> Result<()> {
    mojo_regs::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, pattern) = parse_args(&args)?;

    let transport = SerialTransport::open(&config.serial)
        .with_context(|| format!("failed to open serial port {}", config.serial.device))?;

    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let led_address = config.led_address;

    // the pattern loop blocks on every write, keep it off the async workers
    let mut leds = tokio::task::spawn_blocking(move || {
        let mut fpga = RegisterWriter::new(transport);
        match pattern {
            Pattern::Pwm => PwmGenerator::new(led_address).run(&mut fpga, &worker_cancel),
            Pattern::Counter => BinaryCounter::new(led_address, DEFAULT_STEP_MS).run(
                &mut fpga,
                &mut StdDelay,
                &worker_cancel,
            ),
        }
    });

    tokio::select! {
        finished = &mut leds => {
            // the loop only ends on its own when a write failed
            if let Err(e) = finished? {
                error!("LED pattern stopped: {}", e);
                return Err(e.into());
            }
        }
        interrupted = signal::ctrl_c() => {
            interrupted.context("failed to listen for Ctrl-C")?;
            info!("interrupt received, stopping LED pattern");
            cancel.cancel();
            leds.await??;
            // give the serial buffer time to drain before exiting
            sleep(config.serial.drain_delay).await;
        }
    }

    info!("LEDs off, exiting");
    Ok(())
}
