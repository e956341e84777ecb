use embedded_hal::blocking::serial::Write;
use embedded_hal_mock::eh0::delay::NoopDelay;
use mojo_regs::cancel::CancelToken;
use mojo_regs::config::{BoardConfig, NcoConfig};
use mojo_regs::counter::BinaryCounter;
use mojo_regs::nco::set_nco_freq;
use mojo_regs::pwm::{pwm_byte, PwmGenerator, PwmState};
use mojo_regs::transport::SerialTransport;
use mojo_regs::{Error, RegisterWriter};
use std::io;

/// Records every byte and cancels the token once `cancel_after` frames went out
struct CancellingPort {
    written: Vec<u8>,
    cancel: CancelToken,
    cancel_after: usize,
    flushes: usize,
}

impl CancellingPort {
    fn new(cancel: CancelToken, cancel_after: usize) -> Self {
        Self {
            written: Vec::new(),
            cancel,
            cancel_after,
            flushes: 0,
        }
    }
}

impl Write<u8> for CancellingPort {
    type Error = io::ErrorKind;

    fn bwrite_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
        self.written.extend_from_slice(buffer);
        if self.written.len() / 2 >= self.cancel_after {
            self.cancel.cancel();
        }
        Ok(())
    }

    fn bflush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// Accepts `budget` frames, then fails every write
struct FailingPort {
    budget: usize,
    written: Vec<u8>,
}

impl Write<u8> for FailingPort {
    type Error = io::ErrorKind;

    fn bwrite_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
        if self.budget == 0 {
            return Err(io::ErrorKind::BrokenPipe);
        }
        self.budget -= 1;
        self.written.extend_from_slice(buffer);
        Ok(())
    }

    fn bflush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn pwm_runs_until_cancelled_then_clears_the_leds() {
    let cancel = CancelToken::new();
    let mut fpga = RegisterWriter::new(CancellingPort::new(cancel.clone(), 300));
    let mut pwm = PwmGenerator::new(0);

    pwm.run(&mut fpga, &cancel).unwrap();
    assert_eq!(pwm.state(), PwmState::ShuttingDown);

    let port = fpga.destroy();
    let frames: Vec<&[u8]> = port.written.chunks(2).collect();
    assert_eq!(frames.len(), 301);

    // counter wraps after 256 frames
    for (i, frame) in frames[..300].iter().enumerate() {
        assert_eq!(**frame, [0x00, pwm_byte((i % 256) as u8)]);
    }
    assert_eq!(*frames[300], [0x00, 0x00]);
    assert_eq!(port.flushes, 1);
}

#[test]
fn pwm_write_failure_is_fatal() {
    let mut fpga = RegisterWriter::new(FailingPort {
        budget: 5,
        written: Vec::new(),
    });
    let mut pwm = PwmGenerator::new(0);

    let result = pwm.run(&mut fpga, &CancelToken::new());

    assert_eq!(result, Err(Error::Transport(io::ErrorKind::BrokenPipe)));
    assert_eq!(pwm.state(), PwmState::Running);
    // no all-off frame after the failure
    assert_eq!(fpga.destroy().written.len(), 10);
}

#[test]
fn counter_runs_until_cancelled() {
    let cancel = CancelToken::new();
    let mut fpga = RegisterWriter::new(CancellingPort::new(cancel.clone(), 3));

    BinaryCounter::new(0, 10)
        .run(&mut fpga, &mut NoopDelay::new(), &cancel)
        .unwrap();

    assert_eq!(fpga.destroy().written, vec![0, 0, 0, 1, 0, 2, 0, 0]);
}

#[test]
fn nco_update_stops_at_the_first_failed_write() {
    let mut fpga = RegisterWriter::new(FailingPort {
        budget: 2,
        written: Vec::new(),
    });

    let result = set_nco_freq(&mut fpga, &NcoConfig::default(), 20e6);

    assert_eq!(result, Err(Error::Transport(io::ErrorKind::BrokenPipe)));
    assert_eq!(fpga.destroy().written, vec![8, 0xff, 9, 0xff]);
}

#[test]
fn nco_update_over_a_byte_stream() {
    let config = BoardConfig::default();
    let transport = SerialTransport::from_port("capture", Vec::new());
    let mut fpga = RegisterWriter::new(transport);

    let setting = set_nco_freq(&mut fpga, &config.nco, 10e6).unwrap();

    let expected_word: u32 = (0.125 * u32::MAX as f64) as u32;
    assert_eq!(setting.tuning_word, expected_word);
    let [b0, b1, b2, b3] = expected_word.to_le_bytes();
    assert_eq!(
        fpga.destroy().into_inner(),
        vec![8, b0, 9, b1, 10, b2, 11, b3]
    );
}
