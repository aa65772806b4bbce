//! Opening the byte channel a command talks to: serial device, file, or stdio

use crate::settings::SerialArgs;
use anyhow::{Context, Result};
use edgeline_core::{ChannelConfig, RawChannel, StreamChannel};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::info;

/// How long one serial read call waits before the channel polls again
const SERIAL_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// A boxed raw channel
pub type BoxChannel = Box<dyn RawChannel>;

/// Joins a read half and a write half into one stream
#[derive(Debug)]
pub struct Duplex<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Duplex<R, W> {
    /// Pair `reader` with `writer`
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Borrow the write half
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: Read, W> Read for Duplex<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R, W: Write> Write for Duplex<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn channel_config(serial: &SerialArgs) -> ChannelConfig {
    ChannelConfig {
        read_timeout: serial.read_timeout(),
        ..ChannelConfig::default()
    }
}

/// Open the serial device named by `path`
pub fn open_serial(path: &str, serial: &SerialArgs) -> Result<BoxChannel> {
    let baud = serial.baud.bits_per_second();
    let port = serialport::new(path, baud)
        .timeout(SERIAL_POLL_TIMEOUT)
        .open()
        .with_context(|| format!("Failed to open serial port {} at {} baud", path, baud))?;

    info!("Opened serial port {} at {} baud", path, baud);
    Ok(Box::new(StreamChannel::with_config(port, channel_config(serial))))
}

/// Channel that writes to `output`
///
/// `Some(path)` appends to a file (`-` means stdout); `None` uses `--port` when given,
/// otherwise stdout.
pub fn open_output(output: Option<&str>, serial: &SerialArgs) -> Result<BoxChannel> {
    match (output, serial.port.as_deref()) {
        (Some("-"), _) | (None, None) => Ok(Box::new(StreamChannel::new(Duplex::new(
            io::empty(),
            io::stdout(),
        )))),
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open output file: {}", path))?;
            Ok(Box::new(StreamChannel::new(Duplex::new(io::empty(), file))))
        }
        (None, Some(port)) => open_serial(port, serial),
    }
}

/// Channel that reads from `input`
///
/// `Some(path)` reads a file (`-` means stdin); `None` uses `--port` when given,
/// otherwise stdin.
pub fn open_input(input: Option<&str>, serial: &SerialArgs) -> Result<BoxChannel> {
    let config = channel_config(serial);
    match (input, serial.port.as_deref()) {
        (Some("-"), _) | (None, None) => Ok(Box::new(StreamChannel::with_config(
            Duplex::new(io::stdin(), io::sink()),
            config,
        ))),
        (Some(path), _) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to read input file: {}", path))?;
            Ok(Box::new(StreamChannel::with_config(
                Duplex::new(file, io::sink()),
                config,
            )))
        }
        (None, Some(port)) => open_serial(port, serial),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeline_core::LineError;

    #[test]
    fn duplex_routes_halves() {
        let mut d = Duplex::new(io::Cursor::new(b"in".to_vec()), Vec::new());
        d.write_all(b"out").unwrap();

        let mut buf = String::new();
        d.read_to_string(&mut buf).unwrap();

        assert_eq!(buf, "in");
        assert_eq!(d.writer(), b"out");
    }

    #[test]
    fn missing_input_file_is_reported() {
        let err = open_input(Some("/definitely/not/here.txt"), &SerialArgs::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn output_channel_cannot_be_read() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("out.txt");

        let mut ch = open_output(Some(path.to_str().unwrap()), &SerialArgs::default()).unwrap();
        ch.write_bytes(b"x\n").unwrap();
        assert_eq!(ch.read_until(b'\n'), Err(LineError::ConnectionClosed));
        drop(ch);

        assert_eq!(std::fs::read(&path).unwrap(), b"x\n");
    }
}
