//! Raw channel contract and its stream-backed implementations
//!
//! The raw channel is the byte transport underneath line framing. It transmits bytes
//! without interpreting them and offers a blocking "read until this byte" primitive that
//! line reading is built on.

use crate::error::LineError;
use crate::Result;
use bytes::{Buf, Bytes, BytesMut};
use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Default number of bytes pulled from the stream per read call
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64;

/// Pause between retries when the stream reports `WouldBlock`
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Byte transport consumed by line writers and readers
pub trait RawChannel {
    /// Send all of `data`
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Block until `delimiter` is received and return the bytes before it
    ///
    /// The delimiter is consumed and is not part of the returned bytes.
    fn read_until(&mut self, delimiter: u8) -> Result<Bytes>;

    /// Return whatever is already buffered, without blocking
    fn read_string(&mut self) -> Result<String>;

    /// Read exactly `length` bytes when `length > 0` (blocking), otherwise return what is
    /// already buffered
    fn read_bytes(&mut self, length: i32) -> Result<Bytes>;
}

impl<C: RawChannel + ?Sized> RawChannel for &mut C {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn read_until(&mut self, delimiter: u8) -> Result<Bytes> {
        (**self).read_until(delimiter)
    }

    fn read_string(&mut self) -> Result<String> {
        (**self).read_string()
    }

    fn read_bytes(&mut self, length: i32) -> Result<Bytes> {
        (**self).read_bytes(length)
    }
}

impl<C: RawChannel + ?Sized> RawChannel for Box<C> {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn read_until(&mut self, delimiter: u8) -> Result<Bytes> {
        (**self).read_until(delimiter)
    }

    fn read_string(&mut self) -> Result<String> {
        (**self).read_string()
    }

    fn read_bytes(&mut self, length: i32) -> Result<Bytes> {
        (**self).read_bytes(length)
    }
}

/// Read-side settings of a `StreamChannel`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Deadline for one blocking read; `None` waits indefinitely
    pub read_timeout: Option<Duration>,

    /// Bytes requested from the stream per read call
    pub read_chunk_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Aborts a blocked read on the channel it was taken from
///
/// The read fails with `LineError::Cancelled` at its next poll. A cancellation is
/// consumed by the read it aborts.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cancellation of the current or next blocking read
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a cancellation is pending
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Raw channel over any `Read + Write` stream (serial port, socket, pipe)
///
/// Received bytes are buffered internally; `read_string` and `read_bytes(0)` return only
/// what this buffer already holds. An inner stream that reports `WouldBlock` or
/// `TimedOut` is polled again until the configured read deadline passes.
pub struct StreamChannel<T> {
    inner: T,
    buf: BytesMut,
    config: ChannelConfig,
    cancel: CancelHandle,
}

impl<T: Read + Write> StreamChannel<T> {
    /// Create a channel with default settings
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ChannelConfig::default())
    }

    /// Create a channel with explicit settings
    pub fn with_config(inner: T, config: ChannelConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(config.read_chunk_size.max(1)),
            config,
            cancel: CancelHandle::default(),
        }
    }

    /// Handle that aborts blocked reads on this channel
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Change the read deadline for subsequent reads
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.config.read_timeout = timeout;
    }

    /// Current channel settings
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Number of received bytes not yet returned to a caller
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the channel and return the inner stream. Buffered bytes are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Pull one chunk from the stream into the buffer
    ///
    /// Returns `Ok(false)` when nothing arrived yet and the caller should poll again.
    fn fill(&mut self, deadline: Option<Instant>) -> Result<bool> {
        if self.cancel.take() {
            #[cfg(feature = "logging")]
            warn!("read cancelled with {} bytes buffered", self.buf.len());
            return Err(LineError::Cancelled);
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            #[cfg(feature = "logging")]
            warn!("read timed out with {} bytes buffered", self.buf.len());
            return Err(LineError::TimedOut);
        }

        // read straight into the tail of the buffer, then drop what was not filled
        let start = self.buf.len();
        self.buf.resize(start + self.config.read_chunk_size.max(1), 0);
        let result = self.inner.read(&mut self.buf[start..]);
        let filled = result.as_ref().map_or(0, |n| *n);
        self.buf.truncate(start + filled);

        match result {
            Ok(0) => Err(LineError::ConnectionClosed),
            Ok(_n) => {
                #[cfg(feature = "logging")]
                trace!("received {} bytes", _n);

                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => Ok(false),
            Err(err) if err.kind() == ErrorKind::TimedOut => Ok(false),
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(POLL_INTERVAL);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.read_timeout.map(|t| Instant::now() + t)
    }
}

impl<T: Read + Write> RawChannel for StreamChannel<T> {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < data.len() {
            match self.inner.write(&data[offset..]) {
                Ok(0) => return Err(LineError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn read_until(&mut self, delimiter: u8) -> Result<Bytes> {
        let deadline = self.deadline();
        let mut scanned = 0usize;

        loop {
            if let Some(pos) = memchr::memchr(delimiter, &self.buf[scanned..]) {
                let line = self.buf.split_to(scanned + pos).freeze();
                self.buf.advance(1);

                #[cfg(feature = "logging")]
                debug!("delimiter {:#04x} found after {} bytes", delimiter, line.len());

                return Ok(line);
            }

            scanned = self.buf.len();
            self.fill(deadline)?;
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let data = self.buf.split();
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    fn read_bytes(&mut self, length: i32) -> Result<Bytes> {
        let wanted = match usize::try_from(length) {
            Ok(n) if n > 0 => n,
            _ => return Ok(self.buf.split().freeze()),
        };

        let deadline = self.deadline();
        while self.buf.len() < wanted {
            match self.fill(deadline) {
                Ok(_) => {}
                // short read at end of stream returns what arrived
                Err(LineError::ConnectionClosed) if !self.buf.is_empty() => break,
                Err(err) => return Err(err),
            }
        }

        let take = wanted.min(self.buf.len());
        Ok(self.buf.split_to(take).freeze())
    }
}

impl<T> std::fmt::Debug for StreamChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamChannel")
            .field("buffered", &self.buf.len())
            .field("config", &self.config)
            .finish()
    }
}

/// In-memory channel whose writes are looped back into its receive buffer
///
/// Reads never block: a request the buffer cannot satisfy fails with
/// `LineError::ConnectionClosed`, as if the far end had hung up.
#[derive(Debug, Clone, Default)]
pub struct Loopback {
    rx: BytesMut,
}

impl Loopback {
    /// Create an empty loopback
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loopback with `data` already received
    pub fn with_input(data: impl AsRef<[u8]>) -> Self {
        Self {
            rx: BytesMut::from(data.as_ref()),
        }
    }

    /// Bytes written or received and not yet read
    pub fn pending(&self) -> &[u8] {
        &self.rx
    }

    /// Take every pending byte, leaving the loopback empty
    pub fn take_pending(&mut self) -> Bytes {
        self.rx.split().freeze()
    }
}

impl RawChannel for Loopback {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.rx.extend_from_slice(data);
        Ok(())
    }

    fn read_until(&mut self, delimiter: u8) -> Result<Bytes> {
        let pos = memchr::memchr(delimiter, &self.rx).ok_or(LineError::ConnectionClosed)?;
        let line = self.rx.split_to(pos).freeze();
        self.rx.advance(1);
        Ok(line)
    }

    fn read_string(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.take_pending()).into_owned())
    }

    fn read_bytes(&mut self, length: i32) -> Result<Bytes> {
        let wanted = match usize::try_from(length) {
            Ok(n) if n > 0 => n,
            _ => return Ok(self.take_pending()),
        };
        if self.rx.is_empty() {
            return Err(LineError::ConnectionClosed);
        }
        let take = wanted.min(self.rx.len());
        Ok(self.rx.split_to(take).freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Duplex test stream: reads from a script, records writes
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Duplex {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Stream that never has data
    struct Silent {
        kind: ErrorKind,
        polls: Arc<Mutex<usize>>,
    }

    impl Read for Silent {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            *self.polls.lock().unwrap() += 1;
            Err(std::io::Error::new(self.kind, "no data"))
        }
    }

    impl Write for Silent {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn read_until_consumes_delimiter() {
        let mut ch = StreamChannel::new(Duplex::new(b"one\ntwo\n"));

        assert_eq!(&ch.read_until(b'\n').unwrap()[..], b"one");
        assert_eq!(&ch.read_until(b'\n').unwrap()[..], b"two");
        assert_eq!(ch.read_until(b'\n'), Err(LineError::ConnectionClosed));
    }

    #[test]
    fn read_until_spans_small_chunks() {
        let config = ChannelConfig {
            read_chunk_size: 3,
            ..ChannelConfig::default()
        };
        let mut ch = StreamChannel::with_config(Duplex::new(b"abcdefgh#rest"), config);

        assert_eq!(&ch.read_until(b'#').unwrap()[..], b"abcdefgh");
        assert_eq!(ch.buffered(), 0);
        assert_eq!(ch.read_string().unwrap(), "");
        assert_eq!(&ch.read_bytes(4).unwrap()[..], b"rest");
    }

    #[test]
    fn read_bytes_zero_returns_buffered_only() {
        let mut ch = StreamChannel::new(Duplex::new(b"a,b,c"));
        assert_eq!(&ch.read_until(b',').unwrap()[..], b"a");
        assert_eq!(&ch.read_bytes(0).unwrap()[..], b"b,c");
        assert_eq!(&ch.read_bytes(-1).unwrap()[..], b"");
    }

    #[test]
    fn read_bytes_short_at_end_of_stream() {
        let mut ch = StreamChannel::new(Duplex::new(b"xyz"));
        assert_eq!(&ch.read_bytes(10).unwrap()[..], b"xyz");
        assert_eq!(ch.read_bytes(1), Err(LineError::ConnectionClosed));
    }

    #[test]
    fn write_bytes_reaches_stream() {
        let mut ch = StreamChannel::new(Duplex::new(b""));
        ch.write_bytes(b"hello\r\n").unwrap();
        assert_eq!(ch.get_ref().output, b"hello\r\n");
    }

    #[test]
    fn read_times_out_on_silent_stream() {
        let polls = Arc::new(Mutex::new(0));
        let silent = Silent {
            kind: ErrorKind::TimedOut,
            polls: polls.clone(),
        };
        let config = ChannelConfig {
            read_timeout: Some(Duration::from_millis(20)),
            ..ChannelConfig::default()
        };
        let mut ch = StreamChannel::with_config(silent, config);

        assert_eq!(ch.read_until(b'\n'), Err(LineError::TimedOut));
        assert!(*polls.lock().unwrap() >= 1);
    }

    #[test]
    fn cancel_aborts_blocked_read() {
        let silent = Silent {
            kind: ErrorKind::WouldBlock,
            polls: Arc::new(Mutex::new(0)),
        };
        let mut ch = StreamChannel::new(silent);
        let handle = ch.cancel_handle();

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            handle.cancel();
        });

        assert_eq!(ch.read_until(b'\n'), Err(LineError::Cancelled));
        canceller.join().unwrap();
        assert!(!ch.cancel_handle().is_cancelled());
    }

    #[test]
    fn loopback_echoes_writes() {
        let mut lb = Loopback::new();
        lb.write_bytes(b"ping\n").unwrap();
        assert_eq!(lb.pending(), b"ping\n");
        assert_eq!(&lb.read_until(b'\n').unwrap()[..], b"ping");
        assert!(lb.pending().is_empty());
    }

    #[test]
    fn loopback_without_delimiter_reports_closed() {
        let mut lb = Loopback::with_input("partial");
        assert_eq!(lb.read_until(b'\n'), Err(LineError::ConnectionClosed));
        // nothing consumed
        assert_eq!(lb.read_string().unwrap(), "partial");
        assert_eq!(lb.read_bytes(4), Err(LineError::ConnectionClosed));
    }

    #[test]
    fn mut_ref_is_a_channel() {
        fn send<C: RawChannel>(mut ch: C) {
            ch.write_bytes(b"x").unwrap();
        }

        let mut lb = Loopback::new();
        send(&mut lb);
        send(&mut lb);
        assert_eq!(lb.pending(), b"xx");
    }

    /// Stream that refuses every other write and flush with `WouldBlock`
    struct Backpressure {
        output: Vec<u8>,
        blocked: usize,
        toggle: bool,
    }

    impl Backpressure {
        fn refuse(&mut self) -> bool {
            self.toggle = !self.toggle;
            if self.toggle {
                self.blocked += 1;
            }
            self.toggle
        }
    }

    impl Read for Backpressure {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for Backpressure {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.refuse() {
                return Err(ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(2);
            self.output.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if self.refuse() {
                return Err(ErrorKind::WouldBlock.into());
            }
            Ok(())
        }
    }

    #[test]
    fn write_waits_out_backpressure() {
        let mut ch = StreamChannel::new(Backpressure {
            output: Vec::new(),
            blocked: 0,
            toggle: false,
        });

        let start = Instant::now();
        ch.write_bytes(b"hello").unwrap();

        let stream = ch.get_ref();
        assert_eq!(stream.output, b"hello");
        // three refused writes and one refused flush, each followed by a pause
        assert_eq!(stream.blocked, 4);
        assert!(start.elapsed() >= POLL_INTERVAL * 4);
    }

    /// Stream that hands out one byte per read, with a `WouldBlock` between bytes
    struct Trickle {
        input: Vec<u8>,
        pos: usize,
        stall: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.stall = !self.stall;
            if self.stall {
                return Err(ErrorKind::WouldBlock.into());
            }
            match self.input.get(self.pos) {
                Some(&b) => {
                    buf[0] = b;
                    self.pos += 1;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn stalled_reads_leave_buffer_intact() {
        let mut ch = StreamChannel::new(Trickle {
            input: b"ab\ncd".to_vec(),
            pos: 0,
            stall: false,
        });

        assert_eq!(&ch.read_until(b'\n').unwrap()[..], b"ab");
        assert_eq!(ch.buffered(), 0);
        assert_eq!(&ch.read_bytes(2).unwrap()[..], b"cd");
        assert_eq!(ch.read_until(b'\n'), Err(LineError::ConnectionClosed));
    }
}
