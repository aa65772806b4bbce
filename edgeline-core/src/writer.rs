//! Line writer

use crate::channel::RawChannel;
use crate::config::SharedConfig;
use crate::encoder::{encode_line_into, format_number, format_value, join_numbers};
use crate::Result;
use bytes::BytesMut;

#[cfg(feature = "logging")]
use tracing::trace;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes padded, terminated lines and raw values to a channel
pub struct LineWriter<C> {
    channel: C,
    config: SharedConfig,
    buf: BytesMut,
}

impl<C: RawChannel> LineWriter<C> {
    /// Create a writer with its own default configuration
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, SharedConfig::default())
    }

    /// Create a writer reading its settings from `config`
    pub fn with_config(channel: C, config: impl Into<SharedConfig>) -> Self {
        Self {
            channel,
            config: config.into(),
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write `text`, alignment padding and the terminator as one line
    ///
    /// The whole line goes to the channel in a single write.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.buf.clear();
        let buf = &mut self.buf;
        let _pad = self.config.read(|c| encode_line_into(text, c, buf));

        #[cfg(feature = "logging")]
        trace!(
            "writing line of {} bytes ({} padding)",
            self.buf.len(),
            _pad
        );

        self.channel.write_bytes(&self.buf)
    }

    /// Write `text` verbatim, with no padding or terminator
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.channel.write_bytes(text.as_bytes())
    }

    /// Write raw bytes verbatim
    pub fn write_buffer(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.channel.write_bytes(data)
    }

    /// Write the decimal form of `value`, with no padding or terminator
    pub fn write_number(&mut self, value: impl Into<f64>) -> Result<()> {
        self.write_string(&format_number(value.into()))
    }

    /// Write `values` comma-separated, then terminate them with `write_line("")`
    ///
    /// `None` writes nothing. An empty slice still produces one terminated line. The
    /// padding is that of an empty line: the numbers do not count toward alignment.
    pub fn write_numbers(&mut self, values: Option<&[f64]>) -> Result<()> {
        let Some(values) = values else {
            return Ok(());
        };

        self.write_string(&join_numbers(values))?;
        self.write_line("")
    }

    /// Write a `name:value` line, or a bare `value` line when `name` is empty
    pub fn write_value(&mut self, name: &str, value: impl Into<f64>) -> Result<()> {
        self.write_line(&format_value(name, value.into()))
    }

    /// See [`crate::config::LineConfig::set_write_line_padding`]
    pub fn set_write_line_padding(&self, length: impl Into<f64>) {
        self.config.set_write_line_padding(length);
    }

    /// Shared configuration handle
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.channel
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consume the writer and return the inner channel.
    pub fn into_inner(self) -> C {
        self.channel
    }
}

impl<C> std::fmt::Debug for LineWriter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineWriter")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Loopback;
    use crate::config::LineConfig;

    fn writer(padding: u8) -> LineWriter<Loopback> {
        LineWriter::with_config(
            Loopback::new(),
            LineConfig::default().with_write_line_padding(padding),
        )
    }

    fn written(w: &mut LineWriter<Loopback>) -> Vec<u8> {
        w.get_mut().take_pending().to_vec()
    }

    #[test]
    fn write_line_pads_to_boundary() {
        let mut w = writer(32);
        w.write_line("hello").unwrap();

        let out = written(&mut w);
        assert_eq!(out.len(), 32);
        assert!(out.starts_with(b"hello "));
        assert!(out.ends_with(b" \r\n"));
    }

    #[test]
    fn write_line_unpadded() {
        let mut w = writer(0);
        w.write_line("hello").unwrap();
        assert_eq!(written(&mut w), b"hello\r\n");
    }

    #[test]
    fn write_line_empty_text() {
        let mut w = writer(16);
        w.write_line("").unwrap();

        let mut expected = vec![b' '; 14];
        expected.extend_from_slice(b"\r\n");
        assert_eq!(written(&mut w), expected);
    }

    #[test]
    fn write_number_has_no_framing() {
        let mut w = writer(32);
        w.write_number(42).unwrap();
        w.write_number(2.5).unwrap();
        assert_eq!(written(&mut w), b"422.5");
    }

    #[test]
    fn write_numbers_then_empty_line_framing() {
        let mut w = writer(32);
        w.write_numbers(Some(&[1.0, 2.0, 3.0])).unwrap();

        let mut expected = b"1,2,3".to_vec();
        expected.extend_from_slice(&[b' '; 30]);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(written(&mut w), expected);
    }

    #[test]
    fn write_numbers_empty_and_absent() {
        let mut w = writer(8);
        w.write_numbers(None).unwrap();
        assert!(written(&mut w).is_empty());

        w.write_numbers(Some(&[])).unwrap();
        assert_eq!(written(&mut w), b"      \r\n");
    }

    #[test]
    fn write_value_named_and_unnamed() {
        let mut w = writer(0);
        w.write_value("x", 42).unwrap();
        w.write_value("", 42).unwrap();
        assert_eq!(written(&mut w), b"x:42\r\n42\r\n");
    }

    #[test]
    fn padding_change_applies_to_next_line() {
        let mut w = writer(0);
        w.write_line("a").unwrap();
        w.set_write_line_padding(999);
        w.write_line("a").unwrap();

        let out = written(&mut w);
        assert_eq!(&out[..3], b"a\r\n");
        assert_eq!(out.len() - 3, 128);
    }

    #[test]
    fn write_string_and_buffer_are_verbatim() {
        let mut w = writer(32);
        w.write_string("raw").unwrap();
        w.write_string("").unwrap();
        w.write_buffer(&[0x00, 0xff]).unwrap();
        assert_eq!(written(&mut w), b"raw\x00\xff");
    }
}
