//! Duplex port: one channel, one configuration, both directions

use crate::channel::RawChannel;
use crate::config::{LineConfig, SharedConfig};
use crate::delimiter::Delimiter;
use crate::reader::LineReader;
use crate::writer::LineWriter;
use crate::Result;
use bytes::Bytes;

/// A serial link used for both writing and reading lines
///
/// Writers and readers lent by the port borrow its channel and share its configuration,
/// so settings changed through the port apply to both directions.
pub struct LinePort<C> {
    channel: C,
    config: SharedConfig,
}

impl<C: RawChannel> LinePort<C> {
    /// Create a port with default settings
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, LineConfig::default())
    }

    /// Create a port with explicit settings
    pub fn with_config(channel: C, config: impl Into<SharedConfig>) -> Self {
        Self {
            channel,
            config: config.into(),
        }
    }

    /// Writer borrowing this port's channel
    pub fn writer(&mut self) -> LineWriter<&mut C> {
        LineWriter::with_config(&mut self.channel, self.config.clone())
    }

    /// Reader borrowing this port's channel
    pub fn reader(&mut self) -> LineReader<&mut C> {
        LineReader::with_config(&mut self.channel, self.config.clone())
    }

    /// See [`LineWriter::write_line`]
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.writer().write_line(text)
    }

    /// See [`LineWriter::write_string`]
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.writer().write_string(text)
    }

    /// See [`LineWriter::write_buffer`]
    pub fn write_buffer(&mut self, data: &[u8]) -> Result<()> {
        self.writer().write_buffer(data)
    }

    /// See [`LineWriter::write_number`]
    pub fn write_number(&mut self, value: impl Into<f64>) -> Result<()> {
        self.writer().write_number(value)
    }

    /// See [`LineWriter::write_numbers`]
    pub fn write_numbers(&mut self, values: Option<&[f64]>) -> Result<()> {
        self.writer().write_numbers(values)
    }

    /// See [`LineWriter::write_value`]
    pub fn write_value(&mut self, name: &str, value: impl Into<f64>) -> Result<()> {
        self.writer().write_value(name, value)
    }

    /// See [`LineReader::read_line`]
    pub fn read_line(&mut self) -> Result<String> {
        self.reader().read_line()
    }

    /// See [`LineReader::read_until`]
    pub fn read_until(&mut self, delimiter: Delimiter) -> Result<String> {
        self.reader().read_until(delimiter)
    }

    /// See [`LineReader::read_string`]
    pub fn read_string(&mut self) -> Result<String> {
        self.reader().read_string()
    }

    /// See [`LineReader::read_buffer`]
    pub fn read_buffer(&mut self, length: i32) -> Result<Bytes> {
        self.reader().read_buffer(length)
    }

    /// See [`LineConfig::set_write_line_padding`]
    pub fn set_write_line_padding(&self, length: impl Into<f64>) {
        self.config.set_write_line_padding(length);
    }

    /// See [`LineConfig::set_new_line`]
    pub fn set_new_line(&self, new_line: impl Into<String>) {
        self.config.set_new_line(new_line);
    }

    /// See [`LineConfig::set_delimiter`]
    pub fn set_delimiter(&self, delimiter: Delimiter) {
        self.config.set_delimiter(delimiter);
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

    /// Consume the port and return the inner channel.
    pub fn into_inner(self) -> C {
        self.channel
    }
}

impl<C> std::fmt::Debug for LinePort<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinePort")
            .field("config", &self.config)
            .finish()
    }
}
