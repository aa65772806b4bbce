//! Line reader

use crate::channel::RawChannel;
use crate::config::SharedConfig;
use crate::delimiter::{resolve_delimiter, Delimiter};
use crate::error::LineError;
use crate::Result;
use bytes::Bytes;

#[cfg(feature = "logging")]
use tracing::debug;

/// Reads delimiter-terminated lines from a channel
///
/// Line recovery is delegated entirely to the channel's `read_until`; channel errors are
/// returned unchanged.
pub struct LineReader<C> {
    channel: C,
    config: SharedConfig,
}

impl<C: RawChannel> LineReader<C> {
    /// Create a reader with its own default configuration
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, SharedConfig::default())
    }

    /// Create a reader reading its settings from `config`
    pub fn with_config(channel: C, config: impl Into<SharedConfig>) -> Self {
        Self {
            channel,
            config: config.into(),
        }
    }

    /// Read one line terminated by the configured delimiter (blocking)
    ///
    /// The delimiter is consumed and not returned. Invalid UTF-8 is replaced.
    pub fn read_line(&mut self) -> Result<String> {
        let line = self.read_line_bytes()?;
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Read one line as raw bytes (blocking)
    pub fn read_line_bytes(&mut self) -> Result<Bytes> {
        let delimiter = self.config.delimiter();
        self.read_until_bytes(delimiter)
    }

    /// Read up to an explicit delimiter instead of the configured one (blocking)
    pub fn read_until(&mut self, delimiter: Delimiter) -> Result<String> {
        let data = self.read_until_bytes(delimiter)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Buffered data as text, without blocking
    pub fn read_string(&mut self) -> Result<String> {
        self.channel.read_string()
    }

    /// Read `length` bytes (blocking), or everything buffered when `length <= 0`
    pub fn read_buffer(&mut self, length: i32) -> Result<Bytes> {
        self.channel.read_bytes(length)
    }

    /// Iterate over lines until the channel closes
    ///
    /// `ConnectionClosed` ends the iteration; any other error is yielded once and then
    /// ends it.
    pub fn lines(&mut self) -> Lines<'_, C> {
        Lines {
            reader: self,
            done: false,
        }
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

    /// Consume the reader and return the inner channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    fn read_until_bytes(&mut self, delimiter: Delimiter) -> Result<Bytes> {
        let wire = resolve_delimiter(delimiter);

        #[cfg(feature = "logging")]
        debug!("reading until {:?}", wire);

        // every selector resolves to a single byte
        self.channel.read_until(wire as u8)
    }
}

/// Iterator returned by [`LineReader::lines`]
pub struct Lines<'a, C> {
    reader: &'a mut LineReader<C>,
    done: bool,
}

impl<C: RawChannel> Iterator for Lines<'_, C> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_line() {
            Ok(line) => Some(Ok(line)),
            Err(LineError::ConnectionClosed) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<C> std::fmt::Debug for LineReader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader")
            .field("config", &self.config)
            .finish()
    }
}
