//! Line configuration shared by writers and readers

use crate::constants::{DEFAULT_NEW_LINE, DEFAULT_WRITE_LINE_PADDING, MAX_WRITE_LINE_PADDING};
use crate::delimiter::Delimiter;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "logging")]
use tracing::debug;

/// Framing settings read by every write and read call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Alignment boundary for written lines in bytes; 0 disables padding
    #[serde(deserialize_with = "deserialize_padding")]
    pub write_line_padding: u8,

    /// Terminator appended to every written line
    pub new_line: String,

    /// Delimiter used by `read_line`
    pub delimiter: Delimiter,
}

impl LineConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style padding setter, same clamping as `set_write_line_padding`
    pub fn with_write_line_padding(mut self, length: impl Into<f64>) -> Self {
        self.set_write_line_padding(length);
        self
    }

    /// Builder-style terminator setter
    pub fn with_new_line(mut self, new_line: impl Into<String>) -> Self {
        self.new_line = new_line.into();
        self
    }

    /// Builder-style delimiter setter
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the padding length, coerced into `0..=128`
    ///
    /// Fractions are truncated toward zero, NaN becomes 0, and out-of-range values are
    /// clamped rather than rejected.
    pub fn set_write_line_padding(&mut self, length: impl Into<f64>) {
        self.write_line_padding = clamp_padding(length.into());

        #[cfg(feature = "logging")]
        debug!("write line padding set to {}", self.write_line_padding);
    }

    /// Set the line terminator
    pub fn set_new_line(&mut self, new_line: impl Into<String>) {
        self.new_line = new_line.into();

        #[cfg(feature = "logging")]
        debug!("new line terminator set to {:?}", self.new_line);
    }

    /// Set the default read delimiter
    pub fn set_delimiter(&mut self, delimiter: Delimiter) {
        self.delimiter = delimiter;

        #[cfg(feature = "logging")]
        debug!("read delimiter set to {}", delimiter);
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            write_line_padding: DEFAULT_WRITE_LINE_PADDING,
            new_line: DEFAULT_NEW_LINE.to_string(),
            delimiter: Delimiter::NewLine,
        }
    }
}

fn clamp_padding(length: f64) -> u8 {
    if length.is_nan() {
        return 0;
    }
    length
        .trunc()
        .clamp(0.0, f64::from(MAX_WRITE_LINE_PADDING)) as u8
}

fn deserialize_padding<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_padding)
}

/// Cloneable handle to one `LineConfig` shared between a writer and a reader
///
/// Updates through any clone are seen by every other clone on its next call.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<LineConfig>>,
}

impl SharedConfig {
    /// Wrap a configuration for sharing
    pub fn new(config: LineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> LineConfig {
        self.read(Clone::clone)
    }

    /// Run `f` against the current settings without copying them
    pub fn read<R>(&self, f: impl FnOnce(&LineConfig) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Mutate the settings in place
    pub fn update<R>(&self, f: impl FnOnce(&mut LineConfig) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// See [`LineConfig::set_write_line_padding`]
    pub fn set_write_line_padding(&self, length: impl Into<f64>) {
        let length = length.into();
        self.update(|c| c.set_write_line_padding(length));
    }

    /// See [`LineConfig::set_new_line`]
    pub fn set_new_line(&self, new_line: impl Into<String>) {
        let new_line = new_line.into();
        self.update(|c| c.set_new_line(new_line));
    }

    /// See [`LineConfig::set_delimiter`]
    pub fn set_delimiter(&self, delimiter: Delimiter) {
        self.update(|c| c.set_delimiter(delimiter));
    }

    /// Current padding length
    pub fn write_line_padding(&self) -> u8 {
        self.read(|c| c.write_line_padding)
    }

    /// Current default read delimiter
    pub fn delimiter(&self) -> Delimiter {
        self.read(|c| c.delimiter)
    }
}

impl From<LineConfig> for SharedConfig {
    fn from(config: LineConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LineConfig::default();
        assert_eq!(config.write_line_padding, 32);
        assert_eq!(config.new_line, "\r\n");
        assert_eq!(config.delimiter, Delimiter::NewLine);
    }

    #[test]
    fn test_padding_is_clamped() {
        let mut config = LineConfig::new();

        config.set_write_line_padding(-5);
        assert_eq!(config.write_line_padding, 0);

        config.set_write_line_padding(999);
        assert_eq!(config.write_line_padding, 128);

        config.set_write_line_padding(128);
        assert_eq!(config.write_line_padding, 128);

        config.set_write_line_padding(0);
        assert_eq!(config.write_line_padding, 0);
    }

    #[test]
    fn test_padding_truncates_fractions() {
        let mut config = LineConfig::new();

        config.set_write_line_padding(12.9);
        assert_eq!(config.write_line_padding, 12);

        config.set_write_line_padding(-0.5);
        assert_eq!(config.write_line_padding, 0);

        config.set_write_line_padding(f64::NAN);
        assert_eq!(config.write_line_padding, 0);

        config.set_write_line_padding(f64::INFINITY);
        assert_eq!(config.write_line_padding, 128);
    }

    #[test]
    fn test_shared_updates_are_visible_to_clones() {
        let shared = SharedConfig::default();
        let other = shared.clone();

        other.set_write_line_padding(16);
        other.set_new_line("\n");
        other.set_delimiter(Delimiter::Hash);

        let snap = shared.snapshot();
        assert_eq!(snap.write_line_padding, 16);
        assert_eq!(snap.new_line, "\n");
        assert_eq!(shared.delimiter(), Delimiter::Hash);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: LineConfig = serde_json::from_str(r#"{"write_line_padding": 0}"#).unwrap();
        assert_eq!(config.write_line_padding, 0);
        assert_eq!(config.new_line, "\r\n");

        let config: LineConfig = serde_json::from_str(r#"{"write_line_padding": 4096}"#).unwrap();
        assert_eq!(config.write_line_padding, 128);

        let config: LineConfig = serde_json::from_str(r#"{"delimiter": "hash"}"#).unwrap();
        assert_eq!(config.delimiter, Delimiter::Hash);
    }
}
