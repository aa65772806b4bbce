//! # Edgeline Core
//!
//! Line-oriented framing over a raw serial byte stream.
//!
//! Outgoing values become self-terminating lines, optionally padded with spaces so that
//! every line ends on a multiple of the configured padding length. Incoming bytes are
//! split back into lines at a single-byte delimiter.
//!
//! ## Modules
//!
//! - `constants`: Defaults, limits and supported baud rates
//! - `delimiter`: Delimiter selectors and their wire characters
//! - `config`: Line configuration shared by writers and readers
//! - `encoder`: Pure line framing (padding, number formatting)
//! - `channel`: Raw channel contract and stream-backed implementations
//! - `writer`: Line writer
//! - `reader`: Line reader
//! - `port`: Duplex port combining writer and reader over one channel

#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod constants;
pub mod delimiter;
pub mod encoder;
pub mod error;
pub mod port;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use channel::{CancelHandle, ChannelConfig, Loopback, RawChannel, StreamChannel};
pub use config::{LineConfig, SharedConfig};
pub use delimiter::{resolve_delimiter, Delimiter};
pub use error::LineError;
pub use port::LinePort;
pub use reader::LineReader;
pub use writer::LineWriter;

/// Result type alias for Edgeline operations
pub type Result<T> = core::result::Result<T, LineError>;
