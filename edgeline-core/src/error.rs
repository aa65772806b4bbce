//! Error types for Edgeline operations

use std::io::ErrorKind;

/// Errors that can occur while framing or reading lines
///
/// Caller input is never rejected by the writer; these variants come from the raw
/// channel or from explicit conversions such as `Delimiter::try_from`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LineError {
    /// IO error reported by the underlying stream
    #[error("IO error: {0}")]
    Io(String),

    /// The channel reached end of stream before the request completed
    #[error("Connection closed")]
    ConnectionClosed,

    /// A blocking read exceeded the channel's read deadline
    #[error("Read timed out")]
    TimedOut,

    /// A blocking read was aborted through its cancel handle
    #[error("Read cancelled")]
    Cancelled,

    /// Byte value that does not name a delimiter selector
    #[error("Unknown delimiter code: {0}")]
    UnknownDelimiter(u8),

    /// Text that does not name a delimiter selector
    #[error("Unknown delimiter name: {0:?}")]
    UnknownDelimiterName(String),

    /// Baud rate outside the supported set
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),
}

impl From<std::io::Error> for LineError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::UnexpectedEof => LineError::ConnectionClosed,
            ErrorKind::TimedOut => LineError::TimedOut,
            _ => LineError::Io(err.to_string()),
        }
    }
}
