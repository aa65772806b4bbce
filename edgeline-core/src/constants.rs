//! Constants and limits for Edgeline line framing

use crate::error::LineError;
use serde::{Deserialize, Serialize};

/// Default alignment boundary for written lines, in bytes
pub const DEFAULT_WRITE_LINE_PADDING: u8 = 32;

/// Largest accepted alignment boundary; larger requests are clamped to this
pub const MAX_WRITE_LINE_PADDING: u8 = 128;

/// Default line terminator emitted after every written line
pub const DEFAULT_NEW_LINE: &str = "\r\n";

/// Baud rate used when none is configured
pub const DEFAULT_BAUD_RATE: BaudRate = BaudRate::BaudRate9600;

/// Serial baud rates supported by the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum BaudRate {
    /// 115200 baud
    BaudRate115200 = 115_200,
    /// 57600 baud
    BaudRate57600 = 57_600,
    /// 38400 baud
    BaudRate38400 = 38_400,
    /// 31250 baud (MIDI)
    BaudRate31250 = 31_250,
    /// 28800 baud
    BaudRate28800 = 28_800,
    /// 19200 baud
    BaudRate19200 = 19_200,
    /// 14400 baud
    BaudRate14400 = 14_400,
    /// 9600 baud
    BaudRate9600 = 9_600,
    /// 4800 baud
    BaudRate4800 = 4_800,
    /// 2400 baud
    BaudRate2400 = 2_400,
    /// 1200 baud
    BaudRate1200 = 1_200,
}

impl BaudRate {
    /// Every supported rate, fastest first
    pub const ALL: [BaudRate; 11] = [
        BaudRate::BaudRate115200,
        BaudRate::BaudRate57600,
        BaudRate::BaudRate38400,
        BaudRate::BaudRate31250,
        BaudRate::BaudRate28800,
        BaudRate::BaudRate19200,
        BaudRate::BaudRate14400,
        BaudRate::BaudRate9600,
        BaudRate::BaudRate4800,
        BaudRate::BaudRate2400,
        BaudRate::BaudRate1200,
    ];

    /// Bits per second
    pub const fn bits_per_second(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = LineError;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|b| b.bits_per_second() == rate)
            .ok_or(LineError::UnsupportedBaudRate(rate))
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        DEFAULT_BAUD_RATE
    }
}
