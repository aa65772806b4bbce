//! Delimiter selectors and their single-byte wire representation

use crate::error::LineError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Logical line/record separator used when reading
///
/// Each selector's discriminant is the byte that marks the end of a record on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Delimiter {
    /// Line feed, `\n`
    #[default]
    NewLine = 10,
    /// `,`
    Comma = 44,
    /// `$`
    Dollar = 36,
    /// `:`
    Colon = 58,
    /// `.`
    Fullstop = 46,
    /// `#`
    Hash = 35,
    /// Carriage return, `\r`
    CarriageReturn = 13,
    /// ` `
    Space = 32,
    /// `\t`
    Tab = 9,
    /// `|`
    Pipe = 124,
    /// `;`
    SemiColon = 59,
}

impl Delimiter {
    /// Every selector
    pub const ALL: [Delimiter; 11] = [
        Delimiter::NewLine,
        Delimiter::Comma,
        Delimiter::Dollar,
        Delimiter::Colon,
        Delimiter::Fullstop,
        Delimiter::Hash,
        Delimiter::CarriageReturn,
        Delimiter::Space,
        Delimiter::Tab,
        Delimiter::Pipe,
        Delimiter::SemiColon,
    ];

    /// The byte this selector stands for
    pub const fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Lowercase name, as accepted by `FromStr`
    pub const fn name(&self) -> &'static str {
        match self {
            Delimiter::NewLine => "newline",
            Delimiter::Comma => "comma",
            Delimiter::Dollar => "dollar",
            Delimiter::Colon => "colon",
            Delimiter::Fullstop => "fullstop",
            Delimiter::Hash => "hash",
            Delimiter::CarriageReturn => "carriagereturn",
            Delimiter::Space => "space",
            Delimiter::Tab => "tab",
            Delimiter::Pipe => "pipe",
            Delimiter::SemiColon => "semicolon",
        }
    }
}

/// Return the single character a selector stands for
///
/// The raw channel's read-until primitive matches exactly one byte, so every selector maps
/// to exactly one character in the 0..=255 range.
pub fn resolve_delimiter(delimiter: Delimiter) -> char {
    char::from(delimiter.as_byte())
}

impl TryFrom<u8> for Delimiter {
    type Error = LineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Delimiter::ALL
            .into_iter()
            .find(|d| d.as_byte() == code)
            .ok_or(LineError::UnknownDelimiter(code))
    }
}

impl FromStr for Delimiter {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Delimiter::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| LineError::UnknownDelimiterName(s.to_string()))
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
