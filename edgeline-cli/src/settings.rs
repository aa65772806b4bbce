//! Command-line settings shared by every subcommand

use clap::Args;
use edgeline_core::constants::BaudRate;
use edgeline_core::{Delimiter, LineConfig};
use std::time::Duration;

/// Line framing flags
#[derive(Debug, Clone, Args)]
pub struct LineArgs {
    /// Alignment boundary for written lines in bytes, clamped to 0..=128 (0 disables padding)
    #[arg(
        long,
        global = true,
        env = "EDGELINE_PADDING",
        default_value_t = 32.0,
        allow_negative_numbers = true
    )]
    pub padding: f64,

    /// Line terminator; escapes \r \n \t \0 and \\ are decoded
    #[arg(long, global = true, env = "EDGELINE_NEW_LINE", default_value = "\\r\\n")]
    pub new_line: String,

    /// Delimiter that ends a line when reading (newline, comma, hash, ...)
    #[arg(long, global = true, env = "EDGELINE_DELIMITER", default_value = "newline")]
    pub delimiter: Delimiter,
}

impl LineArgs {
    /// Effective line configuration
    pub fn to_config(&self) -> LineConfig {
        LineConfig::default()
            .with_write_line_padding(self.padding)
            .with_new_line(unescape(&self.new_line))
            .with_delimiter(self.delimiter)
    }
}

impl Default for LineArgs {
    fn default() -> Self {
        Self {
            padding: 32.0,
            new_line: "\\r\\n".to_string(),
            delimiter: Delimiter::NewLine,
        }
    }
}

/// Serial device flags
#[derive(Debug, Clone, Args)]
pub struct SerialArgs {
    /// Serial device to use instead of files or stdio (e.g. /dev/ttyACM0, COM3)
    #[arg(long, global = true, env = "EDGELINE_PORT")]
    pub port: Option<String>,

    /// Baud rate of the serial device
    #[arg(long, global = true, env = "EDGELINE_BAUD", default_value = "9600", value_parser = parse_baud)]
    pub baud: BaudRate,

    /// Give up on a read after this many milliseconds (default: wait forever)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

impl SerialArgs {
    /// Read deadline, if any
    pub fn read_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SerialArgs {
    fn default() -> Self {
        Self {
            port: None,
            baud: BaudRate::default(),
            timeout_ms: None,
        }
    }
}

fn parse_baud(s: &str) -> Result<BaudRate, String> {
    let rate: u32 = s.trim().parse().map_err(|e| format!("{}: {}", s, e))?;
    BaudRate::try_from(rate).map_err(|e| e.to_string())
}

/// Decode `\r`, `\n`, `\t`, `\0` and `\\`; other backslashes are kept as-is
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
