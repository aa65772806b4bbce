use crate::link::open_input;
use crate::settings::SerialArgs;
use anyhow::{Context, Result};
use colored::*;
use edgeline_core::{Delimiter, LineConfig, LineError, LineReader, RawChannel};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// What `read` does with recovered lines
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Stop after this many lines
    pub count: Option<usize>,
    /// Write recovered lines to this JSON file
    pub json: Option<String>,
    /// Print lines as hex instead of text
    pub hex: bool,
    /// Suppress per-line output
    pub quiet: bool,
}

/// A line recovered from the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveredLine {
    /// Zero-based position in the stream
    pub index: usize,
    /// Length in bytes, delimiter excluded
    pub len: usize,
    /// Line text as received, padding included; a CRLF terminator's `\r` is dropped
    pub text: String,
    /// Raw bytes as hex, exactly as received
    pub hex: String,
}

/// Totals reported by `read`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadSummary {
    /// Recovered lines in stream order
    pub lines: Vec<RecoveredLine>,
    /// Bytes consumed, delimiters included
    pub bytes: usize,
    /// Bytes left after the last delimiter
    pub trailing: usize,
    /// Whether reading ended on a read deadline
    pub timed_out: bool,
}

/// Read lines from a capture file, stdin or serial port and print a summary
pub fn execute(
    input: Option<&str>,
    serial: &SerialArgs,
    config: LineConfig,
    options: &ReadOptions,
) -> Result<ReadSummary> {
    let channel = open_input(input, serial)?;
    let summary = read_from(channel, config, options)?;

    println!("\n=== Read Results ===");
    println!("Lines recovered:   {}", summary.lines.len().to_string().green());
    println!("Bytes consumed:    {} bytes", summary.bytes);
    if summary.trailing > 0 {
        println!(
            "Unterminated tail: {} bytes",
            summary.trailing.to_string().yellow()
        );
    }
    if summary.timed_out {
        println!("{} Stopped on read timeout", "✗".red());
    }

    if let Some(path) = &options.json {
        let json = serde_json::to_string_pretty(&summary.lines)
            .with_context(|| "Failed to serialize recovered lines")?;
        fs::write(path, json).with_context(|| format!("Failed to write output file: {}", path))?;
        info!("Recovered lines written to: {}", path);
    }

    Ok(summary)
}

/// Split the channel's stream into lines until it closes, times out, or `count` is reached
pub fn read_from<C: RawChannel>(
    channel: C,
    config: LineConfig,
    options: &ReadOptions,
) -> Result<ReadSummary> {
    let strip_cr = config.delimiter == Delimiter::NewLine;
    let mut reader = LineReader::with_config(channel, config);
    let mut summary = ReadSummary::default();

    while options.count.map_or(true, |n| summary.lines.len() < n) {
        let raw = match reader.read_line_bytes() {
            Ok(raw) => raw,
            Err(LineError::ConnectionClosed) => break,
            Err(LineError::TimedOut) => {
                warn!("Read timed out after {} lines", summary.lines.len());
                summary.timed_out = true;
                break;
            }
            Err(e) => return Err(e).context("Failed to read line"),
        };

        let received = String::from_utf8_lossy(&raw);
        let text = match received.strip_suffix('\r') {
            Some(stripped) if strip_cr => stripped,
            _ => &received[..],
        };
        let line = RecoveredLine {
            index: summary.lines.len(),
            len: raw.len(),
            text: text.to_string(),
            hex: hex::encode(&raw),
        };

        if !options.quiet {
            if options.hex {
                println!("{}", line.hex);
            } else {
                println!("{}", line.text);
            }
        }

        summary.bytes += raw.len() + 1;
        summary.lines.push(line);
    }

    summary.trailing = reader
        .read_buffer(0)
        .map(|rest| rest.len())
        .unwrap_or_default();

    Ok(summary)
}
