use crate::link::open_output;
use crate::settings::SerialArgs;
use anyhow::{Context, Result};
use edgeline_core::{LineConfig, LineWriter, RawChannel};
use tracing::info;

/// One item written by the send commands
#[derive(Debug, Clone, PartialEq)]
pub enum SendItem {
    /// A padded, terminated line of text
    Line(String),
    /// A bare number with no framing
    Number(f64),
    /// Comma-separated numbers followed by an empty line
    Numbers(Vec<f64>),
    /// A `name:value` line
    Value {
        /// Stream name; empty for an unnamed value
        name: String,
        /// Value written after the name
        value: f64,
    },
}

/// Write `item` to stdout, a file or a serial port
pub fn execute(
    output: Option<&str>,
    serial: &SerialArgs,
    config: LineConfig,
    item: &SendItem,
) -> Result<()> {
    let channel = open_output(output, serial)?;
    send_to(channel, config, item)
}

/// Write `item` to an already open channel
pub fn send_to<C: RawChannel>(channel: C, config: LineConfig, item: &SendItem) -> Result<()> {
    let mut writer = LineWriter::with_config(channel, config);

    match item {
        SendItem::Line(text) => writer.write_line(text),
        SendItem::Number(value) => writer.write_number(*value),
        SendItem::Numbers(values) => writer.write_numbers(Some(values.as_slice())),
        SendItem::Value { name, value } => writer.write_value(name, *value),
    }
    .with_context(|| format!("Failed to send {:?}", item))?;

    info!("Sent {:?}", item);
    Ok(())
}
