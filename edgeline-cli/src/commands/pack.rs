use crate::link::open_output;
use crate::settings::SerialArgs;
use anyhow::{Context, Result};
use edgeline_core::{LineConfig, LineWriter, RawChannel};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use tracing::info;

/// Totals reported by `pack`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackSummary {
    /// Lines written
    pub lines: usize,
    /// Payload bytes written, excluding padding and terminators
    pub payload_bytes: usize,
}

/// Frame every line of the text file `input` and send it to `output`
pub fn execute(
    input: &str,
    output: Option<&str>,
    serial: &SerialArgs,
    config: LineConfig,
    progress: bool,
) -> Result<PackSummary> {
    info!("Packing lines from {}", input);

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    let channel = open_output(output, serial)?;
    let summary = pack_lines(&content, channel, config, progress)?;

    info!(
        "Successfully packed {} lines ({} payload bytes)",
        summary.lines, summary.payload_bytes
    );

    Ok(summary)
}

/// Frame each line of `content`; `\n` and `\r\n` endings are both accepted
pub fn pack_lines<C: RawChannel>(
    content: &str,
    channel: C,
    config: LineConfig,
    progress: bool,
) -> Result<PackSummary> {
    let lines: Vec<&str> = content.lines().collect();
    let mut writer = LineWriter::with_config(channel, config);
    let mut summary = PackSummary::default();

    let bar = if progress {
        let pb = ProgressBar::new(lines.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} lines")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    for (i, line) in lines.iter().enumerate() {
        writer
            .write_line(line)
            .with_context(|| format!("Failed to write line {}", i + 1))?;

        summary.lines += 1;
        summary.payload_bytes += line.len();

        if let Some(pb) = &bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }

    Ok(summary)
}
