//! Fuzzing harness functions for edgeline-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Call these functions from fuzz targets

use edgeline_core::{channel::Loopback, LineConfig, LinePort, LineReader};

/// Frame arbitrary bytes as a line and check alignment; should never panic
pub fn fuzz_write_line(data: &[u8]) {
    let Some((&padding, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest);
    let config = LineConfig::default().with_write_line_padding(padding);
    let padding = config.write_line_padding;

    let mut port = LinePort::with_config(Loopback::new(), config);
    port.write_line(&text).unwrap();

    let wire = port.get_ref().pending();
    if padding > 0 {
        assert_eq!(wire.len() % usize::from(padding), 0);
    }
}

/// Split arbitrary bytes into lines; should never panic
pub fn fuzz_read_lines(data: &[u8]) {
    let mut reader = LineReader::new(Loopback::with_input(data));
    for line in reader.lines() {
        let _ = line;
    }
    let _ = reader.read_string();
}
