//! Line encoding
//!
//! A framed line on the wire is laid out as:
//! 1. Payload (UTF-8 text, verbatim)
//! 2. Padding: zero or more ASCII spaces
//! 3. Terminator (default `\r\n`)
//!
//! With a padding length `P > 0`, the number of spaces is chosen so that the end of the
//! terminator lands on the next multiple of `P` bytes. Receivers that deliver data in
//! fixed-size packets then flush the line as soon as it is complete.

use crate::config::LineConfig;
use bytes::{BufMut, Bytes, BytesMut};

/// Byte used for alignment padding
pub const PAD_BYTE: u8 = b' ';

/// Separator between values written by `write_numbers`
pub const NUMBER_SEPARATOR: char = ',';

/// Separator between name and value written by `write_value`
pub const VALUE_SEPARATOR: char = ':';

/// Number of padding spaces for a line
///
/// `payload_len + terminator_len + padding_len(..)` is a multiple of `padding`, and no
/// spaces are added when it already is. A padding of 0 disables alignment.
pub fn padding_len(payload_len: usize, terminator_len: usize, padding: u8) -> usize {
    if padding == 0 {
        return 0;
    }
    let padding = usize::from(padding);
    let line_len = payload_len + terminator_len;
    (padding - line_len % padding) % padding
}

/// Encode `text` as one complete line: payload, padding spaces, terminator
pub fn encode_line(text: &str, config: &LineConfig) -> Bytes {
    let mut buf = BytesMut::new();
    encode_line_into(text, config, &mut buf);
    buf.freeze()
}

/// Append one encoded line to `buf`
///
/// Returns the number of padding spaces written.
pub fn encode_line_into(text: &str, config: &LineConfig, buf: &mut BytesMut) -> usize {
    let terminator = config.new_line.as_bytes();
    let pad = padding_len(text.len(), terminator.len(), config.write_line_padding);

    buf.reserve(text.len() + pad + terminator.len());
    buf.put_slice(text.as_bytes());
    buf.put_bytes(PAD_BYTE, pad);
    buf.put_slice(terminator);

    pad
}

/// Magnitudes at or above this print in exponent form
const EXPONENT_UPPER: f64 = 1e21;

/// Non-zero magnitudes below this print in exponent form
const EXPONENT_LOWER: f64 = 1e-6;

/// Shortest round-trip decimal form of a number
///
/// Integral values print without a fraction (`3`, not `3.0`), negative zero prints as
/// `0`, and non-finite values print as `NaN`, `Infinity` and `-Infinity`. Magnitudes of
/// `1e21` and above or below `1e-6` use exponent form with an explicit sign (`1e+21`,
/// `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= EXPONENT_UPPER || value.abs() < EXPONENT_LOWER {
        format_exponent(value)
    } else {
        value.to_string()
    }
}

fn format_exponent(value: f64) -> String {
    let sci = format!("{:e}", value);
    match sci.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => sci,
    }
}

/// Comma-separated numbers with no leading or trailing separator
pub fn join_numbers(values: &[f64]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(NUMBER_SEPARATOR);
        }
        out.push_str(&format_number(*value));
    }
    out
}

/// `name:value`, or just `value` when `name` is empty
pub fn format_value(name: &str, value: f64) -> String {
    let mut out = String::with_capacity(name.len() + 24);
    if !name.is_empty() {
        out.push_str(name);
        out.push(VALUE_SEPARATOR);
    }
    out.push_str(&format_number(value));
    out
}
