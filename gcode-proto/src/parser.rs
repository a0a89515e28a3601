//! Parameter extraction for command packets.
//!
//! A packet is a whitespace separated list of tokens:
//!
//! ```text
//! G1 X10.5 Y-3 *255\n
//! ^^ ^^^^^ ^^^ ^^^^
//! |  |     |   checksum field
//! |  parameters
//! command
//! ```
//!
//! Values are decimal numbers with an optional sign and fraction. A value
//! ends at the next whitespace byte; a value running into the end of the
//! packet is rejected, so the last parameter of an unterminated packet is
//! not readable.

use core::fmt;

/// Error returned by parameter lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// The parameter name does not occur in the packet.
    NotFound,
    /// The value runs to the end of the packet without a delimiter.
    Unterminated,
    /// The value text is not a decimal number.
    Invalid,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "parameter not found"),
            Self::Unterminated => write!(f, "parameter value not terminated"),
            Self::Invalid => write!(f, "parameter value is not a number"),
        }
    }
}

/// True for bytes that separate tokens (space, tab, CR, LF).
#[inline]
pub(crate) fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace()
}

/// Return the leading command token of a packet.
///
/// The token spans up to the first whitespace byte, or the whole packet if
/// there is none.
#[inline]
#[must_use]
pub fn command_token(packet: &[u8]) -> &[u8] {
    let end = packet
        .iter()
        .position(|&b| is_delimiter(b))
        .unwrap_or(packet.len());
    &packet[..end]
}

/// Extract the value following the first occurrence of `name`.
///
/// Matching is by substring: `name` may occur anywhere in the packet,
/// including inside another token, and the first occurrence wins. Senders in
/// the field rely on this, so it is the default lookup. Use
/// [`extract_strict`] to only match at the start of a token.
///
/// The value starts one byte past the match, so names are expected to be a
/// single letter. For a longer name the rest of it is read as part of the
/// value.
///
/// # Example
///
/// ```
/// use gcode_proto::{extract, ParamError};
///
/// assert_eq!(extract("X", b"G1 X10.5 Y3\n"), Ok(10.5));
/// assert_eq!(extract("Z", b"G1 X10.5 Y3\n"), Err(ParamError::NotFound));
/// ```
pub fn extract(name: &str, packet: &[u8]) -> Result<f32, ParamError> {
    let start = find(packet, name.as_bytes()).ok_or(ParamError::NotFound)?;
    value_at(packet, start + 1)
}

/// Extract a value and truncate it toward zero.
///
/// Out of range values saturate at `i32::MIN` / `i32::MAX`.
#[inline]
pub fn extract_int(name: &str, packet: &[u8]) -> Result<i32, ParamError> {
    extract(name, packet).map(|v| v as i32)
}

/// Extract the value of the first token that starts with `name`.
///
/// Unlike [`extract`], `name` inside a longer token (the `X` in `MAX5`) is
/// skipped, and the whole name is skipped before the value.
pub fn extract_strict(name: &str, packet: &[u8]) -> Result<f32, ParamError> {
    let needle = name.as_bytes();
    if needle.is_empty() {
        return Err(ParamError::NotFound);
    }

    let start = (0..packet.len())
        .filter(|&i| i == 0 || is_delimiter(packet[i - 1]))
        .find(|&i| packet[i..].starts_with(needle))
        .ok_or(ParamError::NotFound)?;

    value_at(packet, start + needle.len())
}

/// Position of the first occurrence of `needle`.
#[inline]
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse the value text starting at `start` up to the next delimiter.
fn value_at(packet: &[u8], start: usize) -> Result<f32, ParamError> {
    let rest = packet.get(start..).ok_or(ParamError::Unterminated)?;
    let len = rest
        .iter()
        .position(|&b| is_delimiter(b))
        .ok_or(ParamError::Unterminated)?;
    parse_decimal(&rest[..len])
}

/// Parse `[+-]digits[.digits]`; at least one digit is required.
fn parse_decimal(s: &[u8]) -> Result<f32, ParamError> {
    let digits = match s.first() {
        Some(b'+') | Some(b'-') => &s[1..],
        _ => s,
    };

    let mut seen_digit = false;
    let mut seen_point = false;
    for &b in digits {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_point => seen_point = true,
            _ => return Err(ParamError::Invalid),
        }
    }
    if !seen_digit {
        return Err(ParamError::Invalid);
    }

    // Only ASCII digits, sign and point remain at this point
    core::str::from_utf8(s)
        .ok()
        .and_then(|text| text.parse::<f32>().ok())
        .ok_or(ParamError::Invalid)
}
