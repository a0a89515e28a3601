//! Packet buffer for one framed command line.

use core::fmt;

use heapless::Vec;

use crate::parser::{self, ParamError};

/// Size of the packet buffer, including the line terminator.
pub const MAX_PACKET_SIZE: usize = 50;

/// Size of a command slot; tokens hold at most `MAX_COMMAND_SIZE - 1` characters.
pub const MAX_COMMAND_SIZE: usize = 5;

/// Byte that ends a packet on the wire.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Bytes a packet can actually store. One slot of [`MAX_PACKET_SIZE`] stays free.
const PACKET_LEN: usize = MAX_PACKET_SIZE - 1;

/// Error returned when a byte does not fit in the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketFull;

impl fmt::Display for PacketFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "packet full")
    }
}

/// One command line as received from the peer.
///
/// The buffer is bounded: it holds at most `MAX_PACKET_SIZE - 1` bytes. When a
/// packet was framed on a terminator, the trailing `\n` is part of the
/// contents.
///
/// # Example
///
/// ```
/// use gcode_proto::Packet;
///
/// let packet = Packet::try_from(&b"M1 A2.5\n"[..]).unwrap();
/// assert_eq!(packet.command(), b"M1");
/// assert_eq!(packet.value("A"), Ok(2.5));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8, PACKET_LEN>,
}

impl Packet {
    /// Number of bytes a packet can hold.
    pub const CAPACITY: usize = PACKET_LEN;

    /// Create an empty packet.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append one byte.
    ///
    /// # Errors
    ///
    /// Returns [`PacketFull`] if the packet already holds [`Packet::CAPACITY`] bytes.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), PacketFull> {
        self.bytes.push(byte).map_err(|_| PacketFull)
    }

    /// Drop all bytes.
    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Number of buffered bytes, terminator included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when no further byte can be appended.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.bytes.is_full()
    }

    /// Raw packet bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Packet contents as text, if they are valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Most recently appended byte.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// True if the packet ends with the line terminator.
    #[inline]
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.last() == Some(LINE_TERMINATOR)
    }

    /// The leading command token (e.g. `G1`).
    #[inline]
    #[must_use]
    pub fn command(&self) -> &[u8] {
        parser::command_token(&self.bytes)
    }

    /// True if the command token equals `token` exactly.
    #[inline]
    #[must_use]
    pub fn is_command(&self, token: &str) -> bool {
        self.command() == token.as_bytes()
    }

    /// Read a numeric parameter, e.g. `X` in `G1 X10.5`.
    ///
    /// See [`parser::extract`] for the matching rules.
    #[inline]
    pub fn value(&self, name: &str) -> Result<f32, ParamError> {
        parser::extract(name, &self.bytes)
    }

    /// Read a numeric parameter truncated to an integer.
    #[inline]
    pub fn int_value(&self, name: &str) -> Result<i32, ParamError> {
        parser::extract_int(name, &self.bytes)
    }

    /// Read a numeric parameter whose name starts a token.
    ///
    /// See [`parser::extract_strict`].
    #[inline]
    pub fn strict_value(&self, name: &str) -> Result<f32, ParamError> {
        parser::extract_strict(name, &self.bytes)
    }
}

impl TryFrom<&[u8]> for Packet {
    type Error = PacketFull;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut packet = Self::new();
        packet
            .bytes
            .extend_from_slice(bytes)
            .map_err(|_| PacketFull)?;
        Ok(packet)
    }
}

impl TryFrom<&str> for Packet {
    type Error = PacketFull;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        Self::try_from(line.as_bytes())
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet(\"")?;
        for &b in self.bytes.iter() {
            write!(f, "{}", core::ascii::escape_default(b))?;
        }
        write!(f, "\")")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Packet {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Packet({=[u8]:a})", self.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut packet = Packet::new();
        for _ in 0..Packet::CAPACITY {
            packet.push(b'A').unwrap();
        }
        assert!(packet.is_full());
        assert_eq!(packet.len(), MAX_PACKET_SIZE - 1);
        assert_eq!(packet.push(b'A'), Err(PacketFull));
        assert_eq!(packet.len(), MAX_PACKET_SIZE - 1);
    }

    #[test]
    fn test_clear() {
        let mut packet = Packet::try_from("G0\n").unwrap();
        assert!(!packet.is_empty());
        packet.clear();
        assert!(packet.is_empty());
        assert_eq!(packet.last(), None);
    }

    #[test]
    fn test_command_token() {
        let packet = Packet::try_from("G1 X10 Y5\n").unwrap();
        assert_eq!(packet.command(), b"G1");
        assert!(packet.is_command("G1"));
        assert!(!packet.is_command("G"));
        assert!(!packet.is_command("G10"));
    }

    #[test]
    fn test_command_without_delimiter_is_whole_packet() {
        let packet = Packet::try_from("M15").unwrap();
        assert!(packet.is_command("M15"));
    }

    #[test]
    fn test_strict_value_needs_token_start() {
        let packet = Packet::try_from("MAX5 A2\n").unwrap();
        assert_eq!(packet.strict_value("A"), Ok(2.0));
        assert_eq!(packet.value("A"), Err(ParamError::Invalid));
        assert_eq!(packet.strict_value("X"), Err(ParamError::NotFound));
    }

    #[test]
    fn test_is_terminated() {
        assert!(Packet::try_from("G0\n").unwrap().is_terminated());
        assert!(!Packet::try_from("G0").unwrap().is_terminated());
    }

    #[test]
    fn test_try_from_too_long() {
        let line = [b'X'; MAX_PACKET_SIZE];
        assert_eq!(Packet::try_from(&line[..]), Err(PacketFull));
    }

    #[test]
    fn test_debug_escapes_terminator() {
        let packet = Packet::try_from("G0\n").unwrap();
        assert_eq!(format!("{:?}", packet), "Packet(\"G0\\n\")");
    }
}
