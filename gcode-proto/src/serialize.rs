//! Outgoing line encoding.
//!
//! Lines are produced without the terminator; the transport appends it when
//! writing.
//!
//! ## Command Line
//!
//! ```text
//! <command>[ *<checksum>]
//! ```
//!
//! ## Error Reply
//!
//! ```text
//! <prefix>: <status code>
//! ```

use core::fmt::{self, Write};

use heapless::String;

use crate::checksum::{ChecksumMode, CHECKSUM_MARKER};
use crate::packet::{LINE_TERMINATOR, MAX_PACKET_SIZE};
use crate::status::FrameStatus;

/// Maximum size of an encoded reply line.
pub const MAX_REPLY_SIZE: usize = 32;

/// Encoded command line.
pub type Line = String<MAX_PACKET_SIZE>;

/// Encoded reply line.
pub type Reply = String<MAX_REPLY_SIZE>;

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the line.
    BufferTooSmall,
    /// The text contains a line terminator and would split into two packets.
    EmbeddedTerminator,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::EmbeddedTerminator => write!(f, "line contains a terminator"),
        }
    }
}

/// Encode an outgoing command, appending ` *<checksum>` when `checksum` is set.
///
/// The encoded line plus the terminator always fits in one packet on the
/// receiving side.
///
/// # Example
///
/// ```
/// use gcode_proto::{encode_command, ChecksumMode};
///
/// let line = encode_command("G1 X10", Some(ChecksumMode::Sentinel)).unwrap();
/// assert_eq!(line.as_str(), "G1 X10 *255");
///
/// let line = encode_command("M0", None).unwrap();
/// assert_eq!(line.as_str(), "M0");
/// ```
///
/// # Errors
///
/// Returns [`SerializeError::EmbeddedTerminator`] if `command` contains `\n`
/// and [`SerializeError::BufferTooSmall`] if the line would not fit.
pub fn encode_command(
    command: &str,
    checksum: Option<ChecksumMode>,
) -> Result<Line, SerializeError> {
    if command.as_bytes().contains(&LINE_TERMINATOR) {
        return Err(SerializeError::EmbeddedTerminator);
    }

    let mut line = Line::new();
    line.push_str(command).map_err(|()| SerializeError::BufferTooSmall)?;

    if let Some(mode) = checksum {
        let value = mode.checksum(command.trim_end().as_bytes());
        write!(line, " {}{}", CHECKSUM_MARKER, value)
            .map_err(|_| SerializeError::BufferTooSmall)?;
    }

    // Terminator and the reserved slot must still fit on the receiving side
    if line.len() + 1 > MAX_PACKET_SIZE - 1 {
        return Err(SerializeError::BufferTooSmall);
    }

    Ok(line)
}

/// Encode the error reply for a failed frame, e.g. `ERROR: 3`.
///
/// # Errors
///
/// Returns [`SerializeError::BufferTooSmall`] if `prefix` is too long.
pub fn encode_error_reply(prefix: &str, status: FrameStatus) -> Result<Reply, SerializeError> {
    let mut reply = Reply::new();
    write!(reply, "{}: {}", prefix, status.code())
        .map_err(|_| SerializeError::BufferTooSmall)?;
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::calculate_crc8;
    use crate::packet::Packet;

    #[test]
    fn test_encode_plain_command() {
        let line = encode_command("G0 X5", None).unwrap();
        assert_eq!(line.as_str(), "G0 X5");
    }

    #[test]
    fn test_encode_sentinel_checksum() {
        let line = encode_command("G1 X10", Some(ChecksumMode::Sentinel)).unwrap();
        assert_eq!(line.as_str(), "G1 X10 *255");
    }

    #[test]
    fn test_encode_crc8_checksum_verifies() {
        let line = encode_command("G1 X10 Y-2.5", Some(ChecksumMode::Crc8)).unwrap();
        let crc = calculate_crc8(b"G1 X10 Y-2.5");

        let mut expected = Line::new();
        write!(expected, "G1 X10 Y-2.5 *{}", crc).unwrap();
        assert_eq!(line, expected);

        // The receiving side sees the line with its terminator
        let mut packet = Packet::try_from(line.as_str()).unwrap();
        packet.push(LINE_TERMINATOR).unwrap();
        assert_eq!(ChecksumMode::Crc8.verify(&packet), FrameStatus::Ready);
    }

    #[test]
    fn test_encode_rejects_terminator() {
        assert_eq!(
            encode_command("G0\nG1", None),
            Err(SerializeError::EmbeddedTerminator)
        );
    }

    #[test]
    fn test_encode_rejects_overlong() {
        let long = "G1 X1000000 Y1000000 Z1000000 A1000000 B1000000";
        assert_eq!(long.len(), 47);
        assert_eq!(encode_command(long, None).unwrap().as_str(), long);
        assert_eq!(
            encode_command(long, Some(ChecksumMode::Sentinel)),
            Err(SerializeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_encode_error_reply() {
        let reply = encode_error_reply("ERROR", FrameStatus::Overflow).unwrap();
        assert_eq!(reply.as_str(), "ERROR: 4");

        let reply = encode_error_reply("NAY", FrameStatus::ChecksumMissing).unwrap();
        assert_eq!(reply.as_str(), "NAY: 3");
    }

    #[test]
    fn test_encode_error_reply_prefix_too_long() {
        let prefix = "ERROR-ERROR-ERROR-ERROR-ERROR-ERROR";
        assert_eq!(
            encode_error_reply(prefix, FrameStatus::Overflow),
            Err(SerializeError::BufferTooSmall)
        );
    }
}
