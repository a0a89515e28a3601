//! Checksum gate applied to completed packets.
//!
//! The checksum travels as a trailing `*<number>` field:
//!
//! ```text
//! G1 X10 *255\n
//! ```
//!
//! Two validation modes exist. [`ChecksumMode::Sentinel`] accepts exactly the
//! fixed value `255`, which is what deployed senders append.
//! [`ChecksumMode::Crc8`] expects the CRC-8/SMBUS of the line text before the
//! field.

use crc::{Crc, CRC_8_SMBUS};

use crate::packet::Packet;
use crate::parser::{self, is_delimiter, ParamError};
use crate::status::FrameStatus;

/// Name of the checksum field.
pub const CHECKSUM_MARKER: &str = "*";

/// Value accepted by [`ChecksumMode::Sentinel`].
pub const CHECKSUM_SENTINEL: u8 = 0xFF;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// CRC-8/SMBUS of `data`, as used by [`ChecksumMode::Crc8`].
#[inline]
#[must_use]
pub fn calculate_crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// How the checksum field of a packet is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumMode {
    /// The field must read `255`.
    #[default]
    Sentinel,
    /// The field must hold the CRC-8/SMBUS of the preceding line text.
    Crc8,
}

impl ChecksumMode {
    /// Checksum a sender appends to `payload`.
    #[must_use]
    pub fn checksum(self, payload: &[u8]) -> u8 {
        match self {
            Self::Sentinel => CHECKSUM_SENTINEL,
            Self::Crc8 => calculate_crc8(payload),
        }
    }

    /// Run the gate on a completed packet.
    ///
    /// Returns [`FrameStatus::Ready`], [`FrameStatus::ChecksumMissing`] when
    /// there is no readable `*` field, or [`FrameStatus::ChecksumInvalid`].
    #[must_use]
    pub fn verify(self, packet: &Packet) -> FrameStatus {
        self.verify_bytes(packet.as_bytes())
    }

    /// Run the gate on raw packet bytes.
    #[must_use]
    pub fn verify_bytes(self, packet: &[u8]) -> FrameStatus {
        let received = match parser::extract(CHECKSUM_MARKER, packet) {
            Ok(value) => value as i32,
            Err(ParamError::NotFound) | Err(ParamError::Unterminated) => {
                return FrameStatus::ChecksumMissing;
            }
            Err(ParamError::Invalid) => return FrameStatus::ChecksumInvalid,
        };

        let expected = self.checksum(payload(packet));
        if received == i32::from(expected) {
            FrameStatus::Ready
        } else {
            FrameStatus::ChecksumInvalid
        }
    }
}

/// Line text covered by the checksum: everything before the `*` field,
/// without trailing whitespace.
fn payload(packet: &[u8]) -> &[u8] {
    let marker = CHECKSUM_MARKER.as_bytes()[0];
    let end = packet
        .iter()
        .position(|&b| b == marker)
        .unwrap_or(packet.len());
    let mut payload = &packet[..end];
    while let Some((&last, rest)) = payload.split_last() {
        if !is_delimiter(last) {
            break;
        }
        payload = rest;
    }
    payload
}
