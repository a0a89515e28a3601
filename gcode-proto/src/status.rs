//! Frame status produced once per engine poll.

use core::fmt;

/// Result of one framing step.
///
/// The discriminants are the numeric codes sent to the peer in error
/// replies (`ERROR: 4` for [`FrameStatus::Overflow`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameStatus {
    /// No complete packet yet.
    #[default]
    None = 0,
    /// Packet complete and valid.
    Ready = 1,
    /// Checksum field present but failed validation.
    ChecksumInvalid = 2,
    /// Checksum required but no `*` field in the packet.
    ChecksumMissing = 3,
    /// Packet exceeded the buffer capacity.
    Overflow = 4,
}

impl FrameStatus {
    /// Wire code of this status.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// True for statuses that are answered with an error reply.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::ChecksumInvalid | Self::ChecksumMissing | Self::Overflow
        )
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Ready => write!(f, "ready"),
            Self::ChecksumInvalid => write!(f, "checksum invalid"),
            Self::ChecksumMissing => write!(f, "checksum missing"),
            Self::Overflow => write!(f, "overflow"),
        }
    }
}
