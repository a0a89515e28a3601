//! Engine configuration.

use gcode_proto::vocabulary::{DEFAULT_ERROR_REPLY, DEFAULT_VALID_REPLY};
use gcode_proto::{ChecksumMode, FrameStatus, Packet};

use crate::framing::PACKET_TIMEOUT_US;

/// Settings applied by [`crate::Engine`].
///
/// ```
/// use gcode_core::EngineConfig;
/// use gcode_proto::ChecksumMode;
///
/// let config = EngineConfig::new()
///     .with_checksum(ChecksumMode::Sentinel)
///     .with_valid_reply("ACK");
/// assert!(config.use_checksum);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Require a checksum field on every received packet.
    pub use_checksum: bool,
    /// How the checksum field is validated and generated.
    pub checksum: ChecksumMode,
    /// Written after a packet matches a registered command.
    pub valid_reply: &'static str,
    /// Prefix of the `<prefix>: <code>` reply sent for failed packets.
    pub error_reply: &'static str,
    /// Inter-byte silence that completes a packet.
    pub packet_timeout_us: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Default settings: no checksum, `OK`/`ERROR` replies, 500 µs timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            use_checksum: false,
            checksum: ChecksumMode::Sentinel,
            valid_reply: DEFAULT_VALID_REPLY,
            error_reply: DEFAULT_ERROR_REPLY,
            packet_timeout_us: PACKET_TIMEOUT_US,
        }
    }

    /// Enable checksum validation with the given mode.
    #[must_use]
    pub const fn with_checksum(mut self, mode: ChecksumMode) -> Self {
        self.use_checksum = true;
        self.checksum = mode;
        self
    }

    /// Accept packets without a checksum field.
    #[must_use]
    pub const fn without_checksum(mut self) -> Self {
        self.use_checksum = false;
        self
    }

    #[must_use]
    pub const fn with_valid_reply(mut self, reply: &'static str) -> Self {
        self.valid_reply = reply;
        self
    }

    #[must_use]
    pub const fn with_error_reply(mut self, reply: &'static str) -> Self {
        self.error_reply = reply;
        self
    }

    #[must_use]
    pub const fn with_packet_timeout_us(mut self, timeout_us: u64) -> Self {
        self.packet_timeout_us = timeout_us;
        self
    }

    /// Status of a completed packet after the checksum gate.
    ///
    /// Always [`FrameStatus::Ready`] when checksums are disabled.
    #[must_use]
    pub fn gate(&self, packet: &Packet) -> FrameStatus {
        if self.use_checksum {
            self.checksum.verify(packet)
        } else {
            FrameStatus::Ready
        }
    }

    /// Checksum mode for outgoing commands, if enabled.
    #[must_use]
    pub const fn outgoing_checksum(&self) -> Option<ChecksumMode> {
        if self.use_checksum {
            Some(self.checksum)
        } else {
            None
        }
    }
}
