//! Packet framing state machine.
//!
//! The framer consumes at most one byte per [`Framer::poll`]. A packet is
//! complete when the line terminator is appended, or when the sender has been
//! silent for the inter-byte timeout, so a peer that never sends `\n` still
//! gets its packets framed.
//!
//! ```text
//!            byte                      '\n' or timeout
//!   Idle ────────────► Accumulating ─────────────────► Idle (Complete)
//!                          │
//!                          │ byte while full
//!                          ▼
//!                      Discarding ── '\n' or timeout ──► Idle
//!                      (Overflow)
//! ```
//!
//! A finished packet stays readable until the next poll, which clears it
//! before accepting new bytes.

use gcode_proto::{Packet, LINE_TERMINATOR};

use crate::transport::Transport;

/// Inter-byte silence, in microseconds, after which a packet is complete.
pub const PACKET_TIMEOUT_US: u64 = 500;

/// Outcome of one framing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameEvent {
    /// No complete packet yet.
    Pending,
    /// A packet is complete and readable through [`Framer::packet`].
    Complete,
    /// A byte arrived while the packet was full; the packet is corrupt.
    Overflow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Accumulating,
    /// Dropping the rest of an over-long line.
    Discarding,
}

/// Assembles transport bytes into packets.
#[derive(Debug, Clone)]
pub struct Framer {
    packet: Packet,
    state: State,
    last_byte_us: u64,
    timeout_us: u64,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(PACKET_TIMEOUT_US)
    }
}

impl Framer {
    /// Create a framer with the given inter-byte timeout.
    #[must_use]
    pub const fn new(timeout_us: u64) -> Self {
        Self {
            packet: Packet::new(),
            state: State::Idle,
            last_byte_us: 0,
            timeout_us,
        }
    }

    /// The current packet.
    ///
    /// After [`FrameEvent::Complete`] this is the finished packet; it is
    /// cleared by the next poll.
    #[inline]
    #[must_use]
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// True while a packet is being received.
    #[inline]
    #[must_use]
    pub fn is_accumulating(&self) -> bool {
        self.state == State::Accumulating
    }

    /// Abandon the in-flight packet, if any.
    pub fn reset(&mut self) {
        self.packet.clear();
        self.state = State::Idle;
    }

    /// Replace the current packet with a complete line from another source.
    ///
    /// The framer ends up idle, exactly as after [`FrameEvent::Complete`].
    /// On error the packet is left empty.
    pub fn load(&mut self, line: &[u8]) -> Result<(), gcode_proto::PacketFull> {
        self.reset();
        self.packet = Packet::try_from(line)?;
        Ok(())
    }

    /// Advance framing by one step.
    ///
    /// Reads at most one byte from `transport`. `now_us` is the current
    /// monotonic time in microseconds.
    ///
    /// # Errors
    ///
    /// Transport errors are returned as-is; the framer state is unchanged
    /// apart from the lazy cleanup of a finished packet.
    pub fn poll<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        now_us: u64,
    ) -> Result<FrameEvent, T::Error> {
        // Previous packet was handed out last poll
        if self.state != State::Accumulating && !self.packet.is_empty() {
            self.packet.clear();
        }

        let byte = if transport.available()? > 0 {
            transport.read_byte()?
        } else {
            None
        };

        if let Some(byte) = byte {
            self.last_byte_us = now_us;

            if self.state == State::Discarding {
                if byte == LINE_TERMINATOR {
                    self.state = State::Idle;
                }
                return Ok(FrameEvent::Pending);
            }

            if self.packet.push(byte).is_err() {
                self.state = if byte == LINE_TERMINATOR {
                    State::Idle
                } else {
                    State::Discarding
                };
                return Ok(FrameEvent::Overflow);
            }
            self.state = State::Accumulating;
        }

        let silent = now_us.saturating_sub(self.last_byte_us) >= self.timeout_us;
        match self.state {
            State::Accumulating if silent || self.packet.is_terminated() => {
                self.state = State::Idle;
                Ok(FrameEvent::Complete)
            }
            State::Discarding if silent => {
                self.state = State::Idle;
                Ok(FrameEvent::Pending)
            }
            _ => Ok(FrameEvent::Pending),
        }
    }
}
