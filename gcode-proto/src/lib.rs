//! ASCII G-code line protocol types, parameter extraction, and checksum gate.
//!
//! This crate holds the wire-level pieces of the motion controller's command
//! protocol:
//!
//! - **Packet**: bounded byte buffer for one framed command line
//!   - [`Packet`] - the buffer, with command/parameter accessors
//!   - [`FrameStatus`] - per-poll framing result and its wire code
//!
//! - **Parsing**: read values out of a packet
//!   - [`extract()`] - loose (substring) parameter lookup
//!   - [`extract_strict()`] - token-aligned parameter lookup
//!   - [`command_token()`] - the leading command token
//!
//! - **Checksum**: optional post-framing validation
//!   - [`ChecksumMode`] - sentinel or CRC-8/SMBUS
//!
//! - **Serialization**: outgoing lines
//!   - [`encode_command()`] - command line with optional checksum field
//!   - [`encode_error_reply()`] - `<prefix>: <code>` error reply
//!
//! # Protocol Format
//!
//! ```text
//! <COMMAND>[ <LETTER><NUMBER>]*[ *<CHECKSUM>]\n
//! ```
//!
//! - `COMMAND` - up to 4 characters, e.g. `G1` or `M15`
//! - `LETTER NUMBER` - parameter, e.g. `X10.5`, `A-90`
//! - `*CHECKSUM` - optional checksum field, decimal
//! - `\n` - line terminator (a silent sender is also framed after a timeout)
//!
//! Replies are either the configured acknowledgement text (`OK`) or
//! `<error text>: <status code>`, e.g. `ERROR: 4` for an overflowed packet.
//!
//! # Example
//!
//! ```
//! use gcode_proto::{ChecksumMode, FrameStatus, Packet};
//!
//! let packet = Packet::try_from(&b"G1 X10.5 Y3 *255\n"[..]).unwrap();
//! assert!(packet.is_command("G1"));
//! assert_eq!(packet.value("X"), Ok(10.5));
//! assert_eq!(packet.int_value("Y"), Ok(3));
//! assert_eq!(ChecksumMode::Sentinel.verify(&packet), FrameStatus::Ready);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod packet;
pub mod parser;
pub mod serialize;
pub mod status;
pub mod vocabulary;

pub use checksum::{calculate_crc8, ChecksumMode, CHECKSUM_MARKER, CHECKSUM_SENTINEL};
pub use packet::{Packet, PacketFull, LINE_TERMINATOR, MAX_COMMAND_SIZE, MAX_PACKET_SIZE};
pub use parser::{command_token, extract, extract_int, extract_strict, ParamError};
pub use serialize::{
    encode_command, encode_error_reply, Line, Reply, SerializeError, MAX_REPLY_SIZE,
};
pub use status::FrameStatus;
