//! Platform-agnostic G-code protocol engine: framing, dispatch, and traits.
//!
//! This crate turns a byte stream into dispatched commands without any
//! platform-specific dependencies. It can be used both in embedded `no_std`
//! firmware and on host for testing.
//!
//! # Overview
//!
//! - [`transport`]: I/O seams ([`Transport`], [`Clock`])
//! - [`framing`]: packet framing state machine ([`Framer`])
//! - [`command`]: command table and dispatch ([`CommandTable`], [`CommandHandler`])
//! - [`config`]: runtime settings ([`EngineConfig`])
//! - [`engine`]: ties everything together ([`Engine`])
//!
//! # Example
//!
//! ```rust
//! use gcode_core::{Clock, Engine, EngineConfig, FrameStatus, Request, Transport};
//!
//! struct Serial { rx: &'static [u8], replies: usize }
//!
//! impl Transport for Serial {
//!     type Error = ();
//!
//!     fn available(&mut self) -> Result<usize, ()> {
//!         Ok(self.rx.len())
//!     }
//!
//!     fn read_byte(&mut self) -> Result<Option<u8>, ()> {
//!         let (first, rest) = self.rx.split_first().ok_or(())?;
//!         self.rx = rest;
//!         Ok(Some(*first))
//!     }
//!
//!     fn write_line(&mut self, _line: &str) -> Result<(), ()> {
//!         self.replies += 1;
//!         Ok(())
//!     }
//! }
//!
//! struct Fixed;
//!
//! impl Clock for Fixed {
//!     fn now_micros(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! fn move_to(target: &mut f32, req: &Request<'_>) {
//!     *target = req.value("X").unwrap_or(*target);
//! }
//!
//! let handler = move_to;
//! let serial = Serial { rx: b"G0 X12.5\n", replies: 0 };
//! let mut engine: Engine<'_, Serial, Fixed, f32> =
//!     Engine::new(serial, Fixed, EngineConfig::default());
//! engine.register("G0", &handler).unwrap();
//!
//! let mut target = 0.0;
//! while engine.poll(&mut target).unwrap() != FrameStatus::Ready {}
//! assert_eq!(target, 12.5);
//! assert_eq!(engine.transport().replies, 1);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support and [`StdClock`]
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`embedded-io`**: Enable [`IoTransport`] over `embedded-io` serial ports
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to the other modules
mod fmt;

pub mod command;
pub mod config;
pub mod engine;
pub mod framing;
pub mod transport;

#[cfg(test)]
mod testing;

pub use command::{CommandHandler, CommandTable, Dispatch, RegisterError, Request, MAX_COMMANDS};
pub use config::EngineConfig;
pub use engine::{Engine, SendError};
pub use framing::{FrameEvent, Framer, PACKET_TIMEOUT_US};
pub use gcode_proto::{ChecksumMode, FrameStatus, Packet, ParamError};
#[cfg(feature = "embedded-io")]
pub use transport::IoTransport;
#[cfg(feature = "std")]
pub use transport::StdClock;
pub use transport::{Clock, Transport};
