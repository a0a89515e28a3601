//! G-code command endpoint over UART for RP2040.
//!
//! This crate provides the embedded side of the motion controller's command
//! link: it frames G-code lines received on a UART, dispatches them to the
//! device handlers and answers every accepted command with `OK`.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives command lines over UART (115200 baud, 8N1)
//! 2. Frames, checksums and dispatches them through [`gcode_core::Engine`]
//! 3. Updates the [`Device`] state and answers `M15` with a `TLM` line
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Serial transmit (replies) |
//! | UART1 RX | 9    | Serial receive (commands) |
//! | LED      | 25   | On-board LED (error indicator) |
//!
//! # Modules
//!
//! - [`clock`]: embassy-time backed [`EmbassyClock`]
//! - [`device`]: device state and command handlers ([`Device`], [`register_vocabulary`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`uart-flow-control`**: Enable hardware flow control (CTS/RTS on GPIO 10/11)
//! - **`checksum`**: Require a ` *255` checksum field on every command

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they both define a panic handler");

pub mod clock;
pub mod device;

pub use clock::EmbassyClock;
pub use device::{register_vocabulary, Brake, Device, Unit};

// Re-export core types for convenience
pub use gcode_core::{
    ChecksumMode, CommandHandler, Engine, EngineConfig, FrameStatus, IoTransport, Request,
};
