//! Event pipeline for a USB-MIDI footswitch.
//!
//! Debounced switch transitions are translated into MIDI messages through a
//! mapping table. A vendor SysEx protocol reads and rewrites that table at
//! runtime, and every change is persisted to flash with a checksummed image
//! so it survives power cycles.
//!
//! ```text
//! pins ──► sampler ──► router ──► Message::to_packet ──► transport
//!                        ▲
//!                  Configuration ◄── sysex::dispatch ◄── SysexReceiver ◄── transport
//!                        │
//!                        └──► ConfigStore ──► flash
//! ```
//!
//! The crate is `no_std` and allocation free. Hardware is reached only
//! through the traits in [`hal`], so everything here runs under `cargo test`
//! on the host; the firmware crate supplies the board implementations.
//!
//! # Quick Start
//!
//! ```ignore
//! use footswitch::controller::{Controller, ControllerConfig};
//!
//! let mut controller = Controller::boot(flash, ControllerConfig::default());
//! loop {
//!     let led_on = controller.poll(now_ms, &mut pins, &mut transport);
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging and `defmt::Format` for public types.

#![no_std]

pub mod controller;
pub mod hal;
pub mod mapping;
pub mod router;
pub mod sampler;
pub mod status;
pub mod storage;
pub mod sysex;
pub mod usb_midi;

#[cfg(test)]
pub(crate) mod testing;
