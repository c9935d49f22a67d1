//! Switch-to-MIDI mapping table.
//!
//! This module provides the [`Configuration`] data structure that maps each
//! footswitch to the MIDI messages it emits. It is the central state read by
//! the event router and rewritten by the SysEx configuration protocol.
//!
//! # Architecture
//!
//! Every switch owns two [`EventSlot`]s, one fired on press and one on
//! release. A slot is an ordered list of up to [`MAX_MESSAGES_PER_SLOT`]
//! [`Message`]s, transmitted in list order:
//!
//! ```text
//! Switch 0 (tip):   press   → [CC ch0 #64 = 127]
//!                   release → [CC ch0 #64 = 0]
//! Switch 1 (ring):  press   → [PC ch0 1]
//!                   release → [PC ch0 0]
//! ```
//!
//! Chained slots matter for devices that expect a fixed sequence, e.g.
//! bank-select (CC #0) followed by a program change.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation. Slots use [`heapless::Vec`] and the table is a
//! fixed array of [`MAX_SWITCHES`] entries, of which the first
//! [`Configuration::switch_count()`] are in use.

mod configuration;
mod error;
mod message;
mod slot;

pub use configuration::Configuration;
pub use error::{MappingError, MessageError};
pub use message::{Message, MessageKind};
pub use slot::{EventSlot, SwitchEvent, SwitchMapping};

/// Maximum number of switches a configuration can describe.
pub const MAX_SWITCHES: usize = 16;

/// Maximum number of messages bound to one press or release.
pub const MAX_MESSAGES_PER_SLOT: usize = 10;

/// Highest valid MIDI channel (channels are 0-based on the wire).
pub const MAX_CHANNEL: u8 = 15;

/// Highest valid MIDI data byte.
pub const MAX_DATA_VALUE: u8 = 127;

/// Number of switches on the stock hardware (TRS tip and ring).
pub const DEFAULT_SWITCH_COUNT: usize = 2;

/// Built-in mapping used when no valid configuration is stored.
///
/// `DEFAULT_MAPPING[switch]` is `[press, release]`. Each entry becomes a
/// single-message slot in [`Configuration::defaults()`].
pub const DEFAULT_MAPPING: [[Message; 2]; DEFAULT_SWITCH_COUNT] = [
    // Switch 0 (tip): sustain pedal on / off
    [
        Message::control_change(0, 64, 127),
        Message::control_change(0, 64, 0),
    ],
    // Switch 1 (ring): program 1 / program 0
    [Message::program_change(0, 1), Message::program_change(0, 0)],
];
