//! SysEx configuration protocol.
//!
//! A host reads and rewrites the mapping table with vendor SysEx frames:
//!
//! ```text
//! F0  00 7D 01  cmd  payload…  F7
//! │   └──┬───┘  │             └ frame end
//! │      │      └ command code
//! │      └ manufacturer (0x00 0x7D, non-commercial) + device id
//! └ frame start
//! ```
//!
//! | Request          | Code | Payload                                   | Response code |
//! |------------------|------|-------------------------------------------|---------------|
//! | `SetMessages`    | 0x01 | switch, event, count, count × 4 fields    | 0x06 status   |
//! | `GetMessages`    | 0x02 | switch, event                             | 0x03 slot     |
//! | `GetInfo`        | 0x04 | none                                      | 0x05 info     |
//! | `GetAllMessages` | 0x07 | none                                      | 0x03 per slot |
//!
//! Bytes arrive through [`SysexReceiver`], which reassembles frames across
//! any number of transport reads. Complete frames go to [`dispatch()`],
//! which decodes them with a [`FrameReader`] cursor and answers on the same
//! transport before returning.

mod dispatch;
mod error;
mod reader;
mod receiver;
mod response;

pub use dispatch::dispatch;
pub use error::ProtocolError;
pub use reader::{open_frame, FrameReader};
pub use receiver::{CaptureState, SysexReceiver};
pub use response::Response;

/// SysEx frame start marker.
pub const SYSEX_START: u8 = 0xF0;

/// SysEx frame end marker.
pub const SYSEX_END: u8 = 0xF7;

/// Manufacturer id (2 bytes) followed by the device id.
pub const DEVICE_PREAMBLE: [u8; 3] = [0x00, 0x7D, 0x01];

/// Capture buffer size, including both markers.
pub const CAPTURE_LEN: usize = 64;

/// Start + preamble + command + end.
pub const MIN_FRAME_LEN: usize = 6;

/// Protocol version reported by `GetInfo`.
pub const PROTOCOL_VERSION: u8 = 2;

/// `SetMessages` status byte: change applied and persisted.
pub const STATUS_OK: u8 = 0;

/// `SetMessages` status byte: change rejected or not persisted.
pub const STATUS_ERROR: u8 = 1;

/// Request command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    SetMessages = 0x01,
    GetMessages = 0x02,
    GetInfo = 0x04,
    GetAllMessages = 0x07,
}

impl Command {
    /// Response code answering this command.
    pub const fn response_code(self) -> ResponseCode {
        match self {
            Command::SetMessages => ResponseCode::SetResult,
            Command::GetMessages | Command::GetAllMessages => ResponseCode::Messages,
            Command::GetInfo => ResponseCode::Info,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Command::SetMessages),
            0x02 => Ok(Command::GetMessages),
            0x04 => Ok(Command::GetInfo),
            0x07 => Ok(Command::GetAllMessages),
            _ => Err(ProtocolError::UnknownCommand),
        }
    }
}

/// Response command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ResponseCode {
    Messages = 0x03,
    Info = 0x05,
    SetResult = 0x06,
}
