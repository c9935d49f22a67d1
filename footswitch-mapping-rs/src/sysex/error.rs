use core::fmt;

/// Reasons a SysEx frame is not acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Frame (or payload) ended before a required field.
    FrameTooShort,
    /// Missing start/end marker or foreign manufacturer/device id.
    BadPreamble,
    /// A field is outside its valid range.
    FieldOutOfRange,
    /// Frame exceeded the capture buffer and was discarded.
    BufferOverflow,
    /// Command byte is not one this device understands.
    UnknownCommand,
    /// Payload continues past the last expected field.
    TrailingBytes,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProtocolError::FrameTooShort => write!(f, "Frame too short"),
            ProtocolError::BadPreamble => write!(f, "Bad frame preamble"),
            ProtocolError::FieldOutOfRange => write!(f, "Field out of range"),
            ProtocolError::BufferOverflow => write!(f, "Capture buffer overflow"),
            ProtocolError::UnknownCommand => write!(f, "Unknown command"),
            ProtocolError::TrailingBytes => write!(f, "Unexpected trailing bytes"),
        }
    }
}
