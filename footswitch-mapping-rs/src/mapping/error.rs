use core::fmt;

/// Errors that can occur when addressing or editing the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MappingError {
    /// Switch index is out of bounds (must be < the configured switch count).
    InvalidSwitchIndex,
    /// Event type byte is neither press (0) nor release (1).
    InvalidEventType,
    /// More than [`MAX_MESSAGES_PER_SLOT`](super::MAX_MESSAGES_PER_SLOT) messages.
    TooManyMessages,
    /// Switch count is 0 or above [`MAX_SWITCHES`](super::MAX_SWITCHES).
    InvalidSwitchCount,
    /// A message in the slot failed field validation.
    InvalidMessage(MessageError),
}

/// Field validation failures for a single [`Message`](super::Message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Kind byte is above `Note` (3).
    InvalidKind,
    /// Channel is above 15.
    InvalidChannel,
    /// A data parameter is above 127.
    InvalidParam,
}

impl From<MessageError> for MappingError {
    fn from(error: MessageError) -> Self {
        MappingError::InvalidMessage(error)
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MessageError::InvalidKind => write!(f, "Invalid message kind (must be 0-3)"),
            MessageError::InvalidChannel => write!(f, "Invalid MIDI channel (must be 0-15)"),
            MessageError::InvalidParam => write!(f, "Invalid data parameter (must be 0-127)"),
        }
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MappingError::InvalidSwitchIndex => write!(f, "Invalid switch index"),
            MappingError::InvalidEventType => write!(f, "Invalid event type (must be 0 or 1)"),
            MappingError::TooManyMessages => write!(f, "Too many messages for one slot"),
            MappingError::InvalidSwitchCount => write!(f, "Invalid switch count"),
            MappingError::InvalidMessage(e) => write!(f, "Invalid message: {}", e),
        }
    }
}
