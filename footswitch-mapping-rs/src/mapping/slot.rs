use heapless::Vec;

use super::error::MappingError;
use super::message::Message;
use super::MAX_MESSAGES_PER_SLOT;

/// Which transition of a switch a slot is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SwitchEvent {
    Press = 0,
    Release = 1,
}

impl SwitchEvent {
    /// Both events, in storage and dump order.
    pub const ALL: [SwitchEvent; 2] = [SwitchEvent::Press, SwitchEvent::Release];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SwitchEvent {
    type Error = MappingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SwitchEvent::Press),
            1 => Ok(SwitchEvent::Release),
            _ => Err(MappingError::InvalidEventType),
        }
    }
}

/// Ordered list of messages bound to one (switch, event) pair.
///
/// Holds at most [`MAX_MESSAGES_PER_SLOT`] messages. The list order is
/// the transmission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventSlot {
    messages: Vec<Message, MAX_MESSAGES_PER_SLOT>,
}

impl EventSlot {
    /// An empty slot.
    pub const fn new() -> Self {
        Self { messages: Vec::new() }
    }

    /// A slot holding exactly one message.
    pub fn single(message: Message) -> Self {
        let mut slot = Self::new();
        // Capacity is at least one.
        let _ = slot.messages.push(message);
        slot
    }

    /// Build a slot from a message list, validating each entry.
    ///
    /// # Errors
    /// * [`MappingError::TooManyMessages`] if more than 10 messages are given
    /// * [`MappingError::InvalidMessage`] if any message is out of range
    pub fn from_messages(messages: &[Message]) -> Result<Self, MappingError> {
        let mut slot = Self::new();
        for message in messages {
            slot.push(*message)?;
        }
        Ok(slot)
    }

    /// Append a validated message.
    pub fn push(&mut self, message: Message) -> Result<(), MappingError> {
        message.validate()?;
        self.messages
            .push(message)
            .map_err(|_| MappingError::TooManyMessages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// The press and release slots of one switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchMapping {
    pub press: EventSlot,
    pub release: EventSlot,
}

impl SwitchMapping {
    pub fn slot(&self, event: SwitchEvent) -> &EventSlot {
        match event {
            SwitchEvent::Press => &self.press,
            SwitchEvent::Release => &self.release,
        }
    }

    pub fn slot_mut(&mut self, event: SwitchEvent) -> &mut EventSlot {
        match event {
            SwitchEvent::Press => &mut self.press,
            SwitchEvent::Release => &mut self.release,
        }
    }
}
