//! MIDI message descriptions and their USB-MIDI event packet encoding.

use super::error::MessageError;
use super::{MAX_CHANNEL, MAX_DATA_VALUE};

/// The kind of MIDI message a [`Message`] describes.
///
/// The discriminant is the byte used on the SysEx wire and in flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageKind {
    /// Empty entry: skipped by the router, never transmitted.
    #[default]
    None = 0,
    /// Control Change: `param1` = controller, `param2` = value.
    ControlChange = 1,
    /// Program Change: `param1` = program, `param2` is ignored.
    ProgramChange = 2,
    /// Note On / Note Off: `param1` = note, `param2` = velocity
    /// (velocity 0 encodes as Note Off).
    Note = 3,
}

impl MessageKind {
    /// Wire/storage byte for this kind.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = MessageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageKind::None),
            1 => Ok(MessageKind::ControlChange),
            2 => Ok(MessageKind::ProgramChange),
            3 => Ok(MessageKind::Note),
            _ => Err(MessageError::InvalidKind),
        }
    }
}

/// One outbound MIDI message as stored in the mapping table.
///
/// Construct with the `const` helpers for known-good values, or with
/// [`Message::from_fields()`] for untrusted bytes (SysEx, flash), which
/// validates every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    pub kind: MessageKind,
    /// MIDI channel, 0–15.
    pub channel: u8,
    /// First data byte, 0–127.
    pub param1: u8,
    /// Second data byte, 0–127.
    pub param2: u8,
}

impl Message {
    /// An empty entry.
    pub const NONE: Message = Message {
        kind: MessageKind::None,
        channel: 0,
        param1: 0,
        param2: 0,
    };

    pub const fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            kind: MessageKind::ControlChange,
            channel,
            param1: controller,
            param2: value,
        }
    }

    pub const fn program_change(channel: u8, program: u8) -> Self {
        Self {
            kind: MessageKind::ProgramChange,
            channel,
            param1: program,
            param2: 0,
        }
    }

    pub const fn note(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            kind: MessageKind::Note,
            channel,
            param1: note,
            param2: velocity,
        }
    }

    /// Build a message from its four raw fields, validating each one.
    ///
    /// # Errors
    /// * [`MessageError::InvalidKind`] if `kind > 3`
    /// * [`MessageError::InvalidChannel`] if `channel > 15`
    /// * [`MessageError::InvalidParam`] if either parameter is above 127
    ///
    /// # Example
    /// ```
    /// use footswitch::mapping::{Message, MessageError};
    ///
    /// let cc = Message::from_fields(1, 0, 64, 127).unwrap();
    /// assert_eq!(cc, Message::control_change(0, 64, 127));
    /// assert_eq!(Message::from_fields(4, 0, 0, 0), Err(MessageError::InvalidKind));
    /// ```
    pub fn from_fields(kind: u8, channel: u8, param1: u8, param2: u8) -> Result<Self, MessageError> {
        let message = Self {
            kind: MessageKind::try_from(kind)?,
            channel,
            param1,
            param2,
        };
        message.validate()?;
        Ok(message)
    }

    /// The four fields in wire order: kind, channel, param1, param2.
    pub fn to_fields(&self) -> [u8; 4] {
        [self.kind.as_u8(), self.channel, self.param1, self.param2]
    }

    /// Check channel and parameter ranges.
    pub fn validate(&self) -> Result<(), MessageError> {
        if self.channel > MAX_CHANNEL {
            return Err(MessageError::InvalidChannel);
        }
        if self.param1 > MAX_DATA_VALUE || self.param2 > MAX_DATA_VALUE {
            return Err(MessageError::InvalidParam);
        }
        Ok(())
    }

    pub fn is_none(&self) -> bool {
        self.kind == MessageKind::None
    }

    /// Encode as a 4-byte USB-MIDI event packet on `cable`.
    ///
    /// Returns `None` for [`MessageKind::None`] and for messages that fail
    /// [`validate()`](Self::validate); such messages are never sent.
    ///
    /// # Example
    /// ```
    /// use footswitch::mapping::Message;
    ///
    /// let packet = Message::control_change(0, 64, 127).to_packet(0);
    /// assert_eq!(packet, Some([0x0B, 0xB0, 64, 127]));
    ///
    /// // Velocity 0 is sent as Note Off.
    /// let packet = Message::note(2, 60, 0).to_packet(0);
    /// assert_eq!(packet, Some([0x08, 0x82, 60, 0]));
    /// ```
    pub fn to_packet(&self, cable: u8) -> Option<[u8; 4]> {
        if self.validate().is_err() {
            return None;
        }

        let (status, data2) = match self.kind {
            MessageKind::None => return None,
            MessageKind::ControlChange => (0xB0, self.param2),
            MessageKind::ProgramChange => (0xC0, 0),
            MessageKind::Note if self.param2 > 0 => (0x90, self.param2),
            MessageKind::Note => (0x80, self.param2),
        };

        // Code index number equals the status high nibble for channel voice messages.
        let header = (cable & 0x0F) << 4 | status >> 4;
        Some([header, status | self.channel, self.param1, data2])
    }

    /// Decode a USB-MIDI event packet produced by [`to_packet()`](Self::to_packet).
    ///
    /// Only CC, PC, Note On and Note Off packets are recognised. The cable
    /// number is ignored.
    pub fn from_packet(packet: [u8; 4]) -> Option<Self> {
        let [header, status, data1, data2] = packet;
        let channel = status & 0x0F;

        if header & 0x0F != status >> 4 || data1 > MAX_DATA_VALUE || data2 > MAX_DATA_VALUE {
            return None;
        }

        match status & 0xF0 {
            0xB0 => Some(Self::control_change(channel, data1, data2)),
            0xC0 => Some(Self::program_change(channel, data1)),
            0x90 | 0x80 => Some(Self::note(channel, data1, data2)),
            _ => None,
        }
    }
}
