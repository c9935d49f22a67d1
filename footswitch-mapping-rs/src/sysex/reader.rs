use crate::mapping::Message;

use super::error::ProtocolError;
use super::{Command, DEVICE_PREAMBLE, MIN_FRAME_LEN, SYSEX_END, SYSEX_START};

/// Bounds-checked cursor over a request payload.
///
/// Every read checks the remaining length first, so a truncated frame
/// surfaces as [`ProtocolError::FrameTooShort`] instead of a panic.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(ProtocolError::FrameTooShort)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read one byte and require it to be `< limit`.
    pub fn read_below(&mut self, limit: usize) -> Result<u8, ProtocolError> {
        let byte = self.read_u8()?;
        if byte as usize >= limit {
            return Err(ProtocolError::FieldOutOfRange);
        }
        Ok(byte)
    }

    /// Read one byte and require it to be `<= max`.
    pub fn read_at_most(&mut self, max: usize) -> Result<u8, ProtocolError> {
        let byte = self.read_u8()?;
        if byte as usize > max {
            return Err(ProtocolError::FieldOutOfRange);
        }
        Ok(byte)
    }

    /// Read four message fields and validate them.
    pub fn read_message(&mut self) -> Result<Message, ProtocolError> {
        if self.remaining() < 4 {
            return Err(ProtocolError::FrameTooShort);
        }
        let fields = &self.bytes[self.pos..self.pos + 4];
        self.pos += 4;
        Message::from_fields(fields[0], fields[1], fields[2], fields[3])
            .map_err(|_| ProtocolError::FieldOutOfRange)
    }

    /// Require the payload to be fully consumed.
    pub fn finish(&self) -> Result<(), ProtocolError> {
        if self.remaining() != 0 {
            return Err(ProtocolError::TrailingBytes);
        }
        Ok(())
    }
}

/// Check the framing of a captured SysEx frame and split off its command.
///
/// Returns the decoded command and a reader positioned at the first payload
/// byte. The payload excludes the trailing end marker.
///
/// # Errors
/// * [`ProtocolError::FrameTooShort`] if shorter than [`MIN_FRAME_LEN`]
/// * [`ProtocolError::BadPreamble`] for missing markers or a foreign id
/// * [`ProtocolError::UnknownCommand`] for an unrecognised command byte
///
/// # Example
/// ```
/// use footswitch::sysex::{open_frame, Command};
///
/// let (command, payload) = open_frame(&[0xF0, 0x00, 0x7D, 0x01, 0x02, 0x01, 0x00, 0xF7]).unwrap();
/// assert_eq!(command, Command::GetMessages);
/// assert_eq!(payload.remaining(), 2);
/// ```
pub fn open_frame(frame: &[u8]) -> Result<(Command, FrameReader<'_>), ProtocolError> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(ProtocolError::FrameTooShort);
    }
    let last = frame.len() - 1;
    if frame[0] != SYSEX_START || frame[last] != SYSEX_END || frame[1..4] != DEVICE_PREAMBLE {
        return Err(ProtocolError::BadPreamble);
    }

    let command = Command::try_from(frame[4])?;
    Ok((command, FrameReader::new(&frame[5..last])))
}
