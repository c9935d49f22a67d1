use heapless::Vec;

use crate::mapping::{EventSlot, SwitchEvent};

use super::{ResponseCode, CAPTURE_LEN, DEVICE_PREAMBLE, PROTOCOL_VERSION, SYSEX_END, SYSEX_START};

/// An outgoing SysEx frame.
///
/// The largest response (a full ten-message slot) is 49 bytes, so every
/// response fits the same buffer size used for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    bytes: Vec<u8, CAPTURE_LEN>,
}

impl Response {
    /// `GetInfo` answer: switch count and protocol version.
    pub fn info(switch_count: usize) -> Self {
        let mut response = Self::start(ResponseCode::Info);
        response.push(switch_count as u8);
        response.push(PROTOCOL_VERSION);
        response.end()
    }

    /// `GetMessages` answer: the full slot for one switch transition.
    ///
    /// ```
    /// use footswitch::mapping::{Configuration, SwitchEvent};
    /// use footswitch::sysex::Response;
    ///
    /// let config = Configuration::defaults();
    /// let slot = config.slot(0, SwitchEvent::Press).unwrap();
    /// let response = Response::messages(0, SwitchEvent::Press, slot);
    /// assert_eq!(
    ///     response.as_bytes(),
    ///     &[0xF0, 0x00, 0x7D, 0x01, 0x03, 0, 0, 1, 1, 0, 64, 127, 0xF7],
    /// );
    /// ```
    pub fn messages(switch: usize, event: SwitchEvent, slot: &EventSlot) -> Self {
        let mut response = Self::start(ResponseCode::Messages);
        response.push(switch as u8);
        response.push(event.as_u8());
        response.push(slot.len() as u8);
        for message in slot.messages() {
            for field in message.to_fields() {
                response.push(field);
            }
        }
        response.end()
    }

    /// `SetMessages` answer: a single status byte.
    pub fn set_result(status: u8) -> Self {
        let mut response = Self::start(ResponseCode::SetResult);
        response.push(status);
        response.end()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn start(code: ResponseCode) -> Self {
        let mut response = Self { bytes: Vec::new() };
        response.push(SYSEX_START);
        for byte in DEVICE_PREAMBLE {
            response.push(byte);
        }
        response.push(code as u8);
        response
    }

    fn end(mut self) -> Self {
        self.push(SYSEX_END);
        self
    }

    // Responses are bounded well below capacity; a failed push cannot occur.
    fn push(&mut self, byte: u8) {
        let _ = self.bytes.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Message, MAX_MESSAGES_PER_SLOT};

    #[test]
    fn info_frame() {
        assert_eq!(
            Response::info(2).as_bytes(),
            &[0xF0, 0x00, 0x7D, 0x01, 0x05, 2, 2, 0xF7]
        );
    }

    #[test]
    fn set_result_frames() {
        assert_eq!(
            Response::set_result(0).as_bytes(),
            &[0xF0, 0x00, 0x7D, 0x01, 0x06, 0, 0xF7]
        );
        assert_eq!(Response::set_result(1).as_bytes()[5], 1);
    }

    #[test]
    fn empty_slot_reports_zero_messages() {
        let response = Response::messages(3, SwitchEvent::Release, &EventSlot::new());
        assert_eq!(
            response.as_bytes(),
            &[0xF0, 0x00, 0x7D, 0x01, 0x03, 3, 1, 0, 0xF7]
        );
    }

    #[test]
    fn full_slot_fits_and_is_terminated() {
        let messages = [Message::note(15, 127, 127); MAX_MESSAGES_PER_SLOT];
        let slot = EventSlot::from_messages(&messages).unwrap();
        let response = Response::messages(15, SwitchEvent::Press, &slot);
        let bytes = response.as_bytes();

        assert_eq!(bytes.len(), 9 + 4 * MAX_MESSAGES_PER_SLOT);
        assert_eq!(bytes[7], MAX_MESSAGES_PER_SLOT as u8);
        assert_eq!(&bytes[8..12], &[3, 15, 127, 127]);
        assert_eq!(bytes.last(), Some(&0xF7));
    }
}
