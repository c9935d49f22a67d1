//! Byte-at-a-time SysEx frame capture.

use heapless::Vec;

use super::error::ProtocolError;
use super::{CAPTURE_LEN, SYSEX_END, SYSEX_START};

/// Capture state of a [`SysexReceiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureState {
    /// Waiting for a frame start; other bytes are ignored.
    Idle,
    /// Inside a frame, appending bytes to the capture buffer.
    Capturing,
}

/// Reassembles SysEx frames from a MIDI byte stream.
///
/// State survives between calls, so a frame split across several transport
/// reads is completed when its last fragment arrives.
///
/// # Transitions
///
/// - `0xF0` in any state → `Capturing`, buffer reset to `[0xF0]`.
/// - other bytes while `Idle` → ignored.
/// - `0xF7` while `Capturing` with room → frame complete, back to `Idle`.
/// - any byte while `Capturing` with the buffer full → frame discarded,
///   back to `Idle`, [`ProtocolError::BufferOverflow`] recorded.
///
/// # Example
///
/// ```
/// use footswitch::sysex::SysexReceiver;
///
/// let mut rx = SysexReceiver::new();
/// assert!(rx.push(0xF0).is_none());
/// for b in [0x00, 0x7D, 0x01, 0x04] {
///     assert!(rx.push(b).is_none());
/// }
/// assert_eq!(rx.push(0xF7), Some(&[0xF0, 0x00, 0x7D, 0x01, 0x04, 0xF7][..]));
/// ```
pub struct SysexReceiver {
    state: CaptureState,
    buffer: Vec<u8, CAPTURE_LEN>,
    overflows: u32,
    last_error: Option<ProtocolError>,
}

impl Default for SysexReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl SysexReceiver {
    pub const fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            buffer: Vec::new(),
            overflows: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Number of frames discarded because they did not fit the buffer.
    pub fn overflow_count(&self) -> u32 {
        self.overflows
    }

    /// Why the most recent frame was dropped during capture, if it was.
    ///
    /// Cleared by the next start marker.
    pub fn last_error(&self) -> Option<ProtocolError> {
        self.last_error
    }

    /// Feed one byte. Returns the complete frame, markers included, when
    /// `byte` finishes one.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        match (self.state, byte) {
            (_, SYSEX_START) => {
                self.buffer.clear();
                self.last_error = None;
                // Empty buffer always has room.
                let _ = self.buffer.push(byte);
                self.state = CaptureState::Capturing;
                None
            }
            (CaptureState::Idle, _) => None,
            (CaptureState::Capturing, SYSEX_END) => {
                if self.buffer.push(byte).is_err() {
                    self.discard();
                    return None;
                }
                self.state = CaptureState::Idle;
                Some(&self.buffer)
            }
            (CaptureState::Capturing, _) => {
                if self.buffer.push(byte).is_err() {
                    self.discard();
                }
                None
            }
        }
    }

    /// Drop the partial frame after a buffer overflow.
    fn discard(&mut self) {
        let error = ProtocolError::BufferOverflow;

        #[cfg(feature = "defmt")]
        defmt::warn!("{}: frame exceeds {} bytes", error, CAPTURE_LEN);

        self.buffer.clear();
        self.state = CaptureState::Idle;
        self.overflows = self.overflows.wrapping_add(1);
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_INFO: [u8; 6] = [0xF0, 0x00, 0x7D, 0x01, 0x04, 0xF7];

    /// Push a byte sequence, returning how many frames completed and the
    /// length of the last one.
    fn feed(rx: &mut SysexReceiver, bytes: &[u8]) -> (usize, usize) {
        let mut frames = 0;
        let mut last_len = 0;
        for &b in bytes {
            if let Some(frame) = rx.push(b) {
                frames += 1;
                last_len = frame.len();
            }
        }
        (frames, last_len)
    }

    #[test]
    fn starts_idle() {
        let rx = SysexReceiver::new();
        assert_eq!(rx.state(), CaptureState::Idle);
    }

    #[test]
    fn ignores_non_sysex_traffic_while_idle() {
        let mut rx = SysexReceiver::new();
        // Note On, clock, stray end marker.
        assert_eq!(feed(&mut rx, &[0x90, 60, 100, 0xF8, 0xF7]), (0, 0));
        assert_eq!(rx.state(), CaptureState::Idle);
    }

    #[test]
    fn completes_frame_across_fragments() {
        let mut rx = SysexReceiver::new();
        assert_eq!(feed(&mut rx, &GET_INFO[..2]), (0, 0));
        assert_eq!(rx.state(), CaptureState::Capturing);
        assert_eq!(feed(&mut rx, &GET_INFO[2..5]), (0, 0));
        assert_eq!(feed(&mut rx, &GET_INFO[5..]), (1, 6));
        assert_eq!(rx.state(), CaptureState::Idle);
    }

    #[test]
    fn start_marker_restarts_capture() {
        let mut rx = SysexReceiver::new();
        feed(&mut rx, &[0xF0, 0x00, 0x7D, 0x01, 0x02, 0x00]);
        let mut frame_len = 0;
        for &b in &GET_INFO {
            if let Some(frame) = rx.push(b) {
                assert_eq!(frame, &GET_INFO);
                frame_len = frame.len();
            }
        }
        assert_eq!(frame_len, GET_INFO.len());
    }

    #[test]
    fn frame_filling_buffer_exactly_is_accepted() {
        let mut rx = SysexReceiver::new();
        rx.push(0xF0);
        for _ in 0..CAPTURE_LEN - 2 {
            rx.push(0x11);
        }
        assert_eq!(rx.push(0xF7).map(|f| f.len()), Some(CAPTURE_LEN));
        assert_eq!(rx.overflow_count(), 0);
        assert_eq!(rx.last_error(), None);
    }

    #[test]
    fn end_marker_without_room_discards_frame() {
        let mut rx = SysexReceiver::new();
        rx.push(0xF0);
        for _ in 0..CAPTURE_LEN - 1 {
            rx.push(0x11);
        }
        assert_eq!(rx.push(0xF7), None);
        assert_eq!(rx.state(), CaptureState::Idle);
        assert_eq!(rx.overflow_count(), 1);
        assert_eq!(rx.last_error(), Some(ProtocolError::BufferOverflow));
    }

    #[test]
    fn overflow_discards_rest_of_frame_and_recovers() {
        let mut rx = SysexReceiver::new();
        rx.push(0xF0);
        for _ in 0..CAPTURE_LEN + 10 {
            rx.push(0x22);
        }
        assert_eq!(rx.state(), CaptureState::Idle);
        // The oversized frame's end marker arrives while idle: ignored.
        assert_eq!(rx.push(0xF7), None);
        assert_eq!(rx.overflow_count(), 1);
        assert_eq!(rx.last_error(), Some(ProtocolError::BufferOverflow));

        // Next frame still works and clears the error.
        assert_eq!(feed(&mut rx, &GET_INFO), (1, 6));
        assert_eq!(rx.last_error(), None);
    }

    #[test]
    fn back_to_back_frames() {
        let mut rx = SysexReceiver::new();
        let mut stream = [0u8; 12];
        stream[..6].copy_from_slice(&GET_INFO);
        stream[6..].copy_from_slice(&GET_INFO);
        assert_eq!(feed(&mut rx, &stream), (2, 6));
    }
}
