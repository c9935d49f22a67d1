//! In-memory collaborators for the unit tests.

use heapless::{Deque, Vec};

use crate::hal::{ConfigFlash, MidiTransport, SwitchInputs};
use crate::mapping::MAX_SWITCHES;
use crate::storage::{ERASE_SIZE, STORAGE_OFFSET};

const REGION_LEN: usize = ERASE_SIZE as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemFlashError {
    OutOfBounds,
    ProgramFailed,
}

/// One erase block of NOR flash located at [`STORAGE_OFFSET`].
///
/// Programming can only clear bits, like the real part.
pub(crate) struct MemFlash {
    pub data: [u8; REGION_LEN],
    pub erase_count: usize,
    pub program_count: usize,
    pub last_program_len: usize,
    pub fail_program: bool,
    /// Byte index (within the region) that always reads back as zero.
    pub stuck_low: Option<usize>,
}

impl MemFlash {
    pub fn new() -> Self {
        Self {
            data: [0xFF; REGION_LEN],
            erase_count: 0,
            program_count: 0,
            last_program_len: 0,
            fail_program: false,
            stuck_low: None,
        }
    }

    fn range(offset: u32, len: usize) -> Result<core::ops::Range<usize>, MemFlashError> {
        let start = offset
            .checked_sub(STORAGE_OFFSET)
            .ok_or(MemFlashError::OutOfBounds)? as usize;
        let end = start + len;
        if end > REGION_LEN {
            return Err(MemFlashError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl ConfigFlash for MemFlash {
    type Error = MemFlashError;

    fn erase(&mut self, offset: u32, len: u32) -> Result<(), Self::Error> {
        let range = Self::range(offset, len as usize)?;
        self.data[range].fill(0xFF);
        self.erase_count += 1;
        Ok(())
    }

    fn program(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_program {
            return Err(MemFlashError::ProgramFailed);
        }
        let range = Self::range(offset, bytes.len())?;
        for (cell, byte) in self.data[range].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        if let Some(index) = self.stuck_low {
            self.data[index] = 0;
        }
        self.program_count += 1;
        self.last_program_len = bytes.len();
        Ok(())
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }
}

/// Input pins driven by the test. All switches start open (high).
pub(crate) struct TestPins {
    pub high: [bool; MAX_SWITCHES],
    pub count: usize,
}

impl TestPins {
    pub fn new(count: usize) -> Self {
        Self {
            high: [true; MAX_SWITCHES],
            count,
        }
    }

    pub fn press(&mut self, index: usize) {
        self.high[index] = false;
    }

    pub fn release(&mut self, index: usize) {
        self.high[index] = true;
    }
}

impl SwitchInputs for TestPins {
    fn count(&self) -> usize {
        self.count
    }

    fn is_high(&mut self, index: usize) -> bool {
        self.high[index]
    }
}

/// Transport that records everything sent and replays queued input.
pub(crate) struct TestTransport {
    pub mounted: bool,
    /// Maximum bytes handed out per `read()` call.
    pub chunk: usize,
    rx: Deque<u8, 512>,
    pub packets: Vec<[u8; 4], 128>,
    pub written: Vec<u8, 2048>,
}

impl TestTransport {
    pub fn new() -> Self {
        Self {
            mounted: true,
            chunk: 32,
            rx: Deque::new(),
            packets: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Queue bytes as if the host had sent them.
    pub fn deliver(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.rx.push_back(b).unwrap();
        }
    }

    /// Responses written so far, one slice per SysEx frame.
    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.written.split_inclusive(|&b| b == 0xF7)
    }

    pub fn frame_count(&self) -> usize {
        self.frames().count()
    }

    pub fn clear(&mut self) {
        self.packets.clear();
        self.written.clear();
    }
}

impl MidiTransport for TestTransport {
    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() && n < self.chunk {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.written.extend_from_slice(bytes).unwrap();
        bytes.len()
    }

    fn send_packet(&mut self, packet: [u8; 4]) -> bool {
        self.packets.push(packet).is_ok()
    }
}
