//! Collaborator interfaces consumed by the pipeline.
//!
//! The firmware crate implements these over the real GPIO, USB and flash
//! peripherals; the unit tests implement them in memory.

/// Raw digital inputs, one per switch.
pub trait SwitchInputs {
    /// Number of physical inputs.
    fn count(&self) -> usize;

    /// Instantaneous pin level. Switches pull the pin low when closed.
    fn is_high(&mut self, index: usize) -> bool;
}

/// Byte-stream MIDI transport.
///
/// `read`/`write` carry the plain MIDI byte stream (no USB-MIDI packet
/// headers); `send_packet` carries one complete USB-MIDI event packet.
/// None of these may block.
pub trait MidiTransport {
    /// `true` once the host has configured the device.
    fn is_mounted(&self) -> bool;

    /// Number of received bytes ready to [`read()`](Self::read).
    fn available(&mut self) -> usize;

    /// Copy up to `buf.len()` received bytes into `buf`, returning the count.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Queue one complete SysEx frame for transmission, returning how many
    /// bytes were accepted. Implementations queue the whole frame or none of
    /// it, so the result is `bytes.len()` or 0.
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Queue one USB-MIDI event packet. Returns `false` if it was dropped.
    fn send_packet(&mut self, packet: [u8; 4]) -> bool;
}

/// Non-volatile storage holding the persisted configuration.
///
/// Offsets are relative to the start of flash.
pub trait ConfigFlash {
    type Error;

    /// Erase `len` bytes starting at `offset` (block aligned).
    fn erase(&mut self, offset: u32, len: u32) -> Result<(), Self::Error>;

    /// Program previously erased bytes starting at `offset`.
    fn program(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read `buf.len()` bytes starting at `offset`.
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error>;
}
