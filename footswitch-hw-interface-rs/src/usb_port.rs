//! Bridges the synchronous main cycle to the async USB-MIDI endpoints.
//!
//! The rx/tx tasks in `main.rs` move 4-byte event packets between the MIDI
//! class endpoints and two bounded channels. [`UsbMidiPort`] is the
//! non-blocking [`MidiTransport`] the controller sees: it unpacks received
//! packets into a byte stream and packetises outgoing SysEx.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::Handler;
use heapless::Deque;

use footswitch::hal::MidiTransport;
use footswitch::usb_midi::{payload, queue_sysex};

/// Packets received from the host, waiting for the main cycle.
pub static RX_PACKETS: Channel<CriticalSectionRawMutex, [u8; 4], 32> = Channel::new();

/// Packets queued by the main cycle, waiting for the IN endpoint.
///
/// Sized so a `GetAllMessages` dump of the stock two-switch table fits.
/// Frames are queued whole or not at all; see [`queue_sysex`].
pub static TX_PACKETS: Channel<CriticalSectionRawMutex, [u8; 4], 128> = Channel::new();

/// Set while the host has the device configured.
static MOUNTED: AtomicBool = AtomicBool::new(false);

/// Tracks the USB configured state for [`UsbMidiPort::is_mounted()`].
pub struct MountHandler;

impl Handler for MountHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            MOUNTED.store(false, Ordering::Relaxed);
        }
    }

    fn reset(&mut self) {
        MOUNTED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        defmt::info!("USB {}", if configured { "mounted" } else { "unmounted" });
        MOUNTED.store(configured, Ordering::Relaxed);
    }
}

/// [`MidiTransport`] over the packet channels.
pub struct UsbMidiPort {
    cable: u8,
    pending: Deque<u8, 64>,
}

impl UsbMidiPort {
    pub fn new(cable: u8) -> Self {
        Self {
            cable,
            pending: Deque::new(),
        }
    }

    /// Move received packets into the byte queue while a full payload fits.
    fn refill(&mut self) {
        while self.pending.capacity() - self.pending.len() >= 3 {
            let Ok(packet) = RX_PACKETS.try_receive() else {
                break;
            };
            for &byte in payload(&packet) {
                // Room for three bytes was checked above.
                let _ = self.pending.push_back(byte);
            }
        }
    }
}

impl MidiTransport for UsbMidiPort {
    fn is_mounted(&self) -> bool {
        MOUNTED.load(Ordering::Relaxed)
    }

    fn available(&mut self) -> usize {
        self.refill();
        self.pending.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.refill();
        let mut n = 0;
        while n < buf.len() {
            let Some(byte) = self.pending.pop_front() else {
                break;
            };
            buf[n] = byte;
            n += 1;
        }
        n
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        // Only this task sends on TX_PACKETS, so the free space cannot shrink
        // while the frame is queued.
        queue_sysex(bytes, self.cable, TX_PACKETS.free_capacity(), |packet| {
            TX_PACKETS.try_send(packet).is_ok()
        })
    }

    fn send_packet(&mut self, packet: [u8; 4]) -> bool {
        TX_PACKETS.try_send(packet).is_ok()
    }
}
