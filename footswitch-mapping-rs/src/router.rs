use crate::hal::MidiTransport;
use crate::mapping::{Configuration, SwitchEvent};

/// Send every message bound to one switch transition, in slot order.
///
/// `None` entries and messages that fail validation are skipped. Nothing is
/// sent while the transport is not mounted, and events for switches beyond
/// the configured count are ignored.
///
/// Returns the number of packets the transport accepted.
pub fn route<T: MidiTransport>(
    config: &Configuration,
    switch: usize,
    event: SwitchEvent,
    cable: u8,
    transport: &mut T,
) -> usize {
    let Ok(slot) = config.slot(switch, event) else {
        return 0;
    };
    if !transport.is_mounted() {
        return 0;
    }

    let mut sent = 0;
    for packet in slot.messages().iter().filter_map(|m| m.to_packet(cable)) {
        if transport.send_packet(packet) {
            sent += 1;
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("Transport full; dropped {:02x}", packet);
        }
    }
    sent
}
