//! USB-MIDI event packet helpers.
//!
//! USB-MIDI 1.0 carries MIDI as 4-byte event packets: a header byte holding
//! the cable number (high nibble) and code index number, or CIN (low nibble),
//! followed by up to three MIDI bytes. These helpers convert between packets
//! and the plain MIDI byte stream the SysEx receiver consumes.

/// CIN for a SysEx start or continuation carrying three bytes.
pub const CIN_SYSEX_CONTINUE: u8 = 0x4;

/// CIN for a SysEx end carrying one, two or three bytes is this plus the
/// byte count minus one.
pub const CIN_SYSEX_END_1: u8 = 0x5;

/// Number of MIDI bytes carried by a packet with the given CIN.
pub const fn payload_len(cin: u8) -> usize {
    match cin & 0x0F {
        0x5 | 0xF => 1,
        0x2 | 0x6 | 0xC | 0xD => 2,
        0x3 | 0x4 | 0x7 | 0x8 | 0x9 | 0xA | 0xB | 0xE => 3,
        // 0x0 and 0x1 are reserved.
        _ => 0,
    }
}

/// The MIDI bytes carried by one event packet.
///
/// ```
/// use footswitch::usb_midi::payload;
///
/// assert_eq!(payload(&[0x0C, 0xC0, 5, 0]), &[0xC0, 5]);
/// assert_eq!(payload(&[0x06, 0x01, 0xF7, 0]), &[0x01, 0xF7]);
/// ```
pub fn payload(packet: &[u8; 4]) -> &[u8] {
    &packet[1..1 + payload_len(packet[0])]
}

/// Splits a complete SysEx frame into USB-MIDI event packets.
///
/// Every packet but the last uses [`CIN_SYSEX_CONTINUE`]; the last one
/// carries the remaining one to three bytes with the matching end CIN and
/// zero padding.
///
/// ```
/// use footswitch::usb_midi::SysexPacketizer;
///
/// let mut packets = SysexPacketizer::new(&[0xF0, 0x00, 0x7D, 0x01, 0x04, 0xF7], 0);
/// assert_eq!(packets.next(), Some([0x04, 0xF0, 0x00, 0x7D]));
/// assert_eq!(packets.next(), Some([0x07, 0x01, 0x04, 0xF7]));
/// assert_eq!(packets.next(), None);
/// ```
#[derive(Debug, Clone)]
pub struct SysexPacketizer<'a> {
    bytes: &'a [u8],
    header: u8,
}

impl<'a> SysexPacketizer<'a> {
    pub fn new(frame: &'a [u8], cable: u8) -> Self {
        Self {
            bytes: frame,
            header: (cable & 0x0F) << 4,
        }
    }
}

impl Iterator for SysexPacketizer<'_> {
    type Item = [u8; 4];

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }

        let (chunk, cin) = if self.bytes.len() > 3 {
            (&self.bytes[..3], CIN_SYSEX_CONTINUE)
        } else {
            (self.bytes, CIN_SYSEX_END_1 + self.bytes.len() as u8 - 1)
        };
        self.bytes = &self.bytes[chunk.len()..];

        let mut packet = [self.header | cin, 0, 0, 0];
        packet[1..1 + chunk.len()].copy_from_slice(chunk);
        Some(packet)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bytes.len().div_ceil(3);
        (n, Some(n))
    }
}

impl ExactSizeIterator for SysexPacketizer<'_> {}

/// Queue a whole SysEx frame or none of it.
///
/// `free` is the number of packet slots the queue can still take; `send`
/// enqueues one packet. When the frame needs more than `free` packets nothing
/// is queued, so the host never sees a start marker without its end.
///
/// Returns the number of frame bytes queued: `frame.len()` or 0.
///
/// ```
/// use footswitch::usb_midi::queue_sysex;
///
/// let frame = [0xF0, 0x00, 0x7D, 0x01, 0x04, 0xF7];
/// let mut queued = 0;
/// assert_eq!(queue_sysex(&frame, 0, 1, |_| { queued += 1; true }), 0);
/// assert_eq!(queue_sysex(&frame, 0, 2, |_| { queued += 1; true }), 6);
/// assert_eq!(queued, 2);
/// ```
pub fn queue_sysex<S>(frame: &[u8], cable: u8, free: usize, mut send: S) -> usize
where
    S: FnMut([u8; 4]) -> bool,
{
    let packets = SysexPacketizer::new(frame, cable);
    if packets.len() > free {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "SysEx frame needs {} packets, {} free; dropped",
            packets.len(),
            free
        );
        return 0;
    }

    let mut queued = 0;
    for packet in packets {
        if !send(packet) {
            #[cfg(feature = "defmt")]
            defmt::error!("Packet queue shrank mid-frame after {} bytes", queued);
            break;
        }
        queued += payload(&packet).len();
    }
    queued
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn reassemble(frame: &[u8]) -> Vec<u8, 64> {
        let mut out = Vec::new();
        for packet in SysexPacketizer::new(frame, 0) {
            out.extend_from_slice(payload(&packet)).unwrap();
        }
        out
    }

    #[test]
    fn channel_voice_payload_lengths() {
        assert_eq!(payload(&[0x0B, 0xB0, 64, 127]).len(), 3);
        assert_eq!(payload(&[0x09, 0x90, 60, 100]).len(), 3);
        assert_eq!(payload(&[0x08, 0x80, 60, 0]).len(), 3);
        assert_eq!(payload(&[0x0C, 0xC3, 7, 0]).len(), 2);
        assert_eq!(payload(&[0x0D, 0xD0, 7, 0]).len(), 2);
    }

    #[test]
    fn cable_nibble_is_ignored() {
        assert_eq!(payload(&[0x5B, 0xB0, 1, 2]), &[0xB0, 1, 2]);
    }

    #[test]
    fn reserved_cin_carries_nothing() {
        assert!(payload(&[0x00, 0xF0, 1, 2]).is_empty());
        assert!(payload(&[0x01, 0xF0, 1, 2]).is_empty());
    }

    #[test]
    fn end_cin_matches_tail_length() {
        let tail = |frame: &[u8]| SysexPacketizer::new(frame, 0).last().unwrap();

        assert_eq!(tail(&[0xF0, 1, 2, 0xF7]), [0x05, 0xF7, 0, 0]);
        assert_eq!(tail(&[0xF0, 1, 2, 3, 0xF7]), [0x06, 3, 0xF7, 0]);
        assert_eq!(tail(&[0xF0, 1, 0xF7]), [0x07, 0xF0, 1, 0xF7]);
    }

    #[test]
    fn packet_count_and_cable() {
        let frame = [0xF0, 0x00, 0x7D, 0x01, 0x03, 0, 0, 1, 1, 0, 64, 127, 0xF7];
        let packets = SysexPacketizer::new(&frame, 2);
        assert_eq!(packets.len(), 5);
        assert!(packets.clone().all(|p| p[0] >> 4 == 2));
        assert_eq!(reassemble(&frame).as_slice(), &frame);
    }

    #[test]
    fn empty_frame_yields_no_packets() {
        assert_eq!(SysexPacketizer::new(&[], 0).next(), None);
    }

    /// Bounded packet queue standing in for the USB IN channel.
    fn queue_into<const N: usize>(queue: &mut Vec<[u8; 4], N>, frame: &[u8]) -> usize {
        let free = N - queue.len();
        queue_sysex(frame, 0, free, |packet| queue.push(packet).is_ok())
    }

    #[test]
    fn frame_that_fits_is_queued_whole() {
        let frame = [0xF0, 0x00, 0x7D, 0x01, 0x03, 0, 0, 1, 1, 0, 64, 127, 0xF7];
        let mut queue: Vec<[u8; 4], 5> = Vec::new();

        assert_eq!(queue_into(&mut queue, &frame), frame.len());
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.last().map(|p| p[0]), Some(CIN_SYSEX_END_1));
    }

    #[test]
    fn frame_that_does_not_fit_queues_nothing() {
        let frame = [0xF0, 0x00, 0x7D, 0x01, 0x03, 0, 0, 1, 1, 0, 64, 127, 0xF7];
        let mut queue: Vec<[u8; 4], 8> = Vec::new();
        // A note packet from the router already occupies a slot.
        queue.push([0x09, 0x90, 60, 100]).unwrap();
        assert_eq!(queue_into(&mut queue, &frame), frame.len());

        // Two slots left; the second frame needs five.
        assert_eq!(queue_into(&mut queue, &frame), 0);
        assert_eq!(queue.len(), 6);

        // Every queued SysEx start is followed by its end.
        let starts = queue.iter().filter(|p| p[1] == 0xF0).count();
        let ends = queue.iter().filter(|p| payload(p).last() == Some(&0xF7)).count();
        assert_eq!((starts, ends), (1, 1));
    }

    #[test]
    fn stream_of_dump_frames_never_splits_one() {
        // Ten-message reads back to back, as a full dump produces them.
        let mut frame = [0u8; 49];
        frame[..5].copy_from_slice(&[0xF0, 0x00, 0x7D, 0x01, 0x03]);
        frame[48] = 0xF7;
        let mut queue: Vec<[u8; 4], 40> = Vec::new();

        let mut whole = 0;
        for _ in 0..4 {
            match queue_into(&mut queue, &frame) {
                0 => {}
                n => {
                    assert_eq!(n, frame.len());
                    whole += 1;
                }
            }
        }
        // 17 packets per frame: two fit, the rest are dropped whole.
        assert_eq!(whole, 2);
        assert_eq!(queue.len(), 34);
        assert_eq!(payload(&queue[33]).last(), Some(&0xF7));
    }
}
