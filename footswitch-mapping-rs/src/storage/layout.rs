//! Fixed byte layout of the persisted configuration image.
//!
//! The image is written field by field, independent of the in-memory
//! struct layout:
//!
//! ```text
//! offset  size  field
//! 0       4     magic (little-endian, CONFIG_MAGIC)
//! 4       1     switch count N (1..=16)
//! 5       41×2N event slots, switch-major, press before release:
//!                 1   message count (0..=10)
//!                 40  10 × (kind, channel, param1, param2), unused = 0
//! 5+82N   4     checksum (little-endian) over bytes [0, 5+82N)
//! ```

use crate::mapping::{Configuration, EventSlot, Message, SwitchEvent, MAX_MESSAGES_PER_SLOT, MAX_SWITCHES};

use super::error::ImageError;

/// Marks an initialised image ("MIDI").
pub const CONFIG_MAGIC: u32 = 0x4D49_4449;

/// Initial value of the checksum register.
pub const CHECKSUM_SEED: u32 = 0x1234_5678;

/// Bit-reversed CRC-32 polynomial.
const CRC_POLYNOMIAL: u32 = 0xEDB8_8320;

const HEADER_LEN: usize = 5;
const CHECKSUM_LEN: usize = 4;
const MESSAGE_LEN: usize = 4;

/// Bytes per stored event slot.
pub const SLOT_LEN: usize = 1 + MAX_MESSAGES_PER_SLOT * MESSAGE_LEN;

/// Image length for a configuration with `switch_count` switches.
pub const fn image_len(switch_count: usize) -> usize {
    HEADER_LEN + switch_count * 2 * SLOT_LEN + CHECKSUM_LEN
}

/// Largest possible image (16 switches).
pub const MAX_IMAGE_LEN: usize = image_len(MAX_SWITCHES);

/// CRC-32 variant used for the image checksum: reflected polynomial
/// `0xEDB88320`, seeded with [`CHECKSUM_SEED`], no final XOR.
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut crc = CHECKSUM_SEED;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC_POLYNOMIAL
            } else {
                crc >> 1
            };
        }
    }
    crc
}

/// Write the image of `config` into `buf`, returning its length.
///
/// The checksum is always recomputed over the freshly written bytes.
///
/// Returns [`ImageError::Truncated`] if `buf` is shorter than
/// [`image_len()`] for this configuration.
pub fn serialize(config: &Configuration, buf: &mut [u8]) -> Result<usize, ImageError> {
    let len = image_len(config.switch_count());
    let image = buf.get_mut(..len).ok_or(ImageError::Truncated)?;

    image[0..4].copy_from_slice(&CONFIG_MAGIC.to_le_bytes());
    image[4] = config.switch_count() as u8;

    let body = &mut image[HEADER_LEN..len - CHECKSUM_LEN];
    for ((_, _, slot), chunk) in config.slots().zip(body.chunks_exact_mut(SLOT_LEN)) {
        chunk.fill(0);
        chunk[0] = slot.len() as u8;
        for (message, fields) in slot.messages().iter().zip(chunk[1..].chunks_exact_mut(MESSAGE_LEN)) {
            fields.copy_from_slice(&message.to_fields());
        }
    }

    let crc = checksum(&image[..len - CHECKSUM_LEN]);
    image[len - CHECKSUM_LEN..].copy_from_slice(&crc.to_le_bytes());
    Ok(len)
}

/// Check the magic and checksum of a stored image without decoding the
/// slots. Returns `(image length, stored checksum)`.
pub fn verify(bytes: &[u8]) -> Result<(usize, u32), ImageError> {
    if bytes.len() < HEADER_LEN {
        return Err(ImageError::Truncated);
    }

    let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != CONFIG_MAGIC {
        return Err(ImageError::BadMagic);
    }

    let switch_count = bytes[4] as usize;
    if switch_count == 0 || switch_count > MAX_SWITCHES {
        return Err(ImageError::InvalidLayout);
    }

    let len = image_len(switch_count);
    let image = bytes.get(..len).ok_or(ImageError::Truncated)?;
    let (data, stored) = image.split_at(len - CHECKSUM_LEN);
    let stored = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);

    if checksum(data) != stored {
        return Err(ImageError::ChecksumMismatch);
    }
    Ok((len, stored))
}

/// Decode a stored image into a new [`Configuration`].
///
/// Accepts the image only if the magic and checksum match, the switch
/// count is in range, and every stored slot and message is valid.
pub fn deserialize(bytes: &[u8]) -> Result<Configuration, ImageError> {
    let (len, _) = verify(bytes)?;
    let switch_count = bytes[4] as usize;
    let mut config = Configuration::new(switch_count).map_err(|_| ImageError::InvalidLayout)?;

    let body = &bytes[HEADER_LEN..len - CHECKSUM_LEN];
    for (index, chunk) in body.chunks_exact(SLOT_LEN).enumerate() {
        let switch = index / 2;
        let event = if index % 2 == 0 {
            SwitchEvent::Press
        } else {
            SwitchEvent::Release
        };

        let count = chunk[0] as usize;
        if count > MAX_MESSAGES_PER_SLOT {
            return Err(ImageError::InvalidLayout);
        }

        let mut slot = EventSlot::new();
        for fields in chunk[1..].chunks_exact(MESSAGE_LEN).take(count) {
            let message = Message::from_fields(fields[0], fields[1], fields[2], fields[3])
                .map_err(|_| ImageError::InvalidLayout)?;
            slot.push(message).map_err(|_| ImageError::InvalidLayout)?;
        }

        config
            .set_slot(switch, event, slot)
            .map_err(|_| ImageError::InvalidLayout)?;
    }

    Ok(config)
}

/// Checksum that [`serialize()`] would store for `config`.
pub fn image_checksum(config: &Configuration) -> u32 {
    let mut buf = [0u8; MAX_IMAGE_LEN];
    match serialize(config, &mut buf) {
        Ok(len) => checksum(&buf[..len - CHECKSUM_LEN]),
        // MAX_IMAGE_LEN always fits.
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MAX_CHANNEL;

    fn image_of(config: &Configuration) -> ([u8; MAX_IMAGE_LEN], usize) {
        let mut buf = [0u8; MAX_IMAGE_LEN];
        let len = serialize(config, &mut buf).unwrap();
        (buf, len)
    }

    fn full_config() -> Configuration {
        let mut config = Configuration::new(MAX_SWITCHES).unwrap();
        for switch in 0..MAX_SWITCHES {
            for event in SwitchEvent::ALL {
                let mut slot = EventSlot::new();
                for i in 0..MAX_MESSAGES_PER_SLOT {
                    let n = ((switch * 10 + i) % 128) as u8;
                    let message = match i % 3 {
                        0 => Message::control_change(n % (MAX_CHANNEL + 1), n, 127 - n),
                        1 => Message::program_change(switch as u8, n),
                        _ => Message::note(15, n, event.as_u8() * 100),
                    };
                    slot.push(message).unwrap();
                }
                config.set_slot(switch, event, slot).unwrap();
            }
        }
        config
    }

    #[test]
    fn image_length_matches_layout() {
        assert_eq!(SLOT_LEN, 41);
        assert_eq!(image_len(2), 5 + 4 * 41 + 4);
        assert_eq!(MAX_IMAGE_LEN, 1321);
    }

    #[test]
    fn checksum_empty_input_is_seed() {
        assert_eq!(checksum(&[]), CHECKSUM_SEED);
    }

    #[test]
    fn checksum_single_byte() {
        // Hand-computed: seed ^ 0x00 shifted through 8 rounds.
        let mut crc = CHECKSUM_SEED;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
        assert_eq!(checksum(&[0x00]), crc);
        assert_ne!(checksum(&[0x00]), checksum(&[0x01]));
    }

    #[test]
    fn default_image_header_and_first_slot() {
        let (buf, len) = image_of(&Configuration::defaults());
        assert_eq!(len, image_len(2));
        assert_eq!(&buf[0..4], &[0x49, 0x44, 0x49, 0x4D]);
        assert_eq!(buf[4], 2);
        // Switch 0 press: one CC ch0 #64 = 127, rest zero.
        assert_eq!(&buf[5..10], &[1, 1, 0, 64, 127]);
        assert!(buf[10..5 + SLOT_LEN].iter().all(|&b| b == 0));
    }

    #[test]
    fn round_trip_defaults() {
        let config = Configuration::defaults();
        let (buf, len) = image_of(&config);
        assert_eq!(deserialize(&buf[..len]).unwrap(), config);
    }

    #[test]
    fn round_trip_full_table() {
        let config = full_config();
        let (buf, len) = image_of(&config);
        assert_eq!(len, MAX_IMAGE_LEN);
        assert_eq!(deserialize(&buf[..len]).unwrap(), config);
    }

    #[test]
    fn round_trip_empty_slots() {
        let config = Configuration::new(5).unwrap();
        let (buf, len) = image_of(&config);
        assert_eq!(deserialize(&buf[..len]).unwrap(), config);
    }

    #[test]
    fn stored_checksum_matches_configuration_checksum() {
        let config = full_config();
        let (buf, len) = image_of(&config);
        assert_eq!(verify(&buf[..len]).unwrap(), (len, config.checksum()));
    }

    #[test]
    fn erased_flash_is_bad_magic() {
        let erased = [0xFFu8; MAX_IMAGE_LEN];
        assert_eq!(deserialize(&erased), Err(ImageError::BadMagic));
    }

    #[test]
    fn any_checksum_byte_corruption_is_detected() {
        let (buf, len) = image_of(&Configuration::defaults());
        for i in len - 4..len {
            let mut corrupted = buf;
            corrupted[i] ^= 0x01;
            assert_eq!(deserialize(&corrupted[..len]), Err(ImageError::ChecksumMismatch));
        }
    }

    #[test]
    fn body_corruption_is_detected() {
        let (mut buf, len) = image_of(&Configuration::defaults());
        buf[8] = 65;
        assert_eq!(deserialize(&buf[..len]), Err(ImageError::ChecksumMismatch));
    }

    #[test]
    fn switch_count_out_of_range_is_invalid() {
        let (mut buf, len) = image_of(&Configuration::defaults());
        buf[4] = 0;
        assert_eq!(deserialize(&buf[..len]), Err(ImageError::InvalidLayout));
        buf[4] = 17;
        assert_eq!(deserialize(&buf), Err(ImageError::InvalidLayout));
    }

    #[test]
    fn truncated_image() {
        let (buf, len) = image_of(&Configuration::defaults());
        assert_eq!(deserialize(&buf[..3]), Err(ImageError::Truncated));
        assert_eq!(deserialize(&buf[..len - 1]), Err(ImageError::Truncated));
    }

    #[test]
    fn invalid_stored_message_is_rejected_even_with_valid_checksum() {
        let (mut buf, len) = image_of(&Configuration::defaults());
        // Channel 16 in the first message, then re-seal the checksum.
        buf[7] = 16;
        let crc = checksum(&buf[..len - 4]);
        buf[len - 4..len].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(deserialize(&buf[..len]), Err(ImageError::InvalidLayout));
    }

    #[test]
    fn slot_count_above_ten_is_rejected() {
        let (mut buf, len) = image_of(&Configuration::defaults());
        buf[5] = 11;
        let crc = checksum(&buf[..len - 4]);
        buf[len - 4..len].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(deserialize(&buf[..len]), Err(ImageError::InvalidLayout));
    }

    #[test]
    fn serialize_into_short_buffer_fails() {
        let mut buf = [0u8; 16];
        assert_eq!(
            serialize(&Configuration::defaults(), &mut buf),
            Err(ImageError::Truncated)
        );
    }
}
