//! Persistence of the mapping table in on-chip flash.
//!
//! Split into two layers:
//!
//! - **`layout`**: pure serialise/deserialise functions for the fixed
//!   byte image, including the magic value and CRC-32 checksum.
//! - **[`ConfigStore`]**: erase/program/verify and boot-time load against a
//!   [`ConfigFlash`](crate::hal::ConfigFlash) implementation.

mod error;
mod layout;
mod store;

pub use error::{ImageError, StoreError};
pub use layout::{
    checksum, deserialize, image_checksum, image_len, serialize, verify, CHECKSUM_SEED,
    CONFIG_MAGIC, MAX_IMAGE_LEN, SLOT_LEN,
};
pub use store::{BootSource, ConfigStore, ERASE_SIZE, PAGE_SIZE, STORAGE_OFFSET};
