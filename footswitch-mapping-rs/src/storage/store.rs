//! Flash-backed configuration store.
//!
//! [`ConfigStore`] owns the flash peripheral and the location of the
//! configuration region. It never holds the live [`Configuration`] itself;
//! callers pass it in to [`persist()`](ConfigStore::persist) and receive a
//! fresh one from [`load()`](ConfigStore::load), so a failed load can never
//! clobber the running mapping.

use crate::hal::ConfigFlash;
use crate::mapping::Configuration;

use super::error::StoreError;
use super::layout::{deserialize, serialize, verify, MAX_IMAGE_LEN};

/// Default offset of the configuration region from the start of flash.
pub const STORAGE_OFFSET: u32 = 256 * 1024;

/// Erase granularity (one flash sector).
pub const ERASE_SIZE: u32 = 4096;

/// Program granularity (one flash page).
pub const PAGE_SIZE: usize = 256;

/// Image buffer padded to a whole number of pages.
const PROGRAM_BUF_LEN: usize = MAX_IMAGE_LEN.next_multiple_of(PAGE_SIZE);

/// Which path the boot sequence took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootSource {
    /// A valid configuration was found in flash.
    Loaded,
    /// Storage was empty or corrupt; defaults were installed. `persisted`
    /// reports whether writing them back succeeded.
    Defaulted { persisted: bool },
}

/// Persistence for the mapping table.
///
/// # Example
///
/// ```ignore
/// let mut store = ConfigStore::new(flash, STORAGE_OFFSET);
/// let (config, source) = store.load_or_default();
/// ```
pub struct ConfigStore<F> {
    flash: F,
    offset: u32,
}

impl<F> ConfigStore<F>
where
    F: ConfigFlash,
{
    /// Create a store over the region starting at `offset`.
    ///
    /// No flash traffic is generated.
    pub fn new(flash: F, offset: u32) -> Self {
        Self { flash, offset }
    }

    /// Write `config` to flash and verify it.
    ///
    /// The image (magic, tables, freshly computed checksum) is built in
    /// RAM, then the region is erased and programmed inside a critical
    /// section. Afterwards the image is read back and its magic and
    /// checksum compared with what was written. There is no retry.
    ///
    /// # Errors
    /// * [`StoreError::Flash`] if erase, program or read-back fails
    /// * [`StoreError::VerifyFailed`] if the read-back image does not match
    pub fn persist(&mut self, config: &Configuration) -> Result<(), StoreError<F::Error>> {
        let mut buf = [0xFFu8; PROGRAM_BUF_LEN];
        let len = serialize(config, &mut buf).map_err(StoreError::Image)?;
        let expected = u32::from_le_bytes([buf[len - 4], buf[len - 3], buf[len - 2], buf[len - 1]]);
        let program_len = len.next_multiple_of(PAGE_SIZE);

        let flash = &mut self.flash;
        let offset = self.offset;
        critical_section::with(|_| -> Result<(), F::Error> {
            flash.erase(offset, ERASE_SIZE)?;
            flash.program(offset, &buf[..program_len])
        })?;

        let readback = &mut buf[..len];
        readback.fill(0);
        self.flash.read(self.offset, readback)?;

        match verify(readback) {
            Ok((_, stored)) if stored == expected => Ok(()),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::error!("Configuration read-back mismatch at offset {=u32:#x}", self.offset);
                Err(StoreError::VerifyFailed)
            }
        }
    }

    /// Read and validate the stored configuration.
    ///
    /// Returns a new [`Configuration`]; nothing is modified on failure.
    ///
    /// # Errors
    /// * [`StoreError::Flash`] if the read fails
    /// * [`StoreError::Image`] if magic, checksum or layout is invalid
    pub fn load(&mut self) -> Result<Configuration, StoreError<F::Error>> {
        let mut buf = [0u8; MAX_IMAGE_LEN];
        self.flash.read(self.offset, &mut buf)?;
        deserialize(&buf).map_err(StoreError::Image)
    }

    /// Boot sequence: load the stored configuration, or fall back to the
    /// built-in defaults and persist them once.
    pub fn load_or_default(&mut self) -> (Configuration, BootSource) {
        match self.load() {
            Ok(config) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Loaded configuration: {} switches", config.switch_count());
                (config, BootSource::Loaded)
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                match &_e {
                    StoreError::Image(reason) => defmt::warn!("No valid configuration ({}); using defaults", reason),
                    _ => defmt::warn!("Configuration read failed; using defaults"),
                }

                let config = Configuration::defaults();
                let persisted = self.persist(&config).is_ok();
                (config, BootSource::Defaulted { persisted })
            }
        }
    }

    /// Offset of the configuration region.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }
}
