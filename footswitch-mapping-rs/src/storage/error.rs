//! Error types for configuration persistence.

use core::fmt;

/// Reasons a stored image is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Fewer bytes than the header-declared image length.
    Truncated,
    /// Magic value missing; storage is uninitialised or foreign.
    BadMagic,
    /// Recomputed checksum differs from the stored one.
    ChecksumMismatch,
    /// Switch count, slot length or a stored message is out of range.
    InvalidLayout,
}

/// Errors from [`ConfigStore`](super::ConfigStore) operations.
#[derive(Debug)]
pub enum StoreError<E> {
    /// Underlying flash error.
    Flash(E),

    /// Stored (or read-back) image failed validation.
    Image(ImageError),

    /// Programmed image did not read back with the expected magic and checksum.
    VerifyFailed,
}

// Allow ergonomic `?` propagation from raw flash errors.
impl<E> From<E> for StoreError<E> {
    fn from(error: E) -> Self {
        StoreError::Flash(error)
    }
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageError::Truncated => write!(f, "Image truncated"),
            ImageError::BadMagic => write!(f, "Bad magic value"),
            ImageError::ChecksumMismatch => write!(f, "Checksum mismatch"),
            ImageError::InvalidLayout => write!(f, "Invalid image layout"),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Flash(e) => write!(f, "Flash error: {:?}", e),
            StoreError::Image(e) => write!(f, "Stored configuration rejected: {}", e),
            StoreError::VerifyFailed => write!(f, "Read-back verification failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for StoreError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            StoreError::Flash(e) => defmt::write!(f, "Flash error: {}", e),
            StoreError::Image(e) => defmt::write!(f, "Stored configuration rejected: {}", e),
            StoreError::VerifyFailed => defmt::write!(f, "Read-back verification failed"),
        }
    }
}
