//! Error types for exif-io

use std::io;

/// Result type for exif-io operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while working with EXIF profiles
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No value type is registered for the tag
    #[error("Unsupported tag: 0x{0:04X}")]
    UnsupportedTag(u16),

    /// Assigned value does not match the tag's declared type
    #[error("Type mismatch for tag 0x{tag:04X}")]
    TypeMismatch {
        /// Numeric id of the rejected tag
        tag: u16,
    },

    /// Encoded profile exceeds what 32-bit offsets can address
    #[error("Data too large: {size} bytes (max: {max})")]
    DataTooLarge { size: usize, max: usize },
}
