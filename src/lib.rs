//! Tolerant, round-trip-exact codec for the EXIF/TIFF metadata directory format.
//!
//! This crate decodes the TIFF-style directory structure embedded in image
//! files into a typed, ordered collection of tag values, and serializes such
//! a collection back into a canonical byte buffer.
//!
//! # Design Principles
//!
//! - **Tolerant decoding**: one corrupt directory entry never aborts the
//!   parse; its tag is reported in an invalid-tag set and the walk continues
//! - **Byte-exact encoding**: deterministic layout (fixed byte order,
//!   ascending tag order, two-pass offset resolution) so one round-trip
//!   reaches a stable fixed point
//! - **Typed values**: a closed set of wire type x arity variants with
//!   type-checked assignment, no runtime reflection
//! - **No I/O**: the boundary is a byte buffer in each direction; acquiring
//!   and storing bytes is the host's concern
//!
//! # Quick Start
//!
//! The simplest way to use this library is the [`ExifProfile`] facade, which
//! decodes lazily on first access:
//!
//! ```
//! use exif_io::{ExifData, ExifProfile, ExifTag, Rational};
//!
//! # fn main() -> exif_io::Result<()> {
//! let mut profile = ExifProfile::new();
//! profile.set_value(ExifTag::MAKE, Some(ExifData::Ascii("Canon".into())))?;
//! profile.set_value(
//!     ExifTag::X_RESOLUTION,
//!     Some(ExifData::Rational(Rational::new(300, 1))),
//! )?;
//!
//! // Serialize; None would mean the profile holds no values at all
//! let bytes = profile.to_bytes()?.expect("two values present");
//!
//! // Re-decode elsewhere
//! let mut reread = ExifProfile::from_bytes(bytes);
//! assert_eq!(reread.values().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Codec API
//!
//! For direct control, [`decode`] and [`encode`] expose the codec boundary
//! without the facade:
//!
//! ```
//! use exif_io::{decode, encode, ExifParts};
//!
//! # fn main() -> exif_io::Result<()> {
//! let decoded = decode(b"not a profile"); // malformed header: empty, not an error
//! assert!(decoded.values.is_empty());
//! assert!(decoded.invalid_tags.is_empty());
//!
//! // Encoding an empty collection produces no buffer
//! assert!(encode(&decoded.values, ExifParts::ALL)?.is_none());
//! # Ok(())
//! # }
//! ```

mod endian;
mod error;
mod profile;
mod reader;
mod tag;
mod value;
mod writer;

pub use endian::{ByteOrder, EndianReader};
pub use error::{Error, Result};
pub use profile::ExifProfile;
pub use reader::{decode, DecodedExif, ThumbnailRange};
pub use tag::{EntryType, ExifParts, ExifTag, Section, TagSpec};
pub use value::{DescriptionProvider, ExifData, ExifValue, Rational, SignedRational};
pub use writer::{encode, EncodedExif, ExifWriter};

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
