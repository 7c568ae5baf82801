//! Test utilities for building synthetic EXIF buffers.
//!
//! Real-world EXIF payloads are awkward to check into a codec crate, so the
//! fixtures here are synthesized: [`TiffBuilder`] lays out headers and
//! 12-byte directory records in either byte order (including deliberately
//! malformed ones), and the canned `sample_*` helpers produce well-formed
//! profiles through the public API.
//!
//! # Usage
//!
//! ```
//! use exif_io::test_utils::*;
//! use exif_io::decode;
//!
//! let decoded = decode(&sample_profile());
//! assert!(!decoded.values.is_empty());
//! ```

use crate::endian::ByteOrder;
use crate::tag::{ExifParts, ExifTag};
use crate::value::{ExifData, ExifValue, Rational};
use crate::writer::ExifWriter;

/// A stand-in for embedded thumbnail data (JPEG SOI/EOI wrapper)
pub const THUMB_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x04, 0xAA, 0xBB, 0xFF, 0xD9];

/// Incremental builder for TIFF-container byte buffers
///
/// Starts with a valid header (byte-order marker, magic, IFD0 offset of 8)
/// unless constructed with [`raw`](Self::raw); everything after that is up
/// to the caller, malformed layouts included.
#[derive(Debug)]
pub struct TiffBuilder {
    order: ByteOrder,
    buf: Vec<u8>,
}

impl TiffBuilder {
    /// Valid little-endian header, IFD0 at offset 8
    pub fn little_endian() -> Self {
        let mut builder = Self::raw(ByteOrder::LittleEndian);
        builder.push_bytes(b"II");
        builder.push_u16(0x002A);
        builder.push_u32(8);
        builder
    }

    /// Valid big-endian header, IFD0 at offset 8
    pub fn big_endian() -> Self {
        let mut builder = Self::raw(ByteOrder::BigEndian);
        builder.push_bytes(b"MM");
        builder.push_u16(0x002A);
        builder.push_u32(8);
        builder
    }

    /// Empty buffer with no header
    pub fn raw(order: ByteOrder) -> Self {
        Self {
            order,
            buf: Vec::new(),
        }
    }

    /// Current length, i.e. the offset the next push lands at
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether anything has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append one byte
    pub fn push_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a u16 in the builder's byte order
    pub fn push_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        self.order.write_u16(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    /// Append a u32 in the builder's byte order
    pub fn push_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        self.order.write_u32(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    /// Append raw bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a 12-byte directory record with a raw 4-byte value field
    pub fn entry(&mut self, tag: u16, type_code: u16, count: u32, field: [u8; 4]) {
        self.push_u16(tag);
        self.push_u16(type_code);
        self.push_u32(count);
        self.push_bytes(&field);
    }

    /// Append a record whose value field is an absolute offset
    pub fn entry_at_offset(&mut self, tag: u16, type_code: u16, count: u32, offset: u32) {
        self.entry(tag, type_code, count, self.field_u32(offset));
    }

    /// Encode a u32 as an inline value field
    pub fn field_u32(&self, value: u32) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        self.order.write_u32(&mut bytes, value);
        bytes
    }

    /// Encode a u16 as an inline value field (left-justified)
    pub fn field_u16(&self, value: u16) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        self.order.write_u16(&mut bytes[..2], value);
        bytes
    }

    /// Finish and take the buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// A representative spread of values across all three sections
pub fn sample_values() -> Vec<ExifValue> {
    let mut values = Vec::new();

    let mut push = |tag: ExifTag, data: ExifData| {
        let mut value = ExifValue::create(tag).expect("sample tags are known");
        assert!(value.set_value(Some(data)), "sample payloads match specs");
        values.push(value);
    };

    push(ExifTag::MAKE, ExifData::Ascii("Canon".into()));
    push(ExifTag::MODEL, ExifData::Ascii("EOS R5".into()));
    push(ExifTag::ORIENTATION, ExifData::Short(1));
    push(
        ExifTag::X_RESOLUTION,
        ExifData::Rational(Rational::new(300, 1)),
    );
    push(
        ExifTag::DATE_TIME,
        ExifData::Ascii("2024:01:15 10:30:00".into()),
    );
    push(
        ExifTag::EXPOSURE_TIME,
        ExifData::Rational(Rational::new(1, 250)),
    );
    push(ExifTag::ISO_SPEED_RATINGS, ExifData::ShortArray(vec![400]));
    push(ExifTag::EXIF_VERSION, ExifData::Undefined(b"0230".to_vec()));
    push(ExifTag::GPS_LATITUDE_REF, ExifData::Ascii("N".into()));
    push(
        ExifTag::GPS_LATITUDE,
        ExifData::RationalArray(vec![
            Rational::new(52, 1),
            Rational::new(30, 1),
            Rational::new(1234, 100),
        ]),
    );

    values
}

/// A well-formed little-endian profile built from [`sample_values`]
pub fn sample_profile() -> Vec<u8> {
    ExifWriter::new(ExifParts::ALL)
        .write(&sample_values())
        .expect("sample values fit in a profile")
        .expect("sample values are non-empty")
}

/// Like [`sample_profile`], with [`THUMB_BYTES`] embedded behind IFD1
pub fn sample_profile_with_thumbnail() -> Vec<u8> {
    ExifWriter::new(ExifParts::ALL)
        .write_with_thumbnail(&sample_values(), Some(THUMB_BYTES))
        .expect("sample values fit in a profile")
        .expect("sample values are non-empty")
        .data
}
