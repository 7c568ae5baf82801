//! EXIF profile decoding
//!
//! Walks the TIFF-style container (header, IFD0, Exif and GPS sub-IFDs,
//! thumbnail IFD) and reconstructs the ordered value collection. Decoding is
//! tolerant: one malformed entry marks its tag invalid and the walk
//! continues, and an unrecognized header degrades the whole buffer to an
//! empty profile instead of an error.
//!
//! TIFF Structure:
//! - Header: byte order (II/MM), magic (0x002A), IFD offset
//! - IFD (Image File Directory): entry count, entries (12 bytes each), next IFD offset
//! - Entries: tag ID (2), type (2), count (4), value/offset (4)

use crate::endian::{ByteOrder, EndianReader};
use crate::tag::{EntryType, ExifTag};
use crate::value::{ExifData, ExifValue, Rational, SignedRational};
use log::{debug, trace, warn};
use std::collections::BTreeSet;

/// TIFF magic number following the byte-order marker
pub(crate) const TIFF_MAGIC: u16 = 0x002A;

/// Maximum number of entries in one IFD (prevents DOS via hostile counts)
pub(crate) const MAX_IFD_ENTRIES: u16 = 1000;

/// Byte range of the embedded thumbnail within the source buffer
///
/// Valid only for the buffer it was decoded from; rewriting the profile
/// produces a new range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailRange {
    /// Absolute offset of the first thumbnail byte
    pub offset: usize,
    /// Length of the thumbnail data in bytes
    pub length: usize,
}

/// Everything recovered from one profile buffer
#[derive(Debug, Default)]
pub struct DecodedExif {
    /// Values in discovery order, duplicates collapsed (last wins)
    pub values: Vec<ExifValue>,
    /// Tags present in the bytes that could not be decoded
    pub invalid_tags: BTreeSet<ExifTag>,
    /// Embedded thumbnail location, when IFD1 declares one
    pub thumbnail: Option<ThumbnailRange>,
}

/// Decode a raw EXIF profile buffer
///
/// Never fails: a missing or unrecognized header yields an empty result, a
/// malformed entry only adds its tag to `invalid_tags`.
pub fn decode(data: &[u8]) -> DecodedExif {
    if data.len() < 8 {
        return DecodedExif::default();
    }

    let mut reader = EndianReader::new(data);

    let order = match reader.read_bytes(2) {
        Some(b"II") => ByteOrder::LittleEndian,
        Some(b"MM") => ByteOrder::BigEndian,
        _ => return DecodedExif::default(), // Not a TIFF container
    };

    match reader.read_u16(order) {
        Some(TIFF_MAGIC) => {}
        _ => return DecodedExif::default(),
    }

    let ifd0_offset = match reader.read_u32(order) {
        Some(offset) => offset,
        None => return DecodedExif::default(),
    };

    debug!("decoding EXIF profile: {} bytes, {order:?}", data.len());

    let mut decoder = Decoder {
        reader,
        order,
        values: Vec::new(),
        invalid_tags: BTreeSet::new(),
        exif_ifd: None,
        gps_ifd: None,
    };

    let next_ifd = decoder.walk_ifd(ifd0_offset);

    // Sub-IFDs referenced from IFD0; their own next-IFD links are ignored
    for (pointer, offset) in [
        (ExifTag::EXIF_IFD_POINTER, decoder.exif_ifd),
        (ExifTag::GPS_IFD_POINTER, decoder.gps_ifd),
    ] {
        // A zero pointer means the sub-IFD is absent
        if let Some(offset) = offset.filter(|&offset| offset != 0) {
            if offset as usize >= data.len() {
                warn!("{pointer} points outside the buffer");
                decoder.invalid_tags.insert(pointer);
            } else {
                decoder.walk_ifd(offset);
            }
        }
    }

    let thumbnail = next_ifd.and_then(|offset| decoder.read_thumbnail(offset, data.len()));

    debug!(
        "decoded {} values, {} invalid tags",
        decoder.values.len(),
        decoder.invalid_tags.len()
    );

    DecodedExif {
        values: decoder.values,
        invalid_tags: decoder.invalid_tags,
        thumbnail,
    }
}

struct Decoder<'a> {
    reader: EndianReader<'a>,
    order: ByteOrder,
    values: Vec<ExifValue>,
    invalid_tags: BTreeSet<ExifTag>,
    exif_ifd: Option<u32>,
    gps_ifd: Option<u32>,
}

impl Decoder<'_> {
    /// Walk one directory, returning its next-IFD link when present
    fn walk_ifd(&mut self, offset: u32) -> Option<u32> {
        if !self.reader.seek(offset as usize) {
            return None;
        }

        let count = self.reader.read_u16(self.order)?;
        if count > MAX_IFD_ENTRIES {
            warn!("IFD entry count {count} exceeds limit, skipping directory");
            return None;
        }

        for _ in 0..count {
            let tag = match self.reader.read_u16(self.order) {
                Some(id) => ExifTag(id),
                None => return None, // Truncated mid-directory
            };

            // The rest of the 12-byte record
            let (type_code, component_count, value_field) = match (
                self.reader.read_u16(self.order),
                self.reader.read_u32(self.order),
                self.reader.read_bytes(4),
            ) {
                (Some(t), Some(c), Some(v)) => (t, c, v),
                _ => {
                    self.invalid_tags.insert(tag);
                    return None;
                }
            };

            trace!(
                "entry {tag}: type {type_code}, count {component_count}, field {value_field:02X?}"
            );

            // Sub-IFD pointers are structural: remember the offset, surface no value
            if tag.is_pointer() {
                match EntryType::from_u16(type_code)
                    .and_then(|entry_type| self.read_field_u32(entry_type, value_field))
                {
                    Some(offset) if tag == ExifTag::EXIF_IFD_POINTER => {
                        self.exif_ifd = Some(offset)
                    }
                    Some(offset) => self.gps_ifd = Some(offset),
                    None => {
                        self.invalid_tags.insert(tag);
                    }
                }
                continue;
            }

            match self.decode_entry(tag, type_code, component_count, value_field) {
                Some(data) => self.insert(tag, data),
                None => {
                    warn!("invalid entry for {tag}");
                    self.invalid_tags.insert(tag);
                }
            }
        }

        let next = self.reader.read_u32(self.order)?;
        if next == 0 {
            None
        } else {
            Some(next)
        }
    }

    /// Decode one 12-byte record into a typed payload
    ///
    /// None means the entry is malformed: unknown tag, unrecognized type
    /// code, inconsistent count, or an offset/length outside the buffer.
    fn decode_entry(
        &self,
        tag: ExifTag,
        type_code: u16,
        component_count: u32,
        value_field: &[u8],
    ) -> Option<ExifData> {
        let entry_type = EntryType::from_u16(type_code)?;
        let spec = tag.spec()?;

        // TIFF permits SHORT where LONG is declared; nothing else coerces
        let widen = entry_type == EntryType::Short && spec.entry_type == EntryType::Long;
        if entry_type != spec.entry_type && !widen {
            return None;
        }

        let total_size = entry_type.size().checked_mul(component_count as usize)?;
        let bytes = if total_size <= 4 {
            &value_field[..total_size]
        } else {
            let offset = self.order.read_u32(value_field) as usize;
            self.reader.bytes_at(offset, total_size)?
        };

        let data = decode_components(entry_type, component_count, bytes, self.order)?;
        let data = if widen { widen_to_long(data) } else { data };

        // Shape the payload against the declared arity
        match (spec.is_array, data) {
            (_, ExifData::Ascii(s)) => Some(ExifData::Ascii(s)),
            (_, ExifData::Undefined(v)) => Some(ExifData::Undefined(v)),
            (true, data) => Some(data),
            (false, data) if data.component_count() == 1 => Some(unarray(data)),
            (false, _) => None,
        }
    }

    /// Read an inline u32-or-u16 field, as pointer and interchange tags use
    fn read_field_u32(&self, entry_type: EntryType, value_field: &[u8]) -> Option<u32> {
        match entry_type {
            EntryType::Short => Some(self.order.read_u16(&value_field[..2]) as u32),
            EntryType::Long => Some(self.order.read_u32(value_field)),
            _ => None,
        }
    }

    /// Replace-in-place when the tag was already seen, else append
    ///
    /// The payload has already been shaped against the tag's spec, so the
    /// type-checked assignment cannot fail here.
    fn insert(&mut self, tag: ExifTag, data: ExifData) {
        if let Some(existing) = self.values.iter_mut().find(|v| v.tag() == tag) {
            existing.set_value(Some(data));
        } else if let Ok(mut value) = ExifValue::create(tag) {
            value.set_value(Some(data));
            self.values.push(value);
        }
    }

    /// Scan IFD1 for the interchange offset/length pair
    fn read_thumbnail(&mut self, offset: u32, data_len: usize) -> Option<ThumbnailRange> {
        if !self.reader.seek(offset as usize) {
            return None;
        }

        let count = self.reader.read_u16(self.order)?;
        if count > MAX_IFD_ENTRIES {
            return None;
        }

        let mut thumb_offset = None;
        let mut thumb_length = None;

        for _ in 0..count {
            let (tag, type_code, _count, value_field) = match (
                self.reader.read_u16(self.order),
                self.reader.read_u16(self.order),
                self.reader.read_u32(self.order),
                self.reader.read_bytes(4),
            ) {
                (Some(tag), Some(t), Some(c), Some(v)) => (ExifTag(tag), t, c, v),
                _ => break,
            };

            let Some(entry_type) = EntryType::from_u16(type_code) else {
                continue;
            };

            match tag {
                ExifTag::JPEG_INTERCHANGE_FORMAT => {
                    thumb_offset = self.read_field_u32(entry_type, value_field);
                }
                ExifTag::JPEG_INTERCHANGE_FORMAT_LENGTH => {
                    thumb_length = self.read_field_u32(entry_type, value_field);
                }
                _ => {}
            }
        }

        let (offset, length) = (thumb_offset? as usize, thumb_length? as usize);
        if length == 0 || offset.checked_add(length)? > data_len {
            warn!("thumbnail range {offset}+{length} outside buffer, dropping");
            return None;
        }

        debug!("thumbnail at {offset}, {length} bytes");
        Some(ThumbnailRange { offset, length })
    }
}

/// Decode `count` wire components into the matching array-shaped payload
fn decode_components(
    entry_type: EntryType,
    count: u32,
    bytes: &[u8],
    order: ByteOrder,
) -> Option<ExifData> {
    let count = count as usize;
    let mut reader = EndianReader::new(bytes);

    let data = match entry_type {
        EntryType::Ascii => {
            let raw = reader.read_bytes(count)?;
            let text = String::from_utf8_lossy(raw);
            ExifData::Ascii(text.trim_end_matches('\0').to_string())
        }
        EntryType::Undefined => ExifData::Undefined(reader.read_bytes(count)?.to_vec()),
        EntryType::Byte => {
            ExifData::ByteArray((0..count).map(|_| reader.read_u8()).collect::<Option<_>>()?)
        }
        EntryType::SignedByte => ExifData::SignedByteArray(
            (0..count).map(|_| reader.read_i8()).collect::<Option<_>>()?,
        ),
        EntryType::Short => ExifData::ShortArray(
            (0..count)
                .map(|_| reader.read_u16(order))
                .collect::<Option<_>>()?,
        ),
        EntryType::SignedShort => ExifData::SignedShortArray(
            (0..count)
                .map(|_| reader.read_i16(order))
                .collect::<Option<_>>()?,
        ),
        EntryType::Long => ExifData::LongArray(
            (0..count)
                .map(|_| reader.read_u32(order))
                .collect::<Option<_>>()?,
        ),
        EntryType::SignedLong => ExifData::SignedLongArray(
            (0..count)
                .map(|_| reader.read_i32(order))
                .collect::<Option<_>>()?,
        ),
        EntryType::Rational => ExifData::RationalArray(
            (0..count)
                .map(|_| {
                    reader
                        .read_rational(order)
                        .map(|(n, d)| Rational::new(n, d))
                })
                .collect::<Option<_>>()?,
        ),
        EntryType::SignedRational => ExifData::SignedRationalArray(
            (0..count)
                .map(|_| {
                    reader
                        .read_srational(order)
                        .map(|(n, d)| SignedRational::new(n, d))
                })
                .collect::<Option<_>>()?,
        ),
        EntryType::Float => ExifData::FloatArray(
            (0..count)
                .map(|_| reader.read_f32(order))
                .collect::<Option<_>>()?,
        ),
        EntryType::Double => ExifData::DoubleArray(
            (0..count)
                .map(|_| reader.read_f64(order))
                .collect::<Option<_>>()?,
        ),
    };

    Some(data)
}

/// Widen SHORT wire data for a LONG-declared tag
fn widen_to_long(data: ExifData) -> ExifData {
    match data {
        ExifData::ShortArray(v) => ExifData::LongArray(v.into_iter().map(u32::from).collect()),
        other => other,
    }
}

/// Collapse a one-element array payload to its scalar variant
fn unarray(data: ExifData) -> ExifData {
    match data {
        ExifData::ByteArray(v) if v.len() == 1 => ExifData::Byte(v[0]),
        ExifData::ShortArray(v) if v.len() == 1 => ExifData::Short(v[0]),
        ExifData::LongArray(v) if v.len() == 1 => ExifData::Long(v[0]),
        ExifData::RationalArray(v) if v.len() == 1 => ExifData::Rational(v[0]),
        ExifData::SignedByteArray(v) if v.len() == 1 => ExifData::SignedByte(v[0]),
        ExifData::SignedShortArray(v) if v.len() == 1 => ExifData::SignedShort(v[0]),
        ExifData::SignedLongArray(v) if v.len() == 1 => ExifData::SignedLong(v[0]),
        ExifData::SignedRationalArray(v) if v.len() == 1 => ExifData::SignedRational(v[0]),
        ExifData::FloatArray(v) if v.len() == 1 => ExifData::Float(v[0]),
        ExifData::DoubleArray(v) if v.len() == 1 => ExifData::Double(v[0]),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TiffBuilder;

    #[test]
    fn test_short_buffer_is_empty_profile() {
        for len in 0..8 {
            let decoded = decode(&vec![0u8; len]);
            assert!(decoded.values.is_empty());
            assert!(decoded.invalid_tags.is_empty());
            assert!(decoded.thumbnail.is_none());
        }
    }

    #[test]
    fn test_unrecognized_header_is_empty_profile() {
        // Wrong marker
        let decoded = decode(b"XX\x2A\x00\x08\x00\x00\x00");
        assert!(decoded.values.is_empty());

        // Right marker, wrong magic
        let decoded = decode(b"II\x2B\x00\x08\x00\x00\x00");
        assert!(decoded.values.is_empty());
        assert!(decoded.invalid_tags.is_empty());
    }

    #[test]
    fn test_inline_short_entry() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        let field = b.field_u16(6);
        b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, field);
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert_eq!(decoded.values.len(), 1);
        assert_eq!(decoded.values[0].tag(), ExifTag::ORIENTATION);
        assert_eq!(*decoded.values[0].value(), ExifData::Short(6));
        assert!(decoded.invalid_tags.is_empty());
    }

    #[test]
    fn test_big_endian_buffer() {
        let mut b = TiffBuilder::big_endian();
        b.push_u16(1);
        let field = b.field_u16(3);
        b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, field);
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert_eq!(*decoded.values[0].value(), ExifData::Short(3));
    }

    #[test]
    fn test_out_of_line_ascii() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        // Data area starts after count + one entry + next link
        b.entry_at_offset(ExifTag::MAKE.id(), EntryType::Ascii as u16, 6, 26);
        b.push_u32(0);
        assert_eq!(b.len(), 26);
        b.push_bytes(b"Canon\0");

        let decoded = decode(&b.into_bytes());
        assert_eq!(*decoded.values[0].value(), ExifData::Ascii("Canon".into()));
    }

    #[test]
    fn test_unknown_tag_marked_invalid() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        let field = b.field_u16(1);
        b.entry(0xBEEF, EntryType::Short as u16, 1, field);
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.values.is_empty());
        assert!(decoded.invalid_tags.contains(&ExifTag(0xBEEF)));
    }

    #[test]
    fn test_unknown_type_code_marked_invalid() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        let field = b.field_u16(1);
        b.entry(ExifTag::ORIENTATION.id(), 99, 1, field);
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.values.is_empty());
        assert!(decoded.invalid_tags.contains(&ExifTag::ORIENTATION));
    }

    #[test]
    fn test_bad_offset_contained_to_one_entry() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(2);
        b.entry_at_offset(ExifTag::MAKE.id(), EntryType::Ascii as u16, 6, 0xFFFF_0000);
        let field = b.field_u16(1);
        b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, field);
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert_eq!(decoded.values.len(), 1);
        assert_eq!(decoded.values[0].tag(), ExifTag::ORIENTATION);
        assert_eq!(
            decoded.invalid_tags.iter().collect::<Vec<_>>(),
            vec![&ExifTag::MAKE]
        );
    }

    #[test]
    fn test_scalar_tag_with_sequence_count_marked_invalid() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        b.entry(
            ExifTag::ORIENTATION.id(),
            EntryType::Short as u16,
            2,
            [1, 0, 2, 0],
        );
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.values.is_empty());
        assert!(decoded.invalid_tags.contains(&ExifTag::ORIENTATION));
    }

    #[test]
    fn test_short_widens_for_long_tag() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        let field = b.field_u16(1920);
        b.entry(ExifTag::IMAGE_WIDTH.id(), EntryType::Short as u16, 1, field);
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert_eq!(*decoded.values[0].value(), ExifData::Long(1920));
    }

    #[test]
    fn test_duplicate_tag_overwrites_in_place() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(3);
        let one = b.field_u16(1);
        let six = b.field_u16(6);
        let make_offset = 8 + 2 + 3 * 12 + 4;
        b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, one);
        b.entry_at_offset(
            ExifTag::MAKE.id(),
            EntryType::Ascii as u16,
            6,
            make_offset as u32,
        );
        b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, six);
        b.push_u32(0);
        b.push_bytes(b"Canon\0");

        let decoded = decode(&b.into_bytes());
        assert_eq!(decoded.values.len(), 2);
        // First-seen position, last-seen value
        assert_eq!(decoded.values[0].tag(), ExifTag::ORIENTATION);
        assert_eq!(*decoded.values[0].value(), ExifData::Short(6));
        assert_eq!(decoded.values[1].tag(), ExifTag::MAKE);
    }

    #[test]
    fn test_thumbnail_descriptor() {
        let mut b = TiffBuilder::little_endian();
        // IFD0: no entries, next link points at IFD1
        b.push_u16(0);
        b.push_u32(14);
        // IFD1 at 14: the interchange pair, data at 44
        b.push_u16(2);
        let offset_field = b.field_u32(44);
        let length_field = b.field_u32(10);
        b.entry(
            ExifTag::JPEG_INTERCHANGE_FORMAT.id(),
            EntryType::Long as u16,
            1,
            offset_field,
        );
        b.entry(
            ExifTag::JPEG_INTERCHANGE_FORMAT_LENGTH.id(),
            EntryType::Long as u16,
            1,
            length_field,
        );
        b.push_u32(0);
        assert_eq!(b.len(), 44);
        b.push_bytes(&[0xAB; 10]);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.values.is_empty());
        assert_eq!(
            decoded.thumbnail,
            Some(ThumbnailRange {
                offset: 44,
                length: 10
            })
        );
    }

    #[test]
    fn test_thumbnail_out_of_bounds_dropped() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(0);
        b.push_u32(14);
        b.push_u16(2);
        let offset_field = b.field_u32(44);
        let length_field = b.field_u32(10_000);
        b.entry(
            ExifTag::JPEG_INTERCHANGE_FORMAT.id(),
            EntryType::Long as u16,
            1,
            offset_field,
        );
        b.entry(
            ExifTag::JPEG_INTERCHANGE_FORMAT_LENGTH.id(),
            EntryType::Long as u16,
            1,
            length_field,
        );
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.thumbnail.is_none());
    }

    #[test]
    fn test_hostile_entry_count_skipped() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(0xFFFF);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.values.is_empty());
        assert!(decoded.invalid_tags.is_empty());
    }

    #[test]
    fn test_count_size_overflow_marked_invalid() {
        let mut b = TiffBuilder::little_endian();
        b.push_u16(1);
        b.entry(
            ExifTag::X_RESOLUTION.id(),
            EntryType::Rational as u16,
            0xFFFF_FFFF,
            [0; 4],
        );
        b.push_u32(0);

        let decoded = decode(&b.into_bytes());
        assert!(decoded.values.is_empty());
        assert!(decoded.invalid_tags.contains(&ExifTag::X_RESOLUTION));
    }
}
