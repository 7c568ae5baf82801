//! EXIF profile encoding
//!
//! Serializes an ordered value collection back into a TIFF-style buffer.
//! Output byte order is fixed little-endian regardless of what the values
//! were decoded from. Layout is two-pass: every directory and data area is
//! sized first, then emitted with resolved offsets, so sub-IFD pointers and
//! the thumbnail interchange pair always describe the new buffer.

use crate::error::{Error, Result};
use crate::reader::ThumbnailRange;
use crate::tag::{EntryType, ExifParts, ExifTag, Section};
use crate::value::{ExifData, ExifValue};
use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;

/// Size of one directory record: tag (2) + type (2) + count (4) + field (4)
const ENTRY_SIZE: usize = 12;

/// A freshly encoded profile buffer
#[derive(Debug)]
pub struct EncodedExif {
    /// The serialized profile
    pub data: Vec<u8>,
    /// Where the thumbnail landed in `data`, when one was written
    pub thumbnail: Option<ThumbnailRange>,
}

/// Serializes value collections under a section mask
#[derive(Debug, Clone, Copy)]
pub struct ExifWriter {
    parts: ExifParts,
}

impl Default for ExifWriter {
    fn default() -> Self {
        Self::new(ExifParts::ALL)
    }
}

impl ExifWriter {
    /// Create a writer emitting only the selected sections
    pub fn new(parts: ExifParts) -> Self {
        Self { parts }
    }

    /// Serialize the collection; None when nothing remains to emit
    pub fn write(&self, values: &[ExifValue]) -> Result<Option<Vec<u8>>> {
        Ok(self
            .write_with_thumbnail(values, None)?
            .map(|encoded| encoded.data))
    }

    /// Serialize the collection plus an optional embedded thumbnail
    ///
    /// The thumbnail is appended behind an IFD1 whose interchange
    /// offset/length pair is recomputed for the new buffer. It is only
    /// written when the mask includes [`ExifParts::THUMBNAIL`].
    pub fn write_with_thumbnail(
        &self,
        values: &[ExifValue],
        thumbnail: Option<&[u8]>,
    ) -> Result<Option<EncodedExif>> {
        let mut ifd = Vec::new();
        let mut exif = Vec::new();
        let mut gps = Vec::new();

        for value in values {
            // Pointer and interchange tags are recomputed, never copied through
            if value.tag().is_pointer() {
                continue;
            }
            match value.tag().section() {
                Some(section) if self.parts.includes(section) => match section {
                    Section::Ifd => ifd.push(value),
                    Section::Exif => exif.push(value),
                    Section::Gps => gps.push(value),
                    Section::Thumbnail => {}
                },
                _ => {}
            }
        }

        let thumbnail = thumbnail
            .filter(|data| !data.is_empty() && self.parts.contains(ExifParts::THUMBNAIL));

        if ifd.is_empty() && exif.is_empty() && gps.is_empty() && thumbnail.is_none() {
            return Ok(None);
        }

        // Valid TIFF consumers expect entries in ascending tag order
        ifd.sort_by_key(|value| value.tag());
        exif.sort_by_key(|value| value.tag());
        gps.sort_by_key(|value| value.tag());

        let mut ifd0: Vec<PlannedEntry> = ifd.iter().map(|v| PlannedEntry::from_value(v)).collect();
        let exif: Vec<PlannedEntry> = exif.iter().map(|v| PlannedEntry::from_value(v)).collect();
        let gps: Vec<PlannedEntry> = gps.iter().map(|v| PlannedEntry::from_value(v)).collect();

        // Size pass: IFD0 gains one pointer entry per non-empty sub-IFD
        let pointer_entries =
            usize::from(!exif.is_empty()) + usize::from(!gps.is_empty());
        let ifd0_size = block_size(ifd0.len() + pointer_entries);
        let ifd0_data = data_size(&ifd0);

        let mut cursor = 8 + ifd0_size + ifd0_data;

        let exif_offset = (!exif.is_empty()).then_some(cursor);
        if !exif.is_empty() {
            cursor += block_size(exif.len()) + data_size(&exif);
        }

        let gps_offset = (!gps.is_empty()).then_some(cursor);
        if !gps.is_empty() {
            cursor += block_size(gps.len()) + data_size(&gps);
        }

        let ifd1_offset = thumbnail.map(|_| cursor);
        let mut thumbnail_range = None;
        if let Some(thumb) = thumbnail {
            let data_offset = cursor + block_size(2);
            thumbnail_range = Some(ThumbnailRange {
                offset: data_offset,
                length: thumb.len(),
            });
            cursor = data_offset + thumb.len();
        }

        if cursor > u32::MAX as usize {
            return Err(Error::DataTooLarge {
                size: cursor,
                max: u32::MAX as usize,
            });
        }

        // Emit pass
        if let Some(offset) = exif_offset {
            ifd0.push(PlannedEntry::long(ExifTag::EXIF_IFD_POINTER, offset as u32));
        }
        if let Some(offset) = gps_offset {
            ifd0.push(PlannedEntry::long(ExifTag::GPS_IFD_POINTER, offset as u32));
        }
        ifd0.sort_by_key(|entry| entry.id);

        let mut buf = Vec::with_capacity(cursor);
        buf.extend_from_slice(b"II");
        buf.write_u16::<LittleEndian>(crate::reader::TIFF_MAGIC)?;
        buf.write_u32::<LittleEndian>(8)?;

        emit_ifd(&mut buf, &ifd0, ifd1_offset.unwrap_or(0) as u32)?;
        emit_ifd_data(&mut buf, &ifd0);

        if exif_offset.is_some() {
            emit_ifd(&mut buf, &exif, 0)?;
            emit_ifd_data(&mut buf, &exif);
        }
        if gps_offset.is_some() {
            emit_ifd(&mut buf, &gps, 0)?;
            emit_ifd_data(&mut buf, &gps);
        }

        if let (Some(thumb), Some(range)) = (thumbnail, thumbnail_range) {
            let ifd1 = [
                PlannedEntry::long(ExifTag::JPEG_INTERCHANGE_FORMAT, range.offset as u32),
                PlannedEntry::long(
                    ExifTag::JPEG_INTERCHANGE_FORMAT_LENGTH,
                    range.length as u32,
                ),
            ];
            emit_ifd(&mut buf, &ifd1, 0)?;
            buf.extend_from_slice(thumb);
        }

        debug_assert_eq!(buf.len(), cursor);
        debug!(
            "encoded {} IFD0 + {} Exif + {} GPS entries, {} bytes",
            ifd0.len(),
            exif.len(),
            gps.len(),
            buf.len()
        );

        Ok(Some(EncodedExif {
            data: buf,
            thumbnail: thumbnail_range,
        }))
    }
}

/// Serialize a collection with the given section mask
///
/// Convenience wrapper over [`ExifWriter`] matching the codec boundary:
/// bytes out, or nothing when the masked collection is empty.
pub fn encode(values: &[ExifValue], parts: ExifParts) -> Result<Option<Vec<u8>>> {
    ExifWriter::new(parts).write(values)
}

/// One directory record with its payload already encoded little-endian
struct PlannedEntry {
    id: u16,
    type_code: u16,
    count: u32,
    payload: Vec<u8>,
}

impl PlannedEntry {
    fn from_value(value: &ExifValue) -> Self {
        Self {
            id: value.tag().id(),
            type_code: value.entry_type() as u16,
            count: value.value().component_count(),
            payload: encode_components(value.value()),
        }
    }

    /// A LONG scalar entry holding a recomputed offset or length
    fn long(tag: ExifTag, value: u32) -> Self {
        Self {
            id: tag.id(),
            type_code: EntryType::Long as u16,
            count: 1,
            payload: value.to_le_bytes().to_vec(),
        }
    }
}

/// Directory size: entry count + records + next-IFD link
fn block_size(entries: usize) -> usize {
    2 + entries * ENTRY_SIZE + 4
}

/// Word-aligned size of one out-of-line payload
fn aligned(len: usize) -> usize {
    len + (len & 1)
}

/// Total trailing data area for a directory
fn data_size(entries: &[PlannedEntry]) -> usize {
    entries
        .iter()
        .filter(|entry| entry.payload.len() > 4)
        .map(|entry| aligned(entry.payload.len()))
        .sum()
}

/// Emit the directory records; `buf.len()` must be the directory's offset
fn emit_ifd(buf: &mut Vec<u8>, entries: &[PlannedEntry], next_ifd: u32) -> Result<()> {
    let dir_offset = buf.len();
    buf.write_u16::<LittleEndian>(entries.len() as u16)?;

    // Out-of-line payloads start right after the next-IFD link
    let mut data_offset = dir_offset + block_size(entries.len());

    for entry in entries {
        buf.write_u16::<LittleEndian>(entry.id)?;
        buf.write_u16::<LittleEndian>(entry.type_code)?;
        buf.write_u32::<LittleEndian>(entry.count)?;

        if entry.payload.len() <= 4 {
            // Inline: left-justified, zero-padded
            let mut field = [0u8; 4];
            field[..entry.payload.len()].copy_from_slice(&entry.payload);
            buf.extend_from_slice(&field);
        } else {
            buf.write_u32::<LittleEndian>(data_offset as u32)?;
            data_offset += aligned(entry.payload.len());
        }
    }

    buf.write_u32::<LittleEndian>(next_ifd)?;
    Ok(())
}

/// Emit the out-of-line payloads in record order, word-aligned
fn emit_ifd_data(buf: &mut Vec<u8>, entries: &[PlannedEntry]) {
    for entry in entries {
        if entry.payload.len() > 4 {
            buf.extend_from_slice(&entry.payload);
            if entry.payload.len() & 1 == 1 {
                buf.push(0);
            }
        }
    }
}

/// Encode a payload's wire components little-endian
fn encode_components(data: &ExifData) -> Vec<u8> {
    let mut buf = Vec::with_capacity(data.byte_size());
    match data {
        ExifData::Byte(v) => buf.push(*v),
        ExifData::ByteArray(v) => buf.extend_from_slice(v),
        ExifData::Ascii(s) => {
            buf.extend_from_slice(s.as_bytes());
            buf.push(0);
        }
        ExifData::Short(v) => buf.extend_from_slice(&v.to_le_bytes()),
        ExifData::ShortArray(v) => {
            for value in v {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        ExifData::Long(v) => buf.extend_from_slice(&v.to_le_bytes()),
        ExifData::LongArray(v) => {
            for value in v {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        ExifData::Rational(r) => {
            buf.extend_from_slice(&r.numerator.to_le_bytes());
            buf.extend_from_slice(&r.denominator.to_le_bytes());
        }
        ExifData::RationalArray(v) => {
            for r in v {
                buf.extend_from_slice(&r.numerator.to_le_bytes());
                buf.extend_from_slice(&r.denominator.to_le_bytes());
            }
        }
        ExifData::SignedByte(v) => buf.push(*v as u8),
        ExifData::SignedByteArray(v) => buf.extend(v.iter().map(|b| *b as u8)),
        ExifData::Undefined(v) => buf.extend_from_slice(v),
        ExifData::SignedShort(v) => buf.extend_from_slice(&v.to_le_bytes()),
        ExifData::SignedShortArray(v) => {
            for value in v {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        ExifData::SignedLong(v) => buf.extend_from_slice(&v.to_le_bytes()),
        ExifData::SignedLongArray(v) => {
            for value in v {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        ExifData::SignedRational(r) => {
            buf.extend_from_slice(&r.numerator.to_le_bytes());
            buf.extend_from_slice(&r.denominator.to_le_bytes());
        }
        ExifData::SignedRationalArray(v) => {
            for r in v {
                buf.extend_from_slice(&r.numerator.to_le_bytes());
                buf.extend_from_slice(&r.denominator.to_le_bytes());
            }
        }
        ExifData::Float(v) => buf.extend_from_slice(&v.to_le_bytes()),
        ExifData::FloatArray(v) => {
            for value in v {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        ExifData::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
        ExifData::DoubleArray(v) => {
            for value in v {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    buf
}
