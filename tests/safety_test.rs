//! Safety tests - hostile and malformed input containment
//!
//! These tests verify that decoding never panics and that damage stays
//! local to the entries that carry it. Comprehensive coverage should be
//! done with fuzzing (cargo-fuzz).

use exif_io::test_utils::TiffBuilder;
use exif_io::{decode, ByteOrder, EntryType, ExifTag};

#[test]
fn test_truncated_headers_decode_empty() {
    let full = TiffBuilder::little_endian().into_bytes();

    for len in 0..full.len() {
        let decoded = decode(&full[..len]);
        assert!(decoded.values.is_empty(), "prefix of {len} bytes");
        assert!(decoded.invalid_tags.is_empty());
        assert!(decoded.thumbnail.is_none());
    }
}

#[test]
fn test_empty_and_junk_buffers() {
    assert!(decode(&[]).values.is_empty());
    assert!(decode(b"\xFF\xD8\xFF\xE1 not tiff data").values.is_empty());

    // Valid header, IFD0 offset pointing past the end
    let mut b = TiffBuilder::raw(ByteOrder::LittleEndian);
    b.push_bytes(b"II");
    b.push_u16(0x002A);
    b.push_u32(0xFFFF_FFFF);
    assert!(decode(&b.into_bytes()).values.is_empty());
}

#[test]
fn test_directory_truncated_mid_entry() {
    let mut b = TiffBuilder::little_endian();
    b.push_u16(4); // Claims four entries, delivers one and a half
    let field = b.field_u16(1);
    b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, field);
    b.push_u16(ExifTag::MAKE.id());
    b.push_u16(EntryType::Ascii as u16);

    let decoded = decode(&b.into_bytes());
    assert_eq!(decoded.values.len(), 1);
    assert!(decoded.invalid_tags.contains(&ExifTag::MAKE));
}

#[test]
fn test_entry_count_larger_than_buffer() {
    let mut b = TiffBuilder::little_endian();
    b.push_u16(900); // Under the entry cap but far beyond the buffer

    let decoded = decode(&b.into_bytes());
    assert!(decoded.values.is_empty());
}

#[test]
fn test_offset_into_header_does_not_panic() {
    // Out-of-line value whose offset points back into the header
    let mut b = TiffBuilder::little_endian();
    b.push_u16(1);
    b.entry_at_offset(ExifTag::MAKE.id(), EntryType::Ascii as u16, 6, 0);
    b.push_u32(0);

    // Garbage text, but structurally decodable; must not panic either way
    let _ = decode(&b.into_bytes());
}

#[test]
fn test_sub_ifd_pointer_out_of_bounds() {
    let mut b = TiffBuilder::little_endian();
    b.push_u16(1);
    b.entry_at_offset(
        ExifTag::EXIF_IFD_POINTER.id(),
        EntryType::Long as u16,
        1,
        0xFFFF_0000,
    );
    b.push_u32(0);

    let decoded = decode(&b.into_bytes());
    assert!(decoded.values.is_empty());
    assert!(decoded.invalid_tags.contains(&ExifTag::EXIF_IFD_POINTER));
}

#[test]
fn test_sub_ifd_pointer_cycle_terminates() {
    // Exif pointer aimed back at IFD0: the walk visits it once more and stops
    let mut b = TiffBuilder::little_endian();
    b.push_u16(2);
    let field = b.field_u16(1);
    b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, field);
    b.entry_at_offset(ExifTag::EXIF_IFD_POINTER.id(), EntryType::Long as u16, 1, 8);
    b.push_u32(0);

    let decoded = decode(&b.into_bytes());
    assert_eq!(decoded.values.len(), 1);
}

#[test]
fn test_component_count_overflow() {
    // count * component size overflows usize multiplication paths
    let mut b = TiffBuilder::little_endian();
    b.push_u16(2);
    b.entry(
        ExifTag::X_RESOLUTION.id(),
        EntryType::Rational as u16,
        u32::MAX,
        [0; 4],
    );
    let field = b.field_u16(1);
    b.entry(ExifTag::ORIENTATION.id(), EntryType::Short as u16, 1, field);
    b.push_u32(0);

    let decoded = decode(&b.into_bytes());
    assert_eq!(decoded.values.len(), 1);
    assert!(decoded.invalid_tags.contains(&ExifTag::X_RESOLUTION));
}

#[test]
fn test_thumbnail_range_overflow() {
    // offset + length wraps; the descriptor must be dropped, not sliced
    let mut b = TiffBuilder::little_endian();
    b.push_u16(0);
    b.push_u32(14);
    b.push_u16(2);
    let offset_field = b.field_u32(u32::MAX);
    let length_field = b.field_u32(u32::MAX);
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
fn test_next_ifd_link_out_of_bounds() {
    let mut b = TiffBuilder::little_endian();
    b.push_u16(0);
    b.push_u32(0xFFFF_FF00); // Thumbnail IFD link past the end

    let decoded = decode(&b.into_bytes());
    assert!(decoded.thumbnail.is_none());
}
