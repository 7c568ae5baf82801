//! Endian-aware primitive reads over an in-memory buffer
//!
//! EXIF containers declare their byte order in the header, so every
//! multi-byte read is parameterized by [`ByteOrder`]. [`EndianReader`] is a
//! cursor over an immutable byte slice: a read that would run past the end
//! returns `None` and leaves the cursor where it was, so a truncated entry
//! degrades to a recoverable per-field failure instead of aborting the walk.

use byteorder::ByteOrder as _;

/// Byte order for multi-byte values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least-significant byte first ("II")
    LittleEndian,
    /// Most-significant byte first ("MM")
    BigEndian,
}

impl ByteOrder {
    /// Decode a u16 from the first two bytes
    pub fn read_u16(self, data: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => byteorder::LittleEndian::read_u16(data),
            ByteOrder::BigEndian => byteorder::BigEndian::read_u16(data),
        }
    }

    /// Decode a u32 from the first four bytes
    pub fn read_u32(self, data: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => byteorder::LittleEndian::read_u32(data),
            ByteOrder::BigEndian => byteorder::BigEndian::read_u32(data),
        }
    }

    /// Decode a u64 from the first eight bytes
    pub fn read_u64(self, data: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => byteorder::LittleEndian::read_u64(data),
            ByteOrder::BigEndian => byteorder::BigEndian::read_u64(data),
        }
    }

    /// Encode a u16 into the first two bytes
    pub fn write_u16(self, data: &mut [u8], value: u16) {
        match self {
            ByteOrder::LittleEndian => byteorder::LittleEndian::write_u16(data, value),
            ByteOrder::BigEndian => byteorder::BigEndian::write_u16(data, value),
        }
    }

    /// Encode a u32 into the first four bytes
    pub fn write_u32(self, data: &mut [u8], value: u32) {
        match self {
            ByteOrder::LittleEndian => byteorder::LittleEndian::write_u32(data, value),
            ByteOrder::BigEndian => byteorder::BigEndian::write_u32(data, value),
        }
    }

    /// Encode a u64 into the first eight bytes
    pub fn write_u64(self, data: &mut [u8], value: u64) {
        match self {
            ByteOrder::LittleEndian => byteorder::LittleEndian::write_u64(data, value),
            ByteOrder::BigEndian => byteorder::BigEndian::write_u64(data, value),
        }
    }
}

/// Cursor-based reader with explicit byte-order reads
///
/// All reads return `None` when the remaining buffer is too short, without
/// advancing the cursor. The cursor position is always queryable via
/// [`index`](Self::index) for diagnostics.
#[derive(Debug)]
pub struct EndianReader<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> EndianReader<'a> {
    /// Create a reader positioned at the start of the buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    /// Current cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bytes remaining after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.index)
    }

    /// Move the cursor to an absolute position
    ///
    /// Returns false (cursor unchanged) when the position is past the end.
    pub fn seek(&mut self, index: usize) -> bool {
        if index > self.data.len() {
            return false;
        }
        self.index = index;
        true
    }

    /// Borrow `len` bytes at the cursor and advance past them
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.index..self.index.checked_add(len)?)?;
        self.index += len;
        Some(bytes)
    }

    /// Borrow `len` bytes at an absolute offset without moving the cursor
    ///
    /// Used for directory entries whose value is stored out-of-line.
    pub fn bytes_at(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    /// Read an unsigned byte
    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.index)?;
        self.index += 1;
        Some(byte)
    }

    /// Read a signed byte
    pub fn read_i8(&mut self) -> Option<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read an unsigned 16-bit integer
    pub fn read_u16(&mut self, order: ByteOrder) -> Option<u16> {
        self.read_bytes(2).map(|b| order.read_u16(b))
    }

    /// Read a signed 16-bit integer
    pub fn read_i16(&mut self, order: ByteOrder) -> Option<i16> {
        self.read_u16(order).map(|v| v as i16)
    }

    /// Read an unsigned 32-bit integer
    pub fn read_u32(&mut self, order: ByteOrder) -> Option<u32> {
        self.read_bytes(4).map(|b| order.read_u32(b))
    }

    /// Read a signed 32-bit integer
    pub fn read_i32(&mut self, order: ByteOrder) -> Option<i32> {
        self.read_u32(order).map(|v| v as i32)
    }

    /// Read an IEEE single-precision float
    pub fn read_f32(&mut self, order: ByteOrder) -> Option<f32> {
        self.read_u32(order).map(f32::from_bits)
    }

    /// Read an IEEE double-precision float
    pub fn read_f64(&mut self, order: ByteOrder) -> Option<f64> {
        self.read_bytes(8).map(|b| f64::from_bits(order.read_u64(b)))
    }

    /// Read an unsigned rational (numerator then denominator)
    pub fn read_rational(&mut self, order: ByteOrder) -> Option<(u32, u32)> {
        // Both halves or neither: check the full width up front
        if self.remaining() < 8 {
            return None;
        }
        let numerator = self.read_u32(order)?;
        let denominator = self.read_u32(order)?;
        Some((numerator, denominator))
    }

    /// Read a signed rational (numerator then denominator)
    pub fn read_srational(&mut self, order: ByteOrder) -> Option<(i32, i32)> {
        if self.remaining() < 8 {
            return None;
        }
        let numerator = self.read_i32(order)?;
        let denominator = self.read_i32(order)?;
        Some((numerator, denominator))
    }
}
