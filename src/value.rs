//! Typed EXIF values
//!
//! Each tag's payload is one variant of the closed [`ExifData`] set: one
//! variant per wire type and arity combination. [`ExifValue`] pairs a tag
//! with its payload and enforces the tag's declared shape on assignment.

use crate::error::{Error, Result};
use crate::tag::{EntryType, ExifTag};
use std::fmt;

/// Unsigned rational (numerator over denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rational {
    /// Numerator
    pub numerator: u32,
    /// Denominator
    pub denominator: u32,
}

impl Rational {
    /// Create a rational number
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Approximate as f64; None when the denominator is zero
    pub fn to_f64(self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Signed rational (numerator over denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedRational {
    /// Numerator
    pub numerator: i32,
    /// Denominator
    pub denominator: i32,
}

impl SignedRational {
    /// Create a signed rational number
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Approximate as f64; None when the denominator is zero
    pub fn to_f64(self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

impl fmt::Display for SignedRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A decoded tag payload
///
/// One variant per wire type and arity. ASCII is a single string regardless
/// of arity (the component count is its byte length plus the terminator) and
/// UNDEFINED is always an opaque byte sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ExifData {
    /// Single unsigned byte
    Byte(u8),
    /// Unsigned byte sequence
    ByteArray(Vec<u8>),
    /// NUL-terminated text, stored without the terminator
    Ascii(String),
    /// Single unsigned 16-bit integer
    Short(u16),
    /// Unsigned 16-bit sequence
    ShortArray(Vec<u16>),
    /// Single unsigned 32-bit integer
    Long(u32),
    /// Unsigned 32-bit sequence
    LongArray(Vec<u32>),
    /// Single unsigned rational
    Rational(Rational),
    /// Unsigned rational sequence
    RationalArray(Vec<Rational>),
    /// Single signed byte
    SignedByte(i8),
    /// Signed byte sequence
    SignedByteArray(Vec<i8>),
    /// Opaque byte blob
    Undefined(Vec<u8>),
    /// Single signed 16-bit integer
    SignedShort(i16),
    /// Signed 16-bit sequence
    SignedShortArray(Vec<i16>),
    /// Single signed 32-bit integer
    SignedLong(i32),
    /// Signed 32-bit sequence
    SignedLongArray(Vec<i32>),
    /// Single signed rational
    SignedRational(SignedRational),
    /// Signed rational sequence
    SignedRationalArray(Vec<SignedRational>),
    /// Single IEEE single-precision float
    Float(f32),
    /// Single-precision sequence
    FloatArray(Vec<f32>),
    /// Single IEEE double-precision float
    Double(f64),
    /// Double-precision sequence
    DoubleArray(Vec<f64>),
}

impl ExifData {
    /// Wire type of this payload
    pub fn entry_type(&self) -> EntryType {
        match self {
            ExifData::Byte(_) | ExifData::ByteArray(_) => EntryType::Byte,
            ExifData::Ascii(_) => EntryType::Ascii,
            ExifData::Short(_) | ExifData::ShortArray(_) => EntryType::Short,
            ExifData::Long(_) | ExifData::LongArray(_) => EntryType::Long,
            ExifData::Rational(_) | ExifData::RationalArray(_) => EntryType::Rational,
            ExifData::SignedByte(_) | ExifData::SignedByteArray(_) => EntryType::SignedByte,
            ExifData::Undefined(_) => EntryType::Undefined,
            ExifData::SignedShort(_) | ExifData::SignedShortArray(_) => EntryType::SignedShort,
            ExifData::SignedLong(_) | ExifData::SignedLongArray(_) => EntryType::SignedLong,
            ExifData::SignedRational(_) | ExifData::SignedRationalArray(_) => {
                EntryType::SignedRational
            }
            ExifData::Float(_) | ExifData::FloatArray(_) => EntryType::Float,
            ExifData::Double(_) | ExifData::DoubleArray(_) => EntryType::Double,
        }
    }

    /// Whether this payload is an ordered sequence
    ///
    /// ASCII and UNDEFINED hold multiple wire components but are scalar at
    /// the value level.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            ExifData::ByteArray(_)
                | ExifData::ShortArray(_)
                | ExifData::LongArray(_)
                | ExifData::RationalArray(_)
                | ExifData::SignedByteArray(_)
                | ExifData::SignedShortArray(_)
                | ExifData::SignedLongArray(_)
                | ExifData::SignedRationalArray(_)
                | ExifData::FloatArray(_)
                | ExifData::DoubleArray(_)
        )
    }

    /// Number of wire components (ASCII counts the NUL terminator)
    pub fn component_count(&self) -> u32 {
        match self {
            ExifData::Ascii(s) => (s.len() + 1) as u32,
            ExifData::ByteArray(v) => v.len() as u32,
            ExifData::Undefined(v) => v.len() as u32,
            ExifData::ShortArray(v) => v.len() as u32,
            ExifData::LongArray(v) => v.len() as u32,
            ExifData::RationalArray(v) => v.len() as u32,
            ExifData::SignedByteArray(v) => v.len() as u32,
            ExifData::SignedShortArray(v) => v.len() as u32,
            ExifData::SignedLongArray(v) => v.len() as u32,
            ExifData::SignedRationalArray(v) => v.len() as u32,
            ExifData::FloatArray(v) => v.len() as u32,
            ExifData::DoubleArray(v) => v.len() as u32,
            _ => 1,
        }
    }

    /// Encoded byte length of this payload
    pub fn byte_size(&self) -> usize {
        self.entry_type().size() * self.component_count() as usize
    }

    /// Default payload for a declared type and arity
    pub fn default_for(entry_type: EntryType, is_array: bool) -> ExifData {
        match (entry_type, is_array) {
            (EntryType::Byte, false) => ExifData::Byte(0),
            (EntryType::Byte, true) => ExifData::ByteArray(Vec::new()),
            (EntryType::Ascii, _) => ExifData::Ascii(String::new()),
            (EntryType::Short, false) => ExifData::Short(0),
            (EntryType::Short, true) => ExifData::ShortArray(Vec::new()),
            (EntryType::Long, false) => ExifData::Long(0),
            (EntryType::Long, true) => ExifData::LongArray(Vec::new()),
            (EntryType::Rational, false) => ExifData::Rational(Rational::default()),
            (EntryType::Rational, true) => ExifData::RationalArray(Vec::new()),
            (EntryType::SignedByte, false) => ExifData::SignedByte(0),
            (EntryType::SignedByte, true) => ExifData::SignedByteArray(Vec::new()),
            (EntryType::Undefined, _) => ExifData::Undefined(Vec::new()),
            (EntryType::SignedShort, false) => ExifData::SignedShort(0),
            (EntryType::SignedShort, true) => ExifData::SignedShortArray(Vec::new()),
            (EntryType::SignedLong, false) => ExifData::SignedLong(0),
            (EntryType::SignedLong, true) => ExifData::SignedLongArray(Vec::new()),
            (EntryType::SignedRational, false) => {
                ExifData::SignedRational(SignedRational::default())
            }
            (EntryType::SignedRational, true) => ExifData::SignedRationalArray(Vec::new()),
            (EntryType::Float, false) => ExifData::Float(0.0),
            (EntryType::Float, true) => ExifData::FloatArray(Vec::new()),
            (EntryType::Double, false) => ExifData::Double(0.0),
            (EntryType::Double, true) => ExifData::DoubleArray(Vec::new()),
        }
    }

    /// Single u32 view of integer scalars, used for pointer and count tags
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ExifData::Byte(v) => Some(*v as u32),
            ExifData::Short(v) => Some(*v as u32),
            ExifData::Long(v) => Some(*v),
            _ => None,
        }
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ExifData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifData::Byte(v) => write!(f, "{v}"),
            ExifData::ByteArray(v) => write!(f, "{}", join(v)),
            ExifData::Ascii(s) => write!(f, "{s}"),
            ExifData::Short(v) => write!(f, "{v}"),
            ExifData::ShortArray(v) => write!(f, "{}", join(v)),
            ExifData::Long(v) => write!(f, "{v}"),
            ExifData::LongArray(v) => write!(f, "{}", join(v)),
            ExifData::Rational(v) => write!(f, "{v}"),
            ExifData::RationalArray(v) => write!(f, "{}", join(v)),
            ExifData::SignedByte(v) => write!(f, "{v}"),
            ExifData::SignedByteArray(v) => write!(f, "{}", join(v)),
            ExifData::Undefined(v) => write!(f, "[{} bytes]", v.len()),
            ExifData::SignedShort(v) => write!(f, "{v}"),
            ExifData::SignedShortArray(v) => write!(f, "{}", join(v)),
            ExifData::SignedLong(v) => write!(f, "{v}"),
            ExifData::SignedLongArray(v) => write!(f, "{}", join(v)),
            ExifData::SignedRational(v) => write!(f, "{v}"),
            ExifData::SignedRationalArray(v) => write!(f, "{}", join(v)),
            ExifData::Float(v) => write!(f, "{v}"),
            ExifData::FloatArray(v) => write!(f, "{}", join(v)),
            ExifData::Double(v) => write!(f, "{v}"),
            ExifData::DoubleArray(v) => write!(f, "{}", join(v)),
        }
    }
}

/// Maps a tag plus exact value to a human-readable description
///
/// Presentation data stays outside the codec: hosts that want rendered
/// strings (for example "Flash fired" instead of "1") inject an
/// implementation; the codec itself never consults one.
pub trait DescriptionProvider {
    /// Description for the exact value, or None to fall back to the
    /// canonical form
    fn description(&self, tag: ExifTag, value: &ExifData) -> Option<String>;
}

/// A tag paired with its typed payload
#[derive(Debug, Clone, PartialEq)]
pub struct ExifValue {
    tag: ExifTag,
    data: ExifData,
}

impl ExifValue {
    /// Create an empty value of the tag's declared type
    ///
    /// Fails with [`Error::UnsupportedTag`] when no type is registered for
    /// the tag, which is distinct from a type mismatch on assignment.
    pub fn create(tag: ExifTag) -> Result<Self> {
        let spec = tag.spec().ok_or(Error::UnsupportedTag(tag.id()))?;
        Ok(Self {
            tag,
            data: ExifData::default_for(spec.entry_type, spec.is_array),
        })
    }

    /// The tag this value belongs to
    pub fn tag(&self) -> ExifTag {
        self.tag
    }

    /// Wire type of the payload
    pub fn entry_type(&self) -> EntryType {
        self.data.entry_type()
    }

    /// Whether the payload is a sequence
    pub fn is_array(&self) -> bool {
        self.data.is_array()
    }

    /// Borrow the payload
    pub fn value(&self) -> &ExifData {
        &self.data
    }

    /// Assign a payload, enforcing the declared type and arity
    ///
    /// `None` resets to the declared type's default without removing the
    /// value. A shape mismatch returns false and leaves the value unchanged.
    pub fn set_value(&mut self, value: Option<ExifData>) -> bool {
        match value {
            None => {
                self.data = ExifData::default_for(self.data.entry_type(), self.data.is_array());
                true
            }
            Some(data) => {
                if data.entry_type() == self.data.entry_type()
                    && data.is_array() == self.data.is_array()
                {
                    self.data = data;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Render via the provider, falling back to the canonical form
    pub fn describe(&self, provider: &dyn DescriptionProvider) -> String {
        provider
            .description(self.tag, &self.data)
            .unwrap_or_else(|| self.data.to_string())
    }
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tag, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uses_declared_shape() {
        let value = ExifValue::create(ExifTag::ORIENTATION).unwrap();
        assert_eq!(value.entry_type(), EntryType::Short);
        assert!(!value.is_array());
        assert_eq!(*value.value(), ExifData::Short(0));

        let value = ExifValue::create(ExifTag::GPS_LATITUDE).unwrap();
        assert_eq!(value.entry_type(), EntryType::Rational);
        assert!(value.is_array());
    }

    #[test]
    fn test_create_unknown_tag_fails() {
        match ExifValue::create(ExifTag(0xF00D)) {
            Err(Error::UnsupportedTag(0xF00D)) => {}
            other => panic!("expected UnsupportedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_set_value_type_checked() {
        let mut value = ExifValue::create(ExifTag::ORIENTATION).unwrap();

        assert!(value.set_value(Some(ExifData::Short(6))));
        assert_eq!(*value.value(), ExifData::Short(6));

        // Wrong wire type is rejected without mutating
        assert!(!value.set_value(Some(ExifData::Long(6))));
        assert_eq!(*value.value(), ExifData::Short(6));

        // Wrong arity is rejected too
        assert!(!value.set_value(Some(ExifData::ShortArray(vec![6]))));
        assert_eq!(*value.value(), ExifData::Short(6));
    }

    #[test]
    fn test_set_none_resets_to_default() {
        let mut value = ExifValue::create(ExifTag::MAKE).unwrap();
        assert!(value.set_value(Some(ExifData::Ascii("Canon".into()))));

        assert!(value.set_value(None));
        assert_eq!(*value.value(), ExifData::Ascii(String::new()));
    }

    #[test]
    fn test_component_counts() {
        assert_eq!(ExifData::Ascii("abc".into()).component_count(), 4);
        assert_eq!(ExifData::ShortArray(vec![1, 2, 3]).component_count(), 3);
        assert_eq!(ExifData::Short(1).component_count(), 1);
        assert_eq!(ExifData::Undefined(vec![0; 6]).component_count(), 6);
    }

    #[test]
    fn test_byte_sizes() {
        assert_eq!(ExifData::ShortArray(vec![1, 2, 3]).byte_size(), 6);
        assert_eq!(ExifData::LongArray(vec![1, 2]).byte_size(), 8);
        assert_eq!(
            ExifData::RationalArray(vec![Rational::new(1, 2), Rational::new(3, 4)]).byte_size(),
            16
        );
        assert_eq!(ExifData::Ascii("abc".into()).byte_size(), 4);
    }

    #[test]
    fn test_rational_display_and_f64() {
        let r = Rational::new(300, 1);
        assert_eq!(r.to_string(), "300/1");
        assert_eq!(r.to_f64(), Some(300.0));
        assert_eq!(Rational::new(1, 0).to_f64(), None);

        let s = SignedRational::new(-1, 3);
        assert_eq!(s.to_string(), "-1/3");
    }

    #[test]
    fn test_describe_prefers_provider() {
        struct FlashDescriptions;

        impl DescriptionProvider for FlashDescriptions {
            fn description(&self, tag: ExifTag, value: &ExifData) -> Option<String> {
                if tag == ExifTag::FLASH && *value == ExifData::Short(1) {
                    Some("Flash fired".into())
                } else {
                    None
                }
            }
        }

        let mut flash = ExifValue::create(ExifTag::FLASH).unwrap();
        flash.set_value(Some(ExifData::Short(1)));
        assert_eq!(flash.describe(&FlashDescriptions), "Flash fired");

        flash.set_value(Some(ExifData::Short(0)));
        assert_eq!(flash.describe(&FlashDescriptions), "0");
    }

    #[test]
    fn test_canonical_rendering() {
        let mut value = ExifValue::create(ExifTag::BITS_PER_SAMPLE).unwrap();
        value.set_value(Some(ExifData::ShortArray(vec![8, 8, 8])));
        assert_eq!(value.to_string(), "BitsPerSample: 8, 8, 8");

        let mut version = ExifValue::create(ExifTag::EXIF_VERSION).unwrap();
        version.set_value(Some(ExifData::Undefined(b"0230".to_vec())));
        assert_eq!(version.to_string(), "ExifVersion: [4 bytes]");
    }
}
