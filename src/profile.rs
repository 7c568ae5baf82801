//! EXIF profile facade
//!
//! [`ExifProfile`] owns the raw serialized buffer and a lazily-materialized
//! typed view of it. The first value-level operation decodes the buffer; from
//! then on the view is authoritative and the buffer is regenerated from it
//! whenever serialization is requested. The profile is single-threaded by
//! design: hosts sharing one instance across threads must wrap it in their
//! own lock so check-then-materialize and read-modify-write stay atomic.

use crate::error::{Error, Result};
use crate::reader::{self, DecodedExif, ThumbnailRange};
use crate::tag::{ExifParts, ExifTag};
use crate::value::{ExifData, ExifValue};
use crate::writer::ExifWriter;
use std::collections::BTreeSet;

/// An EXIF metadata profile over a raw byte buffer
///
/// # Example
///
/// ```
/// use exif_io::{ExifData, ExifProfile, ExifTag};
///
/// # fn main() -> exif_io::Result<()> {
/// let mut profile = ExifProfile::new();
/// profile.set_value(ExifTag::MAKE, Some(ExifData::Ascii("Canon".into())))?;
///
/// let bytes = profile.to_bytes()?.expect("profile has values");
///
/// let mut reread = ExifProfile::from_bytes(bytes);
/// assert!(reread.get_value(ExifTag::MAKE).is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExifProfile {
    data: Option<Vec<u8>>,
    parts: ExifParts,
    view: Option<View>,
}

/// The materialized in-memory view
#[derive(Debug)]
struct View {
    values: Vec<ExifValue>,
    invalid_tags: BTreeSet<ExifTag>,
    thumbnail: Option<ThumbnailRange>,
}

impl ExifProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profile over an existing serialized buffer
    ///
    /// Nothing is decoded until the first value-level operation.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            parts: ExifParts::ALL,
            view: None,
        }
    }

    /// Sections written when the profile is serialized
    pub fn parts(&self) -> ExifParts {
        self.parts
    }

    /// Select which sections are written when the profile is serialized
    pub fn set_parts(&mut self, parts: ExifParts) {
        self.parts = parts;
    }

    /// Decode-once-then-cache; every operation below goes through here
    fn view(&mut self) -> &mut View {
        if self.view.is_none() {
            let DecodedExif {
                values,
                invalid_tags,
                thumbnail,
            } = match &self.data {
                Some(data) => reader::decode(data),
                None => DecodedExif::default(),
            };
            self.view = Some(View {
                values,
                invalid_tags,
                thumbnail,
            });
        }
        self.view.as_mut().expect("view was just materialized")
    }

    /// All current values, in discovery/insertion order
    pub fn values(&mut self) -> &[ExifValue] {
        &self.view().values
    }

    /// Tags that were present in the bytes but could not be decoded
    pub fn invalid_tags(&mut self) -> &BTreeSet<ExifTag> {
        &self.view().invalid_tags
    }

    /// The value with the given tag, if present
    pub fn get_value(&mut self, tag: ExifTag) -> Option<&ExifValue> {
        self.view().values.iter().find(|value| value.tag() == tag)
    }

    /// Set the value of a tag, creating it when absent
    ///
    /// `None` resets an existing (or freshly created) value to its type's
    /// default. Fails with [`Error::UnsupportedTag`] for tags without a
    /// registered type and [`Error::TypeMismatch`] when the payload does not
    /// match the tag's declared type; neither failure mutates the profile.
    pub fn set_value(&mut self, tag: ExifTag, value: Option<ExifData>) -> Result<()> {
        let view = self.view();

        if let Some(existing) = view.values.iter_mut().find(|v| v.tag() == tag) {
            return if existing.set_value(value) {
                Ok(())
            } else {
                Err(Error::TypeMismatch { tag: tag.id() })
            };
        }

        let mut created = ExifValue::create(tag)?;
        if !created.set_value(value) {
            return Err(Error::TypeMismatch { tag: tag.id() });
        }
        view.values.push(created);
        Ok(())
    }

    /// Remove the value with the given tag
    ///
    /// Returns true when a value was found and removed.
    pub fn remove_value(&mut self, tag: ExifTag) -> bool {
        let view = self.view();
        match view.values.iter().position(|value| value.tag() == tag) {
            Some(index) => {
                view.values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Location of the embedded thumbnail within the current buffer
    pub fn thumbnail(&mut self) -> Option<ThumbnailRange> {
        self.view().thumbnail
    }

    /// The embedded thumbnail bytes, sliced out of the current buffer
    pub fn thumbnail_bytes(&mut self) -> Option<&[u8]> {
        let range = self.view().thumbnail?;
        self.data
            .as_ref()?
            .get(range.offset..range.offset + range.length)
    }

    /// Drop the thumbnail so the next serialization omits it
    pub fn remove_thumbnail(&mut self) {
        self.view().thumbnail = None;
    }

    /// Load the values from the profile and rewrite the profile data
    ///
    /// Useful to normalize or repair a profile, and for consumers that
    /// require the writer's canonical structure.
    pub fn rewrite(&mut self) -> Result<()> {
        self.view();
        self.update_data()
    }

    /// Serialize the profile
    ///
    /// Once the view is materialized the buffer is regenerated from it;
    /// until then the stored bytes are returned untouched. An empty view
    /// yields `None`: the profile is unset rather than an empty header.
    pub fn to_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        if self.view.is_some() {
            self.update_data()?;
        }
        Ok(self.data.clone())
    }

    /// Regenerate the raw buffer from the materialized view
    fn update_data(&mut self) -> Result<()> {
        let thumbnail = self.thumbnail_bytes().map(|bytes| bytes.to_vec());
        let writer = ExifWriter::new(self.parts);
        let view = self.view.as_mut().expect("update_data follows view()");

        match writer.write_with_thumbnail(&view.values, thumbnail.as_deref())? {
            Some(encoded) => {
                view.thumbnail = encoded.thumbnail;
                self.data = Some(encoded.data);
            }
            None => {
                view.thumbnail = None;
                self.data = None;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_profile, sample_profile_with_thumbnail, THUMB_BYTES};

    #[test]
    fn test_lazy_materialization_from_bytes() {
        let mut profile = ExifProfile::from_bytes(sample_profile());
        assert!(profile.get_value(ExifTag::MAKE).is_some());
        assert!(profile.invalid_tags().is_empty());
    }

    #[test]
    fn test_set_creates_then_overwrites() {
        let mut profile = ExifProfile::new();

        profile
            .set_value(ExifTag::ORIENTATION, Some(ExifData::Short(1)))
            .unwrap();
        profile
            .set_value(ExifTag::ORIENTATION, Some(ExifData::Short(6)))
            .unwrap();

        assert_eq!(profile.values().len(), 1);
        assert_eq!(
            *profile.get_value(ExifTag::ORIENTATION).unwrap().value(),
            ExifData::Short(6)
        );
    }

    #[test]
    fn test_set_none_resets_without_removing() {
        let mut profile = ExifProfile::new();
        profile
            .set_value(ExifTag::ORIENTATION, Some(ExifData::Short(6)))
            .unwrap();

        profile.set_value(ExifTag::ORIENTATION, None).unwrap();

        let value = profile.get_value(ExifTag::ORIENTATION).unwrap();
        assert_eq!(*value.value(), ExifData::Short(0));
    }

    #[test]
    fn test_set_failures_do_not_mutate() {
        let mut profile = ExifProfile::new();

        match profile.set_value(ExifTag(0xF00D), Some(ExifData::Short(1))) {
            Err(Error::UnsupportedTag(0xF00D)) => {}
            other => panic!("expected UnsupportedTag, got {other:?}"),
        }

        match profile.set_value(ExifTag::ORIENTATION, Some(ExifData::Ascii("6".into()))) {
            Err(Error::TypeMismatch { tag: 0x0112 }) => {}
            other => panic!("expected TypeMismatch, got {other:?}"),
        }

        assert!(profile.values().is_empty());
    }

    #[test]
    fn test_remove_value() {
        let mut profile = ExifProfile::from_bytes(sample_profile());

        assert!(profile.remove_value(ExifTag::MAKE));
        assert!(profile.get_value(ExifTag::MAKE).is_none());

        // Absent tag: not removed, no side effects
        let before = profile.values().len();
        assert!(!profile.remove_value(ExifTag::MAKE));
        assert_eq!(profile.values().len(), before);
    }

    #[test]
    fn test_empty_profile_serializes_to_none() {
        let mut profile = ExifProfile::new();
        assert!(profile.to_bytes().unwrap().is_none());

        // Removing every value unsets a populated profile too
        let mut profile = ExifProfile::from_bytes(sample_profile());
        let tags: Vec<ExifTag> = profile.values().iter().map(|v| v.tag()).collect();
        for tag in tags {
            profile.remove_value(tag);
        }
        assert!(profile.to_bytes().unwrap().is_none());
    }

    #[test]
    fn test_thumbnail_access_and_removal() {
        let mut profile = ExifProfile::from_bytes(sample_profile_with_thumbnail());

        assert_eq!(profile.thumbnail_bytes(), Some(THUMB_BYTES));

        profile.remove_thumbnail();
        assert!(profile.thumbnail().is_none());

        let rewritten = profile.to_bytes().unwrap().unwrap();
        let mut reread = ExifProfile::from_bytes(rewritten);
        assert!(reread.thumbnail().is_none());
        assert!(reread.get_value(ExifTag::MAKE).is_some());
    }

    #[test]
    fn test_rewrite_refreshes_thumbnail_descriptor() {
        let mut profile = ExifProfile::from_bytes(sample_profile_with_thumbnail());

        // Grow an IFD0 value so the thumbnail must move
        profile
            .set_value(
                ExifTag::IMAGE_DESCRIPTION,
                Some(ExifData::Ascii("A much longer description value".into())),
            )
            .unwrap();
        profile.rewrite().unwrap();

        assert_eq!(profile.thumbnail_bytes(), Some(THUMB_BYTES));
    }

    #[test]
    fn test_parts_mask_applies_on_serialize() {
        let mut profile = ExifProfile::from_bytes(sample_profile());
        profile.set_parts(ExifParts::IFD | ExifParts::EXIF);

        let bytes = profile.to_bytes().unwrap().unwrap();
        let mut reread = ExifProfile::from_bytes(bytes);

        assert!(reread.get_value(ExifTag::GPS_LATITUDE).is_none());
        assert!(reread.get_value(ExifTag::EXPOSURE_TIME).is_some());
    }
}
