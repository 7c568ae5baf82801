//! EXIF tag identifiers and their declared wire types
//!
//! A tag is a 16-bit id plus a statically known wire type, arity, and the
//! logical directory (section) it belongs to. Two tags are equal iff their
//! numeric ids match; unknown ids still get an [`ExifTag`] identity so the
//! reader can report them as invalid.

use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Wire type codes from the TIFF 6.0 directory format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EntryType {
    /// Unsigned 8-bit integer
    Byte = 1,
    /// NUL-terminated 7-bit string
    Ascii = 2,
    /// Unsigned 16-bit integer
    Short = 3,
    /// Unsigned 32-bit integer
    Long = 4,
    /// Two unsigned 32-bit integers (numerator, denominator)
    Rational = 5,
    /// Signed 8-bit integer
    SignedByte = 6,
    /// Opaque byte sequence
    Undefined = 7,
    /// Signed 16-bit integer
    SignedShort = 8,
    /// Signed 32-bit integer
    SignedLong = 9,
    /// Two signed 32-bit integers (numerator, denominator)
    SignedRational = 10,
    /// IEEE single-precision float
    Float = 11,
    /// IEEE double-precision float
    Double = 12,
}

impl EntryType {
    /// Resolve a wire type code
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(EntryType::Byte),
            2 => Some(EntryType::Ascii),
            3 => Some(EntryType::Short),
            4 => Some(EntryType::Long),
            5 => Some(EntryType::Rational),
            6 => Some(EntryType::SignedByte),
            7 => Some(EntryType::Undefined),
            8 => Some(EntryType::SignedShort),
            9 => Some(EntryType::SignedLong),
            10 => Some(EntryType::SignedRational),
            11 => Some(EntryType::Float),
            12 => Some(EntryType::Double),
            _ => None,
        }
    }

    /// Size in bytes of one component of this type
    pub fn size(self) -> usize {
        match self {
            EntryType::Byte | EntryType::Ascii | EntryType::SignedByte | EntryType::Undefined => 1,
            EntryType::Short | EntryType::SignedShort => 2,
            EntryType::Long | EntryType::SignedLong | EntryType::Float => 4,
            EntryType::Rational | EntryType::SignedRational | EntryType::Double => 8,
        }
    }
}

/// Logical directory a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Main image directory (IFD0)
    Ifd,
    /// Exif sub-directory
    Exif,
    /// GPS sub-directory
    Gps,
    /// Thumbnail directory (IFD1)
    Thumbnail,
}

bitflags! {
    /// Selects which logical sections the writer emits
    ///
    /// Values whose tag belongs to an excluded section are dropped from the
    /// output without error.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExifParts: u32 {
        /// Main image directory entries
        const IFD = 0x0001;
        /// Exif sub-directory entries
        const EXIF = 0x0002;
        /// GPS sub-directory entries
        const GPS = 0x0004;
        /// Thumbnail directory and embedded image data
        const THUMBNAIL = 0x0008;
        /// Every section
        const ALL = Self::IFD.bits()
            | Self::EXIF.bits()
            | Self::GPS.bits()
            | Self::THUMBNAIL.bits();
    }
}

impl Default for ExifParts {
    fn default() -> Self {
        ExifParts::ALL
    }
}

impl ExifParts {
    /// Whether the mask includes the given section
    pub fn includes(self, section: Section) -> bool {
        match section {
            Section::Ifd => self.contains(ExifParts::IFD),
            Section::Exif => self.contains(ExifParts::EXIF),
            Section::Gps => self.contains(ExifParts::GPS),
            Section::Thumbnail => self.contains(ExifParts::THUMBNAIL),
        }
    }
}

/// Statically known shape of a tag's value
#[derive(Debug, Clone, Copy)]
pub struct TagSpec {
    id: u16,
    name: &'static str,
    /// Declared wire type
    pub entry_type: EntryType,
    /// Scalar or ordered sequence
    pub is_array: bool,
    /// Directory the tag is written to
    pub section: Section,
}

/// An EXIF tag identifier
///
/// Identity is the 16-bit numeric code alone, so ids found in a file that
/// have no registered [`TagSpec`] still compare and sort like any other tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExifTag(pub u16);

macro_rules! tag_table {
    ($($konst:ident = $id:literal, $name:literal, $etype:ident, $array:literal, $section:ident;)*) => {
        impl ExifTag {
            $(
                #[doc = $name]
                pub const $konst: ExifTag = ExifTag($id);
            )*
        }

        const KNOWN_TAGS: &[TagSpec] = &[
            $(
                TagSpec {
                    id: $id,
                    name: $name,
                    entry_type: EntryType::$etype,
                    is_array: $array,
                    section: Section::$section,
                },
            )*
        ];
    };
}

tag_table! {
    // GPS sub-directory (ids share a number space separate from IFD0)
    GPS_VERSION_ID            = 0x0000, "GPSVersionID",            Byte,           true,  Gps;
    GPS_LATITUDE_REF          = 0x0001, "GPSLatitudeRef",          Ascii,          false, Gps;
    GPS_LATITUDE              = 0x0002, "GPSLatitude",             Rational,       true,  Gps;
    GPS_LONGITUDE_REF         = 0x0003, "GPSLongitudeRef",         Ascii,          false, Gps;
    GPS_LONGITUDE             = 0x0004, "GPSLongitude",            Rational,       true,  Gps;
    GPS_ALTITUDE_REF          = 0x0005, "GPSAltitudeRef",          Byte,           false, Gps;
    GPS_ALTITUDE              = 0x0006, "GPSAltitude",             Rational,       false, Gps;
    GPS_TIME_STAMP            = 0x0007, "GPSTimeStamp",            Rational,       true,  Gps;
    GPS_SATELLITES            = 0x0008, "GPSSatellites",           Ascii,          false, Gps;
    GPS_STATUS                = 0x0009, "GPSStatus",               Ascii,          false, Gps;
    GPS_MEASURE_MODE          = 0x000A, "GPSMeasureMode",          Ascii,          false, Gps;
    GPS_DOP                   = 0x000B, "GPSDOP",                  Rational,       false, Gps;
    GPS_SPEED_REF             = 0x000C, "GPSSpeedRef",             Ascii,          false, Gps;
    GPS_SPEED                 = 0x000D, "GPSSpeed",                Rational,       false, Gps;
    GPS_TRACK_REF             = 0x000E, "GPSTrackRef",             Ascii,          false, Gps;
    GPS_TRACK                 = 0x000F, "GPSTrack",                Rational,       false, Gps;
    GPS_IMG_DIRECTION_REF     = 0x0010, "GPSImgDirectionRef",      Ascii,          false, Gps;
    GPS_IMG_DIRECTION         = 0x0011, "GPSImgDirection",         Rational,       false, Gps;
    GPS_MAP_DATUM             = 0x0012, "GPSMapDatum",             Ascii,          false, Gps;
    GPS_DEST_LATITUDE_REF     = 0x0013, "GPSDestLatitudeRef",      Ascii,          false, Gps;
    GPS_DEST_LATITUDE         = 0x0014, "GPSDestLatitude",         Rational,       true,  Gps;
    GPS_DEST_LONGITUDE_REF    = 0x0015, "GPSDestLongitudeRef",     Ascii,          false, Gps;
    GPS_DEST_LONGITUDE        = 0x0016, "GPSDestLongitude",        Rational,       true,  Gps;
    GPS_DEST_BEARING_REF      = 0x0017, "GPSDestBearingRef",       Ascii,          false, Gps;
    GPS_DEST_BEARING          = 0x0018, "GPSDestBearing",          Rational,       false, Gps;
    GPS_DEST_DISTANCE_REF     = 0x0019, "GPSDestDistanceRef",      Ascii,          false, Gps;
    GPS_DEST_DISTANCE         = 0x001A, "GPSDestDistance",         Rational,       false, Gps;
    GPS_PROCESSING_METHOD     = 0x001B, "GPSProcessingMethod",     Undefined,      false, Gps;
    GPS_AREA_INFORMATION      = 0x001C, "GPSAreaInformation",      Undefined,      false, Gps;
    GPS_DATE_STAMP            = 0x001D, "GPSDateStamp",            Ascii,          false, Gps;
    GPS_DIFFERENTIAL          = 0x001E, "GPSDifferential",         Short,          false, Gps;

    // IFD0 (main image)
    IMAGE_WIDTH               = 0x0100, "ImageWidth",              Long,           false, Ifd;
    IMAGE_LENGTH              = 0x0101, "ImageLength",             Long,           false, Ifd;
    BITS_PER_SAMPLE           = 0x0102, "BitsPerSample",           Short,          true,  Ifd;
    COMPRESSION               = 0x0103, "Compression",             Short,          false, Ifd;
    PHOTOMETRIC_INTERPRETATION = 0x0106, "PhotometricInterpretation", Short,       false, Ifd;
    IMAGE_DESCRIPTION         = 0x010E, "ImageDescription",        Ascii,          false, Ifd;
    MAKE                      = 0x010F, "Make",                    Ascii,          false, Ifd;
    MODEL                     = 0x0110, "Model",                   Ascii,          false, Ifd;
    STRIP_OFFSETS             = 0x0111, "StripOffsets",            Long,           true,  Ifd;
    ORIENTATION               = 0x0112, "Orientation",             Short,          false, Ifd;
    SAMPLES_PER_PIXEL         = 0x0115, "SamplesPerPixel",         Short,          false, Ifd;
    ROWS_PER_STRIP            = 0x0116, "RowsPerStrip",            Long,           false, Ifd;
    STRIP_BYTE_COUNTS         = 0x0117, "StripByteCounts",         Long,           true,  Ifd;
    X_RESOLUTION              = 0x011A, "XResolution",             Rational,       false, Ifd;
    Y_RESOLUTION              = 0x011B, "YResolution",             Rational,       false, Ifd;
    PLANAR_CONFIGURATION      = 0x011C, "PlanarConfiguration",     Short,          false, Ifd;
    RESOLUTION_UNIT           = 0x0128, "ResolutionUnit",          Short,          false, Ifd;
    TRANSFER_FUNCTION         = 0x012D, "TransferFunction",        Short,          true,  Ifd;
    SOFTWARE                  = 0x0131, "Software",                Ascii,          false, Ifd;
    DATE_TIME                 = 0x0132, "DateTime",                Ascii,          false, Ifd;
    ARTIST                    = 0x013B, "Artist",                  Ascii,          false, Ifd;
    WHITE_POINT               = 0x013E, "WhitePoint",              Rational,       true,  Ifd;
    PRIMARY_CHROMATICITIES    = 0x013F, "PrimaryChromaticities",   Rational,       true,  Ifd;

    // IFD1 (thumbnail) interchange pair; recomputed on write
    JPEG_INTERCHANGE_FORMAT   = 0x0201, "JPEGInterchangeFormat",   Long,           false, Thumbnail;
    JPEG_INTERCHANGE_FORMAT_LENGTH = 0x0202, "JPEGInterchangeFormatLength", Long,  false, Thumbnail;

    YCBCR_COEFFICIENTS        = 0x0211, "YCbCrCoefficients",       Rational,       true,  Ifd;
    YCBCR_SUB_SAMPLING        = 0x0212, "YCbCrSubSampling",        Short,          true,  Ifd;
    YCBCR_POSITIONING         = 0x0213, "YCbCrPositioning",        Short,          false, Ifd;
    REFERENCE_BLACK_WHITE     = 0x0214, "ReferenceBlackWhite",     Rational,       true,  Ifd;
    COPYRIGHT                 = 0x8298, "Copyright",               Ascii,          false, Ifd;

    // Exif sub-directory
    EXPOSURE_TIME             = 0x829A, "ExposureTime",            Rational,       false, Exif;
    F_NUMBER                  = 0x829D, "FNumber",                 Rational,       false, Exif;
    EXIF_IFD_POINTER          = 0x8769, "ExifIFDPointer",          Long,           false, Ifd;
    EXPOSURE_PROGRAM          = 0x8822, "ExposureProgram",         Short,          false, Exif;
    GPS_IFD_POINTER           = 0x8825, "GPSIFDPointer",           Long,           false, Ifd;
    ISO_SPEED_RATINGS         = 0x8827, "ISOSpeedRatings",         Short,          true,  Exif;
    EXIF_VERSION              = 0x9000, "ExifVersion",             Undefined,      false, Exif;
    DATE_TIME_ORIGINAL        = 0x9003, "DateTimeOriginal",        Ascii,          false, Exif;
    DATE_TIME_DIGITIZED       = 0x9004, "DateTimeDigitized",       Ascii,          false, Exif;
    COMPONENTS_CONFIGURATION  = 0x9101, "ComponentsConfiguration", Undefined,      false, Exif;
    COMPRESSED_BITS_PER_PIXEL = 0x9102, "CompressedBitsPerPixel",  Rational,       false, Exif;
    SHUTTER_SPEED_VALUE       = 0x9201, "ShutterSpeedValue",       SignedRational, false, Exif;
    APERTURE_VALUE            = 0x9202, "ApertureValue",           Rational,       false, Exif;
    BRIGHTNESS_VALUE          = 0x9203, "BrightnessValue",         SignedRational, false, Exif;
    EXPOSURE_BIAS_VALUE       = 0x9204, "ExposureBiasValue",       SignedRational, false, Exif;
    MAX_APERTURE_VALUE        = 0x9205, "MaxApertureValue",        Rational,       false, Exif;
    SUBJECT_DISTANCE          = 0x9206, "SubjectDistance",         Rational,       false, Exif;
    METERING_MODE             = 0x9207, "MeteringMode",            Short,          false, Exif;
    LIGHT_SOURCE              = 0x9208, "LightSource",             Short,          false, Exif;
    FLASH                     = 0x9209, "Flash",                   Short,          false, Exif;
    FOCAL_LENGTH              = 0x920A, "FocalLength",             Rational,       false, Exif;
    SUBJECT_AREA              = 0x9214, "SubjectArea",             Short,          true,  Exif;
    MAKER_NOTE                = 0x927C, "MakerNote",               Undefined,      false, Exif;
    USER_COMMENT              = 0x9286, "UserComment",             Undefined,      false, Exif;
    SUBSEC_TIME               = 0x9290, "SubsecTime",              Ascii,          false, Exif;
    SUBSEC_TIME_ORIGINAL      = 0x9291, "SubsecTimeOriginal",      Ascii,          false, Exif;
    SUBSEC_TIME_DIGITIZED     = 0x9292, "SubsecTimeDigitized",     Ascii,          false, Exif;
    FLASHPIX_VERSION          = 0xA000, "FlashpixVersion",         Undefined,      false, Exif;
    COLOR_SPACE               = 0xA001, "ColorSpace",              Short,          false, Exif;
    PIXEL_X_DIMENSION         = 0xA002, "PixelXDimension",         Long,           false, Exif;
    PIXEL_Y_DIMENSION         = 0xA003, "PixelYDimension",         Long,           false, Exif;
    RELATED_SOUND_FILE        = 0xA004, "RelatedSoundFile",        Ascii,          false, Exif;
    FLASH_ENERGY              = 0xA20B, "FlashEnergy",             Rational,       false, Exif;
    FOCAL_PLANE_X_RESOLUTION  = 0xA20E, "FocalPlaneXResolution",   Rational,       false, Exif;
    FOCAL_PLANE_Y_RESOLUTION  = 0xA20F, "FocalPlaneYResolution",   Rational,       false, Exif;
    FOCAL_PLANE_RESOLUTION_UNIT = 0xA210, "FocalPlaneResolutionUnit", Short,       false, Exif;
    SUBJECT_LOCATION          = 0xA214, "SubjectLocation",         Short,          true,  Exif;
    EXPOSURE_INDEX            = 0xA215, "ExposureIndex",           Rational,       false, Exif;
    SENSING_METHOD            = 0xA217, "SensingMethod",           Short,          false, Exif;
    FILE_SOURCE               = 0xA300, "FileSource",              Undefined,      false, Exif;
    SCENE_TYPE                = 0xA301, "SceneType",               Undefined,      false, Exif;
    CFA_PATTERN               = 0xA302, "CFAPattern",              Undefined,      false, Exif;
    CUSTOM_RENDERED           = 0xA401, "CustomRendered",          Short,          false, Exif;
    EXPOSURE_MODE             = 0xA402, "ExposureMode",            Short,          false, Exif;
    WHITE_BALANCE             = 0xA403, "WhiteBalance",            Short,          false, Exif;
    DIGITAL_ZOOM_RATIO        = 0xA404, "DigitalZoomRatio",        Rational,       false, Exif;
    FOCAL_LENGTH_IN_35MM_FILM = 0xA405, "FocalLengthIn35mmFilm",   Short,          false, Exif;
    SCENE_CAPTURE_TYPE        = 0xA406, "SceneCaptureType",        Short,          false, Exif;
    GAIN_CONTROL              = 0xA407, "GainControl",             Short,          false, Exif;
    CONTRAST                  = 0xA408, "Contrast",                Short,          false, Exif;
    SATURATION                = 0xA409, "Saturation",              Short,          false, Exif;
    SHARPNESS                 = 0xA40A, "Sharpness",               Short,          false, Exif;
    SUBJECT_DISTANCE_RANGE    = 0xA40C, "SubjectDistanceRange",    Short,          false, Exif;
    IMAGE_UNIQUE_ID           = 0xA420, "ImageUniqueID",           Ascii,          false, Exif;
    BODY_SERIAL_NUMBER        = 0xA431, "BodySerialNumber",        Ascii,          false, Exif;
    LENS_SPECIFICATION        = 0xA432, "LensSpecification",       Rational,       true,  Exif;
    LENS_MAKE                 = 0xA433, "LensMake",                Ascii,          false, Exif;
    LENS_MODEL                = 0xA434, "LensModel",               Ascii,          false, Exif;
}

static TAG_INDEX: LazyLock<HashMap<u16, &'static TagSpec>> =
    LazyLock::new(|| KNOWN_TAGS.iter().map(|spec| (spec.id, spec)).collect());

impl ExifTag {
    /// The 16-bit numeric code
    pub fn id(self) -> u16 {
        self.0
    }

    /// Declared shape of this tag's value, if the tag is known
    pub fn spec(self) -> Option<&'static TagSpec> {
        TAG_INDEX.get(&self.0).copied()
    }

    /// Directory this tag belongs to, if known
    pub fn section(self) -> Option<Section> {
        self.spec().map(|spec| spec.section)
    }

    /// Whether a sub-IFD pointer lives behind this tag
    pub fn is_pointer(self) -> bool {
        self == ExifTag::EXIF_IFD_POINTER || self == ExifTag::GPS_IFD_POINTER
    }
}

impl From<u16> for ExifTag {
    fn from(id: u16) -> Self {
        ExifTag(id)
    }
}

impl fmt::Display for ExifTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spec() {
            Some(spec) => write!(f, "{}", spec.name),
            None => write!(f, "Tag(0x{:04X})", self.0),
        }
    }
}
