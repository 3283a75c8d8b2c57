//! Dataset view consumed by pixel data handlers and the shaping routine.
//!
//! Complete DICOM object implementations are expected to
//! implement [`PixelDataSource`] so that handlers can fetch
//! the image pixel attributes and the raw pixel bytes
//! without depending on any particular object model.

use byteordered::Endianness;

/// Raw pixel data as stored in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPixelData {
    /// A single element for native pixel data,
    /// or the encapsulated fragments in the order they appear.
    pub fragments: Vec<Vec<u8>>,

    /// The basic offset table for the fragments,
    /// or empty if there is none.
    pub offset_table: Vec<u32>,
}

/// An interpreted representation of the _Pixel Representation_ attribute.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum PixelRepresentation {
    /// unsigned pixel data sample values
    Unsigned,
    /// signed pixel data sample values
    Signed,
}

impl PixelRepresentation {
    /// Interpret the stored attribute value (0 or 1).
    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            0 => Some(PixelRepresentation::Unsigned),
            1 => Some(PixelRepresentation::Signed),
            _ => None,
        }
    }
}

/// An interpreted representation of the _Planar Configuration_ attribute.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum PlanarConfiguration {
    /// sample values for each pixel are stored contiguously
    Interleaved,
    /// each sample plane is stored separately
    Planar,
}

impl PlanarConfiguration {
    /// Interpret the stored attribute value,
    /// falling back to interleaved for anything other than 1.
    pub fn from_value(value: u16) -> Self {
        if value == 1 {
            PlanarConfiguration::Planar
        } else {
            PlanarConfiguration::Interleaved
        }
    }
}

/// Read access to the parts of a DICOM object
/// that pixel data decoding needs.
///
/// Attribute getters return `None` when the element is absent;
/// whether that is an error depends on the caller
/// (e.g. _Number of Frames_ is optional, _Rows_ is not).
pub trait PixelDataSource {
    /// Return the object's transfer syntax UID.
    ///
    /// A trailing NUL padding byte, if present, is tolerated by consumers.
    fn transfer_syntax_uid(&self) -> &str;

    /// Return the _Rows_, or `None` if it is not found.
    fn rows(&self) -> Option<u16>;

    /// Return the _Columns_, or `None` if it is not found.
    fn cols(&self) -> Option<u16>;

    /// Return the _Samples Per Pixel_, or `None` if it is not found.
    fn samples_per_pixel(&self) -> Option<u16>;

    /// Return the _Bits Allocated_, or `None` if it is not defined.
    fn bits_allocated(&self) -> Option<u16>;

    /// Return the _Pixel Representation_, or `None` if it is not defined.
    fn pixel_representation(&self) -> Option<PixelRepresentation>;

    /// Return the _Planar Configuration_,
    /// assuming interleaved samples when the attribute is absent.
    fn planar_configuration(&self) -> PlanarConfiguration {
        PlanarConfiguration::Interleaved
    }

    /// Return the _Number of Frames_, or `None` if it is not defined.
    fn number_of_frames(&self) -> Option<u32>;

    /// Return the byte order declared by the object's transfer syntax.
    fn byte_order(&self) -> Endianness;

    /// Return the raw pixel data element,
    /// or `None` if the object has none.
    fn raw_pixel_data(&self) -> Option<RawPixelData>;
}
