//! This crate decodes DICOM pixel data into typed n-dimensional arrays.
//!
//! Decoding is a two step process:
//! a handler registered for the object's transfer syntax
//! turns the raw (possibly encapsulated) pixel data into flat sample bytes,
//! and the shared shaping routine turns those bytes
//! into an [`ndarray`]-backed [`PixelArray`]
//! with the scalar type, byte order, and dimensions
//! mandated by the image pixel attributes.
//!
//! Handlers for compressed transfer syntaxes
//! delegate to external codec crates behind cargo features
//! (`jpeg` for [`jpeg-decoder`], `charls` for JPEG-LS).
//! When a feature is disabled,
//! the handler still registers itself
//! so that capability lookups can tell the user what to enable.
//!
//! # Example
//! ```no_run
//! # use std::error::Error;
//! use dicom_pixel_handlers::{decode_pixel_array, PixelDataSource};
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! # fn dataset() -> Box<dyn PixelDataSource> { unimplemented!() }
//! let obj = dataset();
//! let array = decode_pixel_array(&*obj)?;
//! println!("decoded {:?} pixels", array.shape());
//! #   Ok(())
//! # }
//! ```
//!
//! [`jpeg-decoder`]: https://docs.rs/jpeg-decoder

use snafu::Snafu;

pub mod encaps;
pub mod handlers;
pub mod overlay;
pub mod registry;
pub mod shape;
pub mod source;
pub mod uids;

pub use crate::handlers::{DecodedPixelBytes, PixelDecoder, ProcessOutcome};
pub use crate::registry::{handlers as handler_registry, Capability, DecoderDescriptor, HandlerRegistry};
pub use crate::shape::{shape_pixel_array, PixelArray, PixelMetadata, ScalarType};
pub use crate::source::{PixelDataSource, PixelRepresentation, PlanarConfiguration, RawPixelData};

/// The error conditions raised while decoding and shaping pixel data.
///
/// Only missing optional dependencies are handled internally
/// (by trying the next registered handler);
/// every other condition propagates to the caller,
/// since guessing at pixel data is never acceptable.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// No registered handler targets this transfer syntax.
    #[snafu(display("Unknown transfer syntax `{}`", uid))]
    UnknownTransferSyntax { uid: String },

    /// Handlers target this transfer syntax,
    /// but none of their dependencies are present.
    /// The guidance text aggregates the remediation message
    /// of every candidate handler.
    #[snafu(display("No handler available for transfer syntax `{}`: {}", uid, guidance))]
    MissingDependency { uid: String, guidance: String },

    /// A required image pixel attribute is absent from the dataset.
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingAttribute { name: &'static str },

    /// The sample width cannot be represented as a machine scalar.
    #[snafu(display("Unsupported BitsAllocated {}, expected 8, 16 or 32", bits_allocated))]
    UnsupportedBitsAllocated { bits_allocated: u16 },

    /// A valid but unhandled combination of image pixel attributes.
    #[snafu(display(
        "SamplesPerPixel {} with BitsAllocated {} is not implemented (multi-sample data requires BitsAllocated = 8)",
        samples_per_pixel,
        bits_allocated
    ))]
    UnimplementedSampleFormat {
        samples_per_pixel: u16,
        bits_allocated: u16,
    },

    /// Multi-frame color data stored in separate sample planes
    /// has no defined layout here and is rejected outright.
    #[snafu(display(
        "Multi-frame pixel data with SamplesPerPixel {} and PlanarConfiguration 1 is unsupported",
        samples_per_pixel
    ))]
    MultiFramePlanar { samples_per_pixel: u16 },

    /// The decoded buffer length is irreconcilable with the
    /// expected sample count.
    #[snafu(display(
        "Pixel data buffer has {} bytes, expected {}",
        actual,
        expected
    ))]
    LengthMismatch { actual: usize, expected: usize },

    /// The sample count does not match the target dimensions.
    #[snafu(display("Could not reshape pixel data"))]
    ShapeMismatch { source: ndarray::ShapeError },

    /// A sample value is not representable in the requested scalar type.
    #[snafu(display("Invalid target data type for pixel array conversion"))]
    InvalidDataType,

    /// The fragment layout does not permit the requested frame split.
    #[snafu(display("{}", message))]
    Fragmentation { message: String },

    /// The underlying codec rejected the pixel data.
    #[snafu(whatever, display("{}", message))]
    DecodeFailed {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decode the pixel data of the given dataset into a shaped array.
///
/// The handler is chosen from the process-wide [registry](crate::registry)
/// by the dataset's transfer syntax UID.
/// When a handler reports a codec-side byte order for its output,
/// that order takes precedence over the one declared by the file.
pub fn decode_pixel_array(src: &dyn PixelDataSource) -> Result<PixelArray> {
    let decoded = registry::handlers().decode(src)?;
    let mut meta = PixelMetadata::from_source(src)?;
    if let Some(order) = decoded.byte_order {
        meta.byte_order = order;
    }
    shape_pixel_array(decoded.data, &meta)
}
