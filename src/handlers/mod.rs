//! Pixel data handler adapters.
//!
//! A handler turns the dataset's raw pixel bytes into flat sample bytes,
//! delegating any decompression to an external codec.
//! Handlers separate two failure channels:
//! a missing optional dependency is reported through the
//! [`Unavailable`](ProcessOutcome::Unavailable) sentinel
//! (so that dispatch may try the next candidate),
//! while unreadable bytes or unrepresentable sample formats
//! are hard errors that are never retried.

use byteordered::Endianness;
use snafu::OptionExt;

use crate::source::{PixelDataSource, RawPixelData};
use crate::{MissingAttributeSnafu, Result};

pub mod jpeg;
pub mod jpegls;
pub mod native;

/// Flat sample bytes produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPixelBytes {
    /// The decoded sample bytes,
    /// frames concatenated in the order their fragments appeared.
    pub data: Vec<u8>,

    /// The byte order of the sample bytes as reported by the codec,
    /// or `None` to fall back to the order declared by the file.
    pub byte_order: Option<Endianness>,
}

/// The outcome of asking a handler to process pixel data.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The handler decoded the pixel data.
    Decoded(DecodedPixelBytes),
    /// The handler's optional dependency is missing;
    /// the message tells the user what to enable.
    /// This is a sentinel, not an error,
    /// because another handler may still cover the encoding.
    Unavailable { message: String },
}

/// A pixel data handler back end.
pub trait PixelDecoder {
    /// Process the dataset's pixel data into flat sample bytes.
    ///
    /// For compressed encodings,
    /// each frame fragment is decoded independently
    /// and the per-frame outputs are concatenated in fragment order;
    /// single-frame data is defragmented into one compressed blob first.
    fn process(&self, src: &dyn PixelDataSource) -> Result<ProcessOutcome>;
}

/// Fetch the raw pixel data element, which handlers require.
pub(crate) fn require_pixel_data(src: &dyn PixelDataSource) -> Result<RawPixelData> {
    src.raw_pixel_data()
        .context(MissingAttributeSnafu { name: "PixelData" })
}
