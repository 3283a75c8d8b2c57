//! Handler for JPEG compressed pixel data,
//! decoding through the `jpeg-decoder` crate when the
//! `jpeg` cargo feature is enabled.

use crate::handlers::{PixelDecoder, ProcessOutcome};
use crate::source::PixelDataSource;
use crate::Result;

pub(crate) const REMEDY: &str =
    "enable the `jpeg` cargo feature of dicom-pixel-handlers to decode JPEG pixel data";

/// Handler for JPEG baseline, extended and lossless SV1 pixel data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegHandler;

#[cfg(feature = "jpeg")]
impl PixelDecoder for JpegHandler {
    fn process(&self, src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
        use crate::encaps;
        use crate::handlers::{require_pixel_data, DecodedPixelBytes};

        let raw = require_pixel_data(src)?;
        let number_of_frames = src.number_of_frames().unwrap_or(1);

        let mut data = Vec::new();
        if number_of_frames > 1 {
            for (i, frame) in encaps::split_frames(&raw, number_of_frames)?
                .into_iter()
                .enumerate()
            {
                decode_frame(frame, i, &mut data)?;
            }
        } else {
            let blob = encaps::defragment(&raw);
            decode_frame(&blob, 0, &mut data)?;
        }

        // decoded samples are in host order regardless of
        // what the file declares
        Ok(ProcessOutcome::Decoded(DecodedPixelBytes {
            data,
            byte_order: Some(byteordered::Endianness::native()),
        }))
    }
}

#[cfg(feature = "jpeg")]
fn decode_frame(frame: &[u8], index: usize, dst: &mut Vec<u8>) -> Result<()> {
    use snafu::ResultExt;

    let mut decoder = jpeg_decoder::Decoder::new(std::io::Cursor::new(frame));
    let mut decoded = decoder
        .decode()
        .map_err(|e| Box::new(e) as Box<_>)
        .with_whatever_context(|_| format!("JPEG decoding failure on frame {}", index))?;
    dst.append(&mut decoded);
    Ok(())
}

#[cfg(not(feature = "jpeg"))]
impl PixelDecoder for JpegHandler {
    fn process(&self, _src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
        Ok(ProcessOutcome::Unavailable {
            message: REMEDY.to_owned(),
        })
    }
}
