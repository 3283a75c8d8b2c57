//! Handler for JPEG-LS compressed pixel data,
//! decoding through the CharLS bindings when the
//! `charls` cargo feature is enabled.

use crate::handlers::{PixelDecoder, ProcessOutcome};
use crate::source::PixelDataSource;
use crate::Result;

pub(crate) const REMEDY: &str =
    "enable the `charls` cargo feature of dicom-pixel-handlers (CharLS bindings) to decode JPEG-LS pixel data";

/// Handler for JPEG-LS lossless and near-lossless pixel data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegLsHandler;

#[cfg(feature = "charls")]
impl PixelDecoder for JpegLsHandler {
    fn process(&self, src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
        use crate::encaps;
        use crate::handlers::{require_pixel_data, DecodedPixelBytes};

        let raw = require_pixel_data(src)?;
        let number_of_frames = src.number_of_frames().unwrap_or(1);

        let mut data = Vec::new();
        if number_of_frames > 1 {
            for frame in encaps::split_frames(&raw, number_of_frames)? {
                data.append(&mut decode_frame(frame)?);
            }
        } else {
            let blob = encaps::defragment(&raw);
            data = decode_frame(&blob)?;
        }

        Ok(ProcessOutcome::Decoded(DecodedPixelBytes {
            data,
            byte_order: Some(byteordered::Endianness::native()),
        }))
    }
}

#[cfg(feature = "charls")]
fn decode_frame(frame: &[u8]) -> Result<Vec<u8>> {
    use snafu::ResultExt;

    charls::CharLS::default()
        .decode(frame)
        .map_err(|error| error.to_string())
        .with_whatever_context(|error| format!("JPEG-LS decoding failure: {}", error))
}

#[cfg(not(feature = "charls"))]
impl PixelDecoder for JpegLsHandler {
    fn process(&self, _src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
        Ok(ProcessOutcome::Unavailable {
            message: REMEDY.to_owned(),
        })
    }
}

#[cfg(all(test, not(feature = "charls")))]
mod tests {
    use super::*;
    use crate::source::{PixelRepresentation, RawPixelData};
    use crate::uids;
    use byteordered::Endianness;

    struct JpegLsSource;

    impl PixelDataSource for JpegLsSource {
        fn transfer_syntax_uid(&self) -> &str {
            uids::JPEG_LS_LOSSLESS
        }
        fn rows(&self) -> Option<u16> {
            Some(2)
        }
        fn cols(&self) -> Option<u16> {
            Some(2)
        }
        fn samples_per_pixel(&self) -> Option<u16> {
            Some(1)
        }
        fn bits_allocated(&self) -> Option<u16> {
            Some(8)
        }
        fn pixel_representation(&self) -> Option<PixelRepresentation> {
            Some(PixelRepresentation::Unsigned)
        }
        fn number_of_frames(&self) -> Option<u32> {
            None
        }
        fn byte_order(&self) -> Endianness {
            Endianness::Little
        }
        fn raw_pixel_data(&self) -> Option<RawPixelData> {
            Some(RawPixelData {
                fragments: vec![vec![0xFF, 0xD8]],
                offset_table: Vec::new(),
            })
        }
    }

    #[test]
    fn missing_feature_yields_the_unavailable_sentinel() {
        match JpegLsHandler.process(&JpegLsSource).unwrap() {
            ProcessOutcome::Unavailable { message } => assert!(message.contains("charls")),
            ProcessOutcome::Decoded(_) => panic!("handler should be unavailable"),
        }
    }
}
