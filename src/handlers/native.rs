//! Handler for uncompressed (native) pixel data.

use crate::encaps;
use crate::handlers::{require_pixel_data, DecodedPixelBytes, PixelDecoder, ProcessOutcome};
use crate::source::PixelDataSource;
use crate::Result;

/// Handler for the uncompressed transfer syntaxes.
///
/// The pixel bytes are already flat samples;
/// they are returned as-is,
/// in the byte order declared by the transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativeHandler;

impl PixelDecoder for NativeHandler {
    fn process(&self, src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
        let raw = require_pixel_data(src)?;
        // native data is normally a single element; chunked
        // buffers are concatenated in the order they appear
        let data = encaps::defragment(&raw);
        Ok(ProcessOutcome::Decoded(DecodedPixelBytes {
            data,
            byte_order: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{PixelRepresentation, RawPixelData};
    use crate::uids;
    use byteordered::Endianness;

    struct UncompressedSource {
        data: Vec<u8>,
    }

    impl PixelDataSource for UncompressedSource {
        fn transfer_syntax_uid(&self) -> &str {
            uids::EXPLICIT_VR_LITTLE_ENDIAN
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
                fragments: vec![self.data.clone()],
                offset_table: Vec::new(),
            })
        }
    }

    #[test]
    fn native_data_passes_through() {
        let src = UncompressedSource {
            data: vec![1, 2, 3, 4],
        };
        match NativeHandler.process(&src).unwrap() {
            ProcessOutcome::Decoded(decoded) => {
                assert_eq!(decoded.data, vec![1, 2, 3, 4]);
                assert_eq!(decoded.byte_order, None);
            }
            ProcessOutcome::Unavailable { message } => {
                panic!("native handler is always available: {}", message)
            }
        }
    }

    #[test]
    fn missing_pixel_data_is_an_error() {
        struct NoPixels;
        impl PixelDataSource for NoPixels {
            fn transfer_syntax_uid(&self) -> &str {
                uids::IMPLICIT_VR_LITTLE_ENDIAN
            }
            fn rows(&self) -> Option<u16> {
                Some(1)
            }
            fn cols(&self) -> Option<u16> {
                Some(1)
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
                None
            }
        }

        assert!(matches!(
            NativeHandler.process(&NoPixels),
            Err(crate::Error::MissingAttribute { name: "PixelData" })
        ));
    }
}
