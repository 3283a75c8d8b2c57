//! Transfer syntax UIDs of the encodings the built-in handlers target.

/// _Implicit VR Little Endian_
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";

/// _Explicit VR Little Endian_
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// _Explicit VR Big Endian_
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

/// _JPEG Baseline (Process 1)_
pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";

/// _JPEG Extended (Process 2 & 4)_
pub const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";

/// _JPEG Lossless, Non-Hierarchical, First-Order Prediction (Process 14, SV1)_
pub const JPEG_LOSSLESS_SV1: &str = "1.2.840.10008.1.2.4.70";

/// _JPEG-LS Lossless Image Compression_
pub const JPEG_LS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";

/// _JPEG-LS Lossy (Near-Lossless) Image Compression_
pub const JPEG_LS_LOSSY: &str = "1.2.840.10008.1.2.4.81";

/// The uncompressed transfer syntaxes.
pub const NATIVE: &[&str] = &[
    IMPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_BIG_ENDIAN,
];

/// The JPEG transfer syntaxes handled by the `jpeg` feature.
pub const JPEG: &[&str] = &[JPEG_BASELINE, JPEG_EXTENDED, JPEG_LOSSLESS_SV1];

/// The JPEG-LS transfer syntaxes handled by the `charls` feature.
pub const JPEG_LS: &[&str] = &[JPEG_LS_LOSSLESS, JPEG_LS_LOSSY];
