//! Helpers over encapsulated pixel data fragments.
//!
//! Compressed transfer syntaxes store pixel data as a sequence of
//! fragments. Single-frame data may be split over any number of
//! fragments and is defragmented into one compressed blob before
//! decoding; multi-frame data requires one fragment per frame so
//! that each frame can be decoded independently.

use crate::source::RawPixelData;
use crate::{FragmentationSnafu, Result};

/// Concatenate all fragments into a single contiguous byte buffer.
pub fn defragment(raw: &RawPixelData) -> Vec<u8> {
    let total: usize = raw.fragments.iter().map(|f| f.len()).sum();
    let mut out = Vec::with_capacity(total);
    for fragment in &raw.fragments {
        out.extend_from_slice(fragment);
    }
    out
}

/// Split encapsulated pixel data into per-frame byte buffers,
/// in the order the fragments appear.
///
/// Multi-frame encapsulation requires exactly one fragment per frame;
/// any other layout is rejected so that no frame boundary is guessed.
pub fn split_frames(raw: &RawPixelData, number_of_frames: u32) -> Result<Vec<&[u8]>> {
    if raw.fragments.len() != number_of_frames as usize {
        return FragmentationSnafu {
            message: format!(
                "cannot split {} fragments into {} frames",
                raw.fragments.len(),
                number_of_frames
            ),
        }
        .fail();
    }
    Ok(raw.fragments.iter().map(|f| f.as_slice()).collect())
}
