//! Shaping of decoded pixel bytes into typed n-dimensional arrays.
//!
//! This module is the common back half of every handler:
//! given the flat sample bytes a handler produced
//! and the image pixel attributes of the dataset,
//! it resolves the scalar type,
//! materializes the samples in host byte order,
//! reconciles the buffer length against the expected sample count,
//! and reshapes the result into frames, rows, columns and samples.
//!
//! Reshaping never copies sample data;
//! the only copies in this module are the one-time conversion of
//! bytes into wider scalars and the truncation of zero padding.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use ndarray::{Array, ArrayD, IxDyn};
use num_traits::{NumCast, ToPrimitive};
use snafu::{ensure, OptionExt, ResultExt};
use tracing::warn;

use crate::source::{PixelDataSource, PixelRepresentation, PlanarConfiguration};
use crate::{
    InvalidDataTypeSnafu, MissingAttributeSnafu, MultiFramePlanarSnafu, Result, ShapeMismatchSnafu,
    UnimplementedSampleFormatSnafu, UnsupportedBitsAllocatedSnafu,
};

/// The image pixel attributes that determine
/// the scalar type and dimensions of the decoded array.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMetadata {
    pub rows: u16,
    pub cols: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub pixel_representation: PixelRepresentation,
    pub planar_configuration: PlanarConfiguration,
    /// _Number of Frames_, if the attribute is present.
    pub number_of_frames: Option<u32>,
    /// The byte order of the sample bytes,
    /// either declared by the transfer syntax
    /// or reported by the codec that produced them.
    pub byte_order: Endianness,
}

impl PixelMetadata {
    /// Gather the image pixel attributes from a dataset view.
    pub fn from_source(src: &dyn PixelDataSource) -> Result<Self> {
        Ok(PixelMetadata {
            rows: src.rows().context(MissingAttributeSnafu { name: "Rows" })?,
            cols: src
                .cols()
                .context(MissingAttributeSnafu { name: "Columns" })?,
            samples_per_pixel: src.samples_per_pixel().context(MissingAttributeSnafu {
                name: "SamplesPerPixel",
            })?,
            bits_allocated: src.bits_allocated().context(MissingAttributeSnafu {
                name: "BitsAllocated",
            })?,
            pixel_representation: src.pixel_representation().context(MissingAttributeSnafu {
                name: "PixelRepresentation",
            })?,
            planar_configuration: src.planar_configuration(),
            number_of_frames: src.number_of_frames(),
            byte_order: src.byte_order(),
        })
    }

    fn frames(&self) -> usize {
        self.number_of_frames.unwrap_or(1).max(1) as usize
    }

    /// The number of samples the buffer must hold.
    fn expected_samples(&self) -> usize {
        self.frames() * self.rows as usize * self.cols as usize * self.samples_per_pixel as usize
    }

    /// The number of bytes the buffer must hold for the given scalar type.
    pub fn expected_byte_len(&self, scalar: ScalarType) -> usize {
        self.expected_samples() * scalar.size_of()
    }
}

/// The machine scalar type of the decoded samples,
/// uniquely determined by _Bits Allocated_ and _Pixel Representation_.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl ScalarType {
    /// Resolve the scalar type of the pixel samples.
    ///
    /// Sample widths other than 8, 16 and 32 bits are not representable
    /// and are reported as an unsupported format.
    pub fn of(bits_allocated: u16, representation: PixelRepresentation) -> Result<Self> {
        match (bits_allocated, representation) {
            (8, PixelRepresentation::Unsigned) => Ok(ScalarType::U8),
            (8, PixelRepresentation::Signed) => Ok(ScalarType::I8),
            (16, PixelRepresentation::Unsigned) => Ok(ScalarType::U16),
            (16, PixelRepresentation::Signed) => Ok(ScalarType::I16),
            (32, PixelRepresentation::Unsigned) => Ok(ScalarType::U32),
            (32, PixelRepresentation::Signed) => Ok(ScalarType::I32),
            _ => UnsupportedBitsAllocatedSnafu { bits_allocated }.fail(),
        }
    }

    /// The sample size in bytes.
    pub fn size_of(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 => 2,
            ScalarType::U32 | ScalarType::I32 => 4,
        }
    }
}

/// A decoded pixel array over one of the supported scalar types.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelArray {
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
}

impl PixelArray {
    /// The shape of the array:
    /// `(rows, cols)`, `(rows, cols, samples)`,
    /// `(frames, rows, cols)` or `(frames, rows, cols, samples)`.
    pub fn shape(&self) -> &[usize] {
        match self {
            PixelArray::U8(a) => a.shape(),
            PixelArray::I8(a) => a.shape(),
            PixelArray::U16(a) => a.shape(),
            PixelArray::I16(a) => a.shape(),
            PixelArray::U32(a) => a.shape(),
            PixelArray::I32(a) => a.shape(),
        }
    }

    /// The total number of samples.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether the array holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scalar type of the samples.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            PixelArray::U8(_) => ScalarType::U8,
            PixelArray::I8(_) => ScalarType::I8,
            PixelArray::U16(_) => ScalarType::U16,
            PixelArray::I16(_) => ScalarType::I16,
            PixelArray::U32(_) => ScalarType::U32,
            PixelArray::I32(_) => ScalarType::I32,
        }
    }

    /// Convert the samples into an ndarray of the requested type `T`.
    ///
    /// Fails with `InvalidDataType` if any sample value
    /// is not representable in `T`.
    pub fn to_ndarray<T>(&self) -> Result<ArrayD<T>>
    where
        T: NumCast,
    {
        match self {
            PixelArray::U8(a) => convert(a),
            PixelArray::I8(a) => convert(a),
            PixelArray::U16(a) => convert(a),
            PixelArray::I16(a) => convert(a),
            PixelArray::U32(a) => convert(a),
            PixelArray::I32(a) => convert(a),
        }
    }
}

fn convert<S, T>(arr: &ArrayD<S>) -> Result<ArrayD<T>>
where
    S: ToPrimitive + Copy,
    T: NumCast,
{
    let converted: Result<Vec<T>> = arr
        .iter()
        .map(|&v| T::from(v).context(InvalidDataTypeSnafu))
        .collect();
    Array::from_shape_vec(arr.raw_dim(), converted?).context(ShapeMismatchSnafu)
}

/// Shape flat sample bytes into the array
/// described by the image pixel attributes.
///
/// The same `(bytes, metadata)` pair always shapes
/// to the same array, and a well-formed buffer is
/// reshaped without copying the sample data.
pub fn shape_pixel_array(data: Vec<u8>, meta: &PixelMetadata) -> Result<PixelArray> {
    let scalar = ScalarType::of(meta.bits_allocated, meta.pixel_representation)?;
    let data = reconcile_length(data, meta, scalar);

    // a partial trailing sample would be floored away by the
    // conversion below and never reach the reshape check,
    // so it must be rejected here
    ensure!(
        data.len() % scalar.size_of() == 0,
        crate::LengthMismatchSnafu {
            actual: data.len(),
            expected: meta.expected_byte_len(scalar),
        }
    );

    let order = meta.byte_order;
    match scalar {
        ScalarType::U8 => reshape(data, meta).map(PixelArray::U8),
        ScalarType::I8 => {
            let samples = data.into_iter().map(|b| b as i8).collect();
            reshape(samples, meta).map(PixelArray::I8)
        }
        ScalarType::U16 => {
            let mut samples = vec![0u16; data.len() / 2];
            match order {
                Endianness::Little => LittleEndian::read_u16_into(&data, &mut samples),
                Endianness::Big => BigEndian::read_u16_into(&data, &mut samples),
            }
            reshape(samples, meta).map(PixelArray::U16)
        }
        ScalarType::I16 => {
            let mut samples = vec![0i16; data.len() / 2];
            match order {
                Endianness::Little => LittleEndian::read_i16_into(&data, &mut samples),
                Endianness::Big => BigEndian::read_i16_into(&data, &mut samples),
            }
            reshape(samples, meta).map(PixelArray::I16)
        }
        ScalarType::U32 => {
            let mut samples = vec![0u32; data.len() / 4];
            match order {
                Endianness::Little => LittleEndian::read_u32_into(&data, &mut samples),
                Endianness::Big => BigEndian::read_u32_into(&data, &mut samples),
            }
            reshape(samples, meta).map(PixelArray::U32)
        }
        ScalarType::I32 => {
            let mut samples = vec![0i32; data.len() / 4];
            match order {
                Endianness::Little => LittleEndian::read_i32_into(&data, &mut samples),
                Endianness::Big => BigEndian::read_i32_into(&data, &mut samples),
            }
            reshape(samples, meta).map(PixelArray::I32)
        }
    }
}

/// Truncate trailing zero padding down to the expected length.
///
/// Some codecs hand back a buffer that is longer than the image needs.
/// The surplus is dropped only when every surplus byte is zero;
/// a nonzero surplus is corruption and is left in place
/// so that the reshape fails instead of silently masking it.
/// A buffer that is too short is likewise left alone.
fn reconcile_length(mut data: Vec<u8>, meta: &PixelMetadata, scalar: ScalarType) -> Vec<u8> {
    let expected = meta.expected_byte_len(scalar);
    if data.len() > expected && data[expected..].iter().all(|&b| b == 0) {
        warn!(
            "truncating {} trailing zero bytes of pixel data",
            data.len() - expected
        );
        data.truncate(expected);
    }
    data
}

fn reshape<T>(samples: Vec<T>, meta: &PixelMetadata) -> Result<ArrayD<T>> {
    let frames = meta.frames();
    let rows = meta.rows as usize;
    let cols = meta.cols as usize;
    let samples_per_pixel = meta.samples_per_pixel as usize;

    if frames > 1 {
        if samples_per_pixel > 1 {
            ensure!(
                meta.planar_configuration == PlanarConfiguration::Interleaved,
                MultiFramePlanarSnafu {
                    samples_per_pixel: meta.samples_per_pixel,
                }
            );
            Array::from_shape_vec(IxDyn(&[frames, rows, cols, samples_per_pixel]), samples)
                .context(ShapeMismatchSnafu)
        } else {
            Array::from_shape_vec(IxDyn(&[frames, rows, cols]), samples)
                .context(ShapeMismatchSnafu)
        }
    } else if samples_per_pixel > 1 {
        ensure!(
            meta.bits_allocated == 8,
            UnimplementedSampleFormatSnafu {
                samples_per_pixel: meta.samples_per_pixel,
                bits_allocated: meta.bits_allocated,
            }
        );
        match meta.planar_configuration {
            PlanarConfiguration::Interleaved => {
                Array::from_shape_vec(IxDyn(&[rows, cols, samples_per_pixel]), samples)
                    .context(ShapeMismatchSnafu)
            }
            PlanarConfiguration::Planar => {
                // plane-major storage: build (samples, rows, cols) and
                // permute the strides into (rows, cols, samples)
                let planar =
                    Array::from_shape_vec(IxDyn(&[samples_per_pixel, rows, cols]), samples)
                        .context(ShapeMismatchSnafu)?;
                Ok(planar.permuted_axes(vec![1, 2, 0]))
            }
        }
    } else {
        Array::from_shape_vec(IxDyn(&[rows, cols]), samples).context(ShapeMismatchSnafu)
    }
}
