//! The scalar types of voxels, the description of a volume
//! and the volume itself.

use crate::error::{Result, ScalarTypeMismatchSnafu};
use crate::geometry::PatientMatrix;
use crate::options::MemoryRowOrder;
use crate::properties::ImageProperties;
use crate::transform::Rescale;
use byteorder::{ByteOrder, NativeEndian};
use dcmstack_core::{Tag, VR};
use dcmstack_dictionary_std::tags;
use dcmstack_encoding::transfer_syntax::TransferSyntax;
use dcmstack_object::MetaData;
use dcmstack_parser::PixelDataInfo;
use num_traits::NumCast;
use snafu::ensure;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "ndarray")]
use ndarray::{Array, Ix4};

/// The type of the samples of a volume in memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarType {
    /// Determine the scalar type of stored pixel samples.
    ///
    /// Samples of 1 and 12 bits are expanded to 8 and 16 bits.
    /// Samples of 32 and 64 bits are floating point
    /// when stored as _Float Pixel Data_ or _Double Float Pixel Data_.
    pub fn from_pixel_format(bits_allocated: u16, signed: bool, pixel_tag: Tag) -> Option<Self> {
        use ScalarType::*;
        let scalar = match bits_allocated {
            1..=8 if signed => I8,
            1..=8 => U8,
            9..=16 if signed => I16,
            9..=16 => U16,
            17..=32 if pixel_tag == tags::FLOAT_PIXEL_DATA => F32,
            17..=32 if signed => I32,
            17..=32 => U32,
            33..=64 if pixel_tag == tags::DOUBLE_FLOAT_PIXEL_DATA => F64,
            33..=64 if signed => I64,
            33..=64 => U64,
            _ => return None,
        };
        Some(scalar)
    }

    /// The size of one sample in bytes.
    pub fn size(self) -> usize {
        use ScalarType::*;
        match self {
            U8 | I8 => 1,
            U16 | I16 => 2,
            U32 | I32 | F32 => 4,
            U64 | I64 | F64 => 8,
        }
    }

    /// Whether samples are floating point numbers.
    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    /// Whether samples are signed.
    pub fn is_signed(self) -> bool {
        use ScalarType::*;
        matches!(self, I8 | I16 | I32 | I64 | F32 | F64)
    }

    /// The range of values which samples of this type can hold,
    /// for integer types up to 32 bits.
    pub(crate) fn clamp_range(self) -> Option<(f64, f64)> {
        use ScalarType::*;
        match self {
            U8 => Some((0., u8::MAX.into())),
            I8 => Some((i8::MIN.into(), i8::MAX.into())),
            U16 => Some((0., u16::MAX.into())),
            I16 => Some((i16::MIN.into(), i16::MAX.into())),
            U32 => Some((0., u32::MAX.into())),
            I32 => Some((i32::MIN.into(), i32::MAX.into())),
            _ => None,
        }
    }

    /// The pixel data attribute and value representation
    /// which store samples of this type.
    pub fn pixel_data_attribute(self) -> (Tag, VR) {
        use ScalarType::*;
        match self {
            U8 | I8 => (tags::PIXEL_DATA, VR::OB),
            U16 | I16 => (tags::PIXEL_DATA, VR::OW),
            U32 | I32 => (tags::PIXEL_DATA, VR::OL),
            U64 | I64 => (tags::PIXEL_DATA, VR::OV),
            F32 => (tags::FLOAT_PIXEL_DATA, VR::OF),
            F64 => (tags::DOUBLE_FLOAT_PIXEL_DATA, VR::OD),
        }
    }
}

/// A primitive type which can be read out of volume data.
pub trait Sample: Copy + Default + NumCast + Send + Sync + fmt::Debug + 'static {
    /// The scalar type of volumes holding this type.
    const SCALAR_TYPE: ScalarType;

    /// Read samples from native endian bytes.
    fn read_into(bytes: &[u8], out: &mut [Self]);

    /// Write samples as native endian bytes.
    fn write_into(samples: &[Self], out: &mut [u8]);
}

impl Sample for u8 {
    const SCALAR_TYPE: ScalarType = ScalarType::U8;

    fn read_into(bytes: &[u8], out: &mut [Self]) {
        out.copy_from_slice(bytes);
    }

    fn write_into(samples: &[Self], out: &mut [u8]) {
        out.copy_from_slice(samples);
    }
}

impl Sample for i8 {
    const SCALAR_TYPE: ScalarType = ScalarType::I8;

    fn read_into(bytes: &[u8], out: &mut [Self]) {
        for (o, b) in out.iter_mut().zip(bytes) {
            *o = i8::from_ne_bytes([*b]);
        }
    }

    fn write_into(samples: &[Self], out: &mut [u8]) {
        for (o, s) in out.iter_mut().zip(samples) {
            *o = s.to_ne_bytes()[0];
        }
    }
}

macro_rules! impl_sample {
    ($t: ty, $scalar: ident, $read: ident, $write: ident) => {
        impl Sample for $t {
            const SCALAR_TYPE: ScalarType = ScalarType::$scalar;

            fn read_into(bytes: &[u8], out: &mut [Self]) {
                NativeEndian::$read(bytes, out);
            }

            fn write_into(samples: &[Self], out: &mut [u8]) {
                NativeEndian::$write(samples, out);
            }
        }
    };
}

impl_sample!(u16, U16, read_u16_into, write_u16_into);
impl_sample!(i16, I16, read_i16_into, write_i16_into);
impl_sample!(u32, U32, read_u32_into, write_u32_into);
impl_sample!(i32, I32, read_i32_into, write_i32_into);
impl_sample!(u64, U64, read_u64_into, write_u64_into);
impl_sample!(i64, I64, read_i64_into, write_i64_into);
impl_sample!(f32, F32, read_f32_into, write_f32_into);
impl_sample!(f64, F64, read_f64_into, write_f64_into);

/// The pixel data of one file, as located by the parser.
#[derive(Debug, Clone)]
pub(crate) struct FileEntry {
    pub path: PathBuf,
    pub transfer_syntax_uid: String,
    pub transfer_syntax: TransferSyntax,
    pub pixel_data: PixelDataInfo,
    pub file_size: u64,
    /// The rescale function of each frame.
    pub rescales: Vec<Rescale>,
}

impl FileEntry {
    /// The rescale function of a frame.
    pub fn rescale(&self, frame: usize) -> Rescale {
        self.rescales
            .get(frame)
            .copied()
            .unwrap_or(Rescale::IDENTITY)
    }
}

/// Everything known about a volume before its pixel data is read.
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    pub(crate) files: Vec<FileEntry>,
    pub(crate) meta: MetaData,
    pub(crate) columns: usize,
    pub(crate) rows: usize,
    pub(crate) bits_allocated: u16,
    pub(crate) packed_components: usize,
    pub(crate) planar_components: usize,
    pub(crate) scalar_type: ScalarType,
    pub(crate) spacing: [f64; 3],
    pub(crate) patient_matrix: PatientMatrix,
    pub(crate) rescale: Rescale,
    pub(crate) needs_rescale: bool,
    pub(crate) time_points: usize,
    pub(crate) time_spacing: f64,
    pub(crate) row_order: MemoryRowOrder,
    pub(crate) stack_ids: Vec<String>,
}

impl VolumeInfo {
    /// The number of columns, rows and slices.
    pub fn dimensions(&self) -> [usize; 3] {
        [self.columns, self.rows, self.meta.number_of_slices()]
    }

    /// The number of slices.
    pub fn slices(&self) -> usize {
        self.meta.number_of_slices()
    }

    /// The number of samples per voxel.
    pub fn components(&self) -> usize {
        self.packed_components * self.planar_components * self.meta.number_of_components()
    }

    /// The type of the samples in memory.
    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    /// The bits allocated per stored sample.
    pub fn bits_allocated(&self) -> u16 {
        self.bits_allocated
    }

    /// The distance between columns, rows and slices.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// The transform from voxel coordinates to patient coordinates.
    pub fn patient_matrix(&self) -> &PatientMatrix {
        &self.patient_matrix
    }

    /// The attributes of all files and the index arrays of the volume.
    pub fn meta(&self) -> &MetaData {
        &self.meta
    }

    /// The files of the volume, in input order.
    pub fn file_names(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// The rescale function of the samples in memory.
    pub fn rescale(&self) -> Rescale {
        self.rescale
    }

    /// Whether samples are converted to a common rescale function.
    pub fn needs_rescale(&self) -> bool {
        self.needs_rescale
    }

    /// The number of time points, zero if there is no time dimension.
    pub fn time_points(&self) -> usize {
        self.time_points
    }

    /// The time between time points.
    pub fn time_spacing(&self) -> f64 {
        self.time_spacing
    }

    /// The order of the rows in memory.
    pub fn row_order(&self) -> MemoryRowOrder {
        self.row_order
    }

    /// The stack identifiers of the series, in order of appearance.
    pub fn stack_ids(&self) -> &[String] {
        &self.stack_ids
    }

    /// The size of one slice in memory, in bytes.
    pub fn slice_size(&self) -> usize {
        self.columns * self.rows * self.components() * self.scalar_type.size()
    }

    /// The size of the whole volume in memory, in bytes.
    pub fn volume_size(&self) -> usize {
        self.slice_size() * self.slices()
    }

    /// A summary of the descriptive attributes of the volume.
    pub fn properties(&self) -> ImageProperties {
        ImageProperties::from_info(self)
    }
}

/// A volume in memory.
///
/// Samples are in native byte order,
/// slice after slice, row after row, voxel after voxel,
/// with the components of a voxel next to each other.
#[derive(Debug, Clone)]
pub struct Volume {
    info: VolumeInfo,
    data: Vec<u8>,
}

impl Volume {
    pub(crate) fn new(info: VolumeInfo, data: Vec<u8>) -> Self {
        Volume { info, data }
    }

    /// The description of the volume.
    pub fn info(&self) -> &VolumeInfo {
        &self.info
    }

    /// The raw bytes of the samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the raw bytes of the samples.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The bytes of one slice.
    pub fn slice_data(&self, slice: usize) -> Option<&[u8]> {
        let size = self.info.slice_size();
        self.data.get(slice * size..(slice + 1) * size)
    }

    /// Copy the samples out as values of their own type.
    ///
    /// Fails if `T` is not the scalar type of the volume.
    pub fn samples<T: Sample>(&self) -> Result<Vec<T>> {
        let actual = self.info.scalar_type;
        ensure!(
            actual == T::SCALAR_TYPE,
            ScalarTypeMismatchSnafu {
                requested: T::SCALAR_TYPE,
                actual
            }
        );
        let len = self.data.len() / actual.size();
        let mut out = vec![T::default(); len];
        T::read_into(&self.data[..len * actual.size()], &mut out);
        Ok(out)
    }

    /// Convert the volume into an array of shape
    /// `[slices, rows, columns, components]`.
    #[cfg(feature = "ndarray")]
    pub fn to_ndarray<T: Sample>(&self) -> Result<Array<T, Ix4>> {
        use crate::error::ShapeSnafu;
        use snafu::ResultExt;

        let samples = self.samples::<T>()?;
        let [columns, rows, slices] = self.info.dimensions();
        let shape = (slices, rows, columns, self.info.components());
        Array::from_shape_vec(shape, samples).context(ShapeSnafu)
    }
}
