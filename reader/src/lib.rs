//! This crate turns a series of image files into a volume in memory.
//!
//! - [`sorter`] groups candidate files into studies and series.
//! - [`VolumeReader`] reads the attributes of a series,
//!   orders its frames by position and time,
//!   checks that the files agree on their pixel layout,
//!   resolves the [`PatientMatrix`] of the volume,
//!   and streams the pixel data into memory.
//! - [`VolumeWriter`] writes a volume back as a new series.
//!
//! # Example
//!
//! ```no_run
//! use dcmstack_reader::{sort_seed, ReadOptions, VolumeReader};
//!
//! let sorted = sort_seed("series/IM0001.dcm")?;
//! let mut reader = VolumeReader::new(ReadOptions::new());
//! let volume = reader.read_volume(sorted.output_file_names())?;
//! let [columns, rows, slices] = volume.info().dimensions();
//! println!("{}x{}x{} {:?}", columns, rows, slices, volume.info().scalar_type());
//! # Ok::<(), dcmstack_reader::Error>(())
//! ```
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

mod error;
pub mod geometry;
mod options;
pub mod properties;
mod reader;
mod slice_sorter;
pub mod sorter;
mod stream;
pub mod transform;
mod unpack;
mod validate;
pub mod volume;
mod writer;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::geometry::PatientMatrix;
pub use crate::options::{MemoryRowOrder, ReadOptions};
pub use crate::properties::{ImageProperties, WindowPreset};
pub use crate::reader::{read_volume, ReaderState, VolumeReader};
pub use crate::sorter::{compare_uids, sort_files, sort_seed, SortedFiles, StudyEntry};
pub use crate::transform::{Rescale, WindowLevel};
pub use crate::volume::{Sample, ScalarType, Volume, VolumeInfo};
pub use crate::writer::{generate_uid, VolumeWriter, WriteOptions};
pub use dcmstack_parser::can_read_file;
pub use dcmstack_transfer_syntax_registry::{CodecRegistry, ExternalCodec};
