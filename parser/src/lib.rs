//! This crate provides the parser and writer of image files:
//! detection of the preamble and magic code,
//! the file meta group,
//! and the main data set read into an attribute [`Item`](dcmstack_object::Item)
//! up to the pixel data, whose location is recorded.
//!
//! - [`stateful`] holds a decoder of headers and values bound to a source.
//! - [`dataset`] reads and writes whole data sets.
//! - [`meta`] handles the file meta group.
//! - [`file`] puts them together into [`parse_file`].
//!
//! # Example
//!
//! ```no_run
//! use dcmstack_parser::{parse_file, ParseOptions};
//! use dcmstack_dictionary_std::tags;
//!
//! let parsed = parse_file("image.dcm", &ParseOptions::new().group(0x0020))?;
//! if let Some(pixel_data) = parsed.pixel_data {
//!     println!("pixel data at offset {}", pixel_data.offset);
//! }
//! println!("{:?}", parsed.dataset.get_str(tags::SERIES_INSTANCE_UID));
//! # Ok::<(), dcmstack_parser::file::Error>(())
//! ```
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

pub mod dataset;
pub mod file;
pub mod meta;
pub mod stateful;

pub use crate::dataset::{read_dataset, write_dataset, write_file, ParseOptions};
pub use crate::file::{can_read_file, parse_file, parse_reader, ParsedFile, PixelDataInfo};
pub use crate::meta::{FileMetaTable, FileMetaTableBuilder};
pub use crate::stateful::decode::StatefulDecoder;
