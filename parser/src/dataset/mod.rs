//! Reading and writing of whole data sets.

pub mod read;
pub mod write;

pub use self::read::{read_dataset, ParseOptions, PixelDataHeader};
pub use self::write::{write_dataset, write_file};
