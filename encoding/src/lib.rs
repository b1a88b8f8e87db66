//! Encoding and decoding primitives for the data sets of image files.
//!
//! This crate provides the attribute header decoders
//! for each native transfer syntax, a little endian encoder
//! for writing files, text decoding by specific character set,
//! and the descriptor type of a [transfer syntax].
//!
//! For the time being, all APIs are based on synchronous I/O.
//!
//! [transfer syntax]: ./transfer_syntax/index.html
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

pub mod decode;
pub mod encode;
pub mod text;
pub mod transfer_syntax;

pub use byteordered;
pub use decode::{BasicDecode, DatasetDecoder, Decode};
pub use encode::{Encode, ExplicitVRLittleEndianEncoder};
pub use text::SpecificCharacterSet;
pub use transfer_syntax::{Codec, TransferSyntax, TransferSyntaxIndex};
