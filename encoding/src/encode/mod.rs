//! This module contains the data element encoding logic
//! needed to write data sets back to files.
//!
//! Only Explicit VR Little Endian is written,
//! which is the syntax of the file meta group
//! and the default syntax of newly created files.

use crate::text::{EncodeTextError, SpecificCharacterSet};
use dcmstack_core::{DataElementHeader, PrimitiveValue, Tag, VR};
use snafu::{Backtrace, Snafu};
use std::io::{self, Write};

mod explicit_le;

pub use self::explicit_le::ExplicitVRLittleEndianEncoder;

/// Module-level error type:
/// for errors which may occur while encoding attributes.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to write the header's tag"))]
    WriteTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write the header of {}", tag))]
    WriteHeader {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write an item header"))]
    WriteItemHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write a delimiter"))]
    WriteDelimiter {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write the value of {}", tag))]
    WriteValue {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to encode the text of {}", tag))]
    EncodeValueText {
        tag: Tag,
        #[snafu(backtrace)]
        source: EncodeTextError,
    },
    #[snafu(display("Value of {} is too long for a {} header ({} bytes)", tag, vr, len))]
    ValueTooLong {
        tag: Tag,
        vr: VR,
        len: usize,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type trait for a data element encoder.
pub trait Encode {
    /// Encode and write an element tag.
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write;

    /// Encode and write a data element header to the given destination.
    /// Returns the number of bytes effectively written on success.
    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write;

    /// Encode and write a sequence item header to the given destination.
    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write;

    /// Encode and write a sequence item delimiter to the given destination.
    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write;

    /// Encode and write a sequence delimiter to the given destination.
    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write;

    /// Convert a primitive value into its binary form,
    /// padded to an even length.
    fn encode_value(
        &self,
        tag: Tag,
        vr: VR,
        value: &PrimitiveValue,
        charset: SpecificCharacterSet,
    ) -> Result<Vec<u8>>;
}
