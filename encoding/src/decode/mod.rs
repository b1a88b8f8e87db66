//! This module contains the attribute header decoding logic
//! for each supported combination of byte order and VR explicitness.

use self::explicit_be::ExplicitVRBigEndianDecoder;
use self::explicit_le::ExplicitVRLittleEndianDecoder;
use self::implicit_le::ImplicitVRLittleEndianDecoder;
use byteordered::Endianness;
use dcmstack_core::header::{DataElementHeader, SequenceItemHeader};
use dcmstack_core::Tag;
use snafu::{Backtrace, Snafu};
use std::io::{self, Read};

pub mod basic;
pub mod explicit_be;
pub mod explicit_le;
pub mod implicit_le;

/// Module-level error type:
/// for errors which may occur while decoding attribute headers.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to read the beginning (tag) of the header"))]
    ReadHeaderTag {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },
    #[snafu(display("Failed to read the item header"))]
    ReadItemHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's item length field"))]
    ReadItemLength {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's tag field"))]
    ReadTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's reserved bytes"))]
    ReadReserved {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's element length field"))]
    ReadLength {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's value representation"))]
    ReadVr {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Bad sequence item header"))]
    BadSequenceHeader {
        source: dcmstack_core::header::SequenceItemHeaderError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/** Obtain a decoder for reading the attributes in a file's meta
 * information group. According to the standard, these are always
 * encoded in Explicit VR Little Endian.
 */
pub fn file_header_decoder() -> ExplicitVRLittleEndianDecoder {
    ExplicitVRLittleEndianDecoder::default()
}

/** Type trait for reading and decoding basic data values from a data source.
 *
 * This trait aims to provide methods for reading binary numbers based on the
 * source's endianness. There are, and only will be, two possible
 * implementations (`LittleEndianBasicDecoder` and `BigEndianBasicDecoder`).
 */
pub trait BasicDecode {
    /// Retrieve the source's endianness, as expected by this decoder.
    fn endianness(&self) -> Endianness;

    /// Decode an unsigned short value from the given source.
    fn decode_us<S>(&self, source: S) -> io::Result<u16>
    where
        S: Read;

    /// Decode a sequence of unsigned shorts value from the given source
    /// into the given destination.
    fn decode_us_into<S>(&self, source: S, dst: &mut [u16]) -> io::Result<()>
    where
        S: Read;

    /// Decode an unsigned long value from the given source.
    fn decode_ul<S>(&self, source: S) -> io::Result<u32>
    where
        S: Read;

    /// Decode a sequence of unsigned long values from the given source
    /// into the given destination.
    fn decode_ul_into<S>(&self, source: S, dst: &mut [u32]) -> io::Result<()>
    where
        S: Read;

    /// Decode a sequence of unsigned very long values from the given source
    /// into the given destination.
    fn decode_uv_into<S>(&self, source: S, dst: &mut [u64]) -> io::Result<()>
    where
        S: Read;

    /// Decode a sequence of signed short values from the given source
    /// into the given destination.
    fn decode_ss_into<S>(&self, source: S, dst: &mut [i16]) -> io::Result<()>
    where
        S: Read;

    /// Decode a sequence of signed long values from the given source
    /// into the given destination.
    fn decode_sl_into<S>(&self, source: S, dst: &mut [i32]) -> io::Result<()>
    where
        S: Read;

    /// Decode a sequence of signed very long values from the given source
    /// into the given destination.
    fn decode_sv_into<S>(&self, source: S, dst: &mut [i64]) -> io::Result<()>
    where
        S: Read;

    /// Decode a sequence of single precision float values from the given
    /// source into the given destination.
    fn decode_fl_into<S>(&self, source: S, dst: &mut [f32]) -> io::Result<()>
    where
        S: Read;

    /// Decode a sequence of double precision float values from the given
    /// source into the given destination.
    fn decode_fd_into<S>(&self, source: S, dst: &mut [f64]) -> io::Result<()>
    where
        S: Read;

    /// Decode an attribute tag from the given source.
    fn decode_tag<S>(&self, mut source: S) -> io::Result<Tag>
    where
        S: Read,
    {
        let g = self.decode_us(&mut source)?;
        let e = self.decode_us(source)?;
        Ok(Tag(g, e))
    }
}

/** Type trait for reading and decoding attribute headers
 * from a data source.
 */
pub trait Decode {
    /** Fetch and decode the next attribute header from the given source.
     * This method returns only the header of the element. At the end of this
     * operation, the source will be pointing at the element's value data,
     * which should be read or skipped as necessary.
     *
     * Decoding an item or sequence delimiter is considered valid, and so
     * should be properly handled by the decoder. The value representation
     * in this case should be `UN`.
     *
     * Returns the expected header and the exact number of bytes read
     * from the source.
     */
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read;

    /** Fetch and decode the next sequence item head from the given source.
     * It is a separate method because value representation is always
     * implicit when reading item headers and delimiters.
     * This method returns only the header of the item. At the end of this
     * operation, the source will be pointing at the beginning of the item's
     * data, which should be traversed if necessary.
     */
    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read;

    /// Decode an attribute tag.
    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read;
}

/// A header decoder for any of the supported native encodings,
/// chosen at run-time from the file's transfer syntax.
#[derive(Debug, Clone)]
pub enum DatasetDecoder {
    /// Explicit VR Little Endian
    ExplicitLE(ExplicitVRLittleEndianDecoder),
    /// Explicit VR Big Endian
    ExplicitBE(ExplicitVRBigEndianDecoder),
    /// Implicit VR Little Endian
    ImplicitLE(ImplicitVRLittleEndianDecoder),
}

impl DatasetDecoder {
    /// Create a decoder for the given byte order and VR explicitness.
    /// Implicit VR is only defined in little endian,
    /// big endian implicit sources are read as little endian.
    pub fn new(byte_order: Endianness, explicit_vr: bool) -> Self {
        match (byte_order, explicit_vr) {
            (Endianness::Little, true) => DatasetDecoder::ExplicitLE(Default::default()),
            (Endianness::Big, true) => DatasetDecoder::ExplicitBE(Default::default()),
            (_, false) => DatasetDecoder::ImplicitLE(Default::default()),
        }
    }

    /// The byte order of the values decoded with this decoder.
    pub fn endianness(&self) -> Endianness {
        match self {
            DatasetDecoder::ExplicitBE(_) => Endianness::Big,
            _ => Endianness::Little,
        }
    }

    /// Whether headers carry an explicit value representation.
    pub fn is_explicit_vr(&self) -> bool {
        !matches!(self, DatasetDecoder::ImplicitLE(_))
    }
}

impl Decode for DatasetDecoder {
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        match self {
            DatasetDecoder::ExplicitLE(d) => d.decode_header(source),
            DatasetDecoder::ExplicitBE(d) => d.decode_header(source),
            DatasetDecoder::ImplicitLE(d) => d.decode_header(source),
        }
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        match self {
            DatasetDecoder::ExplicitLE(d) => d.decode_item_header(source),
            DatasetDecoder::ExplicitBE(d) => d.decode_item_header(source),
            DatasetDecoder::ImplicitLE(d) => d.decode_item_header(source),
        }
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        match self {
            DatasetDecoder::ExplicitLE(d) => d.decode_tag(source),
            DatasetDecoder::ExplicitBE(d) => d.decode_tag(source),
            DatasetDecoder::ImplicitLE(d) => d.decode_tag(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetDecoder, Decode};
    use byteordered::Endianness;
    use dcmstack_core::header::{Length, SequenceItemHeader};
    use dcmstack_core::{Tag, VR};

    #[test]
    fn dataset_decoder_dispatch() {
        // (0028,0010) US, length 2, in both byte orders
        let le: &[u8] = &[0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00];
        let be: &[u8] = &[0x00, 0x28, 0x00, 0x10, b'U', b'S', 0x00, 0x02];

        let decoder = DatasetDecoder::new(Endianness::Little, true);
        let (header, read) = decoder.decode_header(&mut &le[..]).unwrap();
        assert_eq!(header.tag, Tag(0x0028, 0x0010));
        assert_eq!(header.vr, VR::US);
        assert_eq!(header.len, Length(2));
        assert_eq!(read, 8);

        let decoder = DatasetDecoder::new(Endianness::Big, true);
        assert_eq!(decoder.endianness(), Endianness::Big);
        let (header, _) = decoder.decode_header(&mut &be[..]).unwrap();
        assert_eq!(header.tag, Tag(0x0028, 0x0010));
        assert_eq!(header.len, Length(2));

        let decoder = DatasetDecoder::new(Endianness::Little, false);
        assert!(!decoder.is_explicit_vr());
        let item: &[u8] = &[0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            decoder.decode_item_header(&mut &item[..]).unwrap(),
            SequenceItemHeader::Item {
                len: Length::UNDEFINED
            }
        );
    }
}
