//! A stateful decoder of attribute headers and primitive values,
//! bound to a data source and tracking the number of bytes consumed.

use dcmstack_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dcmstack_core::value::C;
use dcmstack_core::{PrimitiveValue, Tag, VR};
use dcmstack_encoding::decode::basic::BasicDecoder;
use dcmstack_encoding::decode::{self, BasicDecode, DatasetDecoder, Decode};
use dcmstack_encoding::text::{DecodeTextError, SpecificCharacterSet};
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::io::{self, Read};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not decode attribute header at position {}", position))]
    DecodeElementHeader {
        position: u64,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not decode item header at position {}", position))]
    DecodeItemHeader {
        position: u64,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not read attribute header at position {}", position))]
    ReadHeader {
        position: u64,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Attribute header truncated at position {}", position))]
    TruncatedHeader { position: u64, backtrace: Backtrace },
    #[snafu(display("Could not read value data of {} at position {}", tag, position))]
    ReadValueData {
        tag: Tag,
        position: u64,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Could not read skipped data at position {}", position))]
    ReadSkipped {
        position: u64,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Could not skip {} bytes at position {}", length, position))]
    SkipValue {
        length: u64,
        position: u64,
        backtrace: Backtrace,
    },
    #[snafu(display("Undefined value length of {}", tag))]
    UndefinedValueLength { tag: Tag, backtrace: Backtrace },
    #[snafu(display("{} of {} holds no primitive data", vr, tag))]
    NonPrimitiveType {
        tag: Tag,
        vr: VR,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not decode text of {}", tag))]
    DecodeText {
        tag: Tag,
        #[snafu(backtrace)]
        source: DecodeTextError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The initial capacity of the value buffer.
const PARSER_BUFFER_CAPACITY: usize = 2048;

/// A stateful abstraction for reading attributes from a byte source.
///
/// The header decoder and the byte order of values
/// are chosen at run-time from the transfer syntax,
/// and the character set of text values
/// may be changed while reading.
#[derive(Debug)]
pub struct StatefulDecoder<S> {
    from: S,
    decoder: DatasetDecoder,
    basic: BasicDecoder,
    charset: SpecificCharacterSet,
    buffer: Vec<u8>,
    position: u64,
}

macro_rules! read_binary_value {
    ($self: ident, $header: ident, $typ: ty, $variant: ident, $decode: ident) => {{
        let len = $self.require_known_length($header)?;
        let size = std::mem::size_of::<$typ>();
        let mut values: C<$typ> = C::from_elem(Default::default(), len / size);
        let position = $self.position;
        $self
            .basic
            .$decode(&mut $self.from, &mut values)
            .context(ReadValueDataSnafu {
                tag: $header.tag,
                position,
            })?;
        $self.position += (values.len() * size) as u64;
        // a value length which is not a multiple of the sample size
        // leaves some stray bytes behind
        $self.skip_bytes((len % size) as u64)?;
        Ok(PrimitiveValue::$variant(values))
    }};
}

impl<S> StatefulDecoder<S>
where
    S: Read,
{
    /// Create a new stateful decoder at the beginning of the source.
    pub fn new(from: S, decoder: DatasetDecoder, charset: SpecificCharacterSet) -> Self {
        Self::new_with_position(from, decoder, charset, 0)
    }

    /// Create a new stateful decoder,
    /// with `position` being the offset of the source's current byte
    /// relative to the start of the file.
    pub fn new_with_position(
        from: S,
        decoder: DatasetDecoder,
        charset: SpecificCharacterSet,
        position: u64,
    ) -> Self {
        let basic = BasicDecoder::new(decoder.endianness());
        StatefulDecoder {
            from,
            decoder,
            basic,
            charset,
            buffer: Vec::with_capacity(PARSER_BUFFER_CAPACITY),
            position,
        }
    }

    /// Create a decoder for the file meta group,
    /// which is always in Explicit VR Little Endian.
    pub fn file_header_parser(from: S, position: u64) -> Self {
        Self::new_with_position(
            from,
            DatasetDecoder::ExplicitLE(decode::file_header_decoder()),
            SpecificCharacterSet::Default,
            position,
        )
    }

    /// The current position in the file.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The character set currently used for text values.
    pub fn charset(&self) -> SpecificCharacterSet {
        self.charset
    }

    /// Change the character set used for text values.
    pub fn set_charset(&mut self, charset: SpecificCharacterSet) {
        self.charset = charset;
    }

    /// The header decoder in use.
    pub fn decoder(&self) -> &DatasetDecoder {
        &self.decoder
    }

    /// Replace the header decoder, returning the previous one.
    /// The byte order of values follows the new decoder.
    pub fn replace_decoder(&mut self, decoder: DatasetDecoder) -> DatasetDecoder {
        self.basic = BasicDecoder::new(decoder.endianness());
        std::mem::replace(&mut self.decoder, decoder)
    }

    /// Mutable access to the underlying source.
    ///
    /// Bytes consumed through it are not accounted for.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.from
    }

    /// Retrieve the underlying source.
    pub fn into_inner(self) -> S {
        self.from
    }

    /// Decode the next attribute header.
    pub fn decode_header(&mut self) -> Result<DataElementHeader> {
        let position = self.position;
        let (header, bytes_read) = self
            .decoder
            .decode_header(&mut self.from)
            .context(DecodeElementHeaderSnafu { position })?;
        self.position += bytes_read as u64;
        Ok(header)
    }

    /// Decode the next attribute header,
    /// or return `None` if the source ends cleanly before it.
    pub fn decode_header_or_eof(&mut self) -> Result<Option<DataElementHeader>> {
        let mut tag = [0_u8; 4];
        let mut filled = 0;
        while filled < tag.len() {
            match self.from.read(&mut tag[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(e).context(ReadHeaderSnafu {
                        position: self.position + filled as u64,
                    })
                }
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        ensure!(
            filled == tag.len(),
            TruncatedHeaderSnafu {
                position: self.position
            }
        );
        let position = self.position;
        let mut source = (&tag[..]).chain(&mut self.from);
        let (header, bytes_read) = self
            .decoder
            .decode_header(&mut source)
            .context(DecodeElementHeaderSnafu { position })?;
        self.position += bytes_read as u64;
        Ok(Some(header))
    }

    /// Decode the next item header or delimiter.
    pub fn decode_item_header(&mut self) -> Result<SequenceItemHeader> {
        let position = self.position;
        let header = self
            .decoder
            .decode_item_header(&mut self.from)
            .context(DecodeItemHeaderSnafu { position })?;
        self.position += 8;
        Ok(header)
    }

    /// Skip the given number of bytes.
    pub fn skip_bytes(&mut self, length: u64) -> Result<()> {
        if length == 0 {
            return Ok(());
        }
        let position = self.position;
        let skipped = io::copy(&mut (&mut self.from).take(length), &mut io::sink())
            .context(ReadSkippedSnafu { position })?;
        self.position += skipped;
        ensure!(skipped == length, SkipValueSnafu { length, position });
        Ok(())
    }

    /// Read the value of the attribute with the given header
    /// as primitive data of its value representation.
    ///
    /// Text is decoded with the current character set
    /// (or the default repertoire for representations which do not use it),
    /// and binary numbers in the byte order of the transfer syntax.
    /// Numbers in text form are kept as strings,
    /// without the trailing padding of the value.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O problems, on an undefined length,
    /// or if the header describes a sequence.
    pub fn read_value(&mut self, header: &DataElementHeader) -> Result<PrimitiveValue> {
        if header.len == Length(0) {
            return Ok(PrimitiveValue::Empty);
        }

        match header.vr {
            VR::SQ => NonPrimitiveTypeSnafu {
                tag: header.tag,
                vr: header.vr,
            }
            .fail(),
            VR::AT => self.read_value_tag(header),
            VR::UT | VR::ST | VR::UR | VR::LT => self.read_value_str(header),
            vr if vr.is_multi_valued_text() => self.read_value_strs(header),
            VR::US | VR::OW => read_binary_value!(self, header, u16, U16, decode_us_into),
            VR::SS => read_binary_value!(self, header, i16, I16, decode_ss_into),
            VR::UL | VR::OL => read_binary_value!(self, header, u32, U32, decode_ul_into),
            VR::SL => read_binary_value!(self, header, i32, I32, decode_sl_into),
            VR::UV | VR::OV => read_binary_value!(self, header, u64, U64, decode_uv_into),
            VR::SV => read_binary_value!(self, header, i64, I64, decode_sv_into),
            VR::FL | VR::OF => read_binary_value!(self, header, f32, F32, decode_fl_into),
            VR::FD | VR::OD => read_binary_value!(self, header, f64, F64, decode_fd_into),
            _ => self.read_value_bytes(header),
        }
    }

    /// Read the value of the attribute with the given header as raw bytes.
    pub fn read_value_bytes(&mut self, header: &DataElementHeader) -> Result<PrimitiveValue> {
        let len = self.require_known_length(header)?;
        self.fill_buffer(header.tag, len)?;
        Ok(PrimitiveValue::U8(C::from_slice(&self.buffer)))
    }

    // ---------------- private methods ---------------------

    fn require_known_length(&self, header: &DataElementHeader) -> Result<usize> {
        header
            .len
            .get()
            .map(|len| len as usize)
            .ok_or_else(|| UndefinedValueLengthSnafu { tag: header.tag }.build())
    }

    fn fill_buffer(&mut self, tag: Tag, len: usize) -> Result<()> {
        self.buffer.resize_with(len, Default::default);
        let position = self.position;
        self.from
            .read_exact(&mut self.buffer)
            .context(ReadValueDataSnafu { tag, position })?;
        self.position += len as u64;
        Ok(())
    }

    fn text_charset(&self, vr: VR) -> SpecificCharacterSet {
        if vr.uses_character_set() {
            self.charset
        } else {
            SpecificCharacterSet::Default
        }
    }

    fn read_value_tag(&mut self, header: &DataElementHeader) -> Result<PrimitiveValue> {
        let len = self.require_known_length(header)?;
        let mut parts: C<u16> = C::from_elem(0, len / 2);
        let position = self.position;
        self.basic
            .decode_us_into(&mut self.from, &mut parts)
            .context(ReadValueDataSnafu {
                tag: header.tag,
                position,
            })?;
        self.position += (parts.len() * 2) as u64;
        self.skip_bytes((len % 2) as u64)?;
        Ok(PrimitiveValue::Tags(
            parts.chunks_exact(2).map(|p| Tag(p[0], p[1])).collect(),
        ))
    }

    fn read_value_strs(&mut self, header: &DataElementHeader) -> Result<PrimitiveValue> {
        let len = self.require_known_length(header)?;
        self.fill_buffer(header.tag, len)?;
        let charset = self.text_charset(header.vr);
        let parts = trim_trail_empty_bytes(&self.buffer)
            .split(|v| *v == b'\\')
            .map(|slice| charset.decode(slice))
            .collect::<std::result::Result<C<_>, _>>()
            .context(DecodeTextSnafu { tag: header.tag })?;
        Ok(PrimitiveValue::Strs(parts))
    }

    fn read_value_str(&mut self, header: &DataElementHeader) -> Result<PrimitiveValue> {
        let len = self.require_known_length(header)?;
        self.fill_buffer(header.tag, len)?;
        let text = self
            .text_charset(header.vr)
            .decode(trim_trail_empty_bytes(&self.buffer))
            .context(DecodeTextSnafu { tag: header.tag })?;
        Ok(PrimitiveValue::Str(text))
    }
}

/// Remove trailing spaces and null characters.
fn trim_trail_empty_bytes(mut x: &[u8]) -> &[u8] {
    while let [rest @ .., b' ' | b'\0'] = x {
        x = rest;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::StatefulDecoder;
    use dcmstack_core::header::{DataElementHeader, Length};
    use dcmstack_core::{PrimitiveValue, Tag, VR};
    use dcmstack_encoding::byteordered::Endianness;
    use dcmstack_encoding::decode::DatasetDecoder;
    use dcmstack_encoding::text::SpecificCharacterSet;

    #[test]
    fn read_text_and_numbers() {
        #[rustfmt::skip]
        let data: &[u8] = &[
            // (0020,0032) DS "0\-5.5\10 "
            0x20, 0x00, 0x32, 0x00, b'D', b'S', 0x0A, 0x00,
            b'0', b'\\', b'-', b'5', b'.', b'5', b'\\', b'1', b'0', b' ',
            // (0028,0010) US 512
            0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00, 0x00, 0x02,
            // (0010,0010) PN "M\xFCller" in Latin-1
            0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x06, 0x00,
            b'M', 0xFC, b'l', b'l', b'e', b'r',
        ];
        let mut decoder = StatefulDecoder::new(
            data,
            DatasetDecoder::new(Endianness::Little, true),
            SpecificCharacterSet::IsoIr100,
        );

        let header = decoder.decode_header().unwrap();
        assert_eq!(header.tag, Tag(0x0020, 0x0032));
        let value = decoder.read_value(&header).unwrap();
        assert_eq!(value.to_multi_f64(), vec![0.0, -5.5, 10.0]);
        assert_eq!(value.string(2), Some("10"));
        assert_eq!(decoder.position(), 18);

        let header = decoder.decode_header().unwrap();
        let value = decoder.read_value(&header).unwrap();
        assert_eq!(value, PrimitiveValue::from(512_u16));

        let header = decoder.decode_header().unwrap();
        let value = decoder.read_value(&header).unwrap();
        assert_eq!(value.to_str(), "Müller");

        assert!(decoder.decode_header_or_eof().unwrap().is_none());
        assert_eq!(decoder.position(), data.len() as u64);
    }

    #[test]
    fn read_big_endian_values() {
        #[rustfmt::skip]
        let data: &[u8] = &[
            0x00, 0x28, 0x01, 0x06, b'S', b'S', 0x00, 0x04, 0xFF, 0xFE, 0x00, 0x02,
        ];
        let mut decoder = StatefulDecoder::new(
            data,
            DatasetDecoder::new(Endianness::Big, true),
            SpecificCharacterSet::Default,
        );
        let header = decoder.decode_header().unwrap();
        assert_eq!(header.vr, VR::SS);
        let value = decoder.read_value(&header).unwrap();
        assert_eq!(value, PrimitiveValue::I16([-2, 2].into_iter().collect()));
    }

    #[test]
    fn odd_binary_lengths_leave_no_stray_bytes() {
        let data: &[u8] = &[0x01, 0x00, 0x02, 0x00, 0xAA, 0x07];
        let mut decoder = StatefulDecoder::new(
            data,
            DatasetDecoder::new(Endianness::Little, false),
            SpecificCharacterSet::Default,
        );
        let header = DataElementHeader::new(Tag(0x0028, 0x0011), VR::US, Length(5));
        let value = decoder.read_value(&header).unwrap();
        assert_eq!(value, PrimitiveValue::U16([1, 2].into_iter().collect()));
        assert_eq!(decoder.position(), 5);
    }

    #[test]
    fn truncated_tag_is_an_error() {
        let data: &[u8] = &[0x08, 0x00];
        let mut decoder = StatefulDecoder::new(
            data,
            DatasetDecoder::new(Endianness::Little, true),
            SpecificCharacterSet::Default,
        );
        assert!(decoder.decode_header_or_eof().is_err());
    }

    #[test]
    fn undefined_length_values_are_rejected() {
        let mut decoder = StatefulDecoder::new(
            &[][..],
            DatasetDecoder::new(Endianness::Little, true),
            SpecificCharacterSet::Default,
        );
        let header = DataElementHeader::new(Tag(0x0009, 0x0010), VR::OB, Length::UNDEFINED);
        assert!(decoder.read_value(&header).is_err());
    }
}
