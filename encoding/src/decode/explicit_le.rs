//! Explicit VR Little Endian syntax transfer implementation

use crate::decode::basic::LittleEndianBasicDecoder;
use crate::decode::{
    BadSequenceHeaderSnafu, BasicDecode, Decode, ReadHeaderTagSnafu, ReadItemHeaderSnafu,
    ReadItemLengthSnafu, ReadLengthSnafu, ReadReservedSnafu, ReadTagSnafu, ReadVrSnafu, Result,
};
use dcmstack_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dcmstack_core::{Tag, VR};
use snafu::ResultExt;
use std::io::Read;

/// A data element decoder for the Explicit VR Little Endian transfer syntax.
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRLittleEndianDecoder {
    basic: LittleEndianBasicDecoder,
}

/// Read the remainder of an explicit VR header after its tag,
/// with the given basic decoder fixing the byte order.
pub(crate) fn decode_explicit_rest<B, S>(
    basic: &B,
    tag: Tag,
    source: &mut S,
) -> Result<(DataElementHeader, usize)>
where
    B: BasicDecode,
    S: ?Sized + Read,
{
    if tag.group() == 0xFFFE {
        // items and delimiters have no VR field
        let len = basic.decode_ul(&mut *source).context(ReadItemLengthSnafu)?;
        return Ok((DataElementHeader::new(tag, VR::UN, Length(len)), 8));
    }

    let mut vr_bytes = [0u8; 2];
    source.read_exact(&mut vr_bytes).context(ReadVrSnafu)?;
    let vr = VR::from_binary(vr_bytes).unwrap_or(VR::UN);

    if vr.has_long_length() {
        let mut reserved = [0u8; 2];
        source.read_exact(&mut reserved).context(ReadReservedSnafu)?;
        let len = basic.decode_ul(&mut *source).context(ReadLengthSnafu)?;
        Ok((DataElementHeader::new(tag, vr, Length(len)), 12))
    } else {
        let len = basic.decode_us(&mut *source).context(ReadLengthSnafu)?;
        Ok((DataElementHeader::new(tag, vr, Length(u32::from(len))), 8))
    }
}

/// Read an item header or delimiter with the given basic decoder.
pub(crate) fn decode_item<B, S>(basic: &B, source: &mut S) -> Result<SequenceItemHeader>
where
    B: BasicDecode,
    S: ?Sized + Read,
{
    let tag = basic
        .decode_tag(&mut *source)
        .context(ReadItemHeaderSnafu)?;
    let len = basic.decode_ul(&mut *source).context(ReadItemHeaderSnafu)?;
    SequenceItemHeader::new(tag, Length(len)).context(BadSequenceHeaderSnafu)
}

impl Decode for ExplicitVRLittleEndianDecoder {
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        let tag = self
            .basic
            .decode_tag(&mut *source)
            .context(ReadHeaderTagSnafu)?;
        decode_explicit_rest(&self.basic, tag, source)
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        decode_item(&self.basic, source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        self.basic.decode_tag(source).context(ReadTagSnafu)
    }
}
