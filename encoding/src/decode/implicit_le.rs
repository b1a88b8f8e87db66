//! Implicit VR Little Endian syntax transfer implementation

use crate::decode::basic::LittleEndianBasicDecoder;
use crate::decode::explicit_le::decode_item;
use crate::decode::{BasicDecode, Decode, ReadHeaderTagSnafu, ReadLengthSnafu, ReadTagSnafu, Result};
use dcmstack_core::dictionary::{DataDictionary, DictionaryEntry};
use dcmstack_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dcmstack_core::{Tag, VR};
use dcmstack_dictionary_std::StandardDataDictionary;
use snafu::ResultExt;
use std::io::Read;

/// A data element decoder for the Implicit VR Little Endian transfer syntax.
///
/// Value representations are looked up in the standard data dictionary.
/// Attributes which depend on context (such as private attributes
/// or pixel sample values) are given a relaxed VR here,
/// and should be refined by the consumer once the context is known.
#[derive(Debug, Default, Clone)]
pub struct ImplicitVRLittleEndianDecoder {
    basic: LittleEndianBasicDecoder,
}

impl ImplicitVRLittleEndianDecoder {
    /// Retrieve the value representation of an attribute without context.
    pub fn implicit_vr(tag: Tag) -> VR {
        // Pixel Data and Overlay Data are always OW in implicit VR
        if tag == Tag(0x7FE0, 0x0010) || (tag.0 >> 8 == 0x60 && tag.1 == 0x3000) {
            return VR::OW;
        }
        if tag.group() == 0xFFFE {
            return VR::UN;
        }
        StandardDataDictionary
            .by_tag(tag)
            .map(|entry| entry.vr().relaxed())
            .unwrap_or(VR::UN)
    }
}

impl Decode for ImplicitVRLittleEndianDecoder {
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        let tag = self
            .basic
            .decode_tag(&mut *source)
            .context(ReadHeaderTagSnafu)?;
        let len = self
            .basic
            .decode_ul(&mut *source)
            .context(ReadLengthSnafu)?;

        let vr = Self::implicit_vr(tag);
        Ok((DataElementHeader::new(tag, vr, Length(len)), 8))
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        decode_item(&self.basic, source)
    }

    #[inline]
    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        self.basic.decode_tag(source).context(ReadTagSnafu)
    }
}
