//! Explicit VR Little Endian encoder

use crate::encode::{
    Encode, EncodeValueTextSnafu, Result, ValueTooLongSnafu, WriteDelimiterSnafu,
    WriteHeaderSnafu, WriteItemHeaderSnafu, WriteTagSnafu,
};
use crate::text::SpecificCharacterSet;
use byteordered::ByteOrdered;
use dcmstack_core::header::{ITEM, ITEM_DELIMITER, SEQUENCE_DELIMITER};
use dcmstack_core::{DataElementHeader, PrimitiveValue, Tag, VR};
use itertools::Itertools;
use snafu::{ensure, ResultExt};
use std::io::{self, Write};

/// A concrete encoder for the transfer syntax ExplicitVRLittleEndian
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRLittleEndianEncoder;

impl ExplicitVRLittleEndianEncoder {
    fn write_tag_len<W: Write>(to: W, tag: Tag, len: u32) -> io::Result<()> {
        let mut to = ByteOrdered::le(to);
        to.write_u16(tag.0)?;
        to.write_u16(tag.1)?;
        to.write_u32(len)
    }
}

impl Encode for ExplicitVRLittleEndianEncoder {
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        let mut to = ByteOrdered::le(to);
        to.write_u16(tag.0)
            .and_then(|_| to.write_u16(tag.1))
            .context(WriteTagSnafu)
    }

    fn encode_element_header<W>(&self, mut to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        let tag = de.tag;
        self.encode_tag(&mut to, tag)?;
        let mut to = ByteOrdered::le(to);
        to.write_all(&de.vr.to_bytes())
            .context(WriteHeaderSnafu { tag })?;
        if de.vr.has_long_length() {
            to.write_all(&[0, 0])
                .and_then(|_| to.write_u32(de.len.0))
                .context(WriteHeaderSnafu { tag })?;
            Ok(12)
        } else {
            ensure!(
                de.len.0 <= u32::from(u16::MAX),
                ValueTooLongSnafu {
                    tag,
                    vr: de.vr,
                    len: de.len.0 as usize,
                }
            );
            to.write_u16(de.len.0 as u16)
                .context(WriteHeaderSnafu { tag })?;
            Ok(8)
        }
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        Self::write_tag_len(to, ITEM, len).context(WriteItemHeaderSnafu)
    }

    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        Self::write_tag_len(to, ITEM_DELIMITER, 0).context(WriteDelimiterSnafu)
    }

    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        Self::write_tag_len(to, SEQUENCE_DELIMITER, 0).context(WriteDelimiterSnafu)
    }

    fn encode_value(
        &self,
        tag: Tag,
        vr: VR,
        value: &PrimitiveValue,
        charset: SpecificCharacterSet,
    ) -> Result<Vec<u8>> {
        use PrimitiveValue::*;
        let mut out = Vec::new();
        // writes into a Vec<u8> do not fail
        let mut w = ByteOrdered::le(&mut out);
        let _ = match value {
            Empty => Ok(()),
            Str(_) | Strs(_) => {
                let text = match value {
                    Str(s) => s.clone(),
                    _ => value.strings().map(|s| s.iter().join("\\")).unwrap_or_default(),
                };
                let bytes = if vr.uses_character_set() {
                    charset.encode(&text).context(EncodeValueTextSnafu { tag })?
                } else {
                    text.into_bytes()
                };
                w.write_all(&bytes)
            }
            Tags(c) => c
                .iter()
                .try_for_each(|t| w.write_u16(t.0).and_then(|_| w.write_u16(t.1))),
            U8(c) => w.write_all(c),
            I16(c) => c.iter().try_for_each(|v| w.write_i16(*v)),
            U16(c) => c.iter().try_for_each(|v| w.write_u16(*v)),
            I32(c) => c.iter().try_for_each(|v| w.write_i32(*v)),
            U32(c) => c.iter().try_for_each(|v| w.write_u32(*v)),
            I64(c) => c.iter().try_for_each(|v| w.write_i64(*v)),
            U64(c) => c.iter().try_for_each(|v| w.write_u64(*v)),
            F32(c) => c.iter().try_for_each(|v| w.write_f32(*v)),
            F64(c) => c.iter().try_for_each(|v| w.write_f64(*v)),
        };
        if out.len() % 2 == 1 {
            out.push(vr.padding());
        }
        Ok(out)
    }
}
