//! Reading of a data set into an [`Item`],
//! stopping at the pixel data of the top-level data set.

use crate::stateful::decode::{self, StatefulDecoder};
use dcmstack_core::header::{
    DataElementHeader, Length, SequenceItemHeader, ITEM, ITEM_DELIMITER, SEQUENCE_DELIMITER,
};
use dcmstack_core::{Tag, VR};
use dcmstack_dictionary_std::tags;
use dcmstack_encoding::byteordered::Endianness;
use dcmstack_encoding::decode::DatasetDecoder;
use dcmstack_object::{Item, ItemContext, Value};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::Read;
use tracing::warn;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not read attribute header"))]
    ReadHeader {
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not read item header in {}", tag))]
    ReadItemHeader {
        tag: Tag,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not read value of {}", tag))]
    ReadValue {
        tag: Tag,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Unexpected item header at position {}", position))]
    UnexpectedItem { position: u64, backtrace: Backtrace },
    #[snafu(display("Data ended inside an item of {}", tag))]
    PrematureEnd { tag: Tag, backtrace: Backtrace },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Attributes kept regardless of the group filter,
/// as they are needed to tell whether the file holds a readable image.
const PROBE_TAGS: &[Tag] = &[
    tags::SPECIFIC_CHARACTER_SET,
    tags::SAMPLES_PER_PIXEL,
    tags::NUMBER_OF_FRAMES,
    tags::ROWS,
    tags::COLUMNS,
    tags::BITS_ALLOCATED,
    tags::PIXEL_REPRESENTATION,
];

/// Options for parsing a data set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep only the attributes of this group
    /// (plus the file meta group and the image pixel basics).
    /// Other attributes are still read, but not stored.
    pub group: Option<u16>,
    /// Continue parsing past the pixel data of the top-level data set,
    /// instead of stopping at its header.
    pub read_past_pixel_data: bool,
}

impl ParseOptions {
    /// Default options: keep everything, stop at the pixel data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the attributes of the given group.
    pub fn group(mut self, group: u16) -> Self {
        self.group = Some(group);
        self
    }

    /// Set whether to continue parsing past the pixel data.
    pub fn read_past_pixel_data(mut self, read_past: bool) -> Self {
        self.read_past_pixel_data = read_past;
        self
    }

    fn keeps(&self, tag: Tag) -> bool {
        match self.group {
            None => true,
            Some(group) => {
                tag.group() == group || tag.group() == 0x0002 || PROBE_TAGS.contains(&tag)
            }
        }
    }
}

/// The header of the pixel data element of the top-level data set
/// and the file offset of its value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelDataHeader {
    /// The attribute header.
    pub header: DataElementHeader,
    /// The position of the first byte of the value.
    pub offset: u64,
}

/// Whether the tag is one of the pixel data attributes.
pub fn is_pixel_data(tag: Tag) -> bool {
    matches!(
        tag,
        tags::PIXEL_DATA | tags::FLOAT_PIXEL_DATA | tags::DOUBLE_FLOAT_PIXEL_DATA
    )
}

/// How the reading of an item came to an end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ItemEnd {
    /// The source has no more data.
    Source,
    /// The defined length of the item was consumed.
    Length,
    /// An item delimiter was found.
    Delimiter,
    /// A sequence delimiter was found where an item delimiter was expected.
    SequenceDelimiter,
    /// The pixel data of the top-level data set was found.
    PixelData(PixelDataHeader),
}

/// Read the attributes from the decoder into `item`
/// until the pixel data of the data set or the end of the source.
///
/// Returns the populated item and the header of the pixel data, if found.
pub fn read_dataset<S>(
    decoder: &mut StatefulDecoder<S>,
    item: Item,
    options: &ParseOptions,
) -> Result<(Item, Option<PixelDataHeader>)>
where
    S: Read,
{
    let mut reader = DatasetReader {
        decoder,
        options,
        pixel_data: None,
    };
    let (item, end) = reader.read_item(item, None, true)?;
    let pixel_data = match end {
        ItemEnd::PixelData(pixel_data) => Some(pixel_data),
        ItemEnd::Delimiter | ItemEnd::SequenceDelimiter => {
            warn!(
                "Stray delimiter at position {}, ignoring trailing data",
                reader.decoder.position()
            );
            reader.pixel_data
        }
        ItemEnd::Source | ItemEnd::Length => reader.pixel_data,
    };
    Ok((item, pixel_data))
}

struct DatasetReader<'a, S> {
    decoder: &'a mut StatefulDecoder<S>,
    options: &'a ParseOptions,
    pixel_data: Option<PixelDataHeader>,
}

impl<S> DatasetReader<'_, S>
where
    S: Read,
{
    fn read_item(
        &mut self,
        mut item: Item,
        end: Option<u64>,
        top_level: bool,
    ) -> Result<(Item, ItemEnd)> {
        loop {
            if end.map_or(false, |end| self.decoder.position() >= end) {
                return Ok((item, ItemEnd::Length));
            }
            let position = self.decoder.position();
            let header = match self.decoder.decode_header_or_eof().context(ReadHeaderSnafu)? {
                Some(header) => header,
                None => return Ok((item, ItemEnd::Source)),
            };
            match header.tag {
                ITEM_DELIMITER => return Ok((item, ItemEnd::Delimiter)),
                SEQUENCE_DELIMITER => return Ok((item, ItemEnd::SequenceDelimiter)),
                ITEM => return UnexpectedItemSnafu { position }.fail(),
                _ => {}
            }

            if top_level && is_pixel_data(header.tag) {
                let pixel_data = PixelDataHeader {
                    header,
                    offset: self.decoder.position(),
                };
                if !self.options.read_past_pixel_data {
                    return Ok((item, ItemEnd::PixelData(pixel_data)));
                }
                self.skip_value(header)?;
                self.pixel_data.get_or_insert(pixel_data);
                continue;
            }

            self.read_element(&mut item, header)?;
        }
    }

    fn read_element(&mut self, item: &mut Item, header: DataElementHeader) -> Result<()> {
        let tag = header.tag;
        let mut vr = header.vr;
        // implicit VRs and explicit UN are refined with the dictionary,
        // the private creators and the pixel context of the item
        let implicit = !self.decoder.decoder().is_explicit_vr();
        let little_endian = self.decoder.decoder().endianness() == Endianness::Little;
        if implicit || (vr == VR::UN && little_endian) {
            if let Ok(resolved) = item.resolve_vr(tag) {
                vr = resolved;
            }
        }

        let keep = self.options.keeps(tag);

        if vr == VR::SQ || (vr == VR::UN && header.len.is_undefined()) {
            // the content of a UN sequence is always implicit VR little endian
            let saved = (header.vr == VR::UN).then(|| {
                self.decoder
                    .replace_decoder(DatasetDecoder::new(Endianness::Little, false))
            });
            let items = self.read_sequence(tag, header.len, item.context())?;
            if let Some(saved) = saved {
                self.decoder.replace_decoder(saved);
            }
            if keep {
                item.put(tag, Value::sequence(items));
            }
            return Ok(());
        }

        if header.len.is_undefined() || !keep {
            return self.skip_value(header);
        }

        let value = self
            .decoder
            .read_value(&DataElementHeader::new(tag, vr, header.len))
            .context(ReadValueSnafu { tag })?;
        item.put(tag, Value::new(vr, value));
        if tag == tags::SPECIFIC_CHARACTER_SET {
            self.decoder.set_charset(item.context().charset);
        }
        Ok(())
    }

    fn read_sequence(&mut self, tag: Tag, len: Length, context: ItemContext) -> Result<Vec<Item>> {
        let end = len.get().map(|len| self.decoder.position() + u64::from(len));
        let mut items = Vec::new();
        loop {
            if end.map_or(false, |end| self.decoder.position() >= end) {
                break;
            }
            let header = self
                .decoder
                .decode_item_header()
                .context(ReadItemHeaderSnafu { tag })?;
            match header {
                SequenceItemHeader::Item { len } => {
                    let item_end = len.get().map(|len| self.decoder.position() + u64::from(len));
                    let (nested, item_end_kind) =
                        self.read_item(Item::with_context(context), item_end, false)?;
                    // a change of character set is local to the item
                    self.decoder.set_charset(context.charset);
                    items.push(nested);
                    match item_end_kind {
                        ItemEnd::SequenceDelimiter => break,
                        ItemEnd::Source => return PrematureEndSnafu { tag }.fail(),
                        _ => {}
                    }
                }
                SequenceItemHeader::SequenceDelimiter => break,
                SequenceItemHeader::ItemDelimiter => {
                    warn!(
                        "Stray item delimiter in {} at position {}",
                        tag,
                        self.decoder.position()
                    );
                }
            }
        }
        Ok(items)
    }

    /// Skip a value, which may be encapsulated in fragments.
    fn skip_value(&mut self, header: DataElementHeader) -> Result<()> {
        let tag = header.tag;
        if let Some(len) = header.len.get() {
            return self
                .decoder
                .skip_bytes(u64::from(len))
                .context(ReadValueSnafu { tag });
        }
        loop {
            let item = self
                .decoder
                .decode_item_header()
                .context(ReadItemHeaderSnafu { tag })?;
            match item {
                SequenceItemHeader::Item { len } => {
                    let len = len.get().unwrap_or(0);
                    self.decoder
                        .skip_bytes(u64::from(len))
                        .context(ReadValueSnafu { tag })?;
                }
                SequenceItemHeader::ItemDelimiter => {}
                SequenceItemHeader::SequenceDelimiter => return Ok(()),
            }
        }
    }
}
