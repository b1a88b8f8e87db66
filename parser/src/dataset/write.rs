//! Writing of attribute items to files in Explicit VR Little Endian.
//!
//! Sequences and their items are written with undefined length,
//! so that no lengths of nested content need to be computed in advance.

use crate::meta::{FileMetaTable, DICM_MAGIC_CODE};
use dcmstack_core::header::{DataElementHeader, Length};
use dcmstack_core::{PrimitiveValue, Tag, VR};
use dcmstack_dictionary_std::tags;
use dcmstack_encoding::encode::{self, Encode, ExplicitVRLittleEndianEncoder};
use dcmstack_encoding::text::SpecificCharacterSet;
use dcmstack_object::{Item, Value};
use snafu::{Backtrace, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not create file {}", filename.display()))]
    CreateFile {
        filename: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write the preamble"))]
    WritePreamble {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write {}", tag))]
    WriteElement {
        tag: Tag,
        #[snafu(backtrace)]
        source: encode::Error,
    },
    #[snafu(display("Could not write the value of {}", tag))]
    WriteValue {
        tag: Tag,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not flush the file"))]
    Flush {
        backtrace: Backtrace,
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Write a complete file: the preamble, the magic code,
/// the file meta group and the data set.
///
/// Attributes of group 0x0002 in `dataset` are not written,
/// as the meta group comes from `meta`.
pub fn write_file<P>(path: P, meta: &FileMetaTable, dataset: &Item) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path).context(CreateFileSnafu { filename: path })?;
    let mut to = BufWriter::new(file);
    to.write_all(&[0; 128]).context(WritePreambleSnafu)?;
    to.write_all(&DICM_MAGIC_CODE).context(WritePreambleSnafu)?;
    write_meta_group(&mut to, meta)?;
    write_dataset(&mut to, dataset)?;
    to.flush().context(FlushSnafu)
}

/// Write the file meta group, preceded by its group length.
pub fn write_meta_group<W>(mut to: W, meta: &FileMetaTable) -> Result<()>
where
    W: Write,
{
    let mut group = Vec::new();
    write_item(&mut group, &meta.to_item(), SpecificCharacterSet::Default)?;
    let length = Value::new(VR::UL, PrimitiveValue::from(group.len() as u32));
    write_element(
        &mut to,
        tags::FILE_META_INFORMATION_GROUP_LENGTH,
        &length,
        SpecificCharacterSet::Default,
    )?;
    to.write_all(&group).context(WriteValueSnafu {
        tag: tags::FILE_META_INFORMATION_GROUP_LENGTH,
    })
}

/// Write the attributes of a data set, except those of the meta group.
pub fn write_dataset<W>(mut to: W, dataset: &Item) -> Result<()>
where
    W: Write,
{
    let charset = dataset.context().charset;
    for (tag, value) in dataset.iter().filter(|(tag, _)| tag.group() != 0x0002) {
        write_element(&mut to, tag, value, charset)?;
    }
    Ok(())
}

// a trait object, as sequences recurse through items
fn write_item(to: &mut dyn Write, item: &Item, charset: SpecificCharacterSet) -> Result<()> {
    for (tag, value) in item.iter() {
        write_element(&mut *to, tag, value, charset)?;
    }
    Ok(())
}

fn write_element(
    to: &mut dyn Write,
    tag: Tag,
    value: &Value,
    charset: SpecificCharacterSet,
) -> Result<()> {
    let encoder = ExplicitVRLittleEndianEncoder;
    if let Some(items) = value.items() {
        encoder
            .encode_element_header(
                &mut *to,
                DataElementHeader::new(tag, VR::SQ, Length::UNDEFINED),
            )
            .context(WriteElementSnafu { tag })?;
        for item in items {
            encoder
                .encode_item_header(&mut *to, Length::UNDEFINED.0)
                .context(WriteElementSnafu { tag })?;
            // nested items may declare their own character set
            write_item(&mut *to, item, item.context().charset)?;
            encoder
                .encode_item_delimiter(&mut *to)
                .context(WriteElementSnafu { tag })?;
        }
        return encoder
            .encode_sequence_delimiter(&mut *to)
            .context(WriteElementSnafu { tag });
    }

    let primitive = value.primitive().cloned().unwrap_or(PrimitiveValue::Empty);
    let bytes = encoder
        .encode_value(tag, value.vr(), &primitive, charset)
        .context(WriteElementSnafu { tag })?;
    encoder
        .encode_element_header(
            &mut *to,
            DataElementHeader::new(tag, value.vr(), Length(bytes.len() as u32)),
        )
        .context(WriteElementSnafu { tag })?;
    to.write_all(&bytes).context(WriteValueSnafu { tag })
}

#[cfg(test)]
mod tests {
    use super::{write_dataset, write_file, write_meta_group};
    use crate::dataset::read::{read_dataset, ParseOptions};
    use crate::file::parse_file;
    use crate::meta::{FileMetaTable, FileMetaTableBuilder};
    use crate::stateful::decode::StatefulDecoder;
    use dcmstack_dictionary_std::{tags, uids};
    use dcmstack_encoding::byteordered::Endianness;
    use dcmstack_encoding::decode::DatasetDecoder;
    use dcmstack_encoding::text::SpecificCharacterSet;
    use dcmstack_object::{Item, TagPath};

    #[test]
    fn write_and_read_back_nested_items() {
        let mut item = Item::new();
        item.put_path_str(&tags::SPECIFIC_CHARACTER_SET.into(), "ISO_IR 100")
            .unwrap();
        item.put_path_str(&tags::PATIENT_NAME.into(), "Ström^Åsa")
            .unwrap();
        item.put_path_f64(&tags::ROWS.into(), &[4.0]).unwrap();
        for frame in 0..3 {
            item.put_path_f64(
                &TagPath::nested2(
                    tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                    frame,
                    tags::PLANE_POSITION_SEQUENCE,
                    0,
                    tags::IMAGE_POSITION_PATIENT,
                ),
                &[0.0, 0.5, frame as f64 * 2.5],
            )
            .unwrap();
        }

        let mut out = Vec::new();
        write_dataset(&mut out, &item).unwrap();

        let mut decoder = StatefulDecoder::new(
            &out[..],
            DatasetDecoder::new(Endianness::Little, true),
            SpecificCharacterSet::Default,
        );
        let (read, pixel_data) =
            read_dataset(&mut decoder, Item::new(), &ParseOptions::new()).unwrap();
        assert!(pixel_data.is_none());
        assert_eq!(read, item);
        assert_eq!(
            read.get_str(tags::PATIENT_NAME).as_deref(),
            Some("Ström^Åsa")
        );
    }

    #[test]
    fn meta_group_starts_with_its_length() {
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid(uids::MR_IMAGE_STORAGE)
            .media_storage_sop_instance_uid("2.25.1")
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .build()
            .unwrap();
        let mut out = Vec::new();
        write_meta_group(&mut out, &meta).unwrap();
        let group_length = u32::from_le_bytes([out[8], out[9], out[10], out[11]]);
        assert_eq!(group_length as usize, out.len() - 12);

        let (table, _, position) = FileMetaTable::read_from(&mut &out[..], 0).unwrap();
        assert_eq!(table, meta);
        assert_eq!(position, out.len() as u64);
    }

    #[test]
    fn file_with_deeply_nested_sequences_reads_back() {
        let mut item = Item::new();
        item.put_path_str(&tags::SOP_INSTANCE_UID.into(), "2.25.7")
            .unwrap();
        for frame in 0..2 {
            item.put_path_f64(
                &TagPath::nested2(
                    tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                    frame,
                    tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE,
                    0,
                    tags::RESCALE_SLOPE,
                ),
                &[frame as f64 + 1.0],
            )
            .unwrap();
        }
        item.put_path_f64(
            &TagPath::nested(
                tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
                0,
                tags::SLICE_THICKNESS,
            ),
            &[1.5],
        )
        .unwrap();

        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid(uids::MR_IMAGE_STORAGE)
            .media_storage_sop_instance_uid("2.25.7")
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested.dcm");
        write_file(&path, &meta, &item).unwrap();

        let parsed = parse_file(&path, &ParseOptions::new()).unwrap();
        assert_eq!(parsed.meta.as_ref(), Some(&meta));
        let slope = TagPath::nested2(
            tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
            1,
            tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE,
            0,
            tags::RESCALE_SLOPE,
        );
        assert_eq!(
            parsed.dataset.get_by_path(&slope).and_then(|v| v.to_f64()),
            Some(2.0)
        );
    }
}
