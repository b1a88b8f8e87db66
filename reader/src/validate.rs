//! Consistency checks between the index arrays and the files of a volume.

use crate::error::{
    FileIndexOutOfRangeSnafu, FrameIndexOutOfRangeSnafu, IllegalValueSnafu,
    InconsistentAttributeSnafu, MissingAttributeSnafu, Result, SortingFailureSnafu,
    UnreferencedFileSnafu,
};
use dcmstack_core::dictionary::{DataDictionary, DictionaryEntry};
use dcmstack_core::Tag;
use dcmstack_dictionary_std::{tags, StandardDataDictionary};
use dcmstack_object::{Item, MetaData};
use snafu::{ensure, OptionExt};
use std::path::{Path, PathBuf};

/// The bit depths which can be read.
const SUPPORTED_BITS_ALLOCATED: [i64; 6] = [1, 8, 12, 16, 32, 64];

/// The layout of the stored pixels, shared by all files of a volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PixelFormat {
    pub rows: usize,
    pub columns: usize,
    pub bits_allocated: u16,
    pub samples_per_pixel: usize,
}

/// The dictionary name of an attribute.
pub(crate) fn attribute_name(tag: Tag) -> String {
    StandardDataDictionary
        .by_tag(tag)
        .map(|entry| entry.alias().to_string())
        .unwrap_or_else(|| tag.to_string())
}

fn retrieve_required_int(item: &Item, tag: Tag, filename: &Path) -> Result<i64> {
    let value = item.get_int(tag).context(MissingAttributeSnafu {
        filename,
        tag,
        name: attribute_name(tag),
    })?;
    ensure!(
        value > 0,
        IllegalValueSnafu {
            filename,
            tag,
            name: attribute_name(tag),
            value
        }
    );
    Ok(value)
}

fn retrieve_samples_per_pixel(item: &Item, filename: &Path) -> Result<i64> {
    match item.get(tags::SAMPLES_PER_PIXEL) {
        Some(_) => retrieve_required_int(item, tags::SAMPLES_PER_PIXEL, filename),
        None => Ok(1),
    }
}

fn check_consistent(tag: Tag, value: i64, expected: i64, filename: &Path) -> Result<()> {
    ensure!(
        value == expected,
        InconsistentAttributeSnafu {
            filename,
            tag,
            name: attribute_name(tag),
            value,
            expected
        }
    );
    Ok(())
}

/// Check the index arrays against the files,
/// and the pixel layout of every file against the first used file.
///
/// With `require_all_files`, every file must be used by some slice.
pub(crate) fn validate(
    meta: &MetaData,
    filenames: &[PathBuf],
    require_all_files: bool,
) -> Result<PixelFormat> {
    let (file_index, frame_index) = (meta.file_index(), meta.frame_index());
    ensure!(
        file_index.values().len() == frame_index.values().len()
            && file_index.components() == frame_index.components(),
        SortingFailureSnafu {
            message: "file and frame index arrays differ in size"
        }
    );
    ensure!(
        !file_index.is_empty(),
        SortingFailureSnafu {
            message: "no slices to read"
        }
    );

    let mut used = vec![false; meta.number_of_files()];
    for (&file, &frame) in file_index.values().iter().zip(frame_index.values()) {
        let seen = used
            .get_mut(file)
            .with_context(|| FileIndexOutOfRangeSnafu {
                index: file,
                files: filenames.len(),
                first_file: filenames.first().cloned().unwrap_or_default(),
            })?;
        *seen = true;
        let frames = meta.number_of_frames(file);
        ensure!(
            frame < frames,
            FrameIndexOutOfRangeSnafu {
                filename: &filenames[file],
                index: frame,
                frames
            }
        );
    }
    if require_all_files {
        if let Some(unused) = used.iter().position(|u| !u) {
            return UnreferencedFileSnafu {
                filename: &filenames[unused],
            }
            .fail();
        }
    }

    let mut format: Option<(i64, i64, i64, i64)> = None;
    for (file, item) in meta.items().iter().enumerate() {
        if !used[file] {
            continue;
        }
        let filename = &filenames[file];
        let rows = retrieve_required_int(item, tags::ROWS, filename)?;
        let columns = retrieve_required_int(item, tags::COLUMNS, filename)?;
        let bits = retrieve_required_int(item, tags::BITS_ALLOCATED, filename)?;
        ensure!(
            SUPPORTED_BITS_ALLOCATED.contains(&bits),
            IllegalValueSnafu {
                filename,
                tag: tags::BITS_ALLOCATED,
                name: attribute_name(tags::BITS_ALLOCATED),
                value: bits
            }
        );
        let samples = retrieve_samples_per_pixel(item, filename)?;

        match format {
            None => format = Some((rows, columns, bits, samples)),
            Some((r, c, b, s)) => {
                check_consistent(tags::ROWS, rows, r, filename)?;
                check_consistent(tags::COLUMNS, columns, c, filename)?;
                check_consistent(tags::BITS_ALLOCATED, bits, b, filename)?;
                check_consistent(tags::SAMPLES_PER_PIXEL, samples, s, filename)?;
            }
        }
    }

    let (rows, columns, bits, samples) = format.context(SortingFailureSnafu {
        message: "no file is used",
    })?;
    Ok(PixelFormat {
        rows: rows as usize,
        columns: columns as usize,
        bits_allocated: bits as u16,
        samples_per_pixel: samples as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use dcmstack_core::{PrimitiveValue, VR};
    use dcmstack_object::{IndexArray, Value};

    fn image_item(rows: u16, bits: u16) -> Item {
        let us = |v: u16| Value::new(VR::US, PrimitiveValue::from(v));
        let mut item = Item::new();
        item.put(tags::ROWS, us(rows));
        item.put(tags::COLUMNS, us(8));
        item.put(tags::BITS_ALLOCATED, us(bits));
        item
    }

    fn meta_of(items: Vec<Item>, files: &[usize]) -> MetaData {
        let mut meta = MetaData::new(items);
        meta.set_index_arrays(
            IndexArray::from_values(files.to_vec(), 1),
            IndexArray::from_values(vec![0; files.len()], 1),
        );
        meta
    }

    fn names(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("im{}.dcm", i))).collect()
    }

    #[test]
    fn consistent_files_validate() {
        let meta = meta_of(vec![image_item(4, 16), image_item(4, 16)], &[1, 0]);
        let format = validate(&meta, &names(2), true).unwrap();
        assert_eq!(
            format,
            PixelFormat {
                rows: 4,
                columns: 8,
                bits_allocated: 16,
                samples_per_pixel: 1
            }
        );
    }

    #[test]
    fn mismatch_names_file_and_attribute() {
        let meta = meta_of(vec![image_item(4, 16), image_item(5, 16)], &[0, 1]);
        let err = validate(&meta, &names(2), true).unwrap_err();
        match &err {
            Error::InconsistentAttribute {
                filename, tag, name, ..
            } => {
                assert_eq!(filename, &PathBuf::from("im1.dcm"));
                assert_eq!(*tag, tags::ROWS);
                assert_eq!(name, "Rows");
            }
            e => panic!("unexpected error {:?}", e),
        }
        assert!(err.to_string().contains("Rows"));
    }

    #[test]
    fn unsupported_bits_and_unused_files() {
        let meta = meta_of(vec![image_item(4, 24)], &[0]);
        assert!(matches!(
            validate(&meta, &names(1), true),
            Err(Error::IllegalValue { .. })
        ));

        let meta = meta_of(vec![image_item(4, 8), image_item(4, 8)], &[0]);
        assert!(matches!(
            validate(&meta, &names(2), true),
            Err(Error::UnreferencedFile { .. })
        ));
        assert!(validate(&meta, &names(2), false).is_ok());

        let meta = meta_of(vec![image_item(4, 8)], &[3]);
        let err = validate(&meta, &names(1), true).unwrap_err();
        assert!(matches!(
            &err,
            Error::FileIndexOutOfRange {
                index: 3,
                files: 1,
                ..
            }
        ));
        assert!(err.to_string().contains("im0.dcm"));
    }
}
