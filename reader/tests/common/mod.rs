//! Synthetic series written into temporary directories.
#![allow(dead_code)]

use dcmstack_core::{PrimitiveValue, VR};
use dcmstack_dictionary_std::{tags, uids};
use dcmstack_object::{Item, TagPath, Value};
use dcmstack_parser::dataset::write::write_meta_group;
use dcmstack_parser::{write_file, FileMetaTableBuilder};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const ROWS: usize = 4;
pub const COLUMNS: usize = 3;

/// The attributes of a single-frame axial image of 16-bit samples.
pub fn image_item(series: &str, instance: i64, z: f64) -> Item {
    let mut item = Item::new();
    let text = [
        (tags::SOP_CLASS_UID, uids::CT_IMAGE_STORAGE),
        (tags::STUDY_INSTANCE_UID, "1.2.826.0.1.3680043.2.1125.1"),
        (tags::SERIES_INSTANCE_UID, series),
        (tags::MODALITY, "CT"),
        (tags::PATIENT_NAME, "Doe^John"),
        (tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2"),
    ];
    for (tag, value) in text {
        item.put_path_str(&tag.into(), value).unwrap();
    }
    let numbers: [(_, &[f64]); 10] = [
        (tags::INSTANCE_NUMBER, &[instance as f64]),
        (tags::ROWS, &[ROWS as f64]),
        (tags::COLUMNS, &[COLUMNS as f64]),
        (tags::SAMPLES_PER_PIXEL, &[1.]),
        (tags::BITS_ALLOCATED, &[16.]),
        (tags::BITS_STORED, &[16.]),
        (tags::HIGH_BIT, &[15.]),
        (tags::PIXEL_REPRESENTATION, &[0.]),
        (tags::IMAGE_ORIENTATION_PATIENT, &[1., 0., 0., 0., 1., 0.]),
        (tags::PIXEL_SPACING, &[0.5, 0.25]),
    ];
    for (tag, values) in numbers {
        item.put_path_f64(&tag.into(), values).unwrap();
    }
    item.put_path_f64(&tags::IMAGE_POSITION_PATIENT.into(), &[-10., -20., z])
        .unwrap();
    item
}

/// Set the stack of an image.
pub fn set_stack(item: &mut Item, stack: &str) {
    let path = TagPath::nested(tags::FRAME_CONTENT_SEQUENCE, 0, tags::STACK_ID);
    item.put_path_str(&path, stack).unwrap();
}

/// Set 16-bit pixel data.
pub fn put_u16_pixels(item: &mut Item, pixels: Vec<u16>) {
    item.put(
        tags::PIXEL_DATA,
        Value::new(VR::OW, PrimitiveValue::from(pixels)),
    );
}

/// Fill an image with samples starting at `base`.
pub fn ramp(base: u16) -> Vec<u16> {
    (0..(ROWS * COLUMNS) as u16).map(|i| base + i).collect()
}

pub fn write_with_syntax(path: &Path, item: &Item, transfer_syntax: &str) {
    let meta = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid(format!("2.25.{}", path.display().to_string().len()))
        .transfer_syntax(transfer_syntax)
        .build()
        .unwrap();
    write_file(path, &meta, item).unwrap();
}

pub fn write(path: &Path, item: &Item) {
    write_with_syntax(path, item, uids::EXPLICIT_VR_LITTLE_ENDIAN);
}

/// Write an axial series of images at the given positions,
/// each filled with a ramp starting at `100 * (index + 1)`.
pub fn write_series(dir: &Path, series: &str, positions: &[f64]) -> Vec<PathBuf> {
    positions
        .iter()
        .enumerate()
        .map(|(i, z)| {
            let path = dir.join(format!("{}_{}.dcm", series, i));
            let mut item = image_item(series, i as i64 + 1, *z);
            put_u16_pixels(&mut item, ramp(100 * (i as u16 + 1)));
            write(&path, &item);
            path
        })
        .collect()
}

/// Append raw bytes to a file.
pub fn append(path: &Path, bytes: &[u8]) {
    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

/// An item of encapsulated pixel data.
pub fn fragment(value: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF, 0x00, 0xE0];
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
    out
}

/// The header of pixel data with undefined length, explicit VR little endian.
pub fn encapsulated_pixel_data_header() -> Vec<u8> {
    vec![
        0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0, 0, 0xFF, 0xFF, 0xFF, 0xFF,
    ]
}

/// The end of encapsulated pixel data.
pub fn sequence_delimiter() -> Vec<u8> {
    vec![0xFE, 0xFF, 0xDD, 0xE0, 0, 0, 0, 0]
}

/// An attribute in implicit VR little endian.
pub fn implicit_element(group: u16, element: u16, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + value.len());
    out.extend_from_slice(&group.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
    out
}

/// Text padded to an even length with `pad`.
pub fn padded(text: &str, pad: u8) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    if out.len() % 2 == 1 {
        out.push(pad);
    }
    out
}

/// Write a file whose data set is already encoded.
pub fn write_encoded(path: &Path, transfer_syntax: &str, dataset: &[u8]) {
    let meta = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid("2.25.99")
        .transfer_syntax(transfer_syntax)
        .build()
        .unwrap();
    let mut out = vec![0; 128];
    out.extend_from_slice(b"DICM");
    write_meta_group(&mut out, &meta).unwrap();
    out.extend_from_slice(dataset);
    std::fs::write(path, out).unwrap();
}
