//! Parsing of complete files written to a temporary directory.
use dcmstack_core::{PrimitiveValue, VR};
use dcmstack_dictionary_std::{tags, uids};
use dcmstack_object::{Item, Value};
use dcmstack_parser::dataset::write::write_meta_group;
use dcmstack_parser::file::{Error, ReadError};
use dcmstack_parser::{can_read_file, parse_file, write_file, FileMetaTableBuilder, ParseOptions};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn meta(transfer_syntax: &str) -> dcmstack_parser::FileMetaTable {
    FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid("2.25.42")
        .transfer_syntax(transfer_syntax)
        .build()
        .unwrap()
}

fn write_bytes(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

/// An explicit VR little endian element with a short length.
fn explicit_le(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&group.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(vr);
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value);
    out
}

fn implicit_le(group: u16, element: u16, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&group.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
    out
}

fn preamble_and_meta(transfer_syntax: &str) -> Vec<u8> {
    let mut out = vec![0; 128];
    out.extend_from_slice(b"DICM");
    write_meta_group(&mut out, &meta(transfer_syntax)).unwrap();
    out
}

#[test]
fn written_file_is_parsed_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("image.dcm");

    let mut dataset = Item::new();
    dataset
        .put_path_str(&tags::SERIES_INSTANCE_UID.into(), "2.25.7")
        .unwrap();
    dataset.put_path_f64(&tags::ROWS.into(), &[2.0]).unwrap();
    dataset.put_path_f64(&tags::COLUMNS.into(), &[2.0]).unwrap();
    dataset
        .put_path_f64(&tags::BITS_ALLOCATED.into(), &[16.0])
        .unwrap();
    dataset.put(
        tags::PIXEL_DATA,
        Value::new(VR::OW, PrimitiveValue::from(vec![1_u16, 2, 3, 4])),
    );
    write_file(&path, &meta(uids::EXPLICIT_VR_LITTLE_ENDIAN), &dataset).unwrap();

    let parsed = parse_file(&path, &ParseOptions::new()).unwrap();
    assert_eq!(
        parsed.meta.as_ref().map(|m| m.transfer_syntax()),
        Some(uids::EXPLICIT_VR_LITTLE_ENDIAN)
    );
    assert_eq!(parsed.transfer_syntax.uid(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
    assert_eq!(
        parsed.dataset.get_str(tags::SERIES_INSTANCE_UID).as_deref(),
        Some("2.25.7")
    );
    assert_eq!(parsed.dataset.get_int(tags::ROWS), Some(2));
    // the meta group is part of the attributes
    assert_eq!(
        parsed.dataset.get_str(tags::TRANSFER_SYNTAX_UID).as_deref(),
        Some(uids::EXPLICIT_VR_LITTLE_ENDIAN)
    );
    // the pixel data is located, not read
    assert!(parsed.dataset.get(tags::PIXEL_DATA).is_none());

    let pixel_data = parsed.pixel_data.unwrap();
    assert_eq!(pixel_data.tag, tags::PIXEL_DATA);
    assert_eq!(pixel_data.vr, VR::OW);
    assert_eq!(pixel_data.length, 8);
    assert!(!pixel_data.encapsulated);
    assert_eq!(pixel_data.offset + 8, parsed.file_size);

    let bytes = std::fs::read(&path).unwrap();
    let offset = pixel_data.offset as usize;
    assert_eq!(&bytes[offset..offset + 4], &[1, 0, 2, 0]);
    assert!(can_read_file(&path));
}

#[test]
fn raw_implicit_data_set_without_preamble() {
    let dir = TempDir::new().unwrap();
    let mut bytes = Vec::new();
    bytes.extend(implicit_le(0x0008, 0x0018, b"2.25.99\0"));
    bytes.extend(implicit_le(0x0028, 0x0010, &3_u16.to_le_bytes()));
    bytes.extend(implicit_le(0x7FE0, 0x0010, &[0; 6]));
    let path = write_bytes(&dir, "raw", &bytes);

    let parsed = parse_file(&path, &ParseOptions::new()).unwrap();
    assert!(parsed.meta.is_none());
    assert_eq!(parsed.transfer_syntax.uid(), uids::IMPLICIT_VR_LITTLE_ENDIAN);
    assert_eq!(
        parsed.dataset.get_str(tags::SOP_INSTANCE_UID).as_deref(),
        Some("2.25.99")
    );
    // the VR of implicit elements comes from the dictionary
    assert_eq!(parsed.dataset.get(tags::ROWS).map(Value::vr), Some(VR::US));
    assert_eq!(parsed.dataset.get_int(tags::ROWS), Some(3));
    let pixel_data = parsed.pixel_data.unwrap();
    assert_eq!(pixel_data.offset, bytes.len() as u64 - 6);
    assert_eq!(pixel_data.length, 6);
}

#[test]
fn big_endian_data_set() {
    let dir = TempDir::new().unwrap();
    let mut bytes = preamble_and_meta(uids::EXPLICIT_VR_BIG_ENDIAN);
    // (0028,0010) US 2 = 512
    bytes.extend_from_slice(&[0x00, 0x28, 0x00, 0x10, b'U', b'S', 0x00, 0x02, 0x02, 0x00]);
    // (7FE0,0010) OW, 4 bytes
    bytes.extend_from_slice(&[0x7F, 0xE0, 0x00, 0x10, b'O', b'W', 0, 0, 0, 0, 0, 4]);
    bytes.extend_from_slice(&[0x00, 0x01, 0x00, 0x02]);
    let path = write_bytes(&dir, "be.dcm", &bytes);

    let parsed = parse_file(&path, &ParseOptions::new()).unwrap();
    assert!(parsed.transfer_syntax.swaps_pixel_bytes());
    assert_eq!(parsed.dataset.get_int(tags::ROWS), Some(512));
    let pixel_data = parsed.pixel_data.unwrap();
    assert_eq!(pixel_data.length, 4);
    assert_eq!(pixel_data.offset, bytes.len() as u64 - 4);
}

#[test]
fn undefined_length_pixel_data_extends_to_the_end() {
    let dir = TempDir::new().unwrap();
    let mut bytes = preamble_and_meta(uids::RLE_LOSSLESS);
    bytes.extend(explicit_le(0x0028, 0x0100, b"US", &8_u16.to_le_bytes()));
    bytes.extend_from_slice(&[0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0, 0]);
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    let offset = bytes.len() as u64;
    // an empty offset table and a sequence delimiter
    bytes.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0, 0, 0, 0, 0]);
    bytes.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0, 0, 0, 0]);
    let path = write_bytes(&dir, "rle.dcm", &bytes);

    let parsed = parse_file(&path, &ParseOptions::new()).unwrap();
    assert!(parsed.transfer_syntax.is_encapsulated());
    let pixel_data = parsed.pixel_data.unwrap();
    assert!(pixel_data.encapsulated);
    assert_eq!(pixel_data.offset, offset);
    assert_eq!(pixel_data.length, 16);
}

#[test]
fn unknown_transfer_syntax_is_read_as_encapsulated() {
    let dir = TempDir::new().unwrap();
    let mut bytes = preamble_and_meta("1.2.3.4.5.6");
    bytes.extend(explicit_le(0x0028, 0x0010, b"US", &4_u16.to_le_bytes()));
    let path = write_bytes(&dir, "unknown.dcm", &bytes);

    let parsed = parse_file(&path, &ParseOptions::new()).unwrap();
    assert_eq!(parsed.transfer_syntax_uid, "1.2.3.4.5.6");
    assert!(parsed.transfer_syntax.is_encapsulated());
    assert_eq!(parsed.dataset.get_int(tags::ROWS), Some(4));
    assert!(!parsed.pixel_data_found());
    assert!(!can_read_file(&path));
}

#[test]
fn deflated_transfer_syntax_is_rejected() {
    let dir = TempDir::new().unwrap();
    let bytes = preamble_and_meta(uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN);
    let path = write_bytes(&dir, "deflated.dcm", &bytes);

    let err = parse_file(&path, &ParseOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::ParseFile {
            source: ReadError::DeflatedDataset { .. },
            ..
        }
    ));
}

#[test]
fn other_files_are_not_recognized() {
    let dir = TempDir::new().unwrap();
    let path = write_bytes(&dir, "notes.txt", b"these are not the pixels you are looking for");

    let err = parse_file(&path, &ParseOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::ParseFile {
            source: ReadError::NotDicom { .. },
            ..
        }
    ));
    assert!(!can_read_file(&path));
    assert!(!can_read_file(dir.path().join("missing.dcm")));
}
