//! Reading synthetic series into volumes.
mod common;

use common::*;
use dcmstack_dictionary_std::{tags, uids};
use dcmstack_reader::{
    read_volume, CodecRegistry, ErrorKind, MemoryRowOrder, ReadOptions, ReaderState, Rescale,
    ScalarType, VolumeReader,
};
use std::sync::atomic::Ordering;
use tempfile::TempDir;

fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
}

#[test]
fn axial_series_is_sorted_by_position() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[10., 0., 5.]);

    let volume = read_volume(&files, ReadOptions::new()).unwrap();
    let info = volume.info();
    assert_eq!(info.dimensions(), [COLUMNS, ROWS, 3]);
    assert_eq!(info.scalar_type(), ScalarType::U16);
    assert_eq!(info.components(), 1);
    assert_eq!(info.time_points(), 0);
    assert!(approx(info.spacing(), [0.25, 0.5, 5.]));

    let matrix = info.patient_matrix();
    assert!(approx(matrix.origin(), [-10., -20., 0.]));
    assert!(approx(matrix.column(0), [1., 0., 0.]));
    assert!(approx(matrix.column(1), [0., 1., 0.]));
    assert!(approx(matrix.column(2), [0., 0., 1.]));

    // the file at z = 0 was written second, with samples from 200
    let samples = volume.samples::<u16>().unwrap();
    let slice = ROWS * COLUMNS;
    assert_eq!(samples[0], 200);
    assert_eq!(samples[slice], 300);
    assert_eq!(samples[2 * slice], 100);
    assert_eq!(&samples[..slice], &ramp(200)[..]);
}

#[test]
fn pass_through_keeps_file_order() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[10., 0., 5.]);

    let volume = read_volume(&files, ReadOptions::new().sorting(false)).unwrap();
    let samples = volume.samples::<u16>().unwrap();
    let slice = ROWS * COLUMNS;
    assert_eq!(samples[0], 100);
    assert_eq!(samples[slice], 200);
    assert_eq!(samples[2 * slice], 300);
}

#[test]
fn reading_twice_gives_the_same_volume() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0., 2.5, 5.]);

    let first = read_volume(&files, ReadOptions::new()).unwrap();
    let second = read_volume(&files, ReadOptions::new()).unwrap();
    assert_eq!(first.data(), second.data());
    assert_eq!(first.info().spacing(), second.info().spacing());
    assert_eq!(first.info().patient_matrix(), second.info().patient_matrix());
}

#[test]
fn no_files_is_a_format_error() {
    let files: Vec<std::path::PathBuf> = Vec::new();
    let mut reader = VolumeReader::new(ReadOptions::new());
    let err = reader.read_information(&files).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(reader.state(), ReaderState::Failed);
}

#[test]
fn inconsistent_rows_name_the_file() {
    let dir = TempDir::new().unwrap();
    let mut files = write_series(dir.path(), "1.2.3.1", &[0., 5.]);

    let odd = dir.path().join("odd.dcm");
    let mut item = image_item("1.2.3.1", 3, 10.);
    item.put_path_f64(&tags::ROWS.into(), &[5.]).unwrap();
    put_u16_pixels(&mut item, vec![7; 5 * COLUMNS]);
    write(&odd, &item);
    files.push(odd);

    let mut reader = VolumeReader::new(ReadOptions::new());
    let err = reader.read_information(&files).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(reader.state(), ReaderState::Failed);
    let message = err.to_string();
    assert!(message.contains("odd.dcm"), "{}", message);
    assert!(message.contains("Rows"), "{}", message);
}

#[test]
fn differing_rescale_is_normalized() {
    let dir = TempDir::new().unwrap();
    let mut files = Vec::new();
    for (i, slope) in [1., 2.].into_iter().enumerate() {
        let path = dir.path().join(format!("rescaled_{}.dcm", i));
        let mut item = image_item("1.2.3.1", i as i64 + 1, i as f64 * 5.);
        item.put_path_f64(&tags::RESCALE_SLOPE.into(), &[slope]).unwrap();
        item.put_path_f64(&tags::RESCALE_INTERCEPT.into(), &[0.]).unwrap();
        put_u16_pixels(&mut item, ramp(100 * (i as u16 + 1)));
        write(&path, &item);
        files.push(path);
    }

    let volume = read_volume(&files, ReadOptions::new()).unwrap();
    assert!(volume.info().needs_rescale());
    assert_eq!(volume.info().rescale(), Rescale::new(2., 0.));
    let samples = volume.samples::<u16>().unwrap();
    let slice = ROWS * COLUMNS;
    // 100 at slope 1 is 50 at slope 2
    assert_eq!(samples[0], 50);
    assert_eq!(samples[2], 51);
    assert_eq!(samples[slice], 200);

    let volume = read_volume(&files, ReadOptions::new().auto_rescale(false)).unwrap();
    assert!(!volume.info().needs_rescale());
    assert_eq!(volume.info().rescale(), Rescale::new(1., 0.));
    assert_eq!(volume.samples::<u16>().unwrap()[0], 100);
}

#[test]
fn stacks_are_selected_by_id() {
    let dir = TempDir::new().unwrap();
    let mut files = Vec::new();
    for (i, (stack, z)) in [("1", 0.), ("1", 5.), ("2", 0.), ("2", 5.)]
        .into_iter()
        .enumerate()
    {
        let path = dir.path().join(format!("stack_{}.dcm", i));
        let mut item = image_item("1.2.3.1", i as i64 + 1, z);
        set_stack(&mut item, stack);
        put_u16_pixels(&mut item, ramp(100 * (i as u16 + 1)));
        write(&path, &item);
        files.push(path);
    }

    let volume = read_volume(&files, ReadOptions::new()).unwrap();
    assert_eq!(volume.info().stack_ids(), &["1".to_string(), "2".to_string()]);
    assert_eq!(volume.info().slices(), 2);
    assert_eq!(volume.samples::<u16>().unwrap()[0], 100);

    let options = ReadOptions::new().desired_stack_id(Some("2".to_string()));
    let volume = read_volume(&files, options).unwrap();
    assert_eq!(volume.info().slices(), 2);
    let samples = volume.samples::<u16>().unwrap();
    assert_eq!(samples[0], 300);
    assert_eq!(samples[ROWS * COLUMNS], 400);
}

#[test]
fn bottom_up_rows_are_flipped() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0., 5.]);

    let options = ReadOptions::new().memory_row_order(MemoryRowOrder::BottomUp);
    let volume = read_volume(&files, options).unwrap();
    let samples = volume.samples::<u16>().unwrap();
    // slices are reversed and the last row comes first
    let last_row = (ROWS - 1) * COLUMNS;
    assert_eq!(samples[0], 200 + last_row as u16);
    assert_eq!(samples[COLUMNS], 200 + (last_row - COLUMNS) as u16);
}

#[test]
fn rle_frames_are_decoded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rle.dcm");
    let mut item = image_item("1.2.3.1", 1, 0.);
    for tag in [tags::BITS_ALLOCATED, tags::BITS_STORED] {
        item.put_path_f64(&tag.into(), &[8.]).unwrap();
    }
    item.put_path_f64(&tags::HIGH_BIT.into(), &[7.]).unwrap();
    write_with_syntax(&path, &item, uids::RLE_LOSSLESS);

    let samples: Vec<u8> = (1..=(ROWS * COLUMNS) as u8).collect();
    let mut rle = vec![0; 64];
    rle[0] = 1;
    rle[4] = 64;
    rle.push(samples.len() as u8 - 1);
    rle.extend_from_slice(&samples);
    if rle.len() % 2 == 1 {
        rle.push(0);
    }
    let mut bytes = encapsulated_pixel_data_header();
    bytes.extend(fragment(&[]));
    bytes.extend(fragment(&rle));
    bytes.extend(sequence_delimiter());
    append(&path, &bytes);

    let volume = read_volume(&[&path], ReadOptions::new()).unwrap();
    assert_eq!(volume.info().scalar_type(), ScalarType::U8);
    assert_eq!(volume.data(), &samples[..]);

    let options = ReadOptions::new().codecs(CodecRegistry::empty());
    let err = read_volume(&[&path], options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
}

#[test]
fn packed_12_bit_samples_are_expanded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packed.dcm");
    let (rows, columns) = (10, 10);
    let values: Vec<u16> = (0..rows * columns).map(|i| (i * 37 % 4096) as u16).collect();
    let mut packed = Vec::new();
    for pair in values.chunks(2) {
        let (v1, v2) = (pair[0], pair[1]);
        packed.push((v1 >> 4) as u8);
        packed.push(((v1 & 0xf) | (v2 & 0xf0)) as u8);
        packed.push((((v2 >> 8) & 0xf) | ((v2 & 0xf) << 4)) as u8);
    }

    let mut item = image_item("1.2.3.1", 1, 0.);
    let numbers: [(_, f64); 5] = [
        (tags::ROWS, rows as f64),
        (tags::COLUMNS, columns as f64),
        (tags::BITS_ALLOCATED, 12.),
        (tags::BITS_STORED, 12.),
        (tags::HIGH_BIT, 11.),
    ];
    for (tag, value) in numbers {
        item.put_path_f64(&tag.into(), &[value]).unwrap();
    }
    item.put(
        tags::PIXEL_DATA,
        dcmstack_object::Value::new(
            dcmstack_core::VR::OB,
            dcmstack_core::PrimitiveValue::from(packed),
        ),
    );
    write(&path, &item);

    let volume = read_volume(&[&path], ReadOptions::new()).unwrap();
    assert_eq!(volume.info().bits_allocated(), 12);
    assert_eq!(volume.info().scalar_type(), ScalarType::U16);
    assert_eq!(volume.samples::<u16>().unwrap(), values);
}

#[test]
fn truncated_pixel_data_is_reported() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0.]);
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&files[0])
        .unwrap();
    let len = file.metadata().unwrap().len();
    file.set_len(len - 10).unwrap();
    drop(file);

    let mut reader = VolumeReader::new(ReadOptions::new());
    let err = reader.read_volume(&files).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);
    assert_eq!(reader.state(), ReaderState::Failed);
}

#[test]
fn abort_stops_reading() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0., 5.]);

    let mut reader = VolumeReader::new(ReadOptions::new());
    reader.abort_handle().store(true, Ordering::Relaxed);
    let err = reader.read_volume(&files).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
    assert_eq!(reader.state(), ReaderState::Failed);
}

#[test]
fn progress_reaches_completion() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0., 5., 10.]);

    let mut seen = Vec::new();
    {
        let mut reader = VolumeReader::new(ReadOptions::new());
        reader.on_progress(|fraction| seen.push(fraction));
        reader.read_volume(&files).unwrap();
        assert_eq!(reader.state(), ReaderState::Done);
    }
    assert_eq!(seen.len(), 3);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seen.last(), Some(&1.0));
}

#[test]
fn slices_are_read_in_ranges() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0., 5., 10.]);

    let mut reader = VolumeReader::new(ReadOptions::new());
    let info = reader.read_information(&files).unwrap();
    assert_eq!(reader.state(), ReaderState::GeometryResolved);

    let mut buffer = vec![0; info.slice_size()];
    reader.read_slices(&info, 1..2, &mut buffer).unwrap();
    assert_eq!(u16::from_ne_bytes([buffer[0], buffer[1]]), 200);

    let err = reader.read_slices(&info, 2..4, &mut buffer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn file_shrunk_after_reading_information_is_truncated() {
    let dir = TempDir::new().unwrap();
    let files = write_series(dir.path(), "1.2.3.1", &[0., 5.]);

    let mut reader = VolumeReader::new(ReadOptions::new());
    let info = reader.read_information(&files).unwrap();
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&files[1])
        .unwrap();
    let len = file.metadata().unwrap().len();
    file.set_len(len - 4).unwrap();
    drop(file);

    let mut buffer = vec![0; info.volume_size()];
    let err = reader
        .read_slices(&info, 0..info.slices(), &mut buffer)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);
    // what was read stays in the buffer
    assert_eq!(u16::from_ne_bytes([buffer[0], buffer[1]]), 100);
    let second = info.slice_size();
    assert_eq!(u16::from_ne_bytes([buffer[second], buffer[second + 1]]), 200);
}

#[test]
fn planar_color_is_interleaved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("planar.dcm");
    let mut item = image_item("1.2.3.1", 1, 0.);
    item.put_path_str(&tags::PHOTOMETRIC_INTERPRETATION.into(), "RGB")
        .unwrap();
    let numbers: [(_, f64); 5] = [
        (tags::SAMPLES_PER_PIXEL, 3.),
        (tags::PLANAR_CONFIGURATION, 1.),
        (tags::BITS_ALLOCATED, 8.),
        (tags::BITS_STORED, 8.),
        (tags::HIGH_BIT, 7.),
    ];
    for (tag, value) in numbers {
        item.put_path_f64(&tag.into(), &[value]).unwrap();
    }
    let pixels = (ROWS * COLUMNS) as u8;
    let planes: Vec<u8> = [0u8, 100, 200]
        .into_iter()
        .flat_map(|base| (0..pixels).map(move |p| base + p))
        .collect();
    item.put(
        tags::PIXEL_DATA,
        dcmstack_object::Value::new(
            dcmstack_core::VR::OB,
            dcmstack_core::PrimitiveValue::from(planes),
        ),
    );
    write(&path, &item);

    let volume = read_volume(&[&path], ReadOptions::new()).unwrap();
    assert_eq!(volume.info().scalar_type(), ScalarType::U8);
    assert_eq!(volume.info().components(), 3);
    let expected: Vec<u8> = (0..pixels).flat_map(|p| [p, 100 + p, 200 + p]).collect();
    assert_eq!(volume.data(), &expected[..]);
}

#[test]
fn big_endian_pixels_are_swapped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ge.dcm");
    let us = |value: usize| (value as u16).to_le_bytes().to_vec();
    let values: Vec<u16> = (0..(ROWS * COLUMNS) as u16).map(|i| 0x0102 + i * 0x0100).collect();
    let big_endian: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
    let elements = [
        implicit_element(0x0008, 0x0016, &padded(uids::CT_IMAGE_STORAGE, 0)),
        implicit_element(0x0020, 0x000E, &padded("1.2.3.1", 0)),
        implicit_element(0x0020, 0x0013, &padded("1", b' ')),
        implicit_element(0x0020, 0x0032, &padded("-10\\-20\\0", b' ')),
        implicit_element(0x0020, 0x0037, &padded("1\\0\\0\\0\\1\\0", b' ')),
        implicit_element(0x0028, 0x0002, &us(1)),
        implicit_element(0x0028, 0x0004, &padded("MONOCHROME2", b' ')),
        implicit_element(0x0028, 0x0010, &us(ROWS)),
        implicit_element(0x0028, 0x0011, &us(COLUMNS)),
        implicit_element(0x0028, 0x0100, &us(16)),
        implicit_element(0x0028, 0x0101, &us(16)),
        implicit_element(0x0028, 0x0102, &us(15)),
        implicit_element(0x0028, 0x0103, &us(0)),
        implicit_element(0x7FE0, 0x0010, &big_endian),
    ];
    write_encoded(&path, uids::GE_PRIVATE_IMPLICIT_VR_BIG_ENDIAN, &elements.concat());

    let volume = read_volume(&[&path], ReadOptions::new()).unwrap();
    assert_eq!(volume.info().dimensions(), [COLUMNS, ROWS, 1]);
    assert_eq!(volume.samples::<u16>().unwrap(), values);
}

#[test]
fn time_points_become_components() {
    let dir = TempDir::new().unwrap();
    let mut files = Vec::new();
    for (i, (z, trigger)) in [(0., 0.), (0., 40.), (2., 0.), (2., 40.)]
        .into_iter()
        .enumerate()
    {
        let path = dir.path().join(format!("cine_{}.dcm", i));
        let mut item = image_item("1.2.3.1", i as i64 + 1, z);
        item.put_path_f64(&tags::TRIGGER_TIME.into(), &[trigger])
            .unwrap();
        put_u16_pixels(&mut item, ramp(100 * (i as u16 + 1)));
        write(&path, &item);
        files.push(path);
    }

    let volume = read_volume(&files, ReadOptions::new()).unwrap();
    assert_eq!(volume.info().slices(), 4);
    assert_eq!(volume.info().components(), 1);
    assert_eq!(volume.info().time_points(), 2);

    let volume = read_volume(&files, ReadOptions::new().time_as_vector(true)).unwrap();
    let info = volume.info();
    assert_eq!(info.slices(), 2);
    assert_eq!(info.components(), 2);
    assert!((info.spacing()[2] - 2.).abs() < 1e-9);
    let samples = volume.samples::<u16>().unwrap();
    assert_eq!(&samples[..4], &[100, 200, 101, 201]);
    let slice = ROWS * COLUMNS * 2;
    assert_eq!(&samples[slice..slice + 2], &[300, 400]);
}

#[test]
fn stacks_with_their_own_orientation() {
    let dir = TempDir::new().unwrap();
    let mut files = Vec::new();
    let axial = [0., 5.].map(|z| ([-10., -20., z], [1., 0., 0., 0., 1., 0.], "1"));
    let sagittal = [10., 5., 0.].map(|x| ([x, -20., 0.], [0., 1., 0., 0., 0., -1.], "2"));
    for (i, (position, orientation, stack)) in axial.into_iter().chain(sagittal).enumerate() {
        let path = dir.path().join(format!("oriented_{}.dcm", i));
        let mut item = image_item("1.2.3.1", i as i64 + 1, 0.);
        item.put_path_f64(&tags::IMAGE_POSITION_PATIENT.into(), &position)
            .unwrap();
        item.put_path_f64(&tags::IMAGE_ORIENTATION_PATIENT.into(), &orientation)
            .unwrap();
        set_stack(&mut item, stack);
        put_u16_pixels(&mut item, ramp(100 * (i as u16 + 1)));
        write(&path, &item);
        files.push(path);
    }

    let volume = read_volume(&files, ReadOptions::new()).unwrap();
    assert_eq!(volume.info().slices(), 2);
    assert_eq!(volume.samples::<u16>().unwrap()[0], 100);

    let options = ReadOptions::new().desired_stack_id(Some("2".to_string()));
    let volume = read_volume(&files, options).unwrap();
    let info = volume.info();
    assert_eq!(info.slices(), 3);
    assert!((info.spacing()[2] - 5.).abs() < 1e-9);
    let samples = volume.samples::<u16>().unwrap();
    let slice = ROWS * COLUMNS;
    assert_eq!(
        [samples[0], samples[slice], samples[2 * slice]],
        [300, 400, 500]
    );
}

#[test]
fn rescale_is_taken_per_frame() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multiframe.dcm");
    let mut item = image_item("1.2.3.1", 1, 0.);
    item.remove(tags::IMAGE_POSITION_PATIENT);
    item.put_path_f64(&tags::NUMBER_OF_FRAMES.into(), &[2.])
        .unwrap();
    for frame in 0..2 {
        let per_frame = |sequence, tag| {
            dcmstack_object::TagPath::nested2(
                tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                frame,
                sequence,
                0,
                tag,
            )
        };
        let values: [(_, _, &[f64]); 3] = [
            (
                tags::PLANE_POSITION_SEQUENCE,
                tags::IMAGE_POSITION_PATIENT,
                &[-10., -20., frame as f64 * 5.],
            ),
            (
                tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE,
                tags::RESCALE_SLOPE,
                &[frame as f64 + 1.],
            ),
            (
                tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE,
                tags::RESCALE_INTERCEPT,
                &[0.],
            ),
        ];
        for (sequence, tag, value) in values {
            item.put_path_f64(&per_frame(sequence, tag), value).unwrap();
        }
    }
    let mut pixels = ramp(100);
    pixels.extend(ramp(200));
    put_u16_pixels(&mut item, pixels);
    write(&path, &item);

    let volume = read_volume(&[&path], ReadOptions::new()).unwrap();
    assert_eq!(volume.info().slices(), 2);
    assert!(volume.info().needs_rescale());
    assert_eq!(volume.info().rescale(), Rescale::new(2., 0.));
    let samples = volume.samples::<u16>().unwrap();
    // the first frame is at slope 1, the second already at slope 2
    assert_eq!(samples[0], 50);
    assert_eq!(samples[ROWS * COLUMNS], 200);
}
