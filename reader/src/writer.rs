//! Writing a volume back to files, one slice per file,
//! in Explicit VR Little Endian.

use crate::error::{
    BuildMetaSnafu, CreateDirectorySnafu, InvalidImageTypeSnafu, PutAttributeSnafu, Result,
    WriteFileSnafu,
};
use crate::options::MemoryRowOrder;
use crate::volume::{Sample, ScalarType, Volume};
use dcmstack_core::{PrimitiveValue, Tag, VR};
use dcmstack_dictionary_std::{tags, uids};
use dcmstack_object::{Item, Value};
use dcmstack_parser::{write_file, FileMetaTableBuilder};
use snafu::{ensure, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Options of a [`VolumeWriter`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
    /// The order of the rows of the volume in memory,
    /// or `None` to take it from the volume.
    pub row_order: Option<MemoryRowOrder>,
    /// The series description of the new series.
    pub series_description: Option<String>,
    /// The image type of the new images.
    pub image_type: String,
    /// The prefix of the file names.
    pub file_prefix: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            row_order: None,
            series_description: None,
            image_type: "DERIVED\\SECONDARY".to_string(),
            file_prefix: "IM".to_string(),
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_order(mut self, row_order: Option<MemoryRowOrder>) -> Self {
        self.row_order = row_order;
        self
    }

    pub fn series_description(mut self, description: impl Into<String>) -> Self {
        self.series_description = Some(description.into());
        self
    }

    /// Set the image type, such as `ORIGINAL\PRIMARY\AXIAL`.
    ///
    /// The first value must be `ORIGINAL` or `DERIVED`,
    /// the second `PRIMARY` or `SECONDARY`.
    pub fn image_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = image_type.into();
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }
}

fn validate_image_type(image_type: &str) -> Result<()> {
    let mut values = image_type.split('\\');
    let valid = matches!(values.next(), Some("ORIGINAL" | "DERIVED"))
        && matches!(values.next(), Some("PRIMARY" | "SECONDARY"));
    ensure!(
        valid,
        InvalidImageTypeSnafu {
            value: image_type
        }
    );
    Ok(())
}

/// Create a new UID under the `2.25` root from the current time.
pub fn generate_uid() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("2.25.{}", nanos * 100_000 + u128::from(count % 100_000))
}

fn typed<T: Sample>(bytes: &[u8]) -> Vec<T> {
    let mut out = vec![T::default(); bytes.len() / std::mem::size_of::<T>()];
    T::read_into(bytes, &mut out);
    out
}

fn pixel_value(scalar: ScalarType, bytes: &[u8]) -> PrimitiveValue {
    match scalar {
        ScalarType::U8 | ScalarType::I8 => PrimitiveValue::from(bytes.to_vec()),
        ScalarType::U16 => PrimitiveValue::from(typed::<u16>(bytes)),
        ScalarType::I16 => PrimitiveValue::from(typed::<i16>(bytes)),
        ScalarType::U32 => PrimitiveValue::from(typed::<u32>(bytes)),
        ScalarType::I32 => PrimitiveValue::from(typed::<i32>(bytes)),
        ScalarType::U64 => PrimitiveValue::from(typed::<u64>(bytes)),
        ScalarType::I64 => PrimitiveValue::from(typed::<i64>(bytes)),
        ScalarType::F32 => PrimitiveValue::from(typed::<f32>(bytes)),
        ScalarType::F64 => PrimitiveValue::from(typed::<f64>(bytes)),
    }
}

/// Writes a volume as a new series of single-frame files.
#[derive(Debug, Clone, Default)]
pub struct VolumeWriter {
    options: WriteOptions,
}

impl VolumeWriter {
    pub fn new(options: WriteOptions) -> Self {
        VolumeWriter { options }
    }

    /// Write one file per slice into `dir`, returning the file names.
    ///
    /// Patient and study attributes are taken from the source files,
    /// the series and its instances get new identifiers.
    pub fn write<P>(&self, volume: &Volume, dir: P) -> Result<Vec<PathBuf>>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        validate_image_type(&self.options.image_type)?;
        std::fs::create_dir_all(dir).context(CreateDirectorySnafu { dir })?;

        let info = volume.info();
        let properties = info.properties();
        let [columns, rows, slices] = info.dimensions();
        let [sx, sy, sz] = info.spacing();
        let components = info.components();
        let scalar = info.scalar_type();
        let bottom_up = self
            .options
            .row_order
            .unwrap_or(info.row_order())
            .is_bottom_up();
        let matrix = info.patient_matrix();
        let row_dir = matrix.column(0);
        let mut column_dir = matrix.column(1);
        if bottom_up {
            column_dir = column_dir.map(|c| -c);
        }

        let study_uid = properties
            .study_instance_uid
            .clone()
            .unwrap_or_else(generate_uid);
        let frame_of_reference = properties
            .frame_of_reference_uid
            .clone()
            .unwrap_or_else(generate_uid);
        let series_uid = generate_uid();
        let description = self
            .options
            .series_description
            .clone()
            .or_else(|| properties.series_description.clone());

        // attributes shared by all files
        let mut common = Item::new();
        let put_str = |item: &mut Item, tag: Tag, text: &str| {
            item.put_path_str(&tag.into(), text)
                .map(|_| ())
                .context(PutAttributeSnafu)
        };
        put_str(&mut common, tags::SOP_CLASS_UID, uids::SECONDARY_CAPTURE_IMAGE_STORAGE)?;
        put_str(&mut common, tags::STUDY_INSTANCE_UID, &study_uid)?;
        put_str(&mut common, tags::SERIES_INSTANCE_UID, &series_uid)?;
        put_str(&mut common, tags::FRAME_OF_REFERENCE_UID, &frame_of_reference)?;
        put_str(&mut common, tags::IMAGE_TYPE, &self.options.image_type)?;
        put_str(
            &mut common,
            tags::MODALITY,
            properties.modality.as_deref().unwrap_or("OT"),
        )?;
        let copied = [
            (tags::PATIENT_NAME, &properties.patient_name),
            (tags::PATIENT_ID, &properties.patient_id),
            (tags::PATIENT_BIRTH_DATE, &properties.patient_birth_date),
            (tags::PATIENT_SEX, &properties.patient_sex),
            (tags::STUDY_ID, &properties.study_id),
            (tags::STUDY_DESCRIPTION, &properties.study_description),
            (tags::STUDY_DATE, &properties.study_date),
            (tags::STUDY_TIME, &properties.study_time),
            (tags::ACCESSION_NUMBER, &properties.accession_number),
            (tags::SERIES_DESCRIPTION, &description),
        ];
        for (tag, value) in copied {
            if let Some(value) = value {
                put_str(&mut common, tag, value)?;
            }
        }

        let put_f64 = |item: &mut Item, tag: Tag, values: &[f64]| {
            item.put_path_f64(&tag.into(), values)
                .map(|_| ())
                .context(PutAttributeSnafu)
        };
        let orientation = [
            row_dir[0],
            row_dir[1],
            row_dir[2],
            column_dir[0],
            column_dir[1],
            column_dir[2],
        ];
        put_f64(&mut common, tags::IMAGE_ORIENTATION_PATIENT, &orientation)?;
        put_f64(&mut common, tags::PIXEL_SPACING, &[sy, sx])?;
        put_f64(&mut common, tags::SLICE_THICKNESS, &[sz])?;
        put_f64(&mut common, tags::SPACING_BETWEEN_SLICES, &[sz])?;
        put_f64(&mut common, tags::ROWS, &[rows as f64])?;
        put_f64(&mut common, tags::COLUMNS, &[columns as f64])?;
        put_f64(&mut common, tags::SAMPLES_PER_PIXEL, &[components as f64])?;
        if components > 1 {
            put_f64(&mut common, tags::PLANAR_CONFIGURATION, &[0.])?;
        }
        put_str(
            &mut common,
            tags::PHOTOMETRIC_INTERPRETATION,
            if components == 3 { "RGB" } else { "MONOCHROME2" },
        )?;
        let bits = (scalar.size() * 8) as f64;
        put_f64(&mut common, tags::BITS_ALLOCATED, &[bits])?;
        put_f64(&mut common, tags::BITS_STORED, &[bits])?;
        put_f64(&mut common, tags::HIGH_BIT, &[bits - 1.])?;
        let signed_integers = scalar.is_signed() && !scalar.is_float();
        put_f64(
            &mut common,
            tags::PIXEL_REPRESENTATION,
            &[if signed_integers { 1. } else { 0. }],
        )?;
        let rescale = info.rescale();
        put_f64(&mut common, tags::RESCALE_INTERCEPT, &[rescale.intercept])?;
        put_f64(&mut common, tags::RESCALE_SLOPE, &[rescale.slope])?;

        let (pixel_tag, pixel_vr) = scalar.pixel_data_attribute();
        let row_size = columns * components * scalar.size();
        let first_row = if bottom_up { (rows.max(1) - 1) as f64 * sy } else { 0. };

        let mut written = Vec::with_capacity(slices);
        for slice in 0..slices {
            let mut item = common.clone();
            let instance_uid = generate_uid();
            put_str(&mut item, tags::SOP_INSTANCE_UID, &instance_uid)?;
            put_f64(&mut item, tags::INSTANCE_NUMBER, &[(slice + 1) as f64])?;
            let position = matrix.apply([0., first_row, slice as f64 * sz]);
            put_f64(&mut item, tags::IMAGE_POSITION_PATIENT, &position)?;

            let data = volume.slice_data(slice).unwrap_or_default();
            let data: Vec<u8> = if bottom_up {
                data.chunks_exact(row_size.max(1)).rev().flatten().copied().collect()
            } else {
                data.to_vec()
            };
            item.put(pixel_tag, Value::new(pixel_vr, pixel_value(scalar, &data)));

            let meta = FileMetaTableBuilder::new()
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(instance_uid)
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .build()
                .context(BuildMetaSnafu)?;
            let filename = dir.join(format!("{}{:04}.dcm", self.options.file_prefix, slice + 1));
            debug!("Writing {}", filename.display());
            write_file(&filename, &meta, &item).context(WriteFileSnafu {
                filename: &filename,
            })?;
            written.push(filename);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DERIVED\\SECONDARY", true)]
    #[case("ORIGINAL\\PRIMARY\\AXIAL", true)]
    #[case("ORIGINAL", false)]
    #[case("DERIVED\\OTHER", false)]
    #[case("", false)]
    fn image_types(#[case] image_type: &str, #[case] valid: bool) {
        assert_eq!(validate_image_type(image_type).is_ok(), valid);
    }

    #[test]
    fn uids_are_unique() {
        let (a, b) = (generate_uid(), generate_uid());
        assert_ne!(a, b);
        assert!(a.starts_with("2.25."));
        assert!(a.len() <= 64);
    }
}
