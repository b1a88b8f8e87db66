//! A summary of the descriptive attributes of a volume.

use crate::transform::WindowLevel;
use crate::volume::VolumeInfo;
use dcmstack_core::Tag;
use dcmstack_dictionary_std::tags;
use dcmstack_object::MetaData;

/// A window level preset found in the files,
/// with its explanation if any.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPreset {
    pub window: WindowLevel,
    pub explanation: Option<String>,
}

/// Patient, study, series and equipment information of a volume,
/// taken from the file of its first slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageProperties {
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub patient_birth_date: Option<String>,
    pub patient_sex: Option<String>,
    pub study_instance_uid: Option<String>,
    pub study_id: Option<String>,
    pub study_description: Option<String>,
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    pub accession_number: Option<String>,
    pub series_instance_uid: Option<String>,
    pub series_number: Option<String>,
    pub series_description: Option<String>,
    pub modality: Option<String>,
    pub image_type: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_model_name: Option<String>,
    pub institution_name: Option<String>,
    pub station_name: Option<String>,
    pub protocol_name: Option<String>,
    pub acquisition_date: Option<String>,
    pub acquisition_time: Option<String>,
    pub convolution_kernel: Option<String>,
    pub frame_of_reference_uid: Option<String>,
    /// Window level presets, in the order of the files.
    pub windows: Vec<WindowPreset>,
    /// The direction cosines of the rows and columns in memory.
    pub direction_cosines: [f64; 6],
}

impl ImageProperties {
    pub(crate) fn from_info(info: &VolumeInfo) -> Self {
        let mut properties = ImageProperties::from_meta(info.meta());
        properties.direction_cosines = info.patient_matrix().direction_cosines();
        properties
    }

    /// Collect the properties of the first slice of the index arrays.
    pub fn from_meta(meta: &MetaData) -> Self {
        let Some((file, frame)) = meta.file_and_frame(0, 0) else {
            return ImageProperties::default();
        };
        let text = |tag: Tag| {
            meta.item(file)
                .and_then(|item| item.get_str(tag))
                .filter(|s| !s.is_empty())
        };
        let frame_text = |tag: Tag| {
            meta.frame_attribute(file, frame, tag)
                .map(|v| v.to_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let centers = meta
            .frame_attribute(file, frame, tags::WINDOW_CENTER)
            .map(|v| v.to_multi_f64())
            .unwrap_or_default();
        let widths = meta
            .frame_attribute(file, frame, tags::WINDOW_WIDTH)
            .map(|v| v.to_multi_f64())
            .unwrap_or_default();
        let explanations = meta.frame_attribute(file, frame, tags::WINDOW_CENTER_WIDTH_EXPLANATION);
        let windows = centers
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (&center, &width))| WindowPreset {
                window: WindowLevel { width, center },
                explanation: explanations
                    .and_then(|v| v.string(i))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            })
            .collect();

        ImageProperties {
            patient_name: text(tags::PATIENT_NAME),
            patient_id: text(tags::PATIENT_ID),
            patient_birth_date: text(tags::PATIENT_BIRTH_DATE),
            patient_sex: text(tags::PATIENT_SEX),
            study_instance_uid: text(tags::STUDY_INSTANCE_UID),
            study_id: text(tags::STUDY_ID),
            study_description: text(tags::STUDY_DESCRIPTION),
            study_date: text(tags::STUDY_DATE),
            study_time: text(tags::STUDY_TIME),
            accession_number: text(tags::ACCESSION_NUMBER),
            series_instance_uid: text(tags::SERIES_INSTANCE_UID),
            series_number: text(tags::SERIES_NUMBER),
            series_description: text(tags::SERIES_DESCRIPTION),
            modality: text(tags::MODALITY),
            image_type: frame_text(tags::IMAGE_TYPE),
            manufacturer: text(tags::MANUFACTURER),
            manufacturer_model_name: text(tags::MANUFACTURER_MODEL_NAME),
            institution_name: text(tags::INSTITUTION_NAME),
            station_name: text(tags::STATION_NAME),
            protocol_name: text(tags::PROTOCOL_NAME),
            acquisition_date: text(tags::ACQUISITION_DATE),
            acquisition_time: frame_text(tags::ACQUISITION_TIME),
            convolution_kernel: text(tags::CONVOLUTION_KERNEL),
            frame_of_reference_uid: text(tags::FRAME_OF_REFERENCE_UID),
            windows,
            direction_cosines: [1., 0., 0., 0., 1., 0.],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmstack_object::{IndexArray, Item};

    #[test]
    fn window_presets_with_explanations() {
        let mut item = Item::new();
        item.put_path_str(&tags::PATIENT_NAME.into(), "Doe^Jane").unwrap();
        item.put_path_str(&tags::MODALITY.into(), "CT").unwrap();
        item.put_path_f64(&tags::WINDOW_CENTER.into(), &[40., 300.])
            .unwrap();
        item.put_path_f64(&tags::WINDOW_WIDTH.into(), &[400., 1500.])
            .unwrap();
        item.put_path_str(&tags::WINDOW_CENTER_WIDTH_EXPLANATION.into(), "SOFT\\BONE")
            .unwrap();
        let mut meta = MetaData::new(vec![item]);
        meta.set_index_arrays(
            IndexArray::from_values(vec![0], 1),
            IndexArray::from_values(vec![0], 1),
        );

        let properties = ImageProperties::from_meta(&meta);
        assert_eq!(properties.patient_name.as_deref(), Some("Doe^Jane"));
        assert_eq!(properties.modality.as_deref(), Some("CT"));
        assert_eq!(properties.series_description, None);
        assert_eq!(properties.windows.len(), 2);
        assert_eq!(properties.windows[1].window.width, 1500.);
        assert_eq!(properties.windows[1].explanation.as_deref(), Some("BONE"));
    }
}
