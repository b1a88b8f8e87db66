//! Attribute tag constants and the table of standard attributes
//! which the engine knows how to interpret.
#![allow(missing_docs)]

use dcmstack_core::dictionary::{DictEntryRef, TagRange, TagRange::*, VirtualVr, VM};
use dcmstack_core::header::{Tag, VR};

type E = DictEntryRef<'static>;

const fn e(tag: TagRange, alias: &'static str, vr: VR, vm: VM) -> E {
    E {
        tag,
        alias,
        vr: VirtualVr::Exact(vr),
        vm,
        retired: false,
    }
}

const fn v(tag: TagRange, alias: &'static str, vr: VirtualVr, vm: VM) -> E {
    E {
        tag,
        alias,
        vr,
        vm,
        retired: false,
    }
}

const fn r(tag: TagRange, alias: &'static str, vr: VR, vm: VM) -> E {
    E {
        tag,
        alias,
        vr: VirtualVr::Exact(vr),
        vm,
        retired: true,
    }
}

const M1: VM = VM::ONE;
const M2: VM = VM::exactly(2);
const M3: VM = VM::exactly(3);
const M6: VM = VM::exactly(6);
const M1N: VM = VM::unbounded(1, 1);
const M2N: VM = VM::unbounded(2, 1);

// group 0x0002: file meta information
pub const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
pub const FILE_META_INFORMATION_VERSION: Tag = Tag(0x0002, 0x0001);
pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);
pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag(0x0002, 0x0013);
pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0016);

// group 0x0008: identification
pub const SPECIFIC_CHARACTER_SET: Tag = Tag(0x0008, 0x0005);
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const INSTANCE_CREATION_DATE: Tag = Tag(0x0008, 0x0012);
pub const INSTANCE_CREATION_TIME: Tag = Tag(0x0008, 0x0013);
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
pub const ACQUISITION_DATE_TIME: Tag = Tag(0x0008, 0x002A);
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);
pub const STATION_NAME: Tag = Tag(0x0008, 0x1010);
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const SERIES_DESCRIPTION_CODE_SEQUENCE: Tag = Tag(0x0008, 0x103F);
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
pub const DERIVATION_DESCRIPTION: Tag = Tag(0x0008, 0x2111);

// group 0x0010: patient
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
pub const PATIENT_AGE: Tag = Tag(0x0010, 0x1010);

// group 0x0018: acquisition
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const KVP: Tag = Tag(0x0018, 0x0060);
pub const REPETITION_TIME: Tag = Tag(0x0018, 0x0080);
pub const ECHO_TIME: Tag = Tag(0x0018, 0x0081);
pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
pub const ECHO_TRAIN_LENGTH: Tag = Tag(0x0018, 0x0091);
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);
pub const TRIGGER_TIME: Tag = Tag(0x0018, 0x1060);
pub const GANTRY_DETECTOR_TILT: Tag = Tag(0x0018, 0x1120);
pub const EXPOSURE_TIME: Tag = Tag(0x0018, 0x1150);
pub const X_RAY_TUBE_CURRENT: Tag = Tag(0x0018, 0x1151);
pub const EXPOSURE: Tag = Tag(0x0018, 0x1152);
pub const CONVOLUTION_KERNEL: Tag = Tag(0x0018, 0x1210);
pub const PATIENT_POSITION: Tag = Tag(0x0018, 0x5100);

// group 0x0020: relationship and geometry
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const ACQUISITION_NUMBER: Tag = Tag(0x0020, 0x0012);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);
pub const IMAGE_POSITION: Tag = Tag(0x0020, 0x0030);
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const IMAGE_ORIENTATION: Tag = Tag(0x0020, 0x0035);
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
pub const FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0052);
pub const TEMPORAL_POSITION_IDENTIFIER: Tag = Tag(0x0020, 0x0100);
pub const NUMBER_OF_TEMPORAL_POSITIONS: Tag = Tag(0x0020, 0x0105);
pub const TEMPORAL_RESOLUTION: Tag = Tag(0x0020, 0x0110);
pub const IMAGES_IN_ACQUISITION: Tag = Tag(0x0020, 0x1002);
pub const POSITION_REFERENCE_INDICATOR: Tag = Tag(0x0020, 0x1040);
pub const SLICE_LOCATION: Tag = Tag(0x0020, 0x1041);
pub const SOURCE_IMAGE_IDS: Tag = Tag(0x0020, 0x3100);
pub const STACK_ID: Tag = Tag(0x0020, 0x9056);
pub const IN_STACK_POSITION_NUMBER: Tag = Tag(0x0020, 0x9057);
pub const FRAME_CONTENT_SEQUENCE: Tag = Tag(0x0020, 0x9111);
pub const PLANE_POSITION_SEQUENCE: Tag = Tag(0x0020, 0x9113);
pub const PLANE_ORIENTATION_SEQUENCE: Tag = Tag(0x0020, 0x9116);
pub const TEMPORAL_POSITION_INDEX: Tag = Tag(0x0020, 0x9128);
pub const DIMENSION_INDEX_VALUES: Tag = Tag(0x0020, 0x9157);

// group 0x0028: image pixel description
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const PIXEL_ASPECT_RATIO: Tag = Tag(0x0028, 0x0034);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const SMALLEST_IMAGE_PIXEL_VALUE: Tag = Tag(0x0028, 0x0106);
pub const LARGEST_IMAGE_PIXEL_VALUE: Tag = Tag(0x0028, 0x0107);
pub const PIXEL_PADDING_VALUE: Tag = Tag(0x0028, 0x0120);
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
pub const RESCALE_TYPE: Tag = Tag(0x0028, 0x1054);
pub const WINDOW_CENTER_WIDTH_EXPLANATION: Tag = Tag(0x0028, 0x1055);
pub const RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR: Tag = Tag(0x0028, 0x1101);
pub const RED_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1201);
pub const LUT_DESCRIPTOR: Tag = Tag(0x0028, 0x3002);
pub const LUT_DATA: Tag = Tag(0x0028, 0x3006);
pub const PIXEL_MEASURES_SEQUENCE: Tag = Tag(0x0028, 0x9110);
pub const PIXEL_VALUE_TRANSFORMATION_SEQUENCE: Tag = Tag(0x0028, 0x9145);

// functional groups
pub const SHARED_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9229);
pub const PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9230);

// repeating overlay groups
pub const OVERLAY_ROWS: Tag = Tag(0x6000, 0x0010);
pub const OVERLAY_DATA: Tag = Tag(0x6000, 0x3000);

// pixel data
pub const FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0008);
pub const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0009);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// delimitation
pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
pub const ITEM_DELIMITATION_ITEM: Tag = Tag(0xFFFE, 0xE00D);
pub const SEQUENCE_DELIMITATION_ITEM: Tag = Tag(0xFFFE, 0xE0DD);

/// The table of known public attributes.
#[rustfmt::skip]
pub(crate) const ENTRIES: &[E] = &[
    e(Single(FILE_META_INFORMATION_GROUP_LENGTH), "FileMetaInformationGroupLength", VR::UL, M1),
    e(Single(FILE_META_INFORMATION_VERSION), "FileMetaInformationVersion", VR::OB, M1),
    e(Single(MEDIA_STORAGE_SOP_CLASS_UID), "MediaStorageSOPClassUID", VR::UI, M1),
    e(Single(MEDIA_STORAGE_SOP_INSTANCE_UID), "MediaStorageSOPInstanceUID", VR::UI, M1),
    e(Single(TRANSFER_SYNTAX_UID), "TransferSyntaxUID", VR::UI, M1),
    e(Single(IMPLEMENTATION_CLASS_UID), "ImplementationClassUID", VR::UI, M1),
    e(Single(IMPLEMENTATION_VERSION_NAME), "ImplementationVersionName", VR::SH, M1),
    e(Single(SOURCE_APPLICATION_ENTITY_TITLE), "SourceApplicationEntityTitle", VR::AE, M1),
    e(Single(SPECIFIC_CHARACTER_SET), "SpecificCharacterSet", VR::CS, M1N),
    e(Single(IMAGE_TYPE), "ImageType", VR::CS, M2N),
    e(Single(INSTANCE_CREATION_DATE), "InstanceCreationDate", VR::DA, M1),
    e(Single(INSTANCE_CREATION_TIME), "InstanceCreationTime", VR::TM, M1),
    e(Single(SOP_CLASS_UID), "SOPClassUID", VR::UI, M1),
    e(Single(SOP_INSTANCE_UID), "SOPInstanceUID", VR::UI, M1),
    e(Single(STUDY_DATE), "StudyDate", VR::DA, M1),
    e(Single(SERIES_DATE), "SeriesDate", VR::DA, M1),
    e(Single(ACQUISITION_DATE), "AcquisitionDate", VR::DA, M1),
    e(Single(CONTENT_DATE), "ContentDate", VR::DA, M1),
    e(Single(ACQUISITION_DATE_TIME), "AcquisitionDateTime", VR::DT, M1),
    e(Single(STUDY_TIME), "StudyTime", VR::TM, M1),
    e(Single(SERIES_TIME), "SeriesTime", VR::TM, M1),
    e(Single(ACQUISITION_TIME), "AcquisitionTime", VR::TM, M1),
    e(Single(CONTENT_TIME), "ContentTime", VR::TM, M1),
    e(Single(ACCESSION_NUMBER), "AccessionNumber", VR::SH, M1),
    e(Single(MODALITY), "Modality", VR::CS, M1),
    e(Single(MANUFACTURER), "Manufacturer", VR::LO, M1),
    e(Single(INSTITUTION_NAME), "InstitutionName", VR::LO, M1),
    e(Single(REFERRING_PHYSICIAN_NAME), "ReferringPhysicianName", VR::PN, M1),
    e(Single(STATION_NAME), "StationName", VR::SH, M1),
    e(Single(STUDY_DESCRIPTION), "StudyDescription", VR::LO, M1),
    e(Single(SERIES_DESCRIPTION), "SeriesDescription", VR::LO, M1),
    e(Single(SERIES_DESCRIPTION_CODE_SEQUENCE), "SeriesDescriptionCodeSequence", VR::SQ, M1),
    e(Single(MANUFACTURER_MODEL_NAME), "ManufacturerModelName", VR::LO, M1),
    e(Single(DERIVATION_DESCRIPTION), "DerivationDescription", VR::ST, M1),
    e(Single(PATIENT_NAME), "PatientName", VR::PN, M1),
    e(Single(PATIENT_ID), "PatientID", VR::LO, M1),
    e(Single(PATIENT_BIRTH_DATE), "PatientBirthDate", VR::DA, M1),
    e(Single(PATIENT_SEX), "PatientSex", VR::CS, M1),
    e(Single(PATIENT_AGE), "PatientAge", VR::AS, M1),
    e(Single(SLICE_THICKNESS), "SliceThickness", VR::DS, M1),
    e(Single(KVP), "KVP", VR::DS, M1),
    e(Single(REPETITION_TIME), "RepetitionTime", VR::DS, M1),
    e(Single(ECHO_TIME), "EchoTime", VR::DS, M1),
    e(Single(SPACING_BETWEEN_SLICES), "SpacingBetweenSlices", VR::DS, M1),
    e(Single(ECHO_TRAIN_LENGTH), "EchoTrainLength", VR::IS, M1),
    e(Single(PROTOCOL_NAME), "ProtocolName", VR::LO, M1),
    e(Single(TRIGGER_TIME), "TriggerTime", VR::DS, M1),
    e(Single(GANTRY_DETECTOR_TILT), "GantryDetectorTilt", VR::DS, M1),
    e(Single(EXPOSURE_TIME), "ExposureTime", VR::IS, M1),
    e(Single(X_RAY_TUBE_CURRENT), "XRayTubeCurrent", VR::IS, M1),
    e(Single(EXPOSURE), "Exposure", VR::IS, M1),
    e(Single(CONVOLUTION_KERNEL), "ConvolutionKernel", VR::SH, M1N),
    e(Single(PATIENT_POSITION), "PatientPosition", VR::CS, M1),
    e(Single(STUDY_INSTANCE_UID), "StudyInstanceUID", VR::UI, M1),
    e(Single(SERIES_INSTANCE_UID), "SeriesInstanceUID", VR::UI, M1),
    e(Single(STUDY_ID), "StudyID", VR::SH, M1),
    e(Single(SERIES_NUMBER), "SeriesNumber", VR::IS, M1),
    e(Single(ACQUISITION_NUMBER), "AcquisitionNumber", VR::IS, M1),
    e(Single(INSTANCE_NUMBER), "InstanceNumber", VR::IS, M1),
    r(Single(IMAGE_POSITION), "ImagePosition", VR::DS, M3),
    e(Single(IMAGE_POSITION_PATIENT), "ImagePositionPatient", VR::DS, M3),
    r(Single(IMAGE_ORIENTATION), "ImageOrientation", VR::DS, M6),
    e(Single(IMAGE_ORIENTATION_PATIENT), "ImageOrientationPatient", VR::DS, M6),
    e(Single(FRAME_OF_REFERENCE_UID), "FrameOfReferenceUID", VR::UI, M1),
    e(Single(TEMPORAL_POSITION_IDENTIFIER), "TemporalPositionIdentifier", VR::IS, M1),
    e(Single(NUMBER_OF_TEMPORAL_POSITIONS), "NumberOfTemporalPositions", VR::IS, M1),
    e(Single(TEMPORAL_RESOLUTION), "TemporalResolution", VR::DS, M1),
    e(Single(IMAGES_IN_ACQUISITION), "ImagesInAcquisition", VR::IS, M1),
    e(Single(POSITION_REFERENCE_INDICATOR), "PositionReferenceIndicator", VR::LO, M1),
    e(Single(SLICE_LOCATION), "SliceLocation", VR::DS, M1),
    r(Element100(SOURCE_IMAGE_IDS), "SourceImageIDs", VR::CS, M1N),
    e(Single(STACK_ID), "StackID", VR::SH, M1),
    e(Single(IN_STACK_POSITION_NUMBER), "InStackPositionNumber", VR::UL, M1),
    e(Single(FRAME_CONTENT_SEQUENCE), "FrameContentSequence", VR::SQ, M1),
    e(Single(PLANE_POSITION_SEQUENCE), "PlanePositionSequence", VR::SQ, M1),
    e(Single(PLANE_ORIENTATION_SEQUENCE), "PlaneOrientationSequence", VR::SQ, M1),
    e(Single(TEMPORAL_POSITION_INDEX), "TemporalPositionIndex", VR::UL, M1),
    e(Single(DIMENSION_INDEX_VALUES), "DimensionIndexValues", VR::UL, M1N),
    e(Single(SAMPLES_PER_PIXEL), "SamplesPerPixel", VR::US, M1),
    e(Single(PHOTOMETRIC_INTERPRETATION), "PhotometricInterpretation", VR::CS, M1),
    e(Single(PLANAR_CONFIGURATION), "PlanarConfiguration", VR::US, M1),
    e(Single(NUMBER_OF_FRAMES), "NumberOfFrames", VR::IS, M1),
    e(Single(ROWS), "Rows", VR::US, M1),
    e(Single(COLUMNS), "Columns", VR::US, M1),
    e(Single(PIXEL_SPACING), "PixelSpacing", VR::DS, M2),
    e(Single(PIXEL_ASPECT_RATIO), "PixelAspectRatio", VR::IS, M2),
    e(Single(BITS_ALLOCATED), "BitsAllocated", VR::US, M1),
    e(Single(BITS_STORED), "BitsStored", VR::US, M1),
    e(Single(HIGH_BIT), "HighBit", VR::US, M1),
    e(Single(PIXEL_REPRESENTATION), "PixelRepresentation", VR::US, M1),
    v(Single(SMALLEST_IMAGE_PIXEL_VALUE), "SmallestImagePixelValue", VirtualVr::Xs, M1),
    v(Single(LARGEST_IMAGE_PIXEL_VALUE), "LargestImagePixelValue", VirtualVr::Xs, M1),
    v(Single(PIXEL_PADDING_VALUE), "PixelPaddingValue", VirtualVr::Xs, M1),
    e(Single(WINDOW_CENTER), "WindowCenter", VR::DS, M1N),
    e(Single(WINDOW_WIDTH), "WindowWidth", VR::DS, M1N),
    e(Single(RESCALE_INTERCEPT), "RescaleIntercept", VR::DS, M1),
    e(Single(RESCALE_SLOPE), "RescaleSlope", VR::DS, M1),
    e(Single(RESCALE_TYPE), "RescaleType", VR::LO, M1),
    e(Single(WINDOW_CENTER_WIDTH_EXPLANATION), "WindowCenterWidthExplanation", VR::LO, M1N),
    v(Single(RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR), "RedPaletteColorLookupTableDescriptor", VirtualVr::Xs, M3),
    e(Single(RED_PALETTE_COLOR_LOOKUP_TABLE_DATA), "RedPaletteColorLookupTableData", VR::OW, M1),
    v(Single(LUT_DESCRIPTOR), "LUTDescriptor", VirtualVr::Xs, M3),
    v(Single(LUT_DATA), "LUTData", VirtualVr::Xo, M1N),
    e(Single(PIXEL_MEASURES_SEQUENCE), "PixelMeasuresSequence", VR::SQ, M1),
    e(Single(PIXEL_VALUE_TRANSFORMATION_SEQUENCE), "PixelValueTransformationSequence", VR::SQ, M1),
    e(Single(SHARED_FUNCTIONAL_GROUPS_SEQUENCE), "SharedFunctionalGroupsSequence", VR::SQ, M1),
    e(Single(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE), "PerFrameFunctionalGroupsSequence", VR::SQ, M1),
    e(Group100(OVERLAY_ROWS), "OverlayRows", VR::US, M1),
    v(Group100(OVERLAY_DATA), "OverlayData", VirtualVr::Ox, M1),
    e(Single(FLOAT_PIXEL_DATA), "FloatPixelData", VR::OF, M1),
    e(Single(DOUBLE_FLOAT_PIXEL_DATA), "DoubleFloatPixelData", VR::OD, M1),
    v(Single(PIXEL_DATA), "PixelData", VirtualVr::Px, M1),
    e(Single(ITEM), "Item", VR::UN, M1),
    e(Single(ITEM_DELIMITATION_ITEM), "ItemDelimitationItem", VR::UN, M1),
    e(Single(SEQUENCE_DELIMITATION_ITEM), "SequenceDelimitationItem", VR::UN, M1),
];

/// The table of known private attributes, keyed by private creator.
///
/// The element number holds only the offset within the private block
/// (the two rightmost hexadecimal digits).
#[rustfmt::skip]
pub(crate) const PRIVATE_ENTRIES: &[(&str, E)] = &[
    ("SIEMENS CSA HEADER", e(Single(Tag(0x0029, 0x0008)), "CSAImageHeaderType", VR::CS, M1)),
    ("SIEMENS CSA HEADER", e(Single(Tag(0x0029, 0x0009)), "CSAImageHeaderVersion", VR::LO, M1)),
    ("SIEMENS CSA HEADER", e(Single(Tag(0x0029, 0x0010)), "CSAImageHeaderInfo", VR::OB, M1)),
    ("SIEMENS CSA HEADER", e(Single(Tag(0x0029, 0x0018)), "CSASeriesHeaderType", VR::CS, M1)),
    ("SIEMENS CSA HEADER", e(Single(Tag(0x0029, 0x0019)), "CSASeriesHeaderVersion", VR::LO, M1)),
    ("SIEMENS CSA HEADER", e(Single(Tag(0x0029, 0x0020)), "CSASeriesHeaderInfo", VR::OB, M1)),
    ("SIEMENS MR HEADER", e(Single(Tag(0x0019, 0x000A)), "NumberOfImagesInMosaic", VR::US, M1)),
    ("SIEMENS MR HEADER", e(Single(Tag(0x0019, 0x000B)), "SliceMeasurementDuration", VR::DS, M1)),
    ("SIEMENS MR HEADER", e(Single(Tag(0x0019, 0x000C)), "BValue", VR::IS, M1)),
    ("SIEMENS MR HEADER", e(Single(Tag(0x0019, 0x000D)), "DiffusionDirectionality", VR::CS, M1)),
    ("SIEMENS MR HEADER", e(Single(Tag(0x0019, 0x000E)), "DiffusionGradientDirection", VR::FD, M3)),
    ("SIEMENS MR HEADER", e(Single(Tag(0x0019, 0x0027)), "BMatrix", VR::FD, M6)),
    ("GEMS_ACQU_01", e(Single(Tag(0x0019, 0x009C)), "PulseSequenceName", VR::LO, M1)),
    ("GEMS_ACQU_01", e(Single(Tag(0x0019, 0x00BB)), "UserData0", VR::DS, M1)),
];
