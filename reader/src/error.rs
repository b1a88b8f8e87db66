//! Errors of the volume reader and their classification.

use dcmstack_core::Tag;
use dcmstack_transfer_syntax_registry::CodecError;
use snafu::{Backtrace, Snafu};
use std::path::PathBuf;

/// The broad category of a reader error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A file could not be opened or read.
    Io,
    /// The files are not valid or consistent image files.
    Format,
    /// The pixel data of a file ended early.
    Truncated,
    /// Compressed pixel data could not be decoded.
    Codec,
    /// Reading was aborted on request.
    Aborted,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("No image files were provided"))]
    NoFiles { backtrace: Backtrace },

    #[snafu(display("File not found: {}", filename.display()))]
    FileNotFound {
        filename: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display("Named file is a directory: {}", filename.display()))]
    IsDirectory {
        filename: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display("Not an image file: {}", filename.display()))]
    NotAnImage {
        filename: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not list the files of {}", dir.display()))]
    ScanDirectory {
        dir: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("No series holds the file {}", filename.display()))]
    SeedNotInSeries {
        filename: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not read the attributes of a file"))]
    ParseFile {
        #[snafu(backtrace)]
        source: dcmstack_parser::file::Error,
    },

    #[snafu(display("No pixel data in {}", filename.display()))]
    MissingPixelData {
        filename: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display("Critical failure in file sorting: {}", message))]
    SortingFailure {
        message: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "File index {} is out of range for the {} files of the series starting with {}",
        index,
        files,
        first_file.display()
    ))]
    FileIndexOutOfRange {
        index: usize,
        files: usize,
        first_file: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Frame index {} is out of range for {}, which has {} frames",
        index,
        filename.display(),
        frames
    ))]
    FrameIndexOutOfRange {
        filename: PathBuf,
        index: usize,
        frames: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("File {} is not part of the volume", filename.display()))]
    UnreferencedFile {
        filename: PathBuf,
        backtrace: Backtrace,
    },

    #[snafu(display("Missing pixel info for {} \"{}\" in {}", tag, name, filename.display()))]
    MissingAttribute {
        filename: PathBuf,
        tag: Tag,
        name: String,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Inconsistent pixel info {} (expected {}) for {} \"{}\" in {}",
        value,
        expected,
        tag,
        name,
        filename.display()
    ))]
    InconsistentAttribute {
        filename: PathBuf,
        tag: Tag,
        name: String,
        value: i64,
        expected: i64,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Illegal value {} for {} \"{}\" in {}",
        value,
        tag,
        name,
        filename.display()
    ))]
    IllegalValue {
        filename: PathBuf,
        tag: Tag,
        name: String,
        value: i64,
        backtrace: Backtrace,
    },

    #[snafu(display("Slices {}..{} are out of range for {} slices", start, end, slices))]
    SliceRange {
        start: usize,
        end: usize,
        slices: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Output buffer has {} bytes, {} are needed", actual, required))]
    BufferSize {
        actual: usize,
        required: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not open {}", filename.display()))]
    OpenFile {
        filename: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("Could not read the pixel data of {}", filename.display()))]
    ReadPixelData {
        filename: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("File {} is truncated, {} bytes are missing", filename.display(), missing))]
    Truncated {
        filename: PathBuf,
        missing: u64,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "No codec for transfer syntax {} of {}",
        transfer_syntax,
        filename.display()
    ))]
    MissingCodec {
        filename: PathBuf,
        transfer_syntax: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not decode frame {} of {}", frame, filename.display()))]
    DecodeFrame {
        filename: PathBuf,
        frame: usize,
        #[snafu(backtrace)]
        source: CodecError,
    },

    #[snafu(display(
        "Cannot split {} fragments of {} into {} frames",
        fragments,
        filename.display(),
        frames
    ))]
    FragmentLayout {
        filename: PathBuf,
        fragments: usize,
        frames: usize,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Frame {} of {} decoded to {} bytes, expected {}",
        frame,
        filename.display(),
        actual,
        expected
    ))]
    DecodedSize {
        filename: PathBuf,
        frame: usize,
        actual: usize,
        expected: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Reading was aborted"))]
    Aborted { backtrace: Backtrace },

    #[snafu(display("Volume holds {:?} samples, not {:?}", actual, requested))]
    ScalarTypeMismatch {
        requested: crate::volume::ScalarType,
        actual: crate::volume::ScalarType,
        backtrace: Backtrace,
    },

    #[snafu(display("Invalid image type {:?}", value))]
    InvalidImageType { value: String, backtrace: Backtrace },

    #[snafu(display("Could not create the directory {}", dir.display()))]
    CreateDirectory {
        dir: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("Could not set an attribute of the output files"))]
    PutAttribute {
        #[snafu(backtrace)]
        source: dcmstack_object::Error,
    },

    #[snafu(display("Could not build the file meta group"))]
    BuildMeta {
        #[snafu(backtrace)]
        source: dcmstack_parser::meta::Error,
    },

    #[snafu(display("Could not write {}", filename.display()))]
    WriteFile {
        filename: PathBuf,
        #[snafu(backtrace)]
        source: dcmstack_parser::dataset::write::Error,
    },

    #[cfg(feature = "ndarray")]
    #[snafu(display("Invalid shape for ndarray"))]
    Shape {
        backtrace: Backtrace,
        source: ndarray::ShapeError,
    },
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        use dcmstack_parser::file::Error as ParserError;
        match self {
            Error::FileNotFound { .. }
            | Error::IsDirectory { .. }
            | Error::ScanDirectory { .. }
            | Error::OpenFile { .. }
            | Error::ReadPixelData { .. }
            | Error::CreateDirectory { .. }
            | Error::WriteFile { .. }
            | Error::ParseFile {
                source: ParserError::OpenFile { .. },
            } => ErrorKind::Io,
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::MissingCodec { .. }
            | Error::DecodeFrame { .. }
            | Error::FragmentLayout { .. }
            | Error::DecodedSize { .. } => ErrorKind::Codec,
            Error::Aborted { .. } => ErrorKind::Aborted,
            _ => ErrorKind::Format,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
