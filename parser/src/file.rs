//! Parsing of whole files:
//! preamble detection, the file meta group,
//! and the main data set up to the pixel data.

use crate::dataset::read::{self, read_dataset, ParseOptions};
use crate::meta::{self, FileMetaTable, DICM_MAGIC_CODE};
use crate::stateful::decode::StatefulDecoder;
use dcmstack_core::{Tag, VR};
use dcmstack_encoding::transfer_syntax::{Codec, TransferSyntax, TransferSyntaxIndex};
use dcmstack_encoding::SpecificCharacterSet;
use dcmstack_object::Item;
use dcmstack_transfer_syntax_registry::{entries, TransferSyntaxRegistry};
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An error while parsing an open source.
#[derive(Debug, Snafu)]
pub enum ReadError {
    #[snafu(display("Could not read the beginning of the file"))]
    ReadPreamble {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Not an image file: no magic code and no recognizable data set"))]
    NotDicom { backtrace: Backtrace },
    #[snafu(display("Could not read the file meta group"))]
    ReadMeta {
        #[snafu(backtrace)]
        source: meta::Error,
    },
    #[snafu(display("Deflated transfer syntax {} is not supported", uid))]
    DeflatedDataset { uid: String, backtrace: Backtrace },
    #[snafu(display("Could not read the data set"))]
    ReadDataset {
        #[snafu(backtrace)]
        source: read::Error,
    },
}

/// An error while parsing a file.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not open file {}", filename.display()))]
    OpenFile {
        filename: PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not parse file {}", filename.display()))]
    ParseFile {
        filename: PathBuf,
        #[snafu(backtrace)]
        source: ReadError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The location and extent of the pixel data in a file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelDataInfo {
    /// The pixel data attribute:
    /// _Pixel Data_, _Float Pixel Data_ or _Double Float Pixel Data_.
    pub tag: Tag,
    /// The value representation in the header.
    pub vr: VR,
    /// The file offset of the first byte of the value.
    pub offset: u64,
    /// The length of the value,
    /// up to the end of the file if the length is undefined.
    pub length: u64,
    /// Whether the value is encapsulated in fragments (undefined length).
    pub encapsulated: bool,
}

/// The result of parsing a file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// The file meta group, absent in files without a preamble.
    pub meta: Option<FileMetaTable>,
    /// The attributes of the file, meta group included.
    pub dataset: Item,
    /// The transfer syntax UID of the data set.
    pub transfer_syntax_uid: String,
    /// The descriptor of the transfer syntax.
    pub transfer_syntax: TransferSyntax,
    /// Where the pixel data is, if found.
    pub pixel_data: Option<PixelDataInfo>,
    /// The size of the file in bytes.
    pub file_size: u64,
}

impl ParsedFile {
    /// Whether pixel data was found.
    pub fn pixel_data_found(&self) -> bool {
        self.pixel_data.is_some()
    }
}

/// Parse the file at the given path.
pub fn parse_file<P>(path: P, options: &ParseOptions) -> Result<ParsedFile>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).context(OpenFileSnafu { filename: path })?;
    let file_size = file
        .metadata()
        .context(OpenFileSnafu { filename: path })?
        .len();
    debug!("Parsing {}", path.display());
    parse_reader(BufReader::new(file), file_size, options)
        .context(ParseFileSnafu { filename: path })
}

/// Whether the file can be parsed and holds pixel data.
pub fn can_read_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    parse_file(path, &ParseOptions::new().group(0x0028))
        .map(|parsed| parsed.pixel_data_found())
        .unwrap_or(false)
}

/// Parse a file from a buffered source at its beginning.
pub fn parse_reader<R>(
    mut reader: R,
    file_size: u64,
    options: &ParseOptions,
) -> Result<ParsedFile, ReadError>
where
    R: BufRead,
{
    let meta_offset = {
        let buf = reader.fill_buf().context(ReadPreambleSnafu)?;
        if buf.len() >= 132 && buf[128..132] == DICM_MAGIC_CODE {
            Some(132)
        } else if buf.starts_with(&DICM_MAGIC_CODE) {
            Some(4)
        } else {
            // a raw data set must start with a low group
            ensure!(
                buf.len() >= 8 && matches!(u16::from_le_bytes([buf[0], buf[1]]), 0x0002..=0x0008),
                NotDicomSnafu
            );
            None
        }
    };
    let (meta, item, position) = match meta_offset {
        Some(offset) => {
            reader.consume(offset);
            let (table, item, position) =
                FileMetaTable::read_from(&mut reader, offset as u64).context(ReadMetaSnafu)?;
            (Some(table), item, position)
        }
        None => (None, Item::new(), 0),
    };

    let transfer_syntax_uid = meta.as_ref().map_or_else(
        || entries::IMPLICIT_VR_LITTLE_ENDIAN.uid().to_owned(),
        |meta| meta.transfer_syntax().to_owned(),
    );
    let transfer_syntax = match TransferSyntaxRegistry.get(&transfer_syntax_uid) {
        Some(ts) => *ts,
        None => {
            warn!(
                "Unknown transfer syntax {}, assuming encapsulated explicit VR little endian",
                transfer_syntax_uid
            );
            entries::UNKNOWN_ENCAPSULATED
        }
    };
    ensure!(
        transfer_syntax.codec() != Codec::Dataset,
        DeflatedDatasetSnafu {
            uid: transfer_syntax_uid
        }
    );

    let mut decoder = StatefulDecoder::new_with_position(
        &mut reader,
        transfer_syntax.decoder(),
        SpecificCharacterSet::Default,
        position,
    );
    let (dataset, pixel_data) =
        read_dataset(&mut decoder, item, options).context(ReadDatasetSnafu)?;

    let pixel_data = pixel_data.map(|pixel_data| PixelDataInfo {
        tag: pixel_data.header.tag,
        vr: pixel_data.header.vr,
        offset: pixel_data.offset,
        length: pixel_data.header.len.get().map_or_else(
            || file_size.saturating_sub(pixel_data.offset),
            u64::from,
        ),
        encapsulated: pixel_data.header.len.is_undefined(),
    });

    Ok(ParsedFile {
        meta,
        dataset,
        transfer_syntax_uid,
        transfer_syntax,
        pixel_data,
        file_size,
    })
}
