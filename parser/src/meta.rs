//! The file meta information group,
//! which precedes the main data set of a file
//! and tells the transfer syntax the data set is encoded with.

use crate::stateful::decode::{self, StatefulDecoder};
use dcmstack_core::smallvec::smallvec;
use dcmstack_core::{PrimitiveValue, VR};
use dcmstack_dictionary_std::tags;
use dcmstack_object::{Item, Value};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::io::BufRead;

/// The magic code following the preamble of a file.
pub const DICM_MAGIC_CODE: [u8; 4] = *b"DICM";

/// The implementation class UID written to new files.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.248940611523158413187064386622541913921";

/// The implementation version name written to new files.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DCMSTACK_030";

#[derive(Debug, Snafu)]
pub enum Error {
    /// The source could not be peeked at for the next attribute.
    #[snafu(display("Could not read file meta group"))]
    ReadMetaGroup {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// An attribute of the group could not be decoded.
    #[snafu(display("Could not decode file meta attribute"))]
    DecodeElement {
        #[snafu(backtrace)]
        source: decode::Error,
    },
    /// A required attribute is missing.
    #[snafu(display("Missing data element `{}`", alias))]
    MissingElement {
        alias: &'static str,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The attributes of the file meta group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetaTable {
    /// Media Storage SOP Class UID
    pub media_storage_sop_class_uid: String,
    /// Media Storage SOP Instance UID
    pub media_storage_sop_instance_uid: String,
    /// Transfer Syntax UID
    pub transfer_syntax: String,
    /// Implementation Class UID
    pub implementation_class_uid: String,
    /// Implementation Version Name
    pub implementation_version_name: Option<String>,
    /// Source Application Entity Title
    pub source_application_entity_title: Option<String>,
}

impl FileMetaTable {
    /// Read the attributes of group 0x0002 from the source,
    /// which must be positioned right after the magic code.
    /// Reading stops at the first attribute of another group.
    ///
    /// Returns the table, the attributes as an item,
    /// and the position after the group.
    pub fn read_from<S>(source: &mut S, position: u64) -> Result<(Self, Item, u64)>
    where
        S: BufRead,
    {
        let mut decoder = StatefulDecoder::file_header_parser(source, position);
        let mut item = Item::new();
        loop {
            let buf = decoder.source_mut().fill_buf().context(ReadMetaGroupSnafu)?;
            if buf.len() < 2 || u16::from_le_bytes([buf[0], buf[1]]) != 0x0002 {
                break;
            }
            let header = decoder.decode_header().context(DecodeElementSnafu)?;
            let value = decoder.read_value(&header).context(DecodeElementSnafu)?;
            item.put(header.tag, Value::new(header.vr, value));
        }
        let position = decoder.position();
        let table = FileMetaTable::from_item(&item)?;
        Ok((table, item, position))
    }

    /// Collect the table from the attributes of the group.
    pub fn from_item(item: &Item) -> Result<Self> {
        Ok(FileMetaTable {
            media_storage_sop_class_uid: item
                .get_str(tags::MEDIA_STORAGE_SOP_CLASS_UID)
                .unwrap_or_default(),
            media_storage_sop_instance_uid: item
                .get_str(tags::MEDIA_STORAGE_SOP_INSTANCE_UID)
                .unwrap_or_default(),
            transfer_syntax: item
                .get_str(tags::TRANSFER_SYNTAX_UID)
                .context(MissingElementSnafu {
                    alias: "TransferSyntax",
                })?,
            implementation_class_uid: item
                .get_str(tags::IMPLEMENTATION_CLASS_UID)
                .unwrap_or_default(),
            implementation_version_name: item.get_str(tags::IMPLEMENTATION_VERSION_NAME),
            source_application_entity_title: item
                .get_str(tags::SOURCE_APPLICATION_ENTITY_TITLE),
        })
    }

    /// The transfer syntax UID, without padding.
    pub fn transfer_syntax(&self) -> &str {
        self.transfer_syntax.trim_end_matches(['\0', ' '])
    }

    /// Turn the table into the attributes of the group,
    /// without the group length.
    pub fn to_item(&self) -> Item {
        let uid = |s: &str| Value::new(VR::UI, PrimitiveValue::Strs(smallvec![s.to_owned()]));
        let mut item = Item::new();
        item.put(
            tags::FILE_META_INFORMATION_VERSION,
            Value::new(VR::OB, PrimitiveValue::U8(smallvec![0, 1])),
        );
        item.put(
            tags::MEDIA_STORAGE_SOP_CLASS_UID,
            uid(&self.media_storage_sop_class_uid),
        );
        item.put(
            tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            uid(&self.media_storage_sop_instance_uid),
        );
        item.put(tags::TRANSFER_SYNTAX_UID, uid(&self.transfer_syntax));
        item.put(
            tags::IMPLEMENTATION_CLASS_UID,
            uid(&self.implementation_class_uid),
        );
        if let Some(name) = &self.implementation_version_name {
            item.put(
                tags::IMPLEMENTATION_VERSION_NAME,
                Value::new(VR::SH, PrimitiveValue::Strs(smallvec![name.clone()])),
            );
        }
        if let Some(title) = &self.source_application_entity_title {
            item.put(
                tags::SOURCE_APPLICATION_ENTITY_TITLE,
                Value::new(VR::AE, PrimitiveValue::Strs(smallvec![title.clone()])),
            );
        }
        item
    }
}

/// A builder of file meta tables for new files.
#[derive(Debug, Default, Clone)]
pub struct FileMetaTableBuilder {
    media_storage_sop_class_uid: Option<String>,
    media_storage_sop_instance_uid: Option<String>,
    transfer_syntax: Option<String>,
    source_application_entity_title: Option<String>,
}

impl FileMetaTableBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the media storage SOP class UID.
    pub fn media_storage_sop_class_uid<T: Into<String>>(mut self, value: T) -> Self {
        self.media_storage_sop_class_uid = Some(value.into());
        self
    }

    /// Define the media storage SOP instance UID.
    pub fn media_storage_sop_instance_uid<T: Into<String>>(mut self, value: T) -> Self {
        self.media_storage_sop_instance_uid = Some(value.into());
        self
    }

    /// Define the transfer syntax UID.
    pub fn transfer_syntax<T: Into<String>>(mut self, value: T) -> Self {
        self.transfer_syntax = Some(value.into());
        self
    }

    /// Define the source application entity title.
    pub fn source_application_entity_title<T: Into<String>>(mut self, value: T) -> Self {
        self.source_application_entity_title = Some(value.into());
        self
    }

    /// Build the table, naming the first missing attribute on failure.
    pub fn build(self) -> Result<FileMetaTable> {
        Ok(FileMetaTable {
            media_storage_sop_class_uid: self
                .media_storage_sop_class_uid
                .context(MissingElementSnafu {
                    alias: "MediaStorageSOPClassUID",
                })?,
            media_storage_sop_instance_uid: self
                .media_storage_sop_instance_uid
                .context(MissingElementSnafu {
                    alias: "MediaStorageSOPInstanceUID",
                })?,
            transfer_syntax: self.transfer_syntax.context(MissingElementSnafu {
                alias: "TransferSyntax",
            })?,
            implementation_class_uid: IMPLEMENTATION_CLASS_UID.to_owned(),
            implementation_version_name: Some(IMPLEMENTATION_VERSION_NAME.to_owned()),
            source_application_entity_title: self.source_application_entity_title,
        })
    }
}
