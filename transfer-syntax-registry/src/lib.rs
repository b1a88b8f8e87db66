//! This crate contains the transfer syntax registry
//! and the registry of pixel data codecs.
//!
//! The transfer syntax registry maps the UID of a transfer syntax
//! into its specifier, telling how to read the data set
//! and whether the pixel data is native or encapsulated.
//! The codec registry maps the UID of an encapsulated transfer syntax
//! to an [`ExternalCodec`] able to decompress its frames.
//! RLE Lossless is decoded by a built-in codec.
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

pub mod adapters;
pub mod codec;
pub mod entries;

use dcmstack_encoding::transfer_syntax::{TransferSyntax, TransferSyntaxIndex};
use lazy_static::lazy_static;
use std::collections::HashMap;

pub use crate::codec::{CodecError, CodecRegistry, ExternalCodec};

/// Main implementation of a transfer syntax index.
///
/// All instances share the same set of compiled entries.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct TransferSyntaxRegistry;

impl TransferSyntaxRegistry {
    /// Obtain an iterator of all registered transfer syntaxes.
    pub fn iter(&self) -> impl Iterator<Item = &'static TransferSyntax> {
        REGISTRY.values()
    }
}

impl TransferSyntaxIndex for TransferSyntaxRegistry {
    #[inline]
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        let ts_uid = uid.trim_end_matches(|c| c == '\0' || c == ' ');
        REGISTRY.get(ts_uid)
    }
}

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, TransferSyntax> = initialize_entries();
}

/// Retrieve the default transfer syntax,
/// assumed for files without a file meta group.
pub fn default() -> TransferSyntax {
    entries::IMPLICIT_VR_LITTLE_ENDIAN
}

fn initialize_entries() -> HashMap<&'static str, TransferSyntax> {
    use crate::entries::*;

    [
        IMPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_BIG_ENDIAN,
        PAPYRUS3_IMPLICIT_VR_LITTLE_ENDIAN,
        GE_PRIVATE_IMPLICIT_VR_BIG_ENDIAN,
        DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
        RLE_LOSSLESS,
        JPEG_BASELINE,
        JPEG_EXTENDED,
        JPEG_LOSSLESS_NON_HIERARCHICAL,
        JPEG_LOSSLESS_NON_HIERARCHICAL_FIRST_ORDER_PREDICTION,
        JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
        JPEG_LS_LOSSY_IMAGE_COMPRESSION,
        JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY,
        JPEG_2000_IMAGE_COMPRESSION,
    ]
    .into_iter()
    .map(|ts| (ts.uid(), ts))
    .collect()
}
