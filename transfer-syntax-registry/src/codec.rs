//! The interface of pixel data codecs
//! and the registry mapping transfer syntax UIDs to them.
//!
//! Decoding of compressed frames is left to implementations of
//! [`ExternalCodec`], which are looked up by the UID
//! of the transfer syntax of the file.
use crate::adapters::RleLosslessCodec;
use snafu::{Backtrace, Snafu};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// An error while decoding a compressed frame.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodecError {
    #[snafu(display("Invalid RLE data: {}", message))]
    InvalidRle {
        message: &'static str,
        backtrace: Backtrace,
    },
    #[snafu(display("Unsupported bit depth {}", bits_allocated))]
    UnsupportedBitDepth {
        bits_allocated: u16,
        backtrace: Backtrace,
    },
    #[snafu(display("Decoded {} bytes, expected {}", got, expected))]
    UnexpectedLength {
        expected: usize,
        got: usize,
        backtrace: Backtrace,
    },
    /// An error reported by a third-party codec.
    #[snafu(display("Codec failure"))]
    External {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// A decoder of the compressed frames of an encapsulated transfer syntax.
pub trait ExternalCodec: Send + Sync + fmt::Debug {
    /// Decompress one frame.
    ///
    /// `compressed` holds the concatenated fragments of the frame,
    /// `bits_allocated` is the bit depth of each sample,
    /// and `expected_len` is the size in bytes of the decoded frame.
    /// On success, the samples are returned in little endian,
    /// interleaved by pixel.
    fn decode(&self, compressed: &[u8], bits_allocated: u16, expected_len: usize) -> Result<Vec<u8>>;
}

impl<T: ?Sized> ExternalCodec for Arc<T>
where
    T: ExternalCodec,
{
    fn decode(&self, compressed: &[u8], bits_allocated: u16, expected_len: usize) -> Result<Vec<u8>> {
        (**self).decode(compressed, bits_allocated, expected_len)
    }
}

/// A mapping from transfer syntax UIDs to pixel data codecs.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn ExternalCodec>>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut uids: Vec<_> = self.codecs.keys().collect();
        uids.sort();
        f.debug_struct("CodecRegistry").field("uids", &uids).finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Create a registry with the built-in codecs.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(
            crate::entries::RLE_LOSSLESS.uid(),
            Arc::new(RleLosslessCodec),
        );
        registry
    }

    /// Create a registry without any codec.
    pub fn empty() -> Self {
        CodecRegistry {
            codecs: HashMap::new(),
        }
    }

    /// Register a codec for the given transfer syntax UID,
    /// returning the codec previously registered for it.
    pub fn register(
        &mut self,
        uid: impl Into<String>,
        codec: Arc<dyn ExternalCodec>,
    ) -> Option<Arc<dyn ExternalCodec>> {
        let uid = uid.into();
        let uid = uid.trim_end_matches(|c| c == '\0' || c == ' ').to_owned();
        debug!("Registering codec {:?} for {}", codec, uid);
        let previous = self.codecs.insert(uid, codec);
        if let Some(previous) = &previous {
            warn!("Replaced codec {:?}", previous);
        }
        previous
    }

    /// Obtain the codec for the given transfer syntax UID.
    pub fn get(&self, uid: &str) -> Option<&Arc<dyn ExternalCodec>> {
        let uid = uid.trim_end_matches(|c| c == '\0' || c == ' ');
        let codec = self.codecs.get(uid);
        if codec.is_none() {
            trace!("No codec registered for {}", uid);
        }
        codec
    }

    /// Whether a codec is registered for the given UID.
    pub fn contains(&self, uid: &str) -> bool {
        self.get(uid).is_some()
    }
}
