//! Descriptors of transfer syntaxes.
//!
//! A transfer syntax determines how the main data set of a file is encoded:
//! the byte order, whether value representations are explicit,
//! and how the pixel data is compressed.
//! The actual registry of known transfer syntaxes lives in
//! the `dcmstack-transfer-syntax-registry` crate.

use crate::decode::DatasetDecoder;
use byteordered::Endianness;

/// The kind of pixel data codec required by a transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Native (uncompressed) pixel data.
    None,
    /// The whole data set is deflated.
    /// Readable only with an external inflater.
    Dataset,
    /// Encapsulated pixel data with the RLE Lossless codec,
    /// decoded natively.
    Rle,
    /// Encapsulated pixel data in some other compressed format,
    /// requiring an external codec.
    Encapsulated,
}

/// A descriptor of a transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TransferSyntax {
    /// The unique identifier of the transfer syntax.
    uid: &'static str,
    /// The name of the transfer syntax.
    name: &'static str,
    /// The byte order of data.
    byte_order: Endianness,
    /// Whether the transfer syntax mandates an explicit value representation,
    /// or the VR is implicit.
    explicit_vr: bool,
    /// The byte order of native pixel samples,
    /// which differs from that of the data set in some private syntaxes.
    pixel_byte_order: Endianness,
    /// The pixel data codec.
    codec: Codec,
}

impl TransferSyntax {
    /// Create a new transfer syntax descriptor.
    pub const fn new(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
        codec: Codec,
    ) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order,
            explicit_vr,
            pixel_byte_order: byte_order,
            codec,
        }
    }

    /// Replace the byte order of native pixel samples.
    pub const fn with_pixel_byte_order(mut self, byte_order: Endianness) -> Self {
        self.pixel_byte_order = byte_order;
        self
    }

    /// Obtain this transfer syntax' unique identifier.
    pub const fn uid(&self) -> &'static str {
        self.uid
    }

    /// Obtain the name of this transfer syntax.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Obtain this transfer syntax' expected endianness.
    pub const fn endianness(&self) -> Endianness {
        self.byte_order
    }

    /// Whether the value representation is explicit.
    pub const fn explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    /// Obtain the kind of pixel data codec.
    pub const fn codec(&self) -> Codec {
        self.codec
    }

    /// Whether pixel data is stored in encapsulated fragments.
    pub fn is_encapsulated(&self) -> bool {
        matches!(self.codec, Codec::Rle | Codec::Encapsulated)
    }

    /// Whether the pixel samples stored with this syntax
    /// are in a byte order other than little endian.
    pub fn swaps_pixel_bytes(&self) -> bool {
        self.pixel_byte_order == Endianness::Big
    }

    /// Obtain a header decoder for the main data set.
    pub fn decoder(&self) -> DatasetDecoder {
        DatasetDecoder::new(self.byte_order, self.explicit_vr)
    }
}

/// Trait for a container of transfer syntax descriptors.
pub trait TransferSyntaxIndex {
    /// Obtain a transfer syntax descriptor by its UID.
    ///
    /// Trailing null and space characters in `uid` are ignored.
    fn get(&self, uid: &str) -> Option<&TransferSyntax>;
}

impl<T: ?Sized> TransferSyntaxIndex for &T
where
    T: TransferSyntaxIndex,
{
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        (**self).get(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::{Codec, TransferSyntax};
    use byteordered::Endianness;

    #[test]
    fn big_endian_syntax_swaps() {
        let ts = TransferSyntax::new(
            "1.2.840.10008.1.2.2",
            "Explicit VR Big Endian",
            Endianness::Big,
            true,
            Codec::None,
        );
        assert!(ts.swaps_pixel_bytes());
        assert!(!ts.is_encapsulated());
        assert!(ts.decoder().is_explicit_vr());
        assert_eq!(ts.decoder().endianness(), Endianness::Big);
    }

    #[test]
    fn pixel_byte_order_may_differ() {
        let ts = TransferSyntax::new(
            "1.2.840.113619.5.2",
            "Implicit VR Big Endian DLX (GE private)",
            Endianness::Little,
            false,
            Codec::None,
        )
        .with_pixel_byte_order(Endianness::Big);
        assert!(ts.swaps_pixel_bytes());
        assert_eq!(ts.decoder().endianness(), Endianness::Little);
    }
}
