//! A list of compiled transfer syntax specifiers.
//!
//! - **Native** syntaxes are read directly:
//!   the data set is decoded with the byte order and VR explicitness
//!   of the syntax, and so is the pixel data.
//! - **RLE Lossless** pixel data is decoded by the built-in codec.
//! - **Encapsulated** syntaxes are known so that the data set can be read,
//!   but their pixel data needs an external codec.
//! - The **deflated** syntax is known only to be rejected.

use byteordered::Endianness;
use dcmstack_encoding::transfer_syntax::{Codec, TransferSyntax as Ts};

// -- the native transfer syntaxes --

/// **Native:** Implicit VR Little Endian: Default Transfer Syntax
pub const IMPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    "1.2.840.10008.1.2",
    "Implicit VR Little Endian",
    Endianness::Little,
    false,
    Codec::None,
);

/// **Native:** Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    "1.2.840.10008.1.2.1",
    "Explicit VR Little Endian",
    Endianness::Little,
    true,
    Codec::None,
);

/// **Native:** Explicit VR Big Endian
pub const EXPLICIT_VR_BIG_ENDIAN: Ts = Ts::new(
    "1.2.840.10008.1.2.2",
    "Explicit VR Big Endian",
    Endianness::Big,
    true,
    Codec::None,
);

/// **Native:** Papyrus 3 Implicit VR Little Endian
pub const PAPYRUS3_IMPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    "1.2.840.10008.1.20",
    "Papyrus 3 Implicit VR Little Endian",
    Endianness::Little,
    false,
    Codec::None,
);

/// **Native:** the private syntax of some GE scanners,
/// with an implicit VR little endian data set
/// but pixel data in big endian.
pub const GE_PRIVATE_IMPLICIT_VR_BIG_ENDIAN: Ts = Ts::new(
    "1.2.840.113619.5.2",
    "Implicit VR Big Endian DLX (GE Private)",
    Endianness::Little,
    false,
    Codec::None,
)
.with_pixel_byte_order(Endianness::Big);

// -- rejected --

/// **Rejected:** Deflated Explicit VR Little Endian
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: Ts = Ts::new(
    "1.2.840.10008.1.2.1.99",
    "Deflated Explicit VR Little Endian",
    Endianness::Little,
    true,
    Codec::Dataset,
);

// -- RLE --

/// **Built-in codec:** RLE Lossless
pub const RLE_LOSSLESS: Ts = Ts::new(
    "1.2.840.10008.1.2.5",
    "RLE Lossless",
    Endianness::Little,
    true,
    Codec::Rle,
);

// -- encapsulated, decoded by external codecs --

/// create a TS with pixel data for an external codec
const fn create_ts_stub(uid: &'static str, name: &'static str) -> Ts {
    Ts::new(uid, name, Endianness::Little, true, Codec::Encapsulated)
}

/// **Encapsulated:** JPEG Baseline (Process 1)
pub const JPEG_BASELINE: Ts = create_ts_stub("1.2.840.10008.1.2.4.50", "JPEG Baseline (Process 1)");
/// **Encapsulated:** JPEG Extended (Process 2 & 4)
pub const JPEG_EXTENDED: Ts =
    create_ts_stub("1.2.840.10008.1.2.4.51", "JPEG Extended (Process 2 & 4)");
/// **Encapsulated:** JPEG Lossless, Non-Hierarchical (Process 14)
pub const JPEG_LOSSLESS_NON_HIERARCHICAL: Ts = create_ts_stub(
    "1.2.840.10008.1.2.4.57",
    "JPEG Lossless, Non-Hierarchical (Process 14)",
);
/// **Encapsulated:** JPEG Lossless, Non-Hierarchical, First-Order Prediction
pub const JPEG_LOSSLESS_NON_HIERARCHICAL_FIRST_ORDER_PREDICTION: Ts = create_ts_stub(
    "1.2.840.10008.1.2.4.70",
    "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
);
/// **Encapsulated:** JPEG-LS Lossless Image Compression
pub const JPEG_LS_LOSSLESS_IMAGE_COMPRESSION: Ts = create_ts_stub(
    "1.2.840.10008.1.2.4.80",
    "JPEG-LS Lossless Image Compression",
);
/// **Encapsulated:** JPEG-LS Lossy (Near-Lossless) Image Compression
pub const JPEG_LS_LOSSY_IMAGE_COMPRESSION: Ts = create_ts_stub(
    "1.2.840.10008.1.2.4.81",
    "JPEG-LS Lossy (Near-Lossless) Image Compression",
);
/// **Encapsulated:** JPEG 2000 Image Compression (Lossless Only)
pub const JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY: Ts = create_ts_stub(
    "1.2.840.10008.1.2.4.90",
    "JPEG 2000 Image Compression (Lossless Only)",
);
/// **Encapsulated:** JPEG 2000 Image Compression
pub const JPEG_2000_IMAGE_COMPRESSION: Ts =
    create_ts_stub("1.2.840.10008.1.2.4.91", "JPEG 2000 Image Compression");

/// The descriptor assumed for transfer syntaxes missing from the registry:
/// an explicit VR little endian data set with encapsulated pixel data,
/// which can only be decoded by a codec registered for its UID.
pub const UNKNOWN_ENCAPSULATED: Ts = create_ts_stub("", "Unknown encapsulated transfer syntax");
