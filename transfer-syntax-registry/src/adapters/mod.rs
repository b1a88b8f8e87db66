//! Built-in pixel data codecs.
pub mod rle_lossless;

pub use self::rle_lossless::RleLosslessCodec;
