//! Stateful decoding of attributes from a byte source.

pub mod decode;
