#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of dcmstack containing the basic concepts
//! and data structures for medical image attributes.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] comprises the attribute tag, the value representation,
//!   the value length, and the sequence item header.
//! - [`dictionary`] describes common behavior of attribute dictionaries,
//!   which translate attribute names and/or tags to a dictionary entry
//!   containing the representation, multiplicity and retirement status
//!   of the attribute.
//! - [`value`] holds the definition of primitive attribute values,
//!   with the awareness of multiplicity.
//!
//! [`dictionary`]: ./dictionary/index.html
//! [`header`]: ./header/index.html
//! [`value`]: ./value/index.html

pub mod dictionary;
pub mod header;
pub mod value;

pub use dictionary::{DataDictionary, DictionaryEntry, VirtualVr, VM};
pub use header::{DataElementHeader, Length, SequenceItemHeader, Tag, VR};
pub use value::{CastValueError, PrimitiveValue};

// re-export crates that are part of the public API
pub use chrono;
pub use smallvec;
