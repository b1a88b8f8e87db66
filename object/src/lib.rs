//! The attribute model of image files.
//!
//! This crate provides the [`Value`] of an attribute,
//! the copy-on-write attribute [`Item`],
//! [`TagPath`]s into nested sequences,
//! and the [`MetaData`] of a series of files.
//!
//! # Example
//!
//! ```
//! # use dcmstack_object::{Item, TagPath};
//! # use dcmstack_dictionary_std::tags;
//! let mut item = Item::new();
//! item.put_path_str(&tags::PATIENT_NAME.into(), "Doe^John")?;
//! let path = TagPath::nested(
//!     tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
//!     0,
//!     tags::SLICE_THICKNESS,
//! );
//! item.put_path_f64(&path, &[1.5])?;
//!
//! let copy = item.clone();
//! assert_eq!(copy.get_by_path(&path).and_then(|v| v.to_f64()), Some(1.5));
//! # Ok::<(), dcmstack_object::Error>(())
//! ```
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

pub mod item;
pub mod meta;
pub mod path;
pub mod value;

pub use crate::item::{Item, ItemContext};
pub use crate::meta::{IndexArray, MetaData};
pub use crate::path::TagPath;
pub use crate::value::Value;

use dcmstack_core::{Tag, VR};
use snafu::{Backtrace, Snafu};

/// An error which may occur while putting values into an item.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The attribute is not in the dictionary
    /// and its value representation cannot be resolved.
    #[snafu(display("Unknown attribute {}", tag))]
    UnknownAttribute { tag: Tag, backtrace: Backtrace },
    /// A number could not be parsed.
    #[snafu(display("Could not parse {:?} as a number for {}", text, tag))]
    ParseNumber {
        tag: Tag,
        text: String,
        backtrace: Backtrace,
    },
    /// The value cannot be stored with the attribute's VR.
    #[snafu(display("Value is incompatible with {} of {}", vr, tag))]
    IncompatibleVr {
        tag: Tag,
        vr: VR,
        backtrace: Backtrace,
    },
    /// The group cannot hold private attributes.
    #[snafu(display("Group {:04X} is not a private group", group))]
    NotPrivateGroup { group: u16, backtrace: Backtrace },
    /// All private blocks of the group are reserved.
    #[snafu(display("No free private block in group {:04X} for {:?}", group, creator))]
    NoPrivateSlot {
        group: u16,
        creator: String,
        backtrace: Backtrace,
    },
}

/// Type alias for a result from this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
