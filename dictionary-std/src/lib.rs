//! This crate implements the standard attribute dictionary and constants
//! used by the dcmstack engine.
//!
//! ## Run-time dictionaries
//!
//! - [`data_element`]: Contains the information about the attributes
//!   which are relevant for volume reconstruction,
//!   plus a small set of well known private attributes
//!   which are looked up by private creator.
//!   The registry is provided as a singleton
//!   behind the unit type [`StandardDataDictionary`].
//!
//! ## Constants
//!
//! The following modules contain constant declarations,
//! which perform an equivalent mapping at compile time,
//! thus without incurring a look-up cost:
//!
//! - [`tags`], which map an attribute alias to a tag
//! - [`uids`], for normative unique identifiers
pub mod data_element;
pub mod tags;
pub mod uids;

pub use data_element::{StandardDataDictionary, StandardDataDictionaryRegistry};
