//! This module contains the concept of an attribute dictionary.
//!
//! A dictionary translates attribute tags and names into entries
//! with the typical value representation, the value multiplicity,
//! and whether the attribute was retired from the standard.
//! Private attributes are only meaningful in the context of
//! their private creator, which must therefore be given on lookup.

use crate::header::{Tag, VR};
use std::fmt;

/// Specification of a range of tags pertaining to an attribute.
///
/// Very often, the dictionary of attributes indicates a unique
/// group part and element part `(group,elem)`,
/// but occasionally an attribute may cover
/// a range of groups or elements instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TagRange {
    /// Only a specific tag
    Single(Tag),
    /// The two rightmost digits of the _group_ portion are open:
    /// `(GGxx,EEEE)`
    Group100(Tag),
    /// The two rightmost digits of the _element_ portion are open:
    /// `(GGGG,EExx)`
    Element100(Tag),
    /// Generic group length tag, `(GGGG,0000)`
    GroupLength,
    /// Generic private creator tag,
    /// refers to any tag from (GGGG,0010) to (GGGG,00FF),
    /// where `GGGG` is an odd number.
    PrivateCreator,
}

impl TagRange {
    /// Retrieve the inner tag representation of this range.
    ///
    /// Open components are zeroed out.
    pub fn inner(self) -> Tag {
        match self {
            TagRange::Single(tag) => tag,
            TagRange::Group100(tag) => tag,
            TagRange::Element100(tag) => tag,
            TagRange::GroupLength => Tag(0x0000, 0x0000),
            TagRange::PrivateCreator => Tag(0x0009, 0x0010),
        }
    }

    /// Check whether the given tag is covered by this range.
    pub fn contains(self, tag: Tag) -> bool {
        match self {
            TagRange::Single(t) => t == tag,
            TagRange::Group100(t) => t.0 == tag.0 & 0xFF00 && t.1 == tag.1,
            TagRange::Element100(t) => t.0 == tag.0 && t.1 == tag.1 & 0xFF00,
            TagRange::GroupLength => tag.1 == 0,
            TagRange::PrivateCreator => tag.is_private_creator(),
        }
    }
}

/// A value representation as declared in a dictionary,
/// which may depend on the context of the data set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VirtualVr {
    /// The value representation is exactly known
    /// and does not depend on context.
    Exact(VR),
    /// A pixel sample value with a short magnitude:
    /// [`SS`](VR::SS) when _Pixel Representation_ is `1`,
    /// [`US`](VR::US) otherwise.
    Xs,
    /// Overlay or curve data:
    /// [`OW`](VR::OW) above 8 bits allocated,
    /// [`OB`](VR::OB) otherwise.
    Ox,
    /// Pixel data:
    /// [`OW`](VR::OW) above 8 bits allocated,
    /// [`OB`](VR::OB) otherwise.
    Px,
    /// A LUT descriptor or palette entry which is
    /// [`US`](VR::US), [`SS`](VR::SS) or [`OW`](VR::OW).
    Xo,
}

impl From<VR> for VirtualVr {
    fn from(value: VR) -> Self {
        VirtualVr::Exact(value)
    }
}

impl VirtualVr {
    /// Return the underlying value representation
    /// in the case that it can be unambiguously defined without context.
    pub fn exact(self) -> Option<VR> {
        match self {
            VirtualVr::Exact(vr) => Some(vr),
            _ => None,
        }
    }

    /// Resolve the value representation,
    /// given the data set's _Pixel Representation_ and _Bits Allocated_.
    pub fn resolve(self, pixel_representation: u16, bits_allocated: u16) -> VR {
        match self {
            VirtualVr::Exact(vr) => vr,
            VirtualVr::Xs | VirtualVr::Xo => {
                if pixel_representation == 1 {
                    VR::SS
                } else {
                    VR::US
                }
            }
            VirtualVr::Ox | VirtualVr::Px => {
                if bits_allocated > 8 {
                    VR::OW
                } else {
                    VR::OB
                }
            }
        }
    }

    /// Return the underlying value representation,
    /// making a relaxed conversion if it cannot be
    /// accurately resolved without context.
    pub fn relaxed(self) -> VR {
        match self {
            VirtualVr::Exact(vr) => vr,
            VirtualVr::Xs | VirtualVr::Xo => VR::US,
            VirtualVr::Ox | VirtualVr::Px => VR::OW,
        }
    }
}

impl fmt::Display for VirtualVr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VirtualVr::Exact(vr) => write!(f, "{}", vr),
            VirtualVr::Xs => f.write_str("xs"),
            VirtualVr::Ox => f.write_str("ox"),
            VirtualVr::Px => f.write_str("px"),
            VirtualVr::Xo => f.write_str("xo"),
        }
    }
}

/// A value multiplicity specification: the minimum number of values,
/// the maximum number of values (`None` when unbounded),
/// and the step between admissible counts (e.g. `2-2n`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VM {
    /// Minimum number of values.
    pub min: u32,
    /// Maximum number of values, `None` if unbounded.
    pub max: Option<u32>,
    /// Step between admissible numbers of values.
    pub step: u32,
}

impl VM {
    /// Exactly one value.
    pub const ONE: VM = VM::exactly(1);

    /// A multiplicity of exactly `n` values.
    pub const fn exactly(n: u32) -> VM {
        VM {
            min: n,
            max: Some(n),
            step: 1,
        }
    }

    /// A multiplicity from `min` to `max` values.
    pub const fn range(min: u32, max: u32) -> VM {
        VM {
            min,
            max: Some(max),
            step: 1,
        }
    }

    /// An unbounded multiplicity, in multiples of `step` from `min`.
    pub const fn unbounded(min: u32, step: u32) -> VM {
        VM {
            min,
            max: None,
            step,
        }
    }

    /// Check whether the given number of values is admissible.
    pub fn admits(&self, n: u32) -> bool {
        if n < self.min {
            return false;
        }
        if let Some(max) = self.max {
            if n > max {
                return false;
            }
        }
        self.step <= 1 || (n - self.min) % self.step == 0
    }
}

impl fmt::Display for VM {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.max, self.step) {
            (Some(max), _) if max == self.min => write!(f, "{}", self.min),
            (Some(max), _) => write!(f, "{}-{}", self.min, max),
            (None, s) if s <= 1 => write!(f, "{}-n", self.min),
            (None, s) => write!(f, "{}-{}n", self.min, s),
        }
    }
}

/// The dictionary entry data type, representing a DICOM attribute.
pub trait DictionaryEntry {
    /// The attribute tag or tag range.
    fn tag_range(&self) -> TagRange;

    /// The attribute tag. Open components of a range are zeroed out.
    fn tag(&self) -> Tag {
        self.tag_range().inner()
    }

    /// The alias of the attribute, with no spaces, usually in UpperCamelCase.
    fn alias(&self) -> &str;

    /// The _typical_ value representation of the attribute.
    fn vr(&self) -> VirtualVr;

    /// The value multiplicity.
    fn vm(&self) -> VM;

    /// Whether the attribute has been retired from the standard.
    fn retired(&self) -> bool;
}

/// A data type for a dictionary entry with a string slice for its alias.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DictEntryRef<'a> {
    /// The attribute tag or tag range
    pub tag: TagRange,
    /// The alias of the attribute, with no spaces, usually in UpperCamelCase
    pub alias: &'a str,
    /// The _typical_ value representation of the attribute
    pub vr: VirtualVr,
    /// The value multiplicity
    pub vm: VM,
    /// Whether the attribute was retired
    pub retired: bool,
}

impl DictionaryEntry for DictEntryRef<'_> {
    fn tag_range(&self) -> TagRange {
        self.tag
    }
    fn alias(&self) -> &str {
        self.alias
    }
    fn vr(&self) -> VirtualVr {
        self.vr
    }
    fn vm(&self) -> VM {
        self.vm
    }
    fn retired(&self) -> bool {
        self.retired
    }
}

/// Type trait for a dictionary of DICOM attributes.
///
/// Attribute dictionaries provide the means to convert a tag to an alias
/// and vice versa, as well as a form of retrieving additional information
/// about the attribute.
///
/// The methods herein have no generic parameters, so as to enable being
/// used as a trait object.
pub trait DataDictionary: fmt::Debug {
    /// The type of the dictionary entry.
    type Entry: DictionaryEntry;

    /// Fetch an entry by its usual alias (e.g. "PatientName" or "SOPInstanceUID").
    /// Aliases are case sensitive and not separated by spaces.
    fn by_name(&self, name: &str) -> Option<&Self::Entry>;

    /// Fetch an entry of a public attribute by its tag.
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;

    /// Fetch an entry of a private attribute,
    /// given the private creator string that reserved its block.
    fn by_private_tag(&self, tag: Tag, creator: &str) -> Option<&Self::Entry>;

    /// Fetch an entry by tag, using the private creator for odd groups.
    fn find_entry(&self, tag: Tag, creator: Option<&str>) -> Option<&Self::Entry> {
        match creator {
            Some(creator) if tag.is_private() && !tag.is_private_creator() => {
                self.by_private_tag(tag, creator)
            }
            _ => self.by_tag(tag),
        }
    }
}
