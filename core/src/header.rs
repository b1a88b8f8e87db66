//! This module contains the basic data types for interpreting attribute
//! headers: the attribute tag, the value representation, the value length,
//! and the sequence item header.

use snafu::{Backtrace, Snafu};
use std::fmt;
use std::str::FromStr;

/// Error type for issues constructing a sequence item header.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SequenceItemHeaderError {
    /// Unexpected header tag.
    /// Only Item (0xFFFE, 0xE000),
    /// Item Delimiter (0xFFFE, 0xE00D),
    /// or Sequence Delimiter (0xFFFE, 0xE0DD)
    /// are admitted.
    #[snafu(display("Unexpected tag {}", tag))]
    UnexpectedTag { tag: Tag, backtrace: Backtrace },
    /// Unexpected delimiter value length.
    /// Must be zero for item delimiters.
    #[snafu(display("Unexpected delimiter length {}", len))]
    UnexpectedDelimiterLength { len: Length, backtrace: Backtrace },
}

type Result<T, E = SequenceItemHeaderError> = std::result::Result<T, E>;

/// The data type for DICOM attribute tags.
///
/// Tags are ordered by group number first, then by element number,
/// which is also the order in which attributes are stored in a data set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> u16 {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> u16 {
        self.1
    }

    /// Build a tag from its 32-bit key, `0xGGGGEEEE`.
    #[inline]
    pub fn from_key(key: u32) -> Self {
        Tag((key >> 16) as u16, (key & 0xFFFF) as u16)
    }

    /// Obtain the 32-bit key of this tag, `0xGGGGEEEE`.
    #[inline]
    pub fn key(self) -> u32 {
        (u32::from(self.0) << 16) | u32::from(self.1)
    }

    /// Whether this tag belongs to a private group (odd group number).
    #[inline]
    pub fn is_private(self) -> bool {
        self.0 & 1 == 1
    }

    /// Whether this tag is a private creator element,
    /// `(gggg,0010)` to `(gggg,00FF)` in an odd group.
    #[inline]
    pub fn is_private_creator(self) -> bool {
        self.is_private() && (0x0010..=0x00FF).contains(&self.1)
    }

    /// Whether this is a group length tag, `(gggg,0000)`.
    #[inline]
    pub fn is_group_length(self) -> bool {
        self.1 == 0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// Tag of a sequence item header.
pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
/// Tag of an item delimitation header.
pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
/// Tag of a sequence delimitation header.
pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);

/// An enum type for a DICOM value representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Very Long
    OV,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Signed Very Long
    SV,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
    /// Unsigned Very Long
    UV,
}

impl VR {
    /// Every value representation, in alphabetical order of its code
    /// (except for `FL` before `FD`).
    pub const ALL: [VR; 34] = {
        use VR::*;
        [
            AE, AS, AT, CS, DA, DS, DT, FL, FD, IS, LO, LT, OB, OD, OF, OL, OV, OW, PN, SH, SL,
            SQ, SS, ST, SV, TM, UC, UI, UL, UN, UR, US, UT, UV,
        ]
    };

    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        std::str::from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_string(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    /// The function returns two alphabetic characters in upper case.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_string().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Whether the explicit VR header of this representation carries
    /// two reserved bytes and a 32-bit length.
    pub fn has_long_length(self) -> bool {
        use VR::*;
        matches!(
            self,
            OB | OD | OF | OL | OV | OW | SQ | UC | UN | UR | UT | SV | UV
        )
    }

    /// Whether values of this representation are text.
    pub fn is_text(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UC | UI | UR | UT
        )
    }

    /// Whether text values of this representation may hold several
    /// backslash-separated values.
    pub fn is_multi_valued_text(self) -> bool {
        self.is_text() && !matches!(self, VR::LT | VR::ST | VR::UR | VR::UT)
    }

    /// Whether text of this representation is decoded with the
    /// specific character set (as opposed to the default repertoire).
    pub fn uses_character_set(self) -> bool {
        use VR::*;
        matches!(self, LO | LT | PN | SH | ST | UC | UT)
    }

    /// The size in bytes of a single binary value of this representation,
    /// or `None` for text, sequences and unknown content.
    pub fn value_size(self) -> Option<usize> {
        use VR::*;
        match self {
            OB | UN => Some(1),
            US | SS | OW => Some(2),
            UL | SL | FL | OF | OL | AT => Some(4),
            FD | OD | SV | UV | OV => Some(8),
            _ => None,
        }
    }

    /// The byte used for padding values to an even length.
    pub fn padding(self) -> u8 {
        if self == VR::UI || !self.is_text() {
            0
        } else {
            b' '
        }
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two UTF-8 encoded alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> std::result::Result<Self, Self::Err> {
        VR::ALL
            .iter()
            .copied()
            .find(|vr| vr.to_string() == string)
            .ok_or("no such value representation")
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(VR::to_string(*self))
    }
}

/// A type for representing data set content length, in bytes.
/// An internal value of `0xFFFF_FFFF` represents an undefined
/// (unspecified) length, which would have to be determined
/// with a traversal based on the content's encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// A length that is undefined.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Create a new length value from its internal representation.
    #[inline]
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// Create a new length value with the given number of bytes.
    ///
    /// # Panic
    ///
    /// This function will panic if `len` represents an undefined length.
    #[inline]
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    /// Check whether this length is undefined (unknown).
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    /// Returns `None` if it represents an undefined length.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", l),
        }
    }
}

/// A data structure for a data element header, containing
/// a tag, value representation and specified length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DataElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value Representation
    pub vr: VR,
    /// Element length
    pub len: Length,
}

impl DataElementHeader {
    /// Create a new data element header with the given properties.
    #[inline]
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, len: Length) -> DataElementHeader {
        DataElementHeader {
            tag: tag.into(),
            vr,
            len,
        }
    }

    /// Whether this is the header of an item, item delimiter or
    /// sequence delimiter.
    pub fn is_delimiter_or_item(&self) -> bool {
        self.tag.0 == 0xFFFE
    }

    /// Whether this header starts an encapsulated pixel data element.
    pub fn is_encapsulated_pixeldata(&self) -> bool {
        self.tag == Tag(0x7FE0, 0x0010) && self.len.is_undefined()
    }
}

/// Data type for describing a sequence item data element.
/// If the element represents an item, it will also contain
/// the specified length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SequenceItemHeader {
    /// The cursor contains an item.
    Item {
        /// the length of the item in bytes (can be undefined)
        len: Length,
    },
    /// The cursor read an item delimiter.
    /// The element ends here and should not be read any further.
    ItemDelimiter,
    /// The cursor read a sequence delimiter.
    /// The element ends here and should not be read any further.
    SequenceDelimiter,
}

impl SequenceItemHeader {
    /// Create a sequence item header using the element's raw properties.
    /// An error can be raised if the given properties do not relate to a
    /// sequence item, a sequence item delimiter or a sequence delimiter.
    pub fn new<T: Into<Tag>>(tag: T, len: Length) -> Result<SequenceItemHeader> {
        match tag.into() {
            ITEM => Ok(SequenceItemHeader::Item { len }),
            ITEM_DELIMITER => {
                snafu::ensure!(len == Length(0), UnexpectedDelimiterLengthSnafu { len });
                Ok(SequenceItemHeader::ItemDelimiter)
            }
            SEQUENCE_DELIMITER => Ok(SequenceItemHeader::SequenceDelimiter),
            tag => UnexpectedTagSnafu { tag }.fail(),
        }
    }

    /// Retrieve the sequence item header's tag.
    pub fn tag(&self) -> Tag {
        match self {
            SequenceItemHeader::Item { .. } => ITEM,
            SequenceItemHeader::ItemDelimiter => ITEM_DELIMITER,
            SequenceItemHeader::SequenceDelimiter => SEQUENCE_DELIMITER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ordering_and_display() {
        assert!(Tag(0x0008, 0x0018) < Tag(0x0010, 0x0010));
        assert!(Tag(0x0020, 0x0013) < Tag(0x0020, 0x0032));
        assert_eq!(format!("{}", Tag(0x7FE0, 0x0010)), "(7FE0,0010)");
        assert_eq!(format!("{:?}", Tag(0x0028, 0x0100)), "Tag(0x0028, 0x0100)");
        assert_eq!(Tag::from_key(0x0020_0032), Tag(0x0020, 0x0032));
        assert_eq!(Tag(0x0020, 0x0032).key(), 0x0020_0032);
    }

    #[test]
    fn private_tags() {
        assert!(Tag(0x0029, 0x0010).is_private_creator());
        assert!(Tag(0x0029, 0x00FF).is_private_creator());
        assert!(!Tag(0x0029, 0x1010).is_private_creator());
        assert!(Tag(0x0029, 0x1010).is_private());
        assert!(!Tag(0x0028, 0x0010).is_private_creator());
    }

    #[test]
    fn vr_parsing() {
        assert_eq!(VR::from_binary(*b"OW"), Some(VR::OW));
        assert_eq!(VR::from_binary(*b"SQ"), Some(VR::SQ));
        assert_eq!(VR::from_binary(*b"zz"), None);
        assert_eq!("DS".parse::<VR>(), Ok(VR::DS));
        assert_eq!(VR::UT.to_bytes(), *b"UT");
        assert!(VR::ALL.iter().all(|vr| vr.to_string().parse() == Ok(*vr)));
    }

    #[test]
    fn item_headers() {
        assert_eq!(
            SequenceItemHeader::new(ITEM, Length(12)).unwrap(),
            SequenceItemHeader::Item { len: Length(12) }
        );
        assert!(SequenceItemHeader::new(ITEM_DELIMITER, Length(4)).is_err());
        assert!(SequenceItemHeader::new(Tag(0x0008, 0x0010), Length(0)).is_err());
    }
}
