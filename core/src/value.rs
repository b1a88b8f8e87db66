//! Declaration and implementation of a primitive attribute value.
//!
//! See [`PrimitiveValue`](./enum.PrimitiveValue.html).

use crate::header::Tag;
use chrono::NaiveTime;
use itertools::Itertools;
use num_traits::NumCast;
use smallvec::SmallVec;
use snafu::{Backtrace, Snafu};
use std::borrow::Cow;
use std::fmt;

/// An aggregation of one or more elements in a value.
pub type C<T> = SmallVec<[T; 2]>;

/// An enum representing a primitive value of an attribute.
///
/// Text values are kept as decoded strings (numeric strings included),
/// and binary values as arrays in native byte order.
/// Multiple elements are contained in a [`smallvec`] vector,
/// conveniently aliased to the type [`C`].
///
/// [`smallvec`]: ../../smallvec/index.html
/// [`C`]: ./type.C.html
#[derive(Debug, PartialEq, Clone)]
pub enum PrimitiveValue {
    /// No data. Usually employed for zero-lengthed values.
    Empty,

    /// A sequence of strings.
    /// Used for AE, AS, CS, DA, DS, DT, IS, LO, PN, SH, TM, UC and UI.
    Strs(C<String>),

    /// A single string.
    /// Used for ST, LT, UT and UR, which are never multi-valued.
    Str(String),

    /// A sequence of attribute tags.
    /// Used specifically for AT.
    Tags(C<Tag>),

    /// A sequence of bytes.
    /// Used for OB and UN.
    U8(C<u8>),

    /// A sequence of signed 16-bit integers.
    /// Used for SS.
    I16(C<i16>),

    /// A sequence of unsigned 16-bit integers.
    /// Used for US and OW.
    U16(C<u16>),

    /// A sequence of signed 32-bit integers.
    /// Used for SL.
    I32(C<i32>),

    /// A sequence of unsigned 32-bit integers.
    /// Used for UL and OL.
    U32(C<u32>),

    /// A sequence of signed 64-bit integers.
    /// Used for SV.
    I64(C<i64>),

    /// A sequence of unsigned 64-bit integers.
    /// Used for UV and OV.
    U64(C<u64>),

    /// A sequence of 32-bit floating point numbers.
    /// Used for OF and FL.
    F32(C<f32>),

    /// A sequence of 64-bit floating point numbers.
    /// Used for OD and FD.
    F64(C<f64>),
}

/// An enum representing an abstraction of a primitive value's type,
/// used for error reporting.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ValueType {
    /// No data.
    Empty,
    /// A sequence of items.
    Item,
    /// A sequence of strings.
    Strs,
    /// A single string.
    Str,
    /// A sequence of attribute tags.
    Tags,
    /// Unsigned 8-bit integers.
    U8,
    /// Signed 16-bit integers.
    I16,
    /// Unsigned 16-bit integers.
    U16,
    /// Signed 32-bit integers.
    I32,
    /// Unsigned 32-bit integers.
    U32,
    /// Signed 64-bit integers.
    I64,
    /// Unsigned 64-bit integers.
    U64,
    /// 32-bit floating point numbers.
    F32,
    /// 64-bit floating point numbers.
    F64,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An error type for an attempt of accessing a value
/// in one internal representation as another.
#[derive(Debug, Snafu)]
#[snafu(display("bad value cast: requested {} but value is {}", requested, got))]
pub struct CastValueError {
    /// The value format requested
    pub requested: &'static str,
    /// The value's actual representation
    pub got: ValueType,
    backtrace: Backtrace,
}

impl PrimitiveValue {
    /// Obtain the number of individual elements. This number may not
    /// match the DICOM value multiplicity in some value representations.
    pub fn multiplicity(&self) -> u32 {
        use PrimitiveValue::*;
        match self {
            Empty => 0,
            Str(_) => 1,
            Strs(c) => c.len() as u32,
            Tags(c) => c.len() as u32,
            U8(c) => c.len() as u32,
            I16(c) => c.len() as u32,
            U16(c) => c.len() as u32,
            I32(c) => c.len() as u32,
            U32(c) => c.len() as u32,
            I64(c) => c.len() as u32,
            U64(c) => c.len() as u32,
            F32(c) => c.len() as u32,
            F64(c) => c.len() as u32,
        }
    }

    /// Determine whether the value is empty.
    pub fn is_empty(&self) -> bool {
        self.multiplicity() == 0
    }

    /// Obtain the abstract type of this value.
    pub fn value_type(&self) -> ValueType {
        use PrimitiveValue::*;
        match self {
            Empty => ValueType::Empty,
            Str(_) => ValueType::Str,
            Strs(_) => ValueType::Strs,
            Tags(_) => ValueType::Tags,
            U8(_) => ValueType::U8,
            I16(_) => ValueType::I16,
            U16(_) => ValueType::U16,
            I32(_) => ValueType::I32,
            U32(_) => ValueType::U32,
            I64(_) => ValueType::I64,
            U64(_) => ValueType::U64,
            F32(_) => ValueType::F32,
            F64(_) => ValueType::F64,
        }
    }

    /// Get the `i`-th value as a string slice,
    /// if this is a textual value.
    pub fn string(&self, i: usize) -> Option<&str> {
        match self {
            PrimitiveValue::Str(s) if i == 0 => Some(s.as_str()),
            PrimitiveValue::Strs(c) => c.get(i).map(String::as_str),
            _ => None,
        }
    }

    /// Get all textual values, or fail if this is not a textual value.
    pub fn strings(&self) -> Result<&[String], CastValueError> {
        match self {
            PrimitiveValue::Strs(c) => Ok(c),
            PrimitiveValue::Str(s) => Ok(std::slice::from_ref(s)),
            PrimitiveValue::Empty => Ok(&[]),
            other => CastValueSnafu {
                requested: "strings",
                got: other.value_type(),
            }
            .fail(),
        }
    }

    /// Convert the full value into a single string,
    /// joining multiple values with a backslash.
    /// Trailing padding is removed.
    pub fn to_str(&self) -> Cow<'_, str> {
        use PrimitiveValue::*;
        match self {
            Empty => Cow::Borrowed(""),
            Str(s) => Cow::Borrowed(s.trim_end_matches([' ', '\0'])),
            Strs(c) if c.len() == 1 => Cow::Borrowed(c[0].trim_end_matches([' ', '\0'])),
            Strs(c) => Cow::Owned(c.iter().map(|s| s.trim_end_matches([' ', '\0'])).join("\\")),
            Tags(c) => Cow::Owned(c.iter().map(|t| t.to_string()).join("\\")),
            U8(c) => Cow::Owned(c.iter().join("\\")),
            I16(c) => Cow::Owned(c.iter().join("\\")),
            U16(c) => Cow::Owned(c.iter().join("\\")),
            I32(c) => Cow::Owned(c.iter().join("\\")),
            U32(c) => Cow::Owned(c.iter().join("\\")),
            I64(c) => Cow::Owned(c.iter().join("\\")),
            U64(c) => Cow::Owned(c.iter().join("\\")),
            F32(c) => Cow::Owned(c.iter().join("\\")),
            F64(c) => Cow::Owned(c.iter().join("\\")),
        }
    }

    /// Get the `i`-th value as a double precision number.
    ///
    /// Numeric strings (DS, IS) are parsed.
    /// Returns `None` when out of bounds or not numeric.
    pub fn to_f64_at(&self, i: usize) -> Option<f64> {
        use PrimitiveValue::*;
        match self {
            Empty | Tags(_) => None,
            Str(_) | Strs(_) => self.string(i).and_then(|s| s.trim().parse::<f64>().ok()),
            U8(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            I16(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            U16(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            I32(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            U32(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            I64(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            U64(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            F32(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            F64(c) => c.get(i).copied(),
        }
    }

    /// Get the first value as a double precision number.
    pub fn to_f64(&self) -> Option<f64> {
        self.to_f64_at(0)
    }

    /// Get all values as double precision numbers,
    /// skipping those which cannot be interpreted as such.
    pub fn to_multi_f64(&self) -> Vec<f64> {
        (0..self.multiplicity() as usize)
            .filter_map(|i| self.to_f64_at(i))
            .collect()
    }

    /// Get the `i`-th value as an integer.
    ///
    /// Integer strings are parsed, and decimal values are truncated.
    pub fn to_int_at(&self, i: usize) -> Option<i64> {
        use PrimitiveValue::*;
        match self {
            Empty | Tags(_) => None,
            Str(_) | Strs(_) => self.string(i).and_then(|s| {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(NumCast::from))
            }),
            U8(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            I16(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            U16(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            I32(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            U32(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            I64(c) => c.get(i).copied(),
            U64(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            F32(c) => c.get(i).and_then(|v| NumCast::from(*v)),
            F64(c) => c.get(i).and_then(|v| NumCast::from(*v)),
        }
    }

    /// Get the first value as an integer.
    pub fn to_int(&self) -> Option<i64> {
        self.to_int_at(0)
    }

    /// Interpret the first value as a time of day (TM),
    /// in the forms `HH`, `HHMM`, `HHMMSS` or `HHMMSS.FFFFFF`.
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        let text = self.string(0)?.trim();
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        let field = |range: std::ops::Range<usize>| -> Option<u32> {
            match whole.get(range) {
                Some(s) if !s.is_empty() => s.parse().ok(),
                _ => Some(0),
            }
        };
        if whole.len() < 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let micro = if fraction.is_empty() {
            0
        } else {
            let digits: String = fraction.chars().take(6).collect();
            let scale = 10u32.pow(6 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        };
        NaiveTime::from_hms_micro_opt(field(0..2)?, field(2..4)?, field(4..6)?, micro)
    }

    /// Retrieve the value's bytes, if this is a byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PrimitiveValue::U8(c) => Some(c),
            _ => None,
        }
    }

    /// Get the `i`-th attribute tag, if this is an AT value.
    pub fn tag_at(&self, i: usize) -> Option<Tag> {
        match self {
            PrimitiveValue::Tags(c) => c.get(i).copied(),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_primitive {
    ($typ: ty, $variant: ident) => {
        impl From<$typ> for PrimitiveValue {
            fn from(value: $typ) -> Self {
                PrimitiveValue::$variant(C::from_elem(value, 1))
            }
        }

        impl From<Vec<$typ>> for PrimitiveValue {
            fn from(value: Vec<$typ>) -> Self {
                PrimitiveValue::$variant(C::from_vec(value))
            }
        }

        impl From<&[$typ]> for PrimitiveValue {
            fn from(value: &[$typ]) -> Self {
                PrimitiveValue::$variant(C::from_slice(value))
            }
        }
    };
}

impl_from_for_primitive!(u8, U8);
impl_from_for_primitive!(u16, U16);
impl_from_for_primitive!(i16, I16);
impl_from_for_primitive!(u32, U32);
impl_from_for_primitive!(i32, I32);
impl_from_for_primitive!(u64, U64);
impl_from_for_primitive!(i64, I64);
impl_from_for_primitive!(f32, F32);
impl_from_for_primitive!(f64, F64);
impl_from_for_primitive!(Tag, Tags);

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::Str(value.to_owned())
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::Str(value)
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn numeric_strings() {
        let value = PrimitiveValue::Strs(smallvec!["1.5".to_owned(), " -2 ".to_owned()]);
        assert_eq!(value.multiplicity(), 2);
        assert_eq!(value.to_f64(), Some(1.5));
        assert_eq!(value.to_f64_at(1), Some(-2.0));
        assert_eq!(value.to_int_at(1), Some(-2));
        assert_eq!(value.to_int(), Some(1));
        assert_eq!(value.to_f64_at(2), None);
        assert_eq!(value.to_multi_f64(), vec![1.5, -2.0]);
    }

    #[test]
    fn binary_numbers() {
        let value = PrimitiveValue::from(vec![3_u16, 65535]);
        assert_eq!(value.to_int_at(1), Some(65535));
        assert_eq!(value.to_str(), "3\\65535");
        assert_eq!(PrimitiveValue::from(0.25_f32).to_f64(), Some(0.25));
    }

    #[test]
    fn text_padding_is_trimmed() {
        let value = PrimitiveValue::Strs(smallvec!["1.2.840.10008.1.2\0".to_owned()]);
        assert_eq!(value.to_str(), "1.2.840.10008.1.2");
        assert!(PrimitiveValue::from(1_u16).strings().is_err());
    }

    #[test]
    fn time_parsing() {
        let value = PrimitiveValue::from("101530.5");
        assert_eq!(
            value.to_naive_time(),
            NaiveTime::from_hms_micro_opt(10, 15, 30, 500_000)
        );
        assert_eq!(
            PrimitiveValue::from("0930").to_naive_time(),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(PrimitiveValue::from("ab").to_naive_time(), None);
    }
}
