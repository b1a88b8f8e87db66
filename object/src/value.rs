//! The value of an attribute in an [`Item`](crate::Item).

use crate::item::Item;
use dcmstack_core::{PrimitiveValue, VR};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum ValueData {
    Primitive(PrimitiveValue),
    Sequence(Vec<Item>),
}

/// An attribute value: either primitive data
/// or, for the `SQ` value representation, a sequence of nested items.
///
/// Values are immutable and cheap to clone,
/// the underlying data is shared between copies.
#[derive(Clone, PartialEq)]
pub struct Value {
    vr: VR,
    data: Arc<ValueData>,
}

impl Default for Value {
    /// An empty value of unknown representation.
    fn default() -> Self {
        Value::new(VR::UN, PrimitiveValue::Empty)
    }
}

impl Value {
    /// Create a primitive value with the given value representation.
    ///
    /// A sequence cannot hold primitive data:
    /// with `VR::SQ`, an empty primitive becomes an empty sequence
    /// and any other primitive is kept as `UN`.
    pub fn new(vr: VR, value: PrimitiveValue) -> Self {
        match (vr, value) {
            (VR::SQ, PrimitiveValue::Empty) => Value::sequence(Vec::new()),
            (VR::SQ, value) => Value {
                vr: VR::UN,
                data: Arc::new(ValueData::Primitive(value)),
            },
            (vr, value) => Value {
                vr,
                data: Arc::new(ValueData::Primitive(value)),
            },
        }
    }

    /// Create a sequence value from its items.
    pub fn sequence(items: Vec<Item>) -> Self {
        Value {
            vr: VR::SQ,
            data: Arc::new(ValueData::Sequence(items)),
        }
    }

    /// The value representation.
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// Whether this is a sequence of items.
    pub fn is_sequence(&self) -> bool {
        matches!(*self.data, ValueData::Sequence(_))
    }

    /// Whether the value holds no data (no primitive data, or no items).
    pub fn is_empty(&self) -> bool {
        match &*self.data {
            ValueData::Primitive(v) => v.is_empty(),
            ValueData::Sequence(items) => items.is_empty(),
        }
    }

    /// The primitive data, if this is not a sequence.
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match &*self.data {
            ValueData::Primitive(v) => Some(v),
            ValueData::Sequence(_) => None,
        }
    }

    /// The nested items, if this is a sequence.
    pub fn items(&self) -> Option<&[Item]> {
        match &*self.data {
            ValueData::Sequence(items) => Some(items),
            ValueData::Primitive(_) => None,
        }
    }

    /// The number of values (or items).
    pub fn multiplicity(&self) -> u32 {
        match &*self.data {
            ValueData::Primitive(v) => v.multiplicity(),
            ValueData::Sequence(items) => items.len() as u32,
        }
    }

    /// Obtain mutable access to the items of this sequence,
    /// turning the value into an empty sequence first if it is not one.
    pub(crate) fn sequence_mut(&mut self) -> &mut Vec<Item> {
        if !self.is_sequence() {
            *self = Value::sequence(Vec::new());
        }
        match Arc::make_mut(&mut self.data) {
            ValueData::Sequence(items) => items,
            ValueData::Primitive(_) => unreachable!("value was turned into a sequence"),
        }
    }

    /// Whether both values share the same underlying data.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// The full value as a string, trailing padding removed.
    /// Sequences give an empty string.
    pub fn to_str(&self) -> Cow<'_, str> {
        self.primitive()
            .map(PrimitiveValue::to_str)
            .unwrap_or(Cow::Borrowed(""))
    }

    /// The `i`-th string of a text value, padding removed.
    pub fn string(&self, i: usize) -> Option<&str> {
        self.primitive()?
            .string(i)
            .map(|s| s.trim_matches([' ', '\0']))
    }

    /// The first value as a number.
    pub fn to_f64(&self) -> Option<f64> {
        self.primitive()?.to_f64()
    }

    /// The `i`-th value as a number.
    pub fn to_f64_at(&self, i: usize) -> Option<f64> {
        self.primitive()?.to_f64_at(i)
    }

    /// All values which can be read as numbers.
    pub fn to_multi_f64(&self) -> Vec<f64> {
        self.primitive()
            .map(PrimitiveValue::to_multi_f64)
            .unwrap_or_default()
    }

    /// The first value as an integer.
    pub fn to_int(&self) -> Option<i64> {
        self.primitive()?.to_int()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.data {
            ValueData::Primitive(v) => write!(f, "{} {:?}", self.vr, v),
            ValueData::Sequence(items) => f.debug_tuple("SQ").field(items).finish(),
        }
    }
}

impl From<PrimitiveValue> for Value {
    /// Wrap a primitive value with the VR it would be written with by default.
    fn from(value: PrimitiveValue) -> Self {
        let vr = match &value {
            PrimitiveValue::Empty | PrimitiveValue::U8(_) => VR::UN,
            PrimitiveValue::Str(_) => VR::LT,
            PrimitiveValue::Strs(_) => VR::LO,
            PrimitiveValue::Tags(_) => VR::AT,
            PrimitiveValue::I16(_) => VR::SS,
            PrimitiveValue::U16(_) => VR::US,
            PrimitiveValue::I32(_) => VR::SL,
            PrimitiveValue::U32(_) => VR::UL,
            PrimitiveValue::I64(_) => VR::SV,
            PrimitiveValue::U64(_) => VR::UV,
            PrimitiveValue::F32(_) => VR::FL,
            PrimitiveValue::F64(_) => VR::FD,
        };
        Value::new(vr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::Item;
    use dcmstack_core::smallvec::smallvec;
    use dcmstack_core::{PrimitiveValue, VR};

    #[test]
    fn sequences_never_hold_primitives() {
        let v = Value::new(VR::SQ, PrimitiveValue::Empty);
        assert!(v.is_sequence());
        assert_eq!(v.items().map(|i| i.len()), Some(0));

        let v = Value::new(VR::SQ, PrimitiveValue::from(3_u16));
        assert!(!v.is_sequence());
        assert_eq!(v.vr(), VR::UN);
        assert!(v.items().is_none());
    }

    #[test]
    fn clones_share_data() {
        let v = Value::new(
            VR::DS,
            PrimitiveValue::Strs(smallvec!["0.5".to_owned(), "0.25 ".to_owned()]),
        );
        let w = v.clone();
        assert!(v.ptr_eq(&w));
        assert_eq!(w.to_f64_at(1), Some(0.25));
        assert_eq!(w.string(1), Some("0.25"));
        assert_eq!(w.multiplicity(), 2);
    }

    #[test]
    fn sequence_mut_converts() {
        let mut v = Value::new(VR::US, PrimitiveValue::from(1_u16));
        v.sequence_mut().push(Item::new());
        assert_eq!(v.vr(), VR::SQ);
        assert_eq!(v.multiplicity(), 1);
    }
}
