//! The attribute item store.
//!
//! An [`Item`] is an ordered collection of attributes,
//! with at most one value per tag.
//! Items are shared on clone and copied on write.

use crate::path::TagPath;
use crate::value::Value;
use crate::{
    IncompatibleVrSnafu, NoPrivateSlotSnafu, NotPrivateGroupSnafu, ParseNumberSnafu, Result,
    UnknownAttributeSnafu,
};
use dcmstack_core::dictionary::{DataDictionary, DictionaryEntry};
use dcmstack_core::smallvec::smallvec;
use dcmstack_core::value::C;
use dcmstack_core::{PrimitiveValue, Tag, VR};
use dcmstack_dictionary_std::{tags, StandardDataDictionary};
use dcmstack_encoding::text::SpecificCharacterSet;
use snafu::{ensure, OptionExt, ResultExt};
use std::str::FromStr;
use std::sync::Arc;

/// The inherited context of an item,
/// needed to interpret some of its values.
///
/// Nested items start with the context of their parent,
/// and the context is updated whenever one of the
/// attributes it derives from is put into the item.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ItemContext {
    /// The character set of text values, from _Specific Character Set_.
    pub charset: SpecificCharacterSet,
    /// The _Pixel Representation_, which resolves US/SS ambiguity.
    pub pixel_representation: u16,
    /// The _Bits Allocated_, which resolves OB/OW ambiguity.
    pub bits_allocated: u16,
}

/// An ordered map of attribute tags to values.
///
/// Cloning an item is cheap, as the entries are shared.
/// Any mutation first obtains a unique copy of the entries.
#[derive(Debug, Clone, Default)]
pub struct Item {
    entries: Arc<Vec<(Tag, Value)>>,
    context: ItemContext,
}

impl PartialEq for Item {
    // the context is derived from the entries, so it is not compared
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries) || self.entries == other.entries
    }
}

/// Look up the position of `tag`, or where it would be inserted.
/// Scans from the back, since attributes usually arrive in order.
fn position(entries: &[(Tag, Value)], tag: Tag) -> Result<usize, usize> {
    for (i, (t, _)) in entries.iter().enumerate().rev() {
        if *t == tag {
            return Ok(i);
        }
        if *t < tag {
            return Err(i + 1);
        }
    }
    Err(0)
}

impl Item {
    /// Create an empty item with the default context.
    pub fn new() -> Self {
        Item::default()
    }

    /// Create an empty item with the given context.
    pub fn with_context(context: ItemContext) -> Self {
        Item {
            entries: Arc::default(),
            context,
        }
    }

    /// The current context of this item.
    pub fn context(&self) -> ItemContext {
        self.context
    }

    /// The number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the item has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the attributes in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Value)> + '_ {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    /// Whether both items share the same entries.
    pub fn ptr_eq(&self, other: &Item) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Retrieve the value of an attribute.
    pub fn get(&self, tag: Tag) -> Option<&Value> {
        position(&self.entries, tag)
            .ok()
            .map(|i| &self.entries[i].1)
    }

    /// Retrieve a value as a string with padding removed,
    /// if it is present and not empty.
    pub fn get_str(&self, tag: Tag) -> Option<String> {
        self.get(tag)
            .map(|v| v.to_str().trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    /// Retrieve the first value of an attribute as a number.
    pub fn get_f64(&self, tag: Tag) -> Option<f64> {
        self.get(tag)?.to_f64()
    }

    /// Retrieve the first value of an attribute as an integer.
    pub fn get_int(&self, tag: Tag) -> Option<i64> {
        self.get(tag)?.to_int()
    }

    /// Retrieve all values of an attribute as numbers.
    pub fn get_multi_f64(&self, tag: Tag) -> Option<Vec<f64>> {
        self.get(tag).map(Value::to_multi_f64)
    }

    /// Retrieve the `index`-th item of a sequence.
    pub fn get_item(&self, sequence: Tag, index: usize) -> Option<&Item> {
        self.get(sequence)?.items()?.get(index)
    }

    /// Obtain the value of an attribute for modification,
    /// inserting an empty value of unknown VR if absent.
    pub fn find_or_insert(&mut self, tag: Tag) -> &mut Value {
        let entries = Arc::make_mut(&mut self.entries);
        let i = match position(entries, tag) {
            Ok(i) => i,
            Err(i) => {
                entries.insert(i, (tag, Value::default()));
                i
            }
        };
        &mut entries[i].1
    }

    /// Put an attribute, replacing any previous value,
    /// which is returned.
    pub fn put(&mut self, tag: Tag, value: Value) -> Option<Value> {
        self.update_context(tag, &value);
        let entries = Arc::make_mut(&mut self.entries);
        match position(entries, tag) {
            Ok(i) => Some(std::mem::replace(&mut entries[i].1, value)),
            Err(i) => {
                entries.insert(i, (tag, value));
                None
            }
        }
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove(&mut self, tag: Tag) -> Option<Value> {
        let i = position(&self.entries, tag).ok()?;
        Some(Arc::make_mut(&mut self.entries).remove(i).1)
    }

    fn update_context(&mut self, tag: Tag, value: &Value) {
        match tag {
            tags::SPECIFIC_CHARACTER_SET => {
                if let Some(charset) = SpecificCharacterSet::from_attribute(&value.to_str()) {
                    self.context.charset = charset;
                }
            }
            tags::PIXEL_REPRESENTATION => {
                if let Some(v) = value.to_int() {
                    self.context.pixel_representation = v as u16;
                }
            }
            tags::BITS_ALLOCATED => {
                if let Some(v) = value.to_int() {
                    self.context.bits_allocated = v as u16;
                }
            }
            _ => {}
        }
    }

    /// Retrieve the value at the end of a path.
    pub fn get_by_path(&self, path: &TagPath) -> Option<&Value> {
        let mut item = self;
        for &(sequence, index) in path.steps() {
            item = item.get_item(sequence, index)?;
        }
        item.get(path.tag())
    }

    /// Obtain the item holding the attribute at the end of the given steps,
    /// creating sequences and items as necessary.
    /// New items inherit the context of their parent.
    fn leaf_mut(&mut self, steps: &[(Tag, usize)]) -> &mut Item {
        let mut item = self;
        for &(sequence, index) in steps {
            let context = item.context;
            let items = item.find_or_insert(sequence).sequence_mut();
            if items.len() <= index {
                items.resize_with(index + 1, || Item::with_context(context));
            }
            item = &mut items[index];
        }
        item
    }

    /// Obtain the value at the end of a path for modification,
    /// extending sequences to reach it.
    pub fn find_or_insert_by_path(&mut self, path: &TagPath) -> &mut Value {
        self.leaf_mut(path.steps()).find_or_insert(path.tag())
    }

    /// Put a value at the end of a path,
    /// extending sequences to reach it.
    pub fn put_path(&mut self, path: &TagPath, value: Value) -> Option<Value> {
        self.leaf_mut(path.steps()).put(path.tag(), value)
    }

    /// Put a value given in its textual form at the end of a path.
    ///
    /// The value representation is resolved with the dictionary,
    /// the private creator of the attribute's block,
    /// and the context of the item which holds it.
    pub fn put_path_str(&mut self, path: &TagPath, text: &str) -> Result<Option<Value>> {
        let leaf = self.leaf_mut(path.steps());
        let tag = path.tag();
        let vr = leaf.resolve_vr(tag)?;
        let value = text_to_primitive(tag, vr, text)?;
        Ok(leaf.put(tag, Value::new(vr, value)))
    }

    /// Put numeric values at the end of a path.
    ///
    /// The value representation is resolved as in [`put_path_str`](Item::put_path_str).
    /// Numeric strings are formatted, binary integers are rounded.
    pub fn put_path_f64(&mut self, path: &TagPath, values: &[f64]) -> Result<Option<Value>> {
        let leaf = self.leaf_mut(path.steps());
        let tag = path.tag();
        let vr = leaf.resolve_vr(tag)?;
        let value = numbers_to_primitive(tag, vr, values)?;
        Ok(leaf.put(tag, Value::new(vr, value)))
    }

    /// Resolve the value representation of an attribute of this item.
    pub fn resolve_vr(&self, tag: Tag) -> Result<VR> {
        let creator = self.private_creator(tag);
        match StandardDataDictionary.find_entry(tag, creator) {
            Some(entry) => Ok(entry
                .vr()
                .resolve(self.context.pixel_representation, self.context.bits_allocated)),
            None => self
                .get(tag)
                .map(Value::vr)
                .filter(|vr| *vr != VR::UN)
                .context(UnknownAttributeSnafu { tag }),
        }
    }

    /// The private creator which reserved the block of a private attribute.
    pub fn private_creator(&self, tag: Tag) -> Option<&str> {
        if !tag.is_private() || tag.element() < 0x1000 {
            return None;
        }
        self.get(Tag(tag.group(), tag.element() >> 8))?.string(0)
    }

    /// Find the tag of a private attribute,
    /// given its group, private creator and offset within the block.
    pub fn resolve_private_tag(&self, group: u16, creator: &str, offset: u8) -> Option<Tag> {
        if group % 2 == 0 {
            return None;
        }
        let creator = creator.trim();
        (0x0010..=0x00FF_u16)
            .find(|slot| self.get(Tag(group, *slot)).and_then(|v| v.string(0)) == Some(creator))
            .map(|slot| Tag(group, (slot << 8) | u16::from(offset)))
    }

    /// Find the tag of a private attribute as in
    /// [`resolve_private_tag`](Item::resolve_private_tag),
    /// reserving a block for the creator if it has none.
    pub fn resolve_private_tag_for_writing(
        &mut self,
        group: u16,
        creator: &str,
        offset: u8,
    ) -> Result<Tag> {
        ensure!(group % 2 == 1 && group > 0x0008, NotPrivateGroupSnafu { group });
        if let Some(tag) = self.resolve_private_tag(group, creator, offset) {
            return Ok(tag);
        }
        let slot = (0x0010..=0x00FF_u16)
            .find(|slot| self.get(Tag(group, *slot)).is_none())
            .context(NoPrivateSlotSnafu { group, creator })?;
        self.put(
            Tag(group, slot),
            Value::new(
                VR::LO,
                PrimitiveValue::Strs(smallvec![creator.trim().to_owned()]),
            ),
        );
        Ok(Tag(group, (slot << 8) | u16::from(offset)))
    }
}

fn parse_numbers<T: FromStr>(tag: Tag, text: &str) -> Result<C<T>> {
    text.split('\\')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().ok().context(ParseNumberSnafu { tag, text: s }))
        .collect()
}

/// Convert the textual form of a value into a primitive of the given VR.
fn text_to_primitive(tag: Tag, vr: VR, text: &str) -> Result<PrimitiveValue> {
    if text.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    Ok(match vr {
        VR::SQ => return IncompatibleVrSnafu { tag, vr }.fail(),
        vr if vr.is_multi_valued_text() => {
            PrimitiveValue::Strs(text.split('\\').map(str::to_owned).collect())
        }
        vr if vr.is_text() => PrimitiveValue::Str(text.to_owned()),
        VR::US | VR::OW => PrimitiveValue::U16(parse_numbers(tag, text)?),
        VR::SS => PrimitiveValue::I16(parse_numbers(tag, text)?),
        VR::UL | VR::OL => PrimitiveValue::U32(parse_numbers(tag, text)?),
        VR::SL => PrimitiveValue::I32(parse_numbers(tag, text)?),
        VR::UV | VR::OV => PrimitiveValue::U64(parse_numbers(tag, text)?),
        VR::SV => PrimitiveValue::I64(parse_numbers(tag, text)?),
        VR::FL | VR::OF => PrimitiveValue::F32(parse_numbers(tag, text)?),
        VR::FD | VR::OD => PrimitiveValue::F64(parse_numbers(tag, text)?),
        VR::AT => PrimitiveValue::Tags(
            text.split('\\')
                .map(|s| {
                    u32::from_str_radix(s.trim(), 16)
                        .ok()
                        .map(Tag::from_key)
                        .context(ParseNumberSnafu { tag, text: s })
                })
                .collect::<Result<_>>()?,
        ),
        _ => PrimitiveValue::U8(text.as_bytes().into()),
    })
}

/// Format a decimal string in at most 16 characters.
pub(crate) fn format_ds(v: f64) -> String {
    let s = v.to_string();
    if s.len() <= 16 {
        s
    } else {
        format!("{:.8e}", v)
    }
}

/// Convert numbers into a primitive of the given VR.
fn numbers_to_primitive(tag: Tag, vr: VR, values: &[f64]) -> Result<PrimitiveValue> {
    let ints = || values.iter().map(|v| v.round());
    Ok(match vr {
        VR::DS => PrimitiveValue::Strs(values.iter().map(|v| format_ds(*v)).collect()),
        VR::IS => PrimitiveValue::Strs(ints().map(|v| (v as i64).to_string()).collect()),
        VR::US | VR::OW => PrimitiveValue::U16(ints().map(|v| v as u16).collect()),
        VR::SS => PrimitiveValue::I16(ints().map(|v| v as i16).collect()),
        VR::UL | VR::OL => PrimitiveValue::U32(ints().map(|v| v as u32).collect()),
        VR::SL => PrimitiveValue::I32(ints().map(|v| v as i32).collect()),
        VR::UV | VR::OV => PrimitiveValue::U64(ints().map(|v| v as u64).collect()),
        VR::SV => PrimitiveValue::I64(ints().map(|v| v as i64).collect()),
        VR::FL | VR::OF => PrimitiveValue::F32(values.iter().map(|v| *v as f32).collect()),
        VR::FD | VR::OD => PrimitiveValue::F64(values.iter().copied().collect()),
        vr => return IncompatibleVrSnafu { tag, vr }.fail(),
    })
}
