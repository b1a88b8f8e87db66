use crate::tags::{ENTRIES, PRIVATE_ENTRIES};
use dcmstack_core::dictionary::{DataDictionary, DictEntryRef, TagRange::*, VirtualVr, VM};
use dcmstack_core::header::Tag;
use dcmstack_core::VR;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::{Display, Formatter};

static DICT: Lazy<StandardDataDictionaryRegistry> = Lazy::new(init_dictionary);

/// Retrieve a singleton instance of the standard dictionary registry.
///
/// Note that one does not generally have to call this
/// unless when retrieving the underlying registry is important.
/// The unit type [`StandardDataDictionary`]
/// already provides a lazy loaded singleton implementing the necessary traits.
#[inline]
pub fn registry() -> &'static StandardDataDictionaryRegistry {
    &DICT
}

/// The data struct actually containing the standard dictionary.
///
/// This structure is made opaque via the unit type [`StandardDataDictionary`],
/// which provides a lazy loaded singleton.
#[derive(Debug)]
pub struct StandardDataDictionaryRegistry {
    /// mapping: name → entry
    by_name: HashMap<&'static str, &'static DictEntryRef<'static>>,
    /// mapping: tag → entry
    by_tag: HashMap<Tag, &'static DictEntryRef<'static>>,
    /// mapping: creator → (group, block offset) → entry
    by_private: HashMap<&'static str, HashMap<(u16, u16), &'static DictEntryRef<'static>>>,
    /// repeating elements of the form (ggxx, eeee). The `xx` portion is zeroed.
    repeating_ggxx: HashSet<Tag>,
    /// repeating elements of the form (gggg, eexx). The `xx` portion is zeroed.
    repeating_eexx: HashSet<Tag>,
}

impl StandardDataDictionaryRegistry {
    fn new() -> StandardDataDictionaryRegistry {
        StandardDataDictionaryRegistry {
            by_name: HashMap::with_capacity(ENTRIES.len()),
            by_tag: HashMap::with_capacity(ENTRIES.len()),
            by_private: HashMap::new(),
            repeating_ggxx: HashSet::new(),
            repeating_eexx: HashSet::new(),
        }
    }

    /// record the given dictionary entry reference
    fn index(&mut self, entry: &'static DictEntryRef<'static>) -> &mut Self {
        self.by_name.insert(entry.alias, entry);
        self.by_tag.insert(entry.tag.inner(), entry);
        match entry.tag {
            Group100(tag) => {
                self.repeating_ggxx.insert(tag);
            }
            Element100(tag) => {
                self.repeating_eexx.insert(tag);
            }
            _ => {}
        }
        self
    }

    /// record the given private dictionary entry reference
    fn index_private(&mut self, creator: &'static str, entry: &'static DictEntryRef<'static>) {
        let tag = entry.tag.inner();
        self.by_private
            .entry(creator)
            .or_default()
            .insert((tag.0, tag.1 & 0x00FF), entry);
    }
}

/// Generic Group Length dictionary entry.
static GROUP_LENGTH_ENTRY: DictEntryRef<'static> = DictEntryRef {
    tag: GroupLength,
    alias: "GenericGroupLength",
    vr: VirtualVr::Exact(VR::UL),
    vm: VM::ONE,
    retired: false,
};

/// Generic Private Creator dictionary entry.
static PRIVATE_CREATOR_ENTRY: DictEntryRef<'static> = DictEntryRef {
    tag: PrivateCreator,
    alias: "PrivateCreator",
    vr: VirtualVr::Exact(VR::LO),
    vm: VM::ONE,
    retired: false,
};

/// An attribute dictionary which consults
/// the library's global attribute registry.
///
/// This is the type which would generally be used
/// whenever an attribute dictionary is needed,
/// such as when reading files.
///
/// The dictionary index is automatically initialized upon the first use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardDataDictionary;

impl StandardDataDictionary {
    fn indexed_tag(tag: Tag) -> Option<&'static DictEntryRef<'static>> {
        let r = registry();

        r.by_tag
            .get(&tag)
            .or_else(|| {
                // check tags repeating in different groups
                let group_trimmed = Tag(tag.0 & 0xFF00, tag.1);
                if r.repeating_ggxx.contains(&group_trimmed) {
                    return r.by_tag.get(&group_trimmed);
                }
                // check tags repeating in different elements
                let elem_trimmed = Tag(tag.0, tag.1 & 0xFF00);
                if r.repeating_eexx.contains(&elem_trimmed) {
                    return r.by_tag.get(&elem_trimmed);
                }

                None
            })
            .cloned()
            .or_else(|| {
                // check for private creator
                if tag.is_private_creator() {
                    return Some(&PRIVATE_CREATOR_ENTRY);
                }
                // check for group length
                if tag.element() == 0x0000 {
                    return Some(&GROUP_LENGTH_ENTRY);
                }

                None
            })
    }

    fn indexed_private_tag(tag: Tag, creator: &str) -> Option<&'static DictEntryRef<'static>> {
        if tag.is_private_creator() || tag.element() == 0 {
            return StandardDataDictionary::indexed_tag(tag);
        }
        let creator = creator.trim_end_matches([' ', '\0']);
        registry()
            .by_private
            .get(creator)
            .and_then(|block| block.get(&(tag.0, tag.1 & 0x00FF)))
            .copied()
    }
}

impl DataDictionary for StandardDataDictionary {
    type Entry = DictEntryRef<'static>;

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        registry().by_name.get(name).cloned()
    }

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        StandardDataDictionary::indexed_tag(tag)
    }

    fn by_private_tag(&self, tag: Tag, creator: &str) -> Option<&Self::Entry> {
        StandardDataDictionary::indexed_private_tag(tag, creator)
    }
}

impl Display for StandardDataDictionary {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str("Standard Attribute Dictionary")
    }
}

fn init_dictionary() -> StandardDataDictionaryRegistry {
    let mut d = StandardDataDictionaryRegistry::new();
    for entry in ENTRIES {
        d.index(entry);
    }
    for (creator, entry) in PRIVATE_ENTRIES {
        d.index_private(creator, entry);
    }
    // generic group length is not a table entry,
    // inserting it manually
    d.by_name.insert("GenericGroupLength", &GROUP_LENGTH_ENTRY);
    d
}
