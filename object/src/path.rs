//! Paths to attributes nested in sequences.

use dcmstack_core::smallvec::SmallVec;
use dcmstack_core::Tag;
use std::fmt;

/// A path to an attribute, possibly nested
/// in up to two levels of sequence items.
///
/// Each level is a pair of a sequence tag and an item index,
/// followed by the tag of the attribute itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPath {
    steps: SmallVec<[(Tag, usize); 2]>,
    tag: Tag,
}

impl TagPath {
    /// A path to an attribute at the top level.
    pub fn new(tag: Tag) -> Self {
        TagPath {
            steps: SmallVec::new(),
            tag,
        }
    }

    /// A path to an attribute in the `index`-th item of a sequence.
    pub fn nested(sequence: Tag, index: usize, tag: Tag) -> Self {
        let mut steps = SmallVec::new();
        steps.push((sequence, index));
        TagPath { steps, tag }
    }

    /// A path to an attribute in an item of a sequence
    /// which is itself in an item of another sequence.
    pub fn nested2(sequence: Tag, index: usize, sequence2: Tag, index2: usize, tag: Tag) -> Self {
        let mut steps = SmallVec::new();
        steps.push((sequence, index));
        steps.push((sequence2, index2));
        TagPath { steps, tag }
    }

    /// The (sequence, item index) steps leading to the attribute,
    /// outermost first.
    pub fn steps(&self) -> &[(Tag, usize)] {
        &self.steps
    }

    /// The tag of the attribute at the end of the path.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The number of nested sequence levels.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

impl From<Tag> for TagPath {
    fn from(tag: Tag) -> Self {
        TagPath::new(tag)
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (sequence, index) in &self.steps {
            write!(f, "{}[{}].", sequence, index)?;
        }
        write!(f, "{}", self.tag)
    }
}
