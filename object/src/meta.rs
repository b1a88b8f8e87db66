//! The metadata of a series of files:
//! one attribute item per file, and the index arrays
//! which map each slice of a volume to the file and frame it came from.

use crate::item::Item;
use crate::value::Value;
use dcmstack_core::Tag;
use dcmstack_dictionary_std::tags;

/// A two-dimensional array of indices,
/// with one row per slice and a fixed number of components per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexArray {
    components: usize,
    values: Vec<usize>,
}

impl IndexArray {
    /// Create an empty index array with the given number of components.
    pub fn new(components: usize) -> Self {
        IndexArray {
            components: components.max(1),
            values: Vec::new(),
        }
    }

    /// Create an index array from its values in row-major order.
    /// Trailing values which do not fill a whole row are dropped.
    pub fn from_values(mut values: Vec<usize>, components: usize) -> Self {
        let components = components.max(1);
        values.truncate(values.len() - values.len() % components);
        IndexArray { components, values }
    }

    /// The number of components per slice.
    pub fn components(&self) -> usize {
        self.components
    }

    /// The number of slices.
    pub fn slices(&self) -> usize {
        self.values.len() / self.components
    }

    /// Whether the array holds no slices.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append a slice, which must provide exactly one value per component.
    pub fn push_slice(&mut self, values: &[usize]) {
        debug_assert_eq!(values.len(), self.components);
        self.values.extend_from_slice(values);
    }

    /// The value for the given slice and component.
    pub fn get(&self, slice: usize, component: usize) -> Option<usize> {
        if component >= self.components {
            return None;
        }
        self.values.get(slice * self.components + component).copied()
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[usize] {
        &self.values
    }
}

/// The attributes of every file of a series,
/// plus the mapping from each (slice, component) of a volume
/// to the (file, frame) holding its pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaData {
    items: Vec<Item>,
    file_index: IndexArray,
    frame_index: IndexArray,
}

impl MetaData {
    /// Create metadata from one item per file, without index arrays.
    pub fn new(items: Vec<Item>) -> Self {
        MetaData {
            items,
            file_index: IndexArray::new(1),
            frame_index: IndexArray::new(1),
        }
    }

    /// The number of files.
    pub fn number_of_files(&self) -> usize {
        self.items.len()
    }

    /// The attributes of a file.
    pub fn item(&self, file: usize) -> Option<&Item> {
        self.items.get(file)
    }

    /// The attributes of a file, for modification.
    pub fn item_mut(&mut self, file: usize) -> Option<&mut Item> {
        self.items.get_mut(file)
    }

    /// The attributes of all files.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The number of frames in a file, at least one.
    pub fn number_of_frames(&self, file: usize) -> usize {
        self.item(file)
            .and_then(|item| item.get_int(tags::NUMBER_OF_FRAMES))
            .filter(|n| *n > 0)
            .map_or(1, |n| n as usize)
    }

    /// Replace the index arrays.
    pub fn set_index_arrays(&mut self, file_index: IndexArray, frame_index: IndexArray) {
        self.file_index = file_index;
        self.frame_index = frame_index;
    }

    /// The array of file indices.
    pub fn file_index(&self) -> &IndexArray {
        &self.file_index
    }

    /// The array of frame indices.
    pub fn frame_index(&self) -> &IndexArray {
        &self.frame_index
    }

    /// The number of slices described by the index arrays.
    pub fn number_of_slices(&self) -> usize {
        self.file_index.slices()
    }

    /// The number of components per slice in the index arrays.
    pub fn number_of_components(&self) -> usize {
        self.file_index.components()
    }

    /// The file and frame of a slice component.
    pub fn file_and_frame(&self, slice: usize, component: usize) -> Option<(usize, usize)> {
        Some((
            self.file_index.get(slice, component)?,
            self.frame_index.get(slice, component)?,
        ))
    }

    /// Retrieve an attribute which may be specific to a frame.
    ///
    /// The functional groups of the frame in the per-frame sequence
    /// are searched first, then the shared functional groups,
    /// then the top level of the file and the first item of its sequences.
    pub fn frame_attribute(&self, file: usize, frame: usize, tag: Tag) -> Option<&Value> {
        fn in_groups(groups: &Item, tag: Tag) -> Option<&Value> {
            groups
                .iter()
                .filter_map(|(_, v)| v.items()?.first())
                .find_map(|macro_item| macro_item.get(tag))
        }

        let item = self.item(file)?;
        item.get_item(tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, frame)
            .and_then(|groups| in_groups(groups, tag))
            .or_else(|| {
                item.get_item(tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE, 0)
                    .and_then(|groups| in_groups(groups, tag))
            })
            .or_else(|| item.get(tag))
            .or_else(|| in_groups(item, tag))
    }

    /// Retrieve an attribute for a slice component,
    /// as in [`frame_attribute`](MetaData::frame_attribute).
    pub fn attribute_at(&self, slice: usize, component: usize, tag: Tag) -> Option<&Value> {
        let (file, frame) = self.file_and_frame(slice, component)?;
        self.frame_attribute(file, frame, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagPath;

    #[test]
    fn index_arrays() {
        let mut files = IndexArray::new(2);
        files.push_slice(&[0, 1]);
        files.push_slice(&[2, 3]);
        assert_eq!(files.slices(), 2);
        assert_eq!(files.get(1, 0), Some(2));
        assert_eq!(files.get(1, 2), None);
        assert_eq!(files.get(2, 0), None);

        let array = IndexArray::from_values(vec![1, 2, 3, 4, 5], 2);
        assert_eq!(array.values(), &[1, 2, 3, 4]);
    }

    #[test]
    fn frame_attributes_prefer_per_frame_groups() {
        let mut item = Item::new();
        item.put_path_str(&tags::IMAGE_POSITION_PATIENT.into(), "9\\9\\9")
            .unwrap();
        item.put_path_str(
            &TagPath::nested2(
                tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
                0,
                tags::PLANE_ORIENTATION_SEQUENCE,
                0,
                tags::IMAGE_ORIENTATION_PATIENT,
            ),
            "1\\0\\0\\0\\1\\0",
        )
        .unwrap();
        for frame in 0..2 {
            item.put_path_f64(
                &TagPath::nested2(
                    tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                    frame,
                    tags::PLANE_POSITION_SEQUENCE,
                    0,
                    tags::IMAGE_POSITION_PATIENT,
                ),
                &[0.0, 0.0, 2.0 * frame as f64],
            )
            .unwrap();
        }
        item.put_path_str(&tags::NUMBER_OF_FRAMES.into(), "2").unwrap();

        let mut meta = MetaData::new(vec![item]);
        meta.set_index_arrays(
            IndexArray::from_values(vec![0, 0], 1),
            IndexArray::from_values(vec![0, 1], 1),
        );
        assert_eq!(meta.number_of_frames(0), 2);
        assert_eq!(meta.number_of_slices(), 2);
        assert_eq!(meta.file_and_frame(1, 0), Some((0, 1)));

        let pos = meta
            .attribute_at(1, 0, tags::IMAGE_POSITION_PATIENT)
            .unwrap()
            .to_multi_f64();
        assert_eq!(pos, vec![0.0, 0.0, 2.0]);
        let orientation = meta
            .frame_attribute(0, 1, tags::IMAGE_ORIENTATION_PATIENT)
            .unwrap()
            .to_multi_f64();
        assert_eq!(orientation, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        // a frame without functional groups falls back to the top level
        let pos = meta
            .frame_attribute(0, 5, tags::IMAGE_POSITION_PATIENT)
            .unwrap()
            .to_multi_f64();
        assert_eq!(pos, vec![9.0, 9.0, 9.0]);
    }
}
