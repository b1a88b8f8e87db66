//! Spatial and temporal ordering of the frames of a series.
//!
//! The sorter fills the index arrays of the [`MetaData`],
//! which map each slice component to a file and frame.

use crate::error::{Result, SortingFailureSnafu};
use crate::options::ReadOptions;
use dcmstack_core::chrono::Timelike;
use dcmstack_dictionary_std::tags;
use dcmstack_object::{IndexArray, MetaData};
use snafu::ensure;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Frames whose locations differ by no more than this are at the same location.
const LOCATION_TOLERANCE: f64 = 1e-3;

/// The outcome of ordering the frames of a series.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SliceOrder {
    /// The stack identifiers of the series, in order of appearance.
    pub stack_ids: Vec<String>,
    /// The number of time points, zero if there is no time dimension.
    pub time_points: usize,
    /// The distance between slices.
    pub slice_spacing: f64,
    /// The time between time points.
    pub time_spacing: f64,
}

#[derive(Debug, Clone)]
struct FrameKey {
    file: usize,
    frame: usize,
    position: Option<[f64; 3]>,
    stack_id: Option<String>,
    temporal: Option<f64>,
    trigger_time: Option<f64>,
    instance: i64,
    location: f64,
}

impl FrameKey {
    fn read(meta: &MetaData, file: usize, frame: usize) -> Self {
        let attribute = |tag| meta.frame_attribute(file, frame, tag);
        let position: Option<[f64; 3]> = attribute(tags::IMAGE_POSITION_PATIENT)
            .map(|v| v.to_multi_f64())
            .and_then(|v| v.get(0..3).and_then(|p| p.try_into().ok()));
        let stack_id = attribute(tags::STACK_ID)
            .map(|v| v.to_str().trim().to_string())
            .filter(|s| !s.is_empty());
        let trigger_time = attribute(tags::TRIGGER_TIME).and_then(|v| v.to_f64());
        let temporal = attribute(tags::TEMPORAL_POSITION_INDEX)
            .and_then(|v| v.to_f64())
            .or_else(|| attribute(tags::TEMPORAL_POSITION_IDENTIFIER).and_then(|v| v.to_f64()))
            .or(trigger_time)
            .or_else(|| {
                let time = attribute(tags::ACQUISITION_TIME)?.primitive()?.to_naive_time()?;
                Some(
                    f64::from(time.num_seconds_from_midnight())
                        + f64::from(time.nanosecond()) * 1e-9,
                )
            });
        let instance = meta
            .item(file)
            .and_then(|item| item.get_int(tags::INSTANCE_NUMBER))
            .unwrap_or(0);
        FrameKey {
            file,
            frame,
            position,
            stack_id,
            temporal,
            trigger_time,
            instance,
            location: 0.,
        }
    }

    fn time_order(&self, other: &FrameKey) -> Ordering {
        let (a, b) = (
            self.temporal.unwrap_or(f64::NEG_INFINITY),
            other.temporal.unwrap_or(f64::NEG_INFINITY),
        );
        a.total_cmp(&b).then(self.instance.cmp(&other.instance))
    }
}

fn slice_spacing_attribute(meta: &MetaData) -> f64 {
    [tags::SPACING_BETWEEN_SLICES, tags::SLICE_THICKNESS]
        .into_iter()
        .filter_map(|tag| meta.attribute_at(0, 0, tag)?.to_f64())
        .find(|s| *s > 0.)
        .unwrap_or(1.)
}

fn mean_step(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    if values.len() < 2 {
        return None;
    }
    let (first, last) = (values[0], values[values.len() - 1]);
    let step = ((last - first) / (values.len() - 1) as f64).abs();
    Some(step).filter(|s| *s > 0.)
}

/// Keep the files in the given order,
/// each frame of a file becoming one slice.
pub(crate) fn pass_through(meta: &mut MetaData) -> SliceOrder {
    let mut files = IndexArray::new(1);
    let mut frames = IndexArray::new(1);
    for file in 0..meta.number_of_files() {
        for frame in 0..meta.number_of_frames(file) {
            files.push_slice(&[file]);
            frames.push_slice(&[frame]);
        }
    }
    meta.set_index_arrays(files, frames);
    SliceOrder {
        stack_ids: Vec::new(),
        time_points: 0,
        slice_spacing: slice_spacing_attribute(meta),
        time_spacing: 1.,
    }
}

/// Order the frames of all files by location and time.
///
/// `reverse_slices` puts the locations in descending order.
pub(crate) fn sort_slices(
    meta: &mut MetaData,
    options: &ReadOptions,
    reverse_slices: bool,
) -> Result<SliceOrder> {
    let view: &MetaData = meta;
    let mut keys: Vec<FrameKey> = (0..view.number_of_files())
        .flat_map(|file| (0..view.number_of_frames(file)).map(move |frame| (file, frame)))
        .map(|(file, frame)| FrameKey::read(view, file, frame))
        .collect();
    ensure!(
        !keys.is_empty(),
        SortingFailureSnafu {
            message: "no frames to sort"
        }
    );

    // stacks in order of appearance
    let mut stacks: Vec<Option<String>> = Vec::new();
    for key in &keys {
        if !stacks.contains(&key.stack_id) {
            stacks.push(key.stack_id.clone());
        }
    }
    let stack_ids: Vec<String> = stacks.iter().flatten().cloned().collect();

    let selected = match &options.desired_stack_id {
        Some(id) if stacks.iter().any(|s| s.as_deref() == Some(id.as_str())) => Some(id.clone()),
        Some(id) => {
            warn!("Stack {} not found, reading the first stack", id);
            stacks[0].clone()
        }
        None => stacks[0].clone(),
    };
    if stacks.len() > 1 {
        debug!("Series has {} stacks, selected {:?}", stacks.len(), selected);
    }
    keys.retain(|k| k.stack_id == selected);

    // the stacks of a series may differ in orientation
    let normal = view
        .frame_attribute(keys[0].file, keys[0].frame, tags::IMAGE_ORIENTATION_PATIENT)
        .map(|v| v.to_multi_f64())
        .filter(|o| o.len() == 6)
        .map(|o| {
            [
                o[1] * o[5] - o[2] * o[4],
                o[2] * o[3] - o[0] * o[5],
                o[0] * o[4] - o[1] * o[3],
            ]
        });
    let spatial = normal.is_some() && keys.iter().all(|k| k.position.is_some());

    if let (true, Some(n)) = (spatial, normal) {
        for key in &mut keys {
            if let Some(p) = key.position {
                key.location = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            }
        }
        keys.sort_by(|a, b| a.location.total_cmp(&b.location).then(a.time_order(b)));
    } else {
        debug!("Frames without position, sorting by instance number");
        keys.sort_by_key(|k| k.instance);
        for (i, key) in keys.iter_mut().enumerate() {
            key.location = i as f64;
        }
    }

    // group frames by location
    let mut groups: Vec<Vec<FrameKey>> = Vec::new();
    for key in keys {
        let start = groups.last().map(|g: &Vec<FrameKey>| g[0].location);
        match (start, groups.last_mut()) {
            (Some(start), Some(group)) if (key.location - start).abs() <= LOCATION_TOLERANCE => {
                group.push(key);
            }
            _ => groups.push(vec![key]),
        }
    }
    if reverse_slices {
        groups.reverse();
    }
    for group in &mut groups {
        group.sort_by(|a, b| a.time_order(b));
    }

    let first_len = groups[0].len();
    let time_points = if first_len > 1 && groups.iter().all(|g| g.len() == first_len) {
        first_len
    } else {
        0
    };
    if time_points == 0 && groups.iter().any(|g| g.len() > 1) {
        warn!("Locations have differing numbers of frames, reading them as separate slices");
    }

    let slice_spacing = mean_step(groups.iter().map(|g| g[0].location))
        .unwrap_or_else(|| slice_spacing_attribute(meta));
    let time_spacing = if time_points > 0 {
        groups[0]
            .iter()
            .map(|k| k.trigger_time)
            .collect::<Option<Vec<f64>>>()
            .and_then(mean_step)
            .unwrap_or(1.)
    } else {
        1.
    };

    let components = if time_points > 0 && options.time_as_vector && options.desired_time_index.is_none() {
        time_points
    } else {
        1
    };
    let mut files = IndexArray::new(components);
    let mut frames = IndexArray::new(components);
    let mut push = |keys: &[&FrameKey]| {
        let f: Vec<usize> = keys.iter().map(|k| k.file).collect();
        let fr: Vec<usize> = keys.iter().map(|k| k.frame).collect();
        files.push_slice(&f);
        frames.push_slice(&fr);
    };

    match (time_points, options.desired_time_index) {
        (0, _) => {
            for key in groups.iter().flatten() {
                push(&[key]);
            }
        }
        (t, Some(index)) => {
            let index = if index >= t {
                warn!("Time index {} out of range, reading the last of {}", index, t);
                t - 1
            } else {
                index
            };
            for group in &groups {
                push(&[&group[index]]);
            }
        }
        (_, None) if options.time_as_vector => {
            for group in &groups {
                let keys: Vec<&FrameKey> = group.iter().collect();
                push(&keys);
            }
        }
        (t, None) => {
            for time in 0..t {
                for group in &groups {
                    push(&[&group[time]]);
                }
            }
        }
    }
    meta.set_index_arrays(files, frames);

    Ok(SliceOrder {
        stack_ids,
        time_points,
        slice_spacing,
        time_spacing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmstack_object::{Item, TagPath};

    fn frame_item(z: f64, instance: i64, trigger: Option<f64>, stack: Option<&str>) -> Item {
        let mut item = Item::new();
        item.put_path_f64(&tags::IMAGE_POSITION_PATIENT.into(), &[0., 0., z])
            .unwrap();
        item.put_path_f64(
            &tags::IMAGE_ORIENTATION_PATIENT.into(),
            &[1., 0., 0., 0., 1., 0.],
        )
        .unwrap();
        item.put_path_f64(&tags::INSTANCE_NUMBER.into(), &[instance as f64])
            .unwrap();
        if let Some(t) = trigger {
            item.put_path_f64(&tags::TRIGGER_TIME.into(), &[t]).unwrap();
        }
        if let Some(stack) = stack {
            let path = TagPath::nested(tags::FRAME_CONTENT_SEQUENCE, 0, tags::STACK_ID);
            item.put_path_str(&path, stack).unwrap();
        }
        item
    }

    fn files_of(meta: &MetaData) -> Vec<usize> {
        meta.file_index().values().to_vec()
    }

    #[test]
    fn sorts_by_location() {
        let mut meta = MetaData::new(vec![
            frame_item(10., 1, None, None),
            frame_item(0., 2, None, None),
            frame_item(5., 3, None, None),
        ]);
        let order = sort_slices(&mut meta, &ReadOptions::new(), false).unwrap();
        assert_eq!(files_of(&meta), [1, 2, 0]);
        assert_eq!(order.time_points, 0);
        assert!((order.slice_spacing - 5.).abs() < 1e-9);
        assert!(order.stack_ids.is_empty());

        sort_slices(&mut meta, &ReadOptions::new(), true).unwrap();
        assert_eq!(files_of(&meta), [0, 2, 1]);
    }

    #[test]
    fn time_points_are_time_major_or_vectors() {
        let items = vec![
            frame_item(0., 1, Some(0.), None),
            frame_item(0., 2, Some(40.), None),
            frame_item(2., 3, Some(0.), None),
            frame_item(2., 4, Some(40.), None),
        ];
        let mut meta = MetaData::new(items.clone());
        let order = sort_slices(&mut meta, &ReadOptions::new(), false).unwrap();
        assert_eq!(order.time_points, 2);
        assert!((order.time_spacing - 40.).abs() < 1e-9);
        assert_eq!(files_of(&meta), [0, 2, 1, 3]);

        let mut meta = MetaData::new(items.clone());
        sort_slices(&mut meta, &ReadOptions::new().time_as_vector(true), false).unwrap();
        assert_eq!(meta.number_of_components(), 2);
        assert_eq!(files_of(&meta), [0, 1, 2, 3]);

        let mut meta = MetaData::new(items);
        sort_slices(&mut meta, &ReadOptions::new().desired_time_index(Some(1)), false).unwrap();
        assert_eq!(files_of(&meta), [1, 3]);
    }

    #[test]
    fn stacks_are_partitioned() {
        let mut meta = MetaData::new(vec![
            frame_item(5., 1, None, Some("2")),
            frame_item(0., 2, None, Some("1")),
            frame_item(0., 3, None, Some("2")),
            frame_item(5., 4, None, Some("1")),
        ]);
        let order = sort_slices(&mut meta, &ReadOptions::new(), false).unwrap();
        assert_eq!(order.stack_ids, ["2", "1"]);
        assert_eq!(files_of(&meta), [2, 0]);

        let options = ReadOptions::new().desired_stack_id(Some("1".into()));
        sort_slices(&mut meta, &options, false).unwrap();
        assert_eq!(files_of(&meta), [1, 3]);
    }

    #[test]
    fn stacks_are_sorted_along_their_own_normal() {
        let sagittal = |x: f64, instance: i64| {
            let mut item = frame_item(0., instance, None, Some("2"));
            item.put_path_f64(&tags::IMAGE_POSITION_PATIENT.into(), &[x, 0., 0.])
                .unwrap();
            item.put_path_f64(
                &tags::IMAGE_ORIENTATION_PATIENT.into(),
                &[0., 1., 0., 0., 0., -1.],
            )
            .unwrap();
            item
        };
        let mut meta = MetaData::new(vec![
            frame_item(0., 1, None, Some("1")),
            frame_item(5., 2, None, Some("1")),
            sagittal(10., 3),
            sagittal(5., 4),
            sagittal(0., 5),
        ]);
        let options = ReadOptions::new().desired_stack_id(Some("2".into()));
        let order = sort_slices(&mut meta, &options, false).unwrap();
        // the normal of the sagittal stack points along -x
        assert_eq!(files_of(&meta), [2, 3, 4]);
        assert_eq!(order.time_points, 0);
        assert!((order.slice_spacing - 5.).abs() < 1e-9);

        let order = sort_slices(&mut meta, &ReadOptions::new(), false).unwrap();
        assert_eq!(files_of(&meta), [0, 1]);
        assert_eq!(order.time_points, 0);
    }

    #[test]
    fn pass_through_keeps_file_order() {
        let mut meta = MetaData::new(vec![
            frame_item(10., 1, None, None),
            frame_item(0., 2, None, None),
        ]);
        let order = pass_through(&mut meta);
        assert_eq!(files_of(&meta), [0, 1]);
        assert_eq!(order.slice_spacing, 1.);
    }
}
