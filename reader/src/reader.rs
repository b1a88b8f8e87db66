//! The volume reader, which drives a series of files
//! from their attributes to a volume in memory.

use crate::error::{
    AbortedSnafu, BufferSizeSnafu, Error, IllegalValueSnafu, MissingPixelDataSnafu, NoFilesSnafu,
    ParseFileSnafu, Result, SliceRangeSnafu,
};
use crate::geometry::compute_patient_matrix;
use crate::options::ReadOptions;
use crate::slice_sorter::{pass_through, sort_slices};
use crate::stream::{SliceStreamer, Target};
use crate::transform::Rescale;
use crate::validate::{attribute_name, validate};
use crate::volume::{FileEntry, ScalarType, Volume, VolumeInfo};
use dcmstack_dictionary_std::tags;
use dcmstack_object::MetaData;
use dcmstack_parser::{parse_file, ParseOptions};
use snafu::{ensure, OptionExt, ResultExt};
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The stages of reading a volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReaderState {
    Idle,
    ParsingMetadata,
    Sorting,
    Validating,
    GeometryResolved,
    Streaming,
    Done,
    Failed,
}

/// Reads a series of image files as one volume.
///
/// The attributes of all files are read first with [`read_information`],
/// which sorts, validates and resolves the geometry of the volume
/// without touching pixel data.
/// Pixel data is then read with [`read_slices`] into a caller-provided buffer,
/// or all at once with [`read_volume`].
///
/// [`read_information`]: VolumeReader::read_information
/// [`read_slices`]: VolumeReader::read_slices
/// [`read_volume`]: VolumeReader::read_volume
pub struct VolumeReader<'a> {
    options: ReadOptions,
    state: ReaderState,
    abort: Arc<AtomicBool>,
    progress: Option<Box<dyn FnMut(f64) + 'a>>,
}

impl fmt::Debug for VolumeReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeReader")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("abort", &self.abort)
            .field("progress", &self.progress.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for VolumeReader<'_> {
    fn default() -> Self {
        VolumeReader::new(ReadOptions::default())
    }
}

impl<'a> VolumeReader<'a> {
    /// Create a reader with the given options.
    pub fn new(options: ReadOptions) -> Self {
        VolumeReader {
            options,
            state: ReaderState::Idle,
            abort: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    /// The options of the reader.
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// The stage the reader is at.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// A flag which aborts reading when set.
    ///
    /// The flag is polled between files.
    /// An aborted read leaves the slices read so far in the buffer.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Install a callback which receives the fraction of files read.
    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: FnMut(f64) + 'a,
    {
        self.progress = Some(Box::new(callback));
    }

    fn check_abort(&self) -> Result<()> {
        if self.abort.load(Ordering::Relaxed) {
            debug!("Abort requested");
            return AbortedSnafu.fail();
        }
        Ok(())
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.state = ReaderState::Failed;
        }
        result
    }

    /// Read the attributes of the files and resolve the layout of the volume.
    pub fn read_information<P>(&mut self, files: &[P]) -> Result<VolumeInfo>
    where
        P: AsRef<Path>,
    {
        let result = self.read_information_impl(files);
        self.track(result)
    }

    fn read_information_impl<P>(&mut self, files: &[P]) -> Result<VolumeInfo>
    where
        P: AsRef<Path>,
    {
        ensure!(!files.is_empty(), NoFilesSnafu);

        self.state = ReaderState::ParsingMetadata;
        let mut items = Vec::with_capacity(files.len());
        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            self.check_abort()?;
            let path = path.as_ref();
            let parsed = parse_file(path, &ParseOptions::new()).context(ParseFileSnafu)?;
            let pixel_data = parsed
                .pixel_data
                .context(MissingPixelDataSnafu { filename: path })?;
            entries.push(FileEntry {
                path: path.to_owned(),
                transfer_syntax_uid: parsed.transfer_syntax_uid,
                transfer_syntax: parsed.transfer_syntax,
                pixel_data,
                file_size: parsed.file_size,
                rescales: Vec::new(),
            });
            items.push(parsed.dataset);
        }
        let mut meta = MetaData::new(items);

        self.state = ReaderState::Sorting;
        let bottom_up = self.options.memory_row_order.is_bottom_up();
        let order = if self.options.sorting {
            sort_slices(&mut meta, &self.options, bottom_up)?
        } else {
            pass_through(&mut meta)
        };

        self.state = ReaderState::Validating;
        let filenames: Vec<_> = entries.iter().map(|e| e.path.clone()).collect();
        let require_all_files = !self.options.sorting
            || (self.options.desired_time_index.is_none() && order.stack_ids.len() <= 1);
        let format = validate(&meta, &filenames, require_all_files)?;

        let (first_file, first_frame) = meta.file_and_frame(0, 0).unwrap_or((0, 0));
        let first_item = &meta.items()[first_file];
        let signed = first_item
            .get_int(tags::PIXEL_REPRESENTATION)
            .map_or(false, |r| r == 1);
        let pixel_tag = entries[first_file].pixel_data.tag;
        let scalar_type =
            ScalarType::from_pixel_format(format.bits_allocated, signed, pixel_tag).context(
                IllegalValueSnafu {
                    filename: &filenames[first_file],
                    tag: tags::BITS_ALLOCATED,
                    name: attribute_name(tags::BITS_ALLOCATED),
                    value: i64::from(format.bits_allocated),
                },
            )?;

        let planar_configuration = first_item
            .get_int(tags::PLANAR_CONFIGURATION)
            .unwrap_or(0);
        let (packed_components, planar_components) =
            if format.samples_per_pixel > 1 && planar_configuration == 1 {
                (1, format.samples_per_pixel)
            } else {
                (format.samples_per_pixel, 1)
            };

        // column and row spacing
        let mut spacing = [1., 1., order.slice_spacing];
        if let Some(ratio) = meta
            .frame_attribute(first_file, first_frame, tags::PIXEL_ASPECT_RATIO)
            .map(|v| v.to_multi_f64())
            .filter(|r| r.len() == 2 && r[0] > 0. && r[1] > 0.)
        {
            spacing[1] = ratio[0] / ratio[1];
        }
        if let Some(pixel_spacing) = meta
            .frame_attribute(first_file, first_frame, tags::PIXEL_SPACING)
            .map(|v| v.to_multi_f64())
            .filter(|s| s.len() >= 2 && s[0] > 0. && s[1] > 0.)
        {
            spacing[0] = pixel_spacing[1];
            spacing[1] = pixel_spacing[0];
        }

        // rescale parameters of every frame
        for (file, entry) in entries.iter_mut().enumerate() {
            entry.rescales = (0..meta.number_of_frames(file))
                .map(|frame| {
                    let slope = meta
                        .frame_attribute(file, frame, tags::RESCALE_SLOPE)
                        .and_then(|v| v.to_f64());
                    let intercept = meta
                        .frame_attribute(file, frame, tags::RESCALE_INTERCEPT)
                        .and_then(|v| v.to_f64());
                    match (slope, intercept) {
                        (Some(slope), Some(intercept)) if slope != 0. => {
                            Rescale::new(slope, intercept)
                        }
                        _ => Rescale::IDENTITY,
                    }
                })
                .collect();
        }
        let used: Vec<Rescale> = meta
            .file_index()
            .values()
            .iter()
            .zip(meta.frame_index().values())
            .map(|(&file, &frame)| entries[file].rescale(frame))
            .collect();
        let first_rescale = entries[first_file].rescale(first_frame);
        let mismatch = used.iter().any(|r| *r != first_rescale);
        let target = Rescale::new(
            used.iter()
                .map(|r| r.slope)
                .fold(f64::NEG_INFINITY, f64::max),
            used.iter()
                .map(|r| r.intercept)
                .fold(f64::NEG_INFINITY, f64::max),
        );
        let needs_rescale =
            mismatch && self.options.auto_rescale && scalar_type.clamp_range().is_some();
        if mismatch {
            if needs_rescale {
                debug!("Frames differ in rescale parameters, normalizing to {:?}", target);
            } else {
                warn!("Frames differ in rescale parameters, keeping stored values");
            }
        }
        let rescale = if needs_rescale { target } else { first_rescale };

        let patient_matrix = compute_patient_matrix(&meta, format.rows, spacing[1], bottom_up);

        self.state = ReaderState::GeometryResolved;
        Ok(VolumeInfo {
            files: entries,
            meta,
            columns: format.columns,
            rows: format.rows,
            bits_allocated: format.bits_allocated,
            packed_components,
            planar_components,
            scalar_type,
            spacing,
            patient_matrix,
            rescale,
            needs_rescale,
            time_points: order.time_points,
            time_spacing: order.time_spacing,
            row_order: self.options.memory_row_order,
            stack_ids: order.stack_ids,
        })
    }

    /// Read a range of slices into `buffer`,
    /// which must hold at least the size of the slices.
    ///
    /// On failure, the slices read so far stay in the buffer.
    pub fn read_slices(
        &mut self,
        info: &VolumeInfo,
        slices: Range<usize>,
        buffer: &mut [u8],
    ) -> Result<()> {
        let result = self.read_slices_impl(info, slices, buffer);
        self.track(result)
    }

    fn read_slices_impl(
        &mut self,
        info: &VolumeInfo,
        slices: Range<usize>,
        buffer: &mut [u8],
    ) -> Result<()> {
        let total = info.slices();
        ensure!(
            slices.start <= slices.end && slices.end <= total,
            SliceRangeSnafu {
                start: slices.start,
                end: slices.end,
                slices: total
            }
        );
        let required = slices.len() * info.slice_size();
        ensure!(
            buffer.len() >= required,
            BufferSizeSnafu {
                actual: buffer.len(),
                required
            }
        );

        self.state = ReaderState::Streaming;
        // frames grouped by file, in order of first use
        let mut by_file: Vec<(usize, Vec<Target>)> = Vec::new();
        for slice in slices.clone() {
            for component in 0..info.meta.number_of_components() {
                let Some((file, frame)) = info.meta.file_and_frame(slice, component) else {
                    continue;
                };
                let target = Target {
                    slice: slice - slices.start,
                    component,
                    frame,
                };
                match by_file.iter_mut().find(|(f, _)| *f == file) {
                    Some((_, targets)) => targets.push(target),
                    None => by_file.push((file, vec![target])),
                }
            }
        }

        let streamer = SliceStreamer::new(info, &self.options.codecs);
        let count = by_file.len();
        for (done, (file, targets)) in by_file.iter().enumerate() {
            self.check_abort()?;
            streamer.read_file(*file, targets, &mut buffer[..required])?;
            if let Some(progress) = self.progress.as_mut() {
                progress((done + 1) as f64 / count as f64);
            }
        }

        self.state = ReaderState::Done;
        Ok(())
    }

    /// Read all slices of a series into memory.
    pub fn read_volume<P>(&mut self, files: &[P]) -> Result<Volume>
    where
        P: AsRef<Path>,
    {
        let info = self.read_information(files)?;
        let mut data = vec![0; info.volume_size()];
        self.read_slices(&info, 0..info.slices(), &mut data)?;
        Ok(Volume::new(info, data))
    }
}

/// Read a series into memory with the given options.
pub fn read_volume<P>(files: &[P], options: ReadOptions) -> Result<Volume, Error>
where
    P: AsRef<Path>,
{
    VolumeReader::new(options).read_volume(files)
}
