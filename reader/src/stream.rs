//! Reading pixel data from files into the memory layout of a volume.
//!
//! Each file is opened once per request.
//! Native samples are read straight into the output when the layouts agree,
//! otherwise frames go through a scratch buffer
//! where they are unpacked, decoded, swapped and rescaled
//! before being scattered into place.

use crate::error::{
    DecodeFrameSnafu, DecodedSizeSnafu, FragmentLayoutSnafu, MissingCodecSnafu, OpenFileSnafu,
    ReadPixelDataSnafu, Result, TruncatedSnafu,
};
use crate::transform::Rescale;
use crate::unpack::{packed_12_bit_len, packed_1_bit_len, unpack_12_bit, unpack_1_bit};
use crate::volume::{FileEntry, Sample, ScalarType, VolumeInfo};
use byteorder::{ByteOrder, LittleEndian};
use dcmstack_dictionary_std::tags;
use dcmstack_transfer_syntax_registry::CodecRegistry;
use snafu::{ensure, OptionExt, ResultExt};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// The item tag of a fragment.
const ITEM: (u16, u16) = (0xFFFE, 0xE000);
/// The end of a fragment sequence.
const SEQUENCE_DELIMITER: (u16, u16) = (0xFFFE, 0xE0DD);

/// One frame of a file, and where it goes in the volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    /// The slice, relative to the first slice of the output.
    pub slice: usize,
    /// The component in the index arrays.
    pub component: usize,
    /// The frame in the file.
    pub frame: usize,
}

/// Reads the pixel data of the files of a volume.
#[derive(Debug)]
pub(crate) struct SliceStreamer<'a> {
    info: &'a VolumeInfo,
    codecs: &'a CodecRegistry,
}

impl<'a> SliceStreamer<'a> {
    pub fn new(info: &'a VolumeInfo, codecs: &'a CodecRegistry) -> Self {
        SliceStreamer { info, codecs }
    }

    fn samples_per_frame(&self) -> usize {
        self.info.rows * self.info.columns * self.info.packed_components * self.info.planar_components
    }

    /// The size of a frame once expanded to whole samples.
    fn frame_size(&self) -> usize {
        self.samples_per_frame() * self.info.scalar_type.size()
    }

    /// Whether a frame can be copied into a slice as it is.
    fn layout_matches(&self) -> bool {
        self.info.meta.number_of_components() == 1
            && self.info.planar_components == 1
            && !self.info.row_order.is_bottom_up()
    }

    /// Read the frames of one file into `out`,
    /// which starts at the first slice of the request.
    pub fn read_file(&self, file: usize, targets: &[Target], out: &mut [u8]) -> Result<()> {
        let entry = &self.info.files[file];
        debug!(
            "Reading {} frames of {}",
            targets.len(),
            entry.path.display()
        );
        let mut source = File::open(&entry.path).context(OpenFileSnafu {
            filename: &entry.path,
        })?;

        if entry.transfer_syntax.is_encapsulated() {
            let blob = read_blob(&mut source, entry, entry.file_size)?;
            let fragments = parse_fragments(&blob, &entry.path)?;
            let frames = group_fragments(fragments, self.info.meta.number_of_frames(file), &entry.path)?;
            for target in targets {
                let compressed = frames.get(target.frame).map(Vec::as_slice).unwrap_or_default();
                let frame = self.decode_frame(entry, target.frame, compressed)?;
                self.place_frame(entry, frame, cfg!(target_endian = "big"), *target, out);
            }
            return Ok(());
        }

        let stored_big_endian = entry.transfer_syntax.swaps_pixel_bytes();
        let swap = stored_big_endian != cfg!(target_endian = "big");
        match self.info.bits_allocated {
            1 | 12 => {
                let frames = self.info.meta.number_of_frames(file);
                let samples = self.samples_per_frame() * frames;
                let packed_len = if self.info.bits_allocated == 1 {
                    packed_1_bit_len(samples)
                } else {
                    packed_12_bit_len(samples)
                };
                let end = entry.pixel_data.offset + packed_len as u64;
                let blob = read_blob(&mut source, entry, end)?;
                let mut expanded = vec![0; samples * self.info.scalar_type.size()];
                if self.info.bits_allocated == 1 {
                    unpack_1_bit(&blob, &mut expanded);
                } else {
                    unpack_12_bit(&blob, &mut expanded);
                }
                let frame_size = self.frame_size();
                for target in targets {
                    let start = target.frame * frame_size;
                    let frame = expanded[start..start + frame_size].to_vec();
                    self.place_frame(entry, frame, cfg!(target_endian = "big"), *target, out);
                }
                if blob.len() < packed_len {
                    return TruncatedSnafu {
                        filename: &entry.path,
                        missing: (packed_len - blob.len()) as u64,
                    }
                    .fail();
                }
                Ok(())
            }
            _ => {
                for target in targets {
                    self.read_native_frame(&mut source, entry, swap, *target, out)?;
                }
                Ok(())
            }
        }
    }

    /// Read a frame of uncompressed whole samples.
    fn read_native_frame(
        &self,
        source: &mut File,
        entry: &FileEntry,
        swap: bool,
        target: Target,
        out: &mut [u8],
    ) -> Result<()> {
        let frame_size = self.frame_size();
        let start = entry.pixel_data.offset + (target.frame * frame_size) as u64;
        let end = (entry.pixel_data.offset + entry.pixel_data.length).min(entry.file_size);
        let available = end.saturating_sub(start).min(frame_size as u64) as usize;
        source
            .seek(SeekFrom::Start(start))
            .context(ReadPixelDataSnafu {
                filename: &entry.path,
            })?;

        // the file may have shrunk since its size was taken
        let read = if self.layout_matches() {
            let slice_size = self.info.slice_size();
            let dest = &mut out[target.slice * slice_size..][..frame_size];
            let read = read_available(&mut *source, &mut dest[..available]).context(
                ReadPixelDataSnafu {
                    filename: &entry.path,
                },
            )?;
            self.convert_in_place(entry, target.frame, &mut dest[..read], swap);
            read
        } else {
            let mut frame = vec![0; frame_size];
            let read = read_available(&mut *source, &mut frame[..available]).context(
                ReadPixelDataSnafu {
                    filename: &entry.path,
                },
            )?;
            self.place_frame(entry, frame, swap, target, out);
            read
        };

        ensure!(
            read == frame_size,
            TruncatedSnafu {
                filename: &entry.path,
                missing: (frame_size - read) as u64,
            }
        );
        Ok(())
    }

    fn decode_frame(&self, entry: &FileEntry, frame: usize, compressed: &[u8]) -> Result<Vec<u8>> {
        let codec = self
            .codecs
            .get(&entry.transfer_syntax_uid)
            .context(MissingCodecSnafu {
                filename: &entry.path,
                transfer_syntax: &entry.transfer_syntax_uid,
            })?;
        let expected = self.frame_size();
        let decoded = codec
            .decode(compressed, self.info.bits_allocated, expected)
            .context(DecodeFrameSnafu {
                filename: &entry.path,
                frame,
            })?;
        ensure!(
            decoded.len() == expected,
            DecodedSizeSnafu {
                filename: &entry.path,
                frame,
                actual: decoded.len(),
                expected,
            }
        );
        Ok(decoded)
    }

    /// Swap and rescale the samples of a frame in place.
    fn convert_in_place(&self, entry: &FileEntry, frame: usize, data: &mut [u8], swap: bool) {
        let size = self.info.scalar_type.size();
        if swap && size > 1 {
            for sample in data.chunks_exact_mut(size) {
                sample.reverse();
            }
        }
        if self.info.needs_rescale && entry.pixel_data.tag == tags::PIXEL_DATA {
            let relative = entry.rescale(frame).relative_to(&self.info.rescale);
            if !relative.is_identity() {
                trace!(
                    "Rescaling frame {} of {} with {:?}",
                    frame,
                    entry.path.display(),
                    relative
                );
                rescale_in_place(data, self.info.scalar_type, relative);
            }
        }
    }

    /// Convert a frame and copy it into its slice component.
    fn place_frame(&self, entry: &FileEntry, mut frame: Vec<u8>, swap: bool, target: Target, out: &mut [u8]) {
        self.convert_in_place(entry, target.frame, &mut frame, swap);

        let slice_size = self.info.slice_size();
        let dest = &mut out[target.slice * slice_size..][..slice_size];
        if self.layout_matches() {
            dest.copy_from_slice(&frame);
            return;
        }

        let (rows, columns) = (self.info.rows, self.info.columns);
        let (packed, planar) = (self.info.packed_components, self.info.planar_components);
        let samples_per_pixel = packed * planar;
        let total = self.info.components();
        let size = self.info.scalar_type.size();
        let bottom_up = self.info.row_order.is_bottom_up();
        for row in 0..rows {
            let out_row = if bottom_up { rows - 1 - row } else { row };
            for column in 0..columns {
                let pixel = row * columns + column;
                let out_pixel = out_row * columns + column;
                for sample in 0..samples_per_pixel {
                    let src = if planar > 1 {
                        sample * rows * columns + pixel
                    } else {
                        pixel * samples_per_pixel + sample
                    };
                    let dst = out_pixel * total + target.component * samples_per_pixel + sample;
                    dest[dst * size..][..size].copy_from_slice(&frame[src * size..][..size]);
                }
            }
        }
    }
}

/// Read into `buf` until it is full or the source ends,
/// returning the number of bytes read.
fn read_available<R: Read>(mut source: R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read the pixel data value of a file up to `end`,
/// or up to the end of the file if it is shorter.
fn read_blob(source: &mut File, entry: &FileEntry, end: u64) -> Result<Vec<u8>> {
    let start = entry.pixel_data.offset;
    let end = end.min(entry.file_size);
    let mut blob = Vec::with_capacity(end.saturating_sub(start) as usize);
    source
        .seek(SeekFrom::Start(start))
        .context(ReadPixelDataSnafu {
            filename: &entry.path,
        })?;
    source
        .take(end.saturating_sub(start))
        .read_to_end(&mut blob)
        .context(ReadPixelDataSnafu {
            filename: &entry.path,
        })?;
    Ok(blob)
}

/// The basic offset table and the fragments of encapsulated pixel data.
#[derive(Debug, PartialEq)]
pub(crate) struct Fragments<'a> {
    pub offsets: Vec<u32>,
    /// Each fragment with its position after the offset table.
    pub fragments: Vec<(u32, &'a [u8])>,
}

/// Split encapsulated pixel data into its items.
pub(crate) fn parse_fragments<'a>(data: &'a [u8], filename: &Path) -> Result<Fragments<'a>> {
    let mut offsets = Vec::new();
    let mut fragments = Vec::new();
    let mut position = 0;
    let mut first = true;
    let mut table_end = 0;
    while position + 8 <= data.len() {
        let group = LittleEndian::read_u16(&data[position..]);
        let element = LittleEndian::read_u16(&data[position + 2..]);
        let length = LittleEndian::read_u32(&data[position + 4..]) as usize;
        if (group, element) == SEQUENCE_DELIMITER {
            return Ok(Fragments { offsets, fragments });
        }
        if (group, element) != ITEM {
            debug!("Unexpected tag ({:04X},{:04X}) in fragments", group, element);
            break;
        }
        let value_start = position + 8;
        let value_end = value_start + length;
        ensure!(
            value_end <= data.len(),
            TruncatedSnafu {
                filename,
                missing: (value_end - data.len()) as u64,
            }
        );
        let value = &data[value_start..value_end];
        if first {
            offsets = value.chunks_exact(4).map(LittleEndian::read_u32).collect();
            table_end = value_end;
            first = false;
        } else {
            fragments.push(((position - table_end) as u32, value));
        }
        position = value_end;
    }
    Ok(Fragments { offsets, fragments })
}

/// Gather the fragments of each frame.
pub(crate) fn group_fragments(
    fragments: Fragments<'_>,
    frames: usize,
    filename: &Path,
) -> Result<Vec<Vec<u8>>> {
    let Fragments { offsets, fragments } = fragments;
    if frames == 1 {
        return Ok(vec![fragments.iter().flat_map(|(_, f)| f.iter().copied()).collect()]);
    }
    if fragments.len() == frames {
        return Ok(fragments.iter().map(|(_, f)| f.to_vec()).collect());
    }
    ensure!(
        offsets.len() == frames,
        FragmentLayoutSnafu {
            filename,
            fragments: fragments.len(),
            frames,
        }
    );
    let mut out = vec![Vec::new(); frames];
    for (position, fragment) in fragments {
        let frame = offsets
            .iter()
            .rposition(|o| *o <= position)
            .context(FragmentLayoutSnafu {
                filename,
                fragments: offsets.len(),
                frames,
            })?;
        out[frame].extend_from_slice(fragment);
    }
    Ok(out)
}

fn rescale_samples<T: Sample>(data: &mut [u8], rescale: Rescale, (low, high): (f64, f64)) {
    let mut samples = vec![T::default(); data.len() / std::mem::size_of::<T>()];
    T::read_into(data, &mut samples);
    for sample in &mut samples {
        let value = sample.to_f64().unwrap_or_default();
        let value = rescale.apply(value).round().clamp(low, high);
        *sample = T::from(value).unwrap_or_default();
    }
    T::write_into(&samples, data);
}

/// Apply a rescale function to native integer samples,
/// rounding and clamping to the range of the type.
pub(crate) fn rescale_in_place(data: &mut [u8], scalar: ScalarType, rescale: Rescale) {
    let Some(range) = scalar.clamp_range() else {
        return;
    };
    match scalar {
        ScalarType::U8 => rescale_samples::<u8>(data, rescale, range),
        ScalarType::I8 => rescale_samples::<i8>(data, rescale, range),
        ScalarType::U16 => rescale_samples::<u16>(data, rescale, range),
        ScalarType::I16 => rescale_samples::<i16>(data, rescale, range),
        ScalarType::U32 => rescale_samples::<u32>(data, rescale, range),
        ScalarType::I32 => rescale_samples::<i32>(data, rescale, range),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(tag: (u16, u16), value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.0.to_le_bytes());
        out.extend_from_slice(&tag.1.to_le_bytes());
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn fragments_grouped_by_offset_table() {
        let table: Vec<u8> = [0u32, 20].iter().flat_map(|o| o.to_le_bytes()).collect();
        let mut data = item(ITEM, &table);
        data.extend(item(ITEM, &[1, 2]));
        data.extend(item(ITEM, &[3, 4]));
        data.extend(item(ITEM, &[5, 6]));
        data.extend(item(SEQUENCE_DELIMITER, &[]));
        let filename = PathBuf::from("multi.dcm");

        let fragments = parse_fragments(&data, &filename).unwrap();
        assert_eq!(fragments.offsets, [0, 20]);
        assert_eq!(fragments.fragments.len(), 3);
        assert_eq!(fragments.fragments[1].0, 10);

        let frames = group_fragments(fragments, 2, &filename).unwrap();
        assert_eq!(frames, [vec![1, 2, 3, 4], vec![5, 6]]);
    }

    #[test]
    fn fragments_without_table() {
        let mut data = item(ITEM, &[]);
        data.extend(item(ITEM, &[1]));
        data.extend(item(ITEM, &[2]));
        let filename = PathBuf::from("single.dcm");
        let fragments = parse_fragments(&data, &filename).unwrap();
        assert_eq!(group_fragments(fragments, 1, &filename).unwrap(), [vec![1, 2]]);

        let fragments = parse_fragments(&data, &filename).unwrap();
        assert!(group_fragments(fragments, 3, &filename).is_err());
    }

    #[test]
    fn truncated_fragment() {
        let mut data = item(ITEM, &[]);
        data.extend(item(ITEM, &[1, 2, 3, 4]));
        data.truncate(data.len() - 2);
        let err = parse_fragments(&data, Path::new("short.dcm")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Truncated);
    }

    #[test]
    fn rescale_rounds_and_clamps() {
        let mut data = vec![0; 6];
        i16::write_into(&[10, -3, 30000], &mut data);
        rescale_in_place(&mut data, ScalarType::I16, Rescale::new(2.0, 0.5));
        let mut out = [0i16; 3];
        i16::read_into(&data, &mut out);
        assert_eq!(out, [21, -6, i16::MAX]);
    }
}
