//! Support for RLE Lossless image decoding.
//!
//! Each frame is a single fragment made of a 64-byte header,
//! holding the number of segments and their offsets,
//! followed by PackBits-compressed segments.
//! A segment holds one byte of every sample of one component,
//! from the most significant byte down to the least significant one.
use crate::codec::{
    CodecError, ExternalCodec, InvalidRleSnafu, Result, UnexpectedLengthSnafu,
    UnsupportedBitDepthSnafu,
};
use byteordered::byteorder::{ByteOrder, LittleEndian};
use snafu::ensure;

/// The codec for the RLE Lossless transfer syntax (UID `1.2.840.10008.1.2.5`).
///
/// Decoded samples are interleaved by pixel and stored in little endian.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RleLosslessCodec;

impl ExternalCodec for RleLosslessCodec {
    fn decode(&self, compressed: &[u8], bits_allocated: u16, expected_len: usize) -> Result<Vec<u8>> {
        ensure!(
            matches!(bits_allocated, 8 | 16 | 32),
            UnsupportedBitDepthSnafu { bits_allocated }
        );
        let bytes_per_sample = usize::from(bits_allocated / 8);

        let mut offsets = read_rle_header(compressed)?;
        ensure!(
            !offsets.is_empty() && offsets.len() % bytes_per_sample == 0,
            InvalidRleSnafu {
                message: "segment count does not match the bit depth",
            }
        );
        let segments = offsets.len();
        let samples_per_pixel = segments / bytes_per_sample;
        let plane_len = expected_len / segments;
        ensure!(
            plane_len * segments == expected_len,
            InvalidRleSnafu {
                message: "frame length is not a multiple of the segment count",
            }
        );
        offsets.push(compressed.len() as u32);

        let mut dst = vec![0; expected_len];
        for sample in 0..samples_per_pixel {
            for byte in 0..bytes_per_sample {
                // segments go from the most significant byte,
                // samples are stored from the least significant one
                let segment_index = sample * bytes_per_sample + byte;
                let start = offsets[segment_index] as usize;
                let end = offsets[segment_index + 1] as usize;
                ensure!(
                    start <= end && end <= compressed.len(),
                    InvalidRleSnafu {
                        message: "segment offsets out of range",
                    }
                );
                let decoded = unpack_bits(&compressed[start..end], plane_len);
                ensure!(
                    decoded.len() >= plane_len,
                    UnexpectedLengthSnafu {
                        expected: plane_len,
                        got: decoded.len(),
                    }
                );

                let first = sample * bytes_per_sample + (bytes_per_sample - 1 - byte);
                let step = bytes_per_sample * samples_per_pixel;
                for (value, dst_index) in decoded.iter().zip((first..expected_len).step_by(step)) {
                    dst[dst_index] = *value;
                }
            }
        }
        Ok(dst)
    }
}

/// Read the RLE header and return the segment offsets.
fn read_rle_header(fragment: &[u8]) -> Result<Vec<u32>, CodecError> {
    ensure!(
        fragment.len() >= 64,
        InvalidRleSnafu {
            message: "fragment shorter than the RLE header",
        }
    );
    let nr_segments = LittleEndian::read_u32(&fragment[0..4]) as usize;
    ensure!(
        nr_segments <= 15,
        InvalidRleSnafu {
            message: "more than 15 segments",
        }
    );
    let mut offsets = vec![0; nr_segments];
    LittleEndian::read_u32_into(&fragment[4..4 * (nr_segments + 1)], &mut offsets);
    Ok(offsets)
}

/// Decode a PackBits segment, up to `limit` bytes.
///
/// A header byte `n` in 0..=127 copies the next `n + 1` bytes,
/// one in -127..=-1 repeats the next byte `1 - n` times,
/// and -128 is a no-op.
fn unpack_bits(mut data: &[u8], limit: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(limit);
    while let [header, rest @ ..] = data {
        if out.len() >= limit {
            break;
        }
        let h = *header as i8;
        data = rest;
        if h >= 0 {
            let n = (h as usize + 1).min(data.len());
            out.extend_from_slice(&data[..n]);
            data = &data[n..];
        } else if h != -128 {
            if let [value, rest @ ..] = data {
                out.resize(out.len() + (1 - h as isize) as usize, *value);
                data = rest;
            }
        }
    }
    out.truncate(limit);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packbits() {
        let encoded = vec![
            0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7,
            0xAA,
        ];
        let decoded = unpack_bits(&encoded, usize::MAX);

        let expected = vec![
            0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(decoded, expected);
        assert_eq!(unpack_bits(&encoded, 5), &expected[..5]);
    }

    fn rle_fragment(segments: &[&[u8]]) -> Vec<u8> {
        let mut header = vec![0_u8; 64];
        LittleEndian::write_u32(&mut header[0..4], segments.len() as u32);
        let mut offset = 64;
        let mut body = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            LittleEndian::write_u32(&mut header[4 + 4 * i..8 + 4 * i], offset);
            offset += segment.len() as u32;
            body.extend_from_slice(segment);
        }
        header.extend(body);
        header
    }

    #[test]
    fn decode_16_bit_samples() {
        // 4 samples: 0x0102, 0x0102, 0x0304, 0x0506
        let msb: &[u8] = &[0xFF, 0x01, 0x01, 0x03, 0x05];
        let lsb: &[u8] = &[0xFF, 0x02, 0x01, 0x04, 0x06];
        let fragment = rle_fragment(&[msb, lsb]);
        let decoded = RleLosslessCodec.decode(&fragment, 16, 8).unwrap();
        assert_eq!(decoded, vec![0x02, 0x01, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05]);
    }

    #[test]
    fn decode_rgb_samples() {
        let r: &[u8] = &[0x01, 10, 11];
        let g: &[u8] = &[0x01, 20, 21];
        let b: &[u8] = &[0x01, 30, 31];
        let fragment = rle_fragment(&[r, g, b]);
        let decoded = RleLosslessCodec.decode(&fragment, 8, 6).unwrap();
        assert_eq!(decoded, vec![10, 20, 30, 11, 21, 31]);
    }

    #[test]
    fn reject_short_segments() {
        let fragment = rle_fragment(&[&[0x00, 0x01]]);
        assert!(RleLosslessCodec.decode(&fragment, 8, 4).is_err());
        assert!(RleLosslessCodec.decode(&fragment, 12, 4).is_err());
        assert!(RleLosslessCodec.decode(&[0; 10], 8, 4).is_err());
    }
}
