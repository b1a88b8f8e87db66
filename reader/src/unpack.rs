//! Expansion of packed sample bit depths.
//!
//! Samples of 12 bits are stored two in three bytes,
//! samples of 1 bit eight in a byte.
//! Both are expanded to whole bytes in little endian order.

/// The number of packed bytes which hold `samples` samples of 12 bits.
pub fn packed_12_bit_len(samples: usize) -> usize {
    (samples * 3 + 1) / 2
}

/// The number of packed bytes which hold `samples` samples of 1 bit.
pub fn packed_1_bit_len(samples: usize) -> usize {
    (samples + 7) / 8
}

/// Expand 12-bit samples to 16 bits each.
///
/// `out` receives two bytes per sample, in little endian order.
/// Samples which are not covered by `packed` are set to zero.
pub fn unpack_12_bit(packed: &[u8], out: &mut [u8]) {
    let samples = out.len() / 2;
    let mut words = out.chunks_exact_mut(4);
    let mut triples = packed.chunks(3);
    for pair in words.by_ref() {
        let (v1, v2) = match triples.next() {
            Some(&[a1, a2, a3]) => {
                let v1 = (u16::from(a1) << 4) | u16::from(a2 & 0x0f);
                let v2 = (u16::from(a3 & 0x0f) << 8) | u16::from(a2 & 0xf0) | u16::from(a3 >> 4);
                (v1, v2)
            }
            Some(&[a1, a2]) => ((u16::from(a1) << 4) | u16::from(a2 & 0x0f), 0),
            Some(&[a1]) => (u16::from(a1) << 4, 0),
            _ => (0, 0),
        };
        pair[..2].copy_from_slice(&v1.to_le_bytes());
        pair[2..].copy_from_slice(&v2.to_le_bytes());
    }
    // odd number of samples
    let rest = words.into_remainder();
    if rest.len() >= 2 && samples % 2 == 1 {
        let v = match triples.next() {
            Some(&[a1, a2, ..]) => (u16::from(a1) << 4) | u16::from(a2 & 0x0f),
            Some(&[a1]) => u16::from(a1) << 4,
            _ => 0,
        };
        rest[..2].copy_from_slice(&v.to_le_bytes());
    }
}

/// Expand 1-bit samples to one byte each, least significant bit first.
pub fn unpack_1_bit(packed: &[u8], out: &mut [u8]) {
    for (i, sample) in out.iter_mut().enumerate() {
        *sample = packed
            .get(i / 8)
            .map_or(0, |byte| (byte >> (i % 8)) & 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_12_bit(values: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        for pair in values.chunks(2) {
            let v1 = pair[0];
            let v2 = pair.get(1).copied().unwrap_or(0);
            out.push((v1 >> 4) as u8);
            out.push(((v1 & 0x0f) | (v2 & 0xf0)) as u8);
            out.push((((v2 >> 8) & 0x0f) | ((v2 & 0x0f) << 4)) as u8);
        }
        out.truncate(packed_12_bit_len(values.len()));
        out
    }

    #[test]
    fn packed_lengths() {
        assert_eq!(packed_12_bit_len(2), 3);
        assert_eq!(packed_12_bit_len(3), 5);
        assert_eq!(packed_12_bit_len(100), 150);
        assert_eq!(packed_1_bit_len(8), 1);
        assert_eq!(packed_1_bit_len(9), 2);
    }

    #[test]
    fn unpack_12_bit_table() {
        let values: Vec<u16> = (0..100u16).map(|i| (i * 41 + 7) % 4096).collect();
        let packed = pack_12_bit(&values);
        assert_eq!(packed.len(), 150);
        let mut out = vec![0xff; 200];
        unpack_12_bit(&packed, &mut out);
        let unpacked: Vec<u16> = out
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(unpacked, values);
    }

    #[test]
    fn unpack_12_bit_odd_count() {
        let values = [0xabc, 0x123, 0xfff];
        let packed = pack_12_bit(&values);
        let mut out = vec![0; 6];
        unpack_12_bit(&packed, &mut out);
        assert_eq!(out, [0xbc, 0x0a, 0x23, 0x01, 0xff, 0x0f]);
    }

    #[test]
    fn unpack_1_bit_lsb_first() {
        let mut out = vec![9; 10];
        unpack_1_bit(&[0b1000_0101, 0b10], &mut out);
        assert_eq!(out, [1, 0, 1, 0, 0, 0, 0, 1, 0, 1]);
    }
}
