//! Splitting chunk encode/decode across workers.
//!
//! A chunk of `len` bytes starting at bit `offset` is cut into contiguous
//! byte ranges, `len / n` bytes each with the remainder on the last worker.
//! Every inner boundary is then moved forward to the first byte whose bit
//! address starts a fresh carrier cell, so each worker owns a disjoint run
//! of cells and the shared carrier needs no locking. Workers run on a rayon
//! pool and are joined before the call returns.

use std::ops::Range;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::engine::{CellCodec, Cells, CellsMut};
use crate::error::{DecodeError, EncodeError};
use crate::framing::{chunk_end, decode_chunk, encode_chunk};

/// Byte range of a chunk handled by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Bit address of the first byte.
    pub start: u64,
    /// Bytes of the chunk covered by this worker.
    pub bytes: Range<usize>,
}

/// Plans at most `workers` partitions for a chunk of `len` bytes at
/// `offset`, with boundaries aligned to cells of `bits_per_cell` bits.
pub fn plan(offset: u64, len: usize, workers: usize, bits_per_cell: usize) -> Vec<Partition> {
    let workers = workers.clamp(1, len.max(1));
    let per_worker = len / workers;

    let mut bounds = vec![0usize];
    for w in 1..workers {
        let Some(boundary) = align_boundary(offset, w * per_worker, len, bits_per_cell) else {
            continue;
        };
        if boundary > bounds[bounds.len() - 1] && boundary < len {
            bounds.push(boundary);
        }
    }
    bounds.push(len);

    bounds
        .windows(2)
        .map(|pair| Partition {
            start: chunk_end(offset, pair[0]),
            bytes: pair[0]..pair[1],
        })
        .collect()
}

/// First byte at or after `byte` whose bit address starts a cell.
fn align_boundary(offset: u64, byte: usize, len: usize, bits_per_cell: usize) -> Option<usize> {
    let bpc = bits_per_cell.max(1) as u64;
    (byte..len)
        .take(bits_per_cell.max(1))
        .find(|&b| chunk_end(offset, b) % bpc == 0)
}

/// Encodes `bytes` at `offset`, one worker per partition.
///
/// Runs inline when there is a single partition or no pool.
pub fn encode_partitioned<C: CellCodec>(
    cells: CellsMut<'_, C>,
    offset: u64,
    bytes: &[u8],
    partitions: &[Partition],
    pool: Option<&ThreadPool>,
) -> Result<(), EncodeError> {
    let end = chunk_end(offset, bytes.len());
    if end > cells.end() {
        return Err(EncodeError::CarrierTooSmall {
            required: end,
            capacity: cells.end(),
        });
    }

    let mut cells = cells;
    let pool = match pool {
        Some(pool) if partitions.len() > 1 => pool,
        _ => return encode_chunk(&mut cells, offset, bytes),
    };

    let (_, mut rest) = cells.split_at(offset);
    let mut jobs = Vec::with_capacity(partitions.len());
    for (i, part) in partitions.iter().enumerate() {
        if i + 1 == partitions.len() {
            jobs.push((rest, part));
            break;
        }
        let (head, tail) = rest.split_at(chunk_end(offset, part.bytes.end));
        jobs.push((head, part));
        rest = tail;
    }

    pool.install(|| {
        jobs.into_par_iter().try_for_each(|(mut view, part)| {
            encode_chunk(&mut view, part.start, &bytes[part.bytes.clone()])
        })
    })
}

/// Decodes `dest.len()` bytes from `offset`, one worker per partition.
///
/// Runs inline when there is a single partition or no pool.
pub fn decode_partitioned<C: CellCodec>(
    cells: Cells<'_, C>,
    offset: u64,
    dest: &mut [u8],
    partitions: &[Partition],
    pool: Option<&ThreadPool>,
) -> Result<(), DecodeError> {
    let end = chunk_end(offset, dest.len());
    if end > cells.end() {
        return Err(DecodeError::Truncated {
            needed: end,
            capacity: cells.end(),
        });
    }

    let pool = match pool {
        Some(pool) if partitions.len() > 1 => pool,
        _ => return decode_chunk(cells, offset, dest),
    };

    let mut jobs = Vec::with_capacity(partitions.len());
    let mut rest = dest;
    for part in partitions {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(part.bytes.len());
        jobs.push((head, part.start));
        rest = tail;
    }

    pool.install(|| {
        jobs.into_par_iter()
            .try_for_each(|(slice, start)| decode_chunk(cells, start, slice))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::Carrier;
    use crate::config::{DctParams, LsbParams};
    use crate::engine::{DctEngine, Embedder, LsbEngine};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn pool(threads: usize) -> ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
    }

    fn payload(len: usize, seed: u64) -> Vec<u8> {
        let mut data = vec![0u8; len];
        ChaCha20Rng::seed_from_u64(seed).fill_bytes(&mut data);
        data
    }

    fn gray(width: u32, height: u32) -> Carrier {
        let samples = (0..width * height * 3).map(|i| (120 + i % 17) as u8).collect();
        Carrier::new(width, height, 3, samples).unwrap()
    }

    fn assert_covers(parts: &[Partition], offset: u64, len: usize) {
        assert_eq!(parts[0].bytes.start, 0);
        assert_eq!(parts[parts.len() - 1].bytes.end, len);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].bytes.end, pair[1].bytes.start);
        }
        for part in parts {
            assert_eq!(part.start, offset + 8 * part.bytes.start as u64);
        }
    }

    #[test]
    fn test_plan_even_split() {
        let parts = plan(0, 4000, 4, 1);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].bytes, 1000..2000);
        assert_covers(&parts, 0, 4000);
    }

    #[test]
    fn test_plan_remainder_goes_to_last() {
        let parts = plan(32, 10_003, 4, 1);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].bytes, 0..2500);
        assert_eq!(parts[3].bytes, 7500..10_003);
        assert_covers(&parts, 32, 10_003);
    }

    #[test]
    fn test_plan_boundaries_start_new_cells() {
        for bpc in 1..=8 {
            let offset = 64 + 8 * 13;
            let parts = plan(offset, 9_999, 5, bpc);
            assert!(parts.len() > 1);
            assert_covers(&parts, offset, 9_999);
            for part in &parts[1..] {
                assert_eq!(part.start % bpc as u64, 0, "bpc {bpc}");
            }
        }
    }

    #[test]
    fn test_plan_tiny_chunks() {
        assert_eq!(plan(0, 3, 8, 1).len(), 3);
        let parts = plan(0, 0, 4, 1);
        assert_eq!(parts, vec![Partition { start: 0, bytes: 0..0 }]);
        assert_eq!(plan(8, 100, 1, 3).len(), 1);
    }

    #[test]
    fn test_lsb_partitioned_encode_is_bit_identical() {
        let data = payload(3_001, 1);
        let offset = 64 + 8 * 7;
        let pool = pool(4);

        for depth in [1u8, 3, 8] {
            let params = LsbParams { depth };
            let mut serial = LsbEngine::new(gray(96, 96), params).unwrap();
            let mut parallel = LsbEngine::new(gray(96, 96), params).unwrap();

            let single = plan(offset, data.len(), 1, depth as usize);
            encode_partitioned(serial.cells_mut(), offset, &data, &single, None).unwrap();

            let parts = plan(offset, data.len(), 4, depth as usize);
            assert_eq!(parts.len(), 4);
            encode_partitioned(parallel.cells_mut(), offset, &data, &parts, Some(&pool)).unwrap();

            assert_eq!(serial.carrier(), parallel.carrier(), "depth {depth}");

            let mut out = vec![0u8; data.len()];
            decode_partitioned(parallel.cells(), offset, &mut out, &parts, Some(&pool)).unwrap();
            assert_eq!(out, data);
        }
    }

    #[test]
    fn test_dct_partitioned_encode_is_bit_identical() {
        let data = payload(80, 2);
        let offset = 32 + 8 * 3;
        let pool = pool(3);
        let params = DctParams {
            swap_count: 3,
            persistence: 8,
            ..DctParams::default()
        };

        let mut serial = DctEngine::new(gray(136, 136), params).unwrap();
        let mut parallel = DctEngine::new(gray(136, 136), params).unwrap();

        let single = plan(offset, data.len(), 1, 3);
        encode_partitioned(serial.cells_mut(), offset, &data, &single, None).unwrap();
        let parts = plan(offset, data.len(), 3, 3);
        assert_eq!(parts.len(), 3);
        encode_partitioned(parallel.cells_mut(), offset, &data, &parts, Some(&pool)).unwrap();

        let mut out = vec![0u8; data.len()];
        decode_partitioned(parallel.cells(), offset, &mut out, &parts, Some(&pool)).unwrap();
        assert_eq!(out, data);

        assert_eq!(serial.into_carrier(), parallel.into_carrier());
    }

    #[test]
    fn test_partitioned_encode_checks_capacity_first() {
        let original = gray(8, 8);
        let mut engine = LsbEngine::new(original.clone(), LsbParams { depth: 1 }).unwrap();
        let data = payload(40, 3);
        let parts = plan(0, data.len(), 2, 1);
        let result = encode_partitioned(engine.cells_mut(), 0, &data, &parts, Some(&pool(2)));
        assert!(matches!(result, Err(EncodeError::CarrierTooSmall { .. })));
        assert_eq!(engine.carrier(), &original);
    }

    #[test]
    fn test_partitioned_decode_past_end_is_truncated() {
        let engine = LsbEngine::new(gray(8, 8), LsbParams { depth: 1 }).unwrap();
        let mut out = vec![0u8; 40];
        let parts = plan(0, out.len(), 2, 1);
        assert!(matches!(
            decode_partitioned(engine.cells(), 0, &mut out, &parts, None),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
