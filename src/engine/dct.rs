//! DCT coefficient-swap embedding.
//!
//! Each 8×8 block of one carrier channel holds up to [`MAX_SWAP_COUNT`] bits.
//! A bit is stored in the relative order of a coefficient pair: `low < high`
//! means `1`, anything else means `0`. After ordering, the pair is pushed
//! apart by `persistence` so the order survives moderate requantization.
//!
//! Per block visit:
//! 1. level shift (subtract 128)
//! 2. forward DCT
//! 3. divide pair values by their quantization weights (only with `quantize`)
//! 4. order and separate each pair in the requested slots
//! 5. multiply back (only with `quantize`)
//! 6. inverse DCT, shift back (+128), round and clamp to 0..=255
//! 7. re-read every slot up to the last one written
//!
//! If rounding flipped any pair, the visit restarts from the original block
//! with all slots ordered at two, three, ... times `persistence`, up to
//! eight times. A working block therefore always holds 8-bit sample values,
//! and what the engine reads in memory is what a decoder reads from the
//! saved carrier.
//!
//! Extraction runs steps 1-3 and compares. Exact equality reads as `0`; the
//! encoder never leaves a tie when writing `1`.
//!
//! Blocks are visited in row-major order. The last partial 8-pixel strip on
//! the right and bottom edges is never used.

use crate::capacity::dct_block_grid;
use crate::carrier::Carrier;
use crate::config::{DctParams, COLOR_CHANNELS, MAX_SWAP_COUNT};
use crate::error::ConfigError;
use crate::transform::{forward_dct, inverse_dct, Block};

use super::{CellCodec, Cells, CellsMut, Embedder};

/// Coefficient positions `((row, col) low, (row, col) high)` for each swap
/// slot, in natural order within the block.
pub const COEFFICIENT_PAIRS: [((usize, usize), (usize, usize)); MAX_SWAP_COUNT] = [
    ((1, 2), (3, 1)),
    ((2, 1), (1, 3)),
    ((0, 3), (2, 2)),
    ((3, 0), (1, 4)),
];

/// JPEG (Annex K) luminance quantization table, natural order.
pub const QUANT_WEIGHTS: [f64; 64] = [
    16.0, 11.0, 10.0, 16.0, 24.0, 40.0, 51.0, 61.0, //
    12.0, 12.0, 14.0, 19.0, 26.0, 58.0, 60.0, 55.0, //
    14.0, 13.0, 16.0, 24.0, 40.0, 57.0, 69.0, 56.0, //
    14.0, 17.0, 22.0, 29.0, 51.0, 87.0, 80.0, 62.0, //
    18.0, 22.0, 37.0, 56.0, 68.0, 109.0, 103.0, 77.0, //
    24.0, 35.0, 55.0, 64.0, 81.0, 104.0, 113.0, 92.0, //
    49.0, 64.0, 78.0, 87.0, 103.0, 121.0, 120.0, 101.0, //
    72.0, 92.0, 95.0, 98.0, 112.0, 100.0, 103.0, 99.0,
];

const LEVEL_SHIFT: f64 = 128.0;

/// Margin multiples tried before a block is left at the widest one.
const MAX_ATTEMPTS: usize = 8;

/// Puts `low` and `high` in the order encoding `bit`, then separates them
/// by `persistence` in that direction.
pub fn order_pair(low: &mut f64, high: &mut f64, bit: bool, persistence: f64) {
    if *low == *high {
        let half = persistence / 2.0;
        if bit {
            *low -= half;
            *high += half;
        } else {
            *low += half;
            *high -= half;
        }
    } else if (*low < *high) != bit {
        std::mem::swap(low, high);
    }

    if *low < *high {
        *low -= persistence;
        *high += persistence;
    } else {
        *low += persistence;
        *high -= persistence;
    }
}

/// Bit encoded by an ordered pair.
pub fn read_pair(low: f64, high: f64) -> bool {
    low < high
}

/// Pair swapper for one 8×8 block.
#[derive(Debug, Clone, Copy)]
pub struct DctCodec {
    swap_count: usize,
    persistence: f64,
    quantize: bool,
}

impl DctCodec {
    fn pair_indices(slot: usize) -> (usize, usize) {
        let ((lr, lc), (hr, hc)) = COEFFICIENT_PAIRS[slot];
        (lr * 8 + lc, hr * 8 + hc)
    }

    fn weights(&self, lo: usize, hi: usize) -> (f64, f64) {
        if self.quantize {
            (QUANT_WEIGHTS[lo], QUANT_WEIGHTS[hi])
        } else {
            (1.0, 1.0)
        }
    }

    /// Orders slots `first..wanted.len()` of `original` with the given
    /// margin and returns the block rounded to 8-bit samples.
    fn ordered(&self, original: &Block, first: usize, wanted: &[bool], persistence: f64) -> Block {
        let mut coeffs = Self::coefficients(original);
        for (slot, &bit) in wanted.iter().enumerate().skip(first) {
            let (lo, hi) = Self::pair_indices(slot);
            let (w_lo, w_hi) = self.weights(lo, hi);
            let mut low = coeffs[lo] / w_lo;
            let mut high = coeffs[hi] / w_hi;
            order_pair(&mut low, &mut high, bit, persistence);
            coeffs[lo] = low * w_lo;
            coeffs[hi] = high * w_hi;
        }

        let mut block = inverse_dct(&coeffs);
        for sample in block.iter_mut() {
            *sample = (*sample + LEVEL_SHIFT).round().clamp(0.0, 255.0);
        }
        block
    }

    fn coefficients(block: &Block) -> Block {
        let mut shifted = [0.0f64; 64];
        for (dst, &sample) in shifted.iter_mut().zip(block.iter()) {
            *dst = sample - LEVEL_SHIFT;
        }
        forward_dct(&shifted)
    }
}

impl CellCodec for DctCodec {
    type Cell = Block;

    fn bits_per_cell(&self) -> usize {
        self.swap_count
    }

    fn embed(&self, block: &mut Block, slot: usize, bits: &[bool]) {
        let end = slot + bits.len();
        let mut wanted = [false; MAX_SWAP_COUNT];
        self.extract(block, 0, &mut wanted[..slot]);
        wanted[slot..end].copy_from_slice(bits);

        let original = *block;
        let mut first = slot;
        for attempt in 1..=MAX_ATTEMPTS {
            let persistence = self.persistence * attempt as f64;
            *block = self.ordered(&original, first, &wanted[..end], persistence);

            let mut read = [false; MAX_SWAP_COUNT];
            self.extract(block, 0, &mut read[..end]);
            if read[..end] == wanted[..end] {
                return;
            }
            // Rounding flipped a pair; reorder every slot with a wider margin.
            first = 0;
        }
    }

    fn extract(&self, block: &Block, slot: usize, bits: &mut [bool]) {
        let coeffs = Self::coefficients(block);

        for (slot, bit) in (slot..).zip(bits.iter_mut()) {
            let (lo, hi) = Self::pair_indices(slot);
            let (w_lo, w_hi) = self.weights(lo, hi);
            *bit = read_pair(coeffs[lo] / w_lo, coeffs[hi] / w_hi);
        }
    }
}

/// DCT engine owning its carrier for the duration of an operation.
#[derive(Debug)]
pub struct DctEngine {
    codec: DctCodec,
    params: DctParams,
    carrier: Carrier,
    blocks: Vec<Block>,
    blocks_per_row: usize,
    dirty: bool,
}

impl DctEngine {
    pub fn new(carrier: Carrier, params: DctParams) -> Result<Self, ConfigError> {
        if !(1..=MAX_SWAP_COUNT).contains(&params.swap_count) {
            return Err(ConfigError::InvalidSwapCount(params.swap_count));
        }
        if params.persistence == 0 {
            return Err(ConfigError::InvalidPersistence(params.persistence));
        }
        let channels = carrier.channels().min(COLOR_CHANNELS);
        if params.channel >= channels {
            return Err(ConfigError::InvalidChannel {
                channel: params.channel,
                channels,
            });
        }

        let (blocks_per_row, blocks_per_col) = dct_block_grid(carrier.rows(), carrier.cols());
        let mut blocks = Vec::with_capacity(blocks_per_row * blocks_per_col);
        for br in 0..blocks_per_col {
            for bc in 0..blocks_per_row {
                let mut block = [0.0f64; 64];
                for (i, value) in block.iter_mut().enumerate() {
                    let sample = carrier.sample(br * 8 + i / 8, bc * 8 + i % 8, params.channel);
                    *value = sample as f64;
                }
                blocks.push(block);
            }
        }

        Ok(Self {
            codec: DctCodec {
                swap_count: params.swap_count,
                persistence: params.persistence as f64,
                quantize: params.quantize,
            },
            params,
            carrier,
            blocks,
            blocks_per_row,
            dirty: false,
        })
    }

    /// Number of usable blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Writes the working blocks back into the carrier and releases it.
    pub fn into_carrier(mut self) -> Carrier {
        if self.dirty {
            self.flush();
        }
        self.carrier
    }

    fn flush(&mut self) {
        let channel = self.params.channel;
        for (index, block) in self.blocks.iter().enumerate() {
            let br = index / self.blocks_per_row;
            let bc = index % self.blocks_per_row;
            for (i, &value) in block.iter().enumerate() {
                self.carrier.set_sample(br * 8 + i / 8, bc * 8 + i % 8, channel, value as u8);
            }
        }
        self.dirty = false;
    }
}

impl Embedder for DctEngine {
    type Codec = DctCodec;

    fn capacity(&self) -> u64 {
        (self.blocks.len() * self.params.swap_count) as u64
    }

    fn cells(&self) -> Cells<'_, DctCodec> {
        Cells::new(&self.codec, &self.blocks)
    }

    fn cells_mut(&mut self) -> CellsMut<'_, DctCodec> {
        self.dirty = true;
        CellsMut::new(&self.codec, &mut self.blocks)
    }
}
