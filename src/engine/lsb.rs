//! LSB (Least Significant Bit) embedding.
//!
//! Bits replace the lowest `depth` bit planes of every channel sample, in
//! raster order: row-major, then channel, then plane 0..depth. The bit
//! address of plane `p` of channel `c` at pixel `(row, col)` is
//! `((row * cols + col) * channels + c) * depth + p`.

use crate::bits::BitAccess;
use crate::capacity::lsb_capacity;
use crate::carrier::Carrier;
use crate::config::LsbParams;
use crate::error::ConfigError;

use super::{CellCodec, Cells, CellsMut, Embedder};

/// Plane writer for one channel sample.
#[derive(Debug, Clone, Copy)]
pub struct LsbCodec {
    depth: usize,
}

impl CellCodec for LsbCodec {
    type Cell = u8;

    fn bits_per_cell(&self) -> usize {
        self.depth
    }

    fn embed(&self, sample: &mut u8, slot: usize, bits: &[bool]) {
        for (plane, &bit) in (slot..).zip(bits) {
            sample.set_bit(plane as u32, bit);
        }
    }

    fn extract(&self, sample: &u8, slot: usize, bits: &mut [bool]) {
        for (plane, bit) in (slot..).zip(bits.iter_mut()) {
            *bit = sample.get_bit(plane as u32);
        }
    }
}

/// LSB engine owning its carrier for the duration of an operation.
#[derive(Debug)]
pub struct LsbEngine {
    codec: LsbCodec,
    params: LsbParams,
    carrier: Carrier,
}

impl LsbEngine {
    pub fn new(carrier: Carrier, params: LsbParams) -> Result<Self, ConfigError> {
        if !(1..=8).contains(&params.depth) {
            return Err(ConfigError::InvalidDepth(params.depth));
        }
        Ok(Self {
            codec: LsbCodec {
                depth: params.depth as usize,
            },
            params,
            carrier,
        })
    }

    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    pub fn into_carrier(self) -> Carrier {
        self.carrier
    }
}

impl Embedder for LsbEngine {
    type Codec = LsbCodec;

    fn capacity(&self) -> u64 {
        lsb_capacity(
            self.carrier.rows(),
            self.carrier.cols(),
            self.carrier.channels(),
            &self.params,
        )
    }

    fn cells(&self) -> Cells<'_, LsbCodec> {
        Cells::new(&self.codec, self.carrier.samples())
    }

    fn cells_mut(&mut self) -> CellsMut<'_, LsbCodec> {
        CellsMut::new(&self.codec, self.carrier.samples_mut())
    }
}
