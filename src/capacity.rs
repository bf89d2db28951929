//! Capacity accounting.
//!
//! Capacity is the number of addressable bits a carrier offers under a
//! technique. For LSB that is one bit per plane per channel sample. For DCT
//! it is one coefficient-pair decision per swap slot per block; the last
//! partial 8-pixel strip in each direction is never used, so every block
//! lies fully inside the image.

use crate::carrier::Carrier;
use crate::config::{DctParams, LsbParams, Technique};
use crate::{HEADER_BITS, LENGTH_BITS};

/// Blocks used per row and per column for a `cols`×`rows` image.
pub fn dct_block_grid(rows: usize, cols: usize) -> (usize, usize) {
    let blocks_per_row = cols.saturating_sub(8) / 8;
    let blocks_per_col = rows.saturating_sub(8) / 8;
    (blocks_per_row, blocks_per_col)
}

/// LSB capacity in bits.
pub fn lsb_capacity(rows: usize, cols: usize, channels: usize, params: &LsbParams) -> u64 {
    (rows * cols * channels) as u64 * params.depth as u64
}

/// DCT capacity in coefficient-pair decisions.
pub fn dct_capacity(rows: usize, cols: usize, params: &DctParams) -> u64 {
    let (per_row, per_col) = dct_block_grid(rows, cols);
    (per_row * per_col * params.swap_count) as u64
}

/// Capacity of `carrier` under `technique`.
pub fn capacity(carrier: &Carrier, technique: &Technique) -> u64 {
    match technique {
        Technique::Lsb(p) => lsb_capacity(carrier.rows(), carrier.cols(), carrier.channels(), p),
        Technique::Dct(p) => dct_capacity(carrier.rows(), carrier.cols(), p),
    }
}

/// Bits needed to store a filename and a payload with their length fields.
pub fn required_bits(filename_len: usize, payload_len: usize) -> u64 {
    HEADER_BITS + 8 * (filename_len as u64 + payload_len as u64)
}

/// Largest payload (in bytes) that fits alongside a filename of
/// `filename_len` bytes.
pub fn max_payload_len(capacity: u64, filename_len: usize) -> u64 {
    capacity
        .saturating_sub(HEADER_BITS + 8 * filename_len as u64)
        / 8
}

/// First bit address of the payload length field.
pub fn payload_length_offset(filename_len: usize) -> u64 {
    LENGTH_BITS + 8 * filename_len as u64
}
