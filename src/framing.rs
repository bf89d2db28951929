//! Length-prefixed chunk framing.
//!
//! A chunk is a 32-bit length followed by that many bytes. Bit `i` of the
//! length is stored at `offset + i`; bit `j` of byte `b` is stored at
//! `offset + b * 8 + j`. Encode and decode visit addresses in the same
//! order.
//!
//! Layout of an embedded file, starting at bit 0:
//!
//! ```text
//! [filename length: 32][filename: 8*n][payload length: 32][payload: 8*m]
//! ```

use crate::bits::{byte_bits, BitAccess};
use crate::engine::{CellCodec, Cells, CellsMut};
use crate::error::{DecodeError, EncodeError};
use crate::LENGTH_BITS;

/// Writes a chunk length at `offset`.
pub fn encode_length<C: CellCodec>(
    cells: &mut CellsMut<'_, C>,
    offset: u64,
    length: u32,
) -> Result<(), EncodeError> {
    cells.write_bits(offset, (0..u32::WIDTH).map(|i| length.get_bit(i)))?;
    Ok(())
}

/// Reads a chunk length at `offset`.
///
/// A length of zero, or one not below `capacity`, cannot describe real
/// data and is rejected as [`DecodeError::InvalidLength`].
pub fn decode_length<C: CellCodec>(
    cells: Cells<'_, C>,
    offset: u64,
    capacity: u64,
) -> Result<u32, DecodeError> {
    let mut length = 0u32;
    cells.read_bits(offset, LENGTH_BITS, |i, bit| length.set_bit(i as u32, bit))?;

    if length == 0 || u64::from(length) >= capacity {
        return Err(DecodeError::InvalidLength { length, capacity });
    }
    Ok(length)
}

/// Writes the bytes of a chunk starting at `offset`.
pub fn encode_chunk<C: CellCodec>(
    cells: &mut CellsMut<'_, C>,
    offset: u64,
    bytes: &[u8],
) -> Result<(), EncodeError> {
    cells.write_bits(offset, byte_bits(bytes))?;
    Ok(())
}

/// Fills `dest` with chunk bytes read from `offset`.
pub fn decode_chunk<C: CellCodec>(
    cells: Cells<'_, C>,
    offset: u64,
    dest: &mut [u8],
) -> Result<(), DecodeError> {
    dest.fill(0);
    cells.read_bits(offset, 8 * dest.len() as u64, |i, bit| {
        dest[(i / 8) as usize].set_bit((i % 8) as u32, bit);
    })
}

/// First address after a chunk of `len` bytes starting at `offset`.
pub fn chunk_end(offset: u64, len: usize) -> u64 {
    offset + 8 * len as u64
}
