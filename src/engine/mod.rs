//! Embedding engines and the bit-addressed view they expose.
//!
//! Both techniques store bits in *cells*: an LSB cell is one 8-bit channel
//! sample holding `depth` bits, a DCT cell is one 8×8 block holding
//! `swap_count` bits. A bit address `a` lives in cell `a / bits_per_cell` at
//! slot `a % bits_per_cell`. Engines expose their cells through [`Cells`] and
//! [`CellsMut`], which the framing and partitioning layers work on without
//! knowing which technique is active.

pub mod dct;
pub mod lsb;

pub use dct::DctEngine;
pub use lsb::LsbEngine;

use crate::error::{DecodeError, EncodeError};

/// Upper bound on `bits_per_cell` across techniques.
pub const MAX_BITS_PER_CELL: usize = 8;

/// Per-cell embedding primitive of a technique.
pub trait CellCodec: Sync {
    type Cell: Send + Sync;

    /// Number of addressable bits held by one cell.
    fn bits_per_cell(&self) -> usize;

    /// Writes `bits` into consecutive slots of `cell`, starting at `slot`.
    fn embed(&self, cell: &mut Self::Cell, slot: usize, bits: &[bool]);

    /// Reads `bits.len()` consecutive slots of `cell`, starting at `slot`.
    fn extract(&self, cell: &Self::Cell, slot: usize, bits: &mut [bool]);
}

/// An engine owning a carrier in cell form.
pub trait Embedder {
    type Codec: CellCodec;

    /// Total addressable bits.
    fn capacity(&self) -> u64;

    fn cells(&self) -> Cells<'_, Self::Codec>;

    fn cells_mut(&mut self) -> CellsMut<'_, Self::Codec>;
}

/// Read-only view over a contiguous run of cells.
pub struct Cells<'a, C: CellCodec> {
    codec: &'a C,
    cells: &'a [C::Cell],
    first_cell: usize,
}

impl<C: CellCodec> Clone for Cells<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: CellCodec> Copy for Cells<'_, C> {}

impl<'a, C: CellCodec> Cells<'a, C> {
    pub fn new(codec: &'a C, cells: &'a [C::Cell]) -> Self {
        Self {
            codec,
            cells,
            first_cell: 0,
        }
    }

    pub fn bits_per_cell(&self) -> usize {
        self.codec.bits_per_cell()
    }

    /// One past the last bit address covered by this view.
    pub fn end(&self) -> u64 {
        ((self.first_cell + self.cells.len()) * self.bits_per_cell()) as u64
    }

    /// Reads `count` bits starting at `start`, passing each bit and its
    /// index relative to `start` to `sink`.
    pub fn read_bits<F>(&self, start: u64, count: u64, mut sink: F) -> Result<(), DecodeError>
    where
        F: FnMut(u64, bool),
    {
        let end = start + count;
        if start < self.begin() || end > self.end() {
            return Err(DecodeError::Truncated {
                needed: end,
                capacity: self.end(),
            });
        }

        let bpc = self.bits_per_cell() as u64;
        let mut buf = [false; MAX_BITS_PER_CELL];
        let mut address = start;
        while address < end {
            let slot = (address % bpc) as usize;
            let len = ((bpc - slot as u64).min(end - address)) as usize;
            let cell = &self.cells[(address / bpc) as usize - self.first_cell];

            self.codec.extract(cell, slot, &mut buf[..len]);
            for (i, &bit) in buf[..len].iter().enumerate() {
                sink(address - start + i as u64, bit);
            }
            address += len as u64;
        }
        Ok(())
    }

    fn begin(&self) -> u64 {
        (self.first_cell * self.bits_per_cell()) as u64
    }
}

/// Mutable view over a contiguous run of cells.
///
/// Views produced by [`CellsMut::split_at`] never share a cell, so they can
/// be handed to different threads.
pub struct CellsMut<'a, C: CellCodec> {
    codec: &'a C,
    cells: &'a mut [C::Cell],
    first_cell: usize,
}

impl<'a, C: CellCodec> CellsMut<'a, C> {
    pub fn new(codec: &'a C, cells: &'a mut [C::Cell]) -> Self {
        Self {
            codec,
            cells,
            first_cell: 0,
        }
    }

    pub fn bits_per_cell(&self) -> usize {
        self.codec.bits_per_cell()
    }

    /// One past the last bit address covered by this view.
    pub fn end(&self) -> u64 {
        ((self.first_cell + self.cells.len()) * self.bits_per_cell()) as u64
    }

    pub fn as_cells(&self) -> Cells<'_, C> {
        Cells {
            codec: self.codec,
            cells: &*self.cells,
            first_cell: self.first_cell,
        }
    }

    /// Writes `bits` to consecutive addresses starting at `start` and
    /// returns how many were written.
    pub fn write_bits<I>(&mut self, start: u64, bits: I) -> Result<u64, EncodeError>
    where
        I: IntoIterator<Item = bool>,
    {
        let bpc = self.bits_per_cell() as u64;
        let end = self.end();
        let mut bits = bits.into_iter().peekable();
        let mut buf = [false; MAX_BITS_PER_CELL];
        let mut address = start;

        while bits.peek().is_some() {
            let slot = (address % bpc) as usize;
            let mut len = 0;
            while len < bpc as usize - slot {
                match bits.next() {
                    Some(bit) => {
                        buf[len] = bit;
                        len += 1;
                    }
                    None => break,
                }
            }

            let cell_index = (address / bpc) as usize;
            let cell = cell_index
                .checked_sub(self.first_cell)
                .and_then(|local| self.cells.get_mut(local))
                .ok_or(EncodeError::CarrierTooSmall {
                    required: address + len as u64,
                    capacity: end,
                })?;

            self.codec.embed(cell, slot, &buf[..len]);
            address += len as u64;
        }

        Ok(address - start)
    }

    /// Splits the view at a cell-aligned bit address.
    ///
    /// The address is rounded down to its cell and clamped to the view.
    pub fn split_at(self, address: u64) -> (CellsMut<'a, C>, CellsMut<'a, C>) {
        let cell = (address / self.bits_per_cell() as u64) as usize;
        let local = cell.saturating_sub(self.first_cell).min(self.cells.len());
        let codec = self.codec;
        let first_cell = self.first_cell;
        let (head, tail) = self.cells.split_at_mut(local);
        (
            CellsMut {
                codec,
                cells: head,
                first_cell,
            },
            CellsMut {
                codec,
                cells: tail,
                first_cell: first_cell + local,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cell of three bits, one bool per slot.
    struct Triple;

    impl CellCodec for Triple {
        type Cell = [bool; 3];

        fn bits_per_cell(&self) -> usize {
            3
        }

        fn embed(&self, cell: &mut [bool; 3], slot: usize, bits: &[bool]) {
            cell[slot..slot + bits.len()].copy_from_slice(bits);
        }

        fn extract(&self, cell: &[bool; 3], slot: usize, bits: &mut [bool]) {
            let len = bits.len();
            bits.copy_from_slice(&cell[slot..slot + len]);
        }
    }

    #[test]
    fn test_write_then_read_unaligned() {
        let mut cells = vec![[false; 3]; 5];
        let mut view = CellsMut::new(&Triple, &mut cells);
        assert_eq!(view.end(), 15);

        let pattern = [true, false, true, true, false, true, true];
        assert_eq!(view.write_bits(2, pattern).unwrap(), 7);

        let mut read = vec![false; 7];
        view.as_cells()
            .read_bits(2, 7, |i, bit| read[i as usize] = bit)
            .unwrap();
        assert_eq!(read, pattern);
        assert_eq!(cells[0], [false, false, true]);
        assert_eq!(cells[3], [false; 3]);
    }

    #[test]
    fn test_write_past_end_fails() {
        let mut cells = vec![[false; 3]; 2];
        let mut view = CellsMut::new(&Triple, &mut cells);
        let result = view.write_bits(4, [true; 3]);
        assert!(matches!(
            result,
            Err(EncodeError::CarrierTooSmall { capacity: 6, .. })
        ));
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let cells = vec![[false; 3]; 2];
        let view = Cells::new(&Triple, &cells);
        let result = view.read_bits(4, 3, |_, _| {});
        assert!(matches!(
            result,
            Err(DecodeError::Truncated { needed: 7, capacity: 6 })
        ));
    }

    #[test]
    fn test_split_views_keep_absolute_addresses() {
        let mut cells = vec![[false; 3]; 4];
        let view = CellsMut::new(&Triple, &mut cells);
        let (mut head, mut tail) = view.split_at(6);
        assert_eq!(head.end(), 6);
        assert_eq!(tail.end(), 12);

        tail.write_bits(6, [true, true, true, true]).unwrap();
        head.write_bits(0, [true]).unwrap();
        assert!(tail.write_bits(3, [true]).is_err());

        assert_eq!(cells[0], [true, false, false]);
        assert_eq!(cells[2], [true; 3]);
        assert_eq!(cells[3], [true, false, false]);
    }
}
