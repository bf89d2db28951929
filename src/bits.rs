//! Single-bit access on unsigned integers.
//!
//! Bit `0` is the least significant bit. The framing layer relies on the
//! index passing through unchanged: bit `i` of a length maps to embedded
//! bit `i`, for every operand width.

/// Read and write the n-th bit of an unsigned integer.
pub trait BitAccess: Copy {
    /// Width of the type in bits.
    const WIDTH: u32;

    /// Returns bit `index` of `self`.
    fn get_bit(self, index: u32) -> bool;

    /// Sets bit `index` of `self` to `bit`, leaving the other bits untouched.
    fn set_bit(&mut self, index: u32, bit: bool);
}

macro_rules! impl_bit_access {
    ($($ty:ty),*) => {
        $(
            impl BitAccess for $ty {
                const WIDTH: u32 = <$ty>::BITS;

                #[inline]
                fn get_bit(self, index: u32) -> bool {
                    debug_assert!(index < Self::WIDTH);
                    (self >> index) & 1 == 1
                }

                #[inline]
                fn set_bit(&mut self, index: u32, bit: bool) {
                    debug_assert!(index < Self::WIDTH);
                    let mask: $ty = 1 << index;
                    if bit {
                        *self |= mask;
                    } else {
                        *self &= !mask;
                    }
                }
            }
        )*
    };
}

impl_bit_access!(u8, u16, u32, u64);

/// Iterates the bits of `bytes`, 8 per byte, least significant bit first.
pub fn byte_bits(bytes: &[u8]) -> impl Iterator<Item = bool> + '_ {
    bytes
        .iter()
        .flat_map(|&byte| (0..u8::WIDTH).map(move |j| byte.get_bit(j)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_idempotent<T: BitAccess + PartialEq + std::fmt::Debug>(values: &[T]) {
        for &value in values {
            for i in 0..T::WIDTH {
                let mut copy = value;
                copy.set_bit(i, value.get_bit(i));
                assert_eq!(copy, value, "bit {i} rewrite changed {value:?}");
            }
        }
    }

    #[test]
    fn test_get_bit() {
        assert!(0b0000_0001u8.get_bit(0));
        assert!(!0b0000_0001u8.get_bit(1));
        assert!(0x8000u16.get_bit(15));
        assert!(0x8000_0000u32.get_bit(31));
        assert!(!0x8000_0000u32.get_bit(30));
    }

    #[test]
    fn test_set_bit() {
        let mut v = 0u8;
        v.set_bit(3, true);
        assert_eq!(v, 0b0000_1000);
        v.set_bit(3, false);
        assert_eq!(v, 0);

        let mut w = u32::MAX;
        w.set_bit(31, false);
        assert_eq!(w, 0x7FFF_FFFF);

        let mut h = 0u16;
        h.set_bit(15, true);
        assert_eq!(h, 0x8000);
    }

    #[test]
    fn test_rewriting_a_bit_is_idempotent() {
        check_idempotent(&[0u8, 1, 0x55, 0xAA, 0xFF]);
        check_idempotent(&[0u16, 0x1234, 0xFFFF]);
        check_idempotent(&[0u32, 0xDEAD_BEEF, u32::MAX]);
        check_idempotent(&[0u64, 0x0123_4567_89AB_CDEF]);
    }

    #[test]
    fn test_byte_bits_order() {
        let bits: Vec<bool> = byte_bits(&[0b0000_0101, 0x80]).collect();
        assert_eq!(bits.len(), 16);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(bits[2]);
        assert!(bits[15]);
        assert_eq!(bits.iter().filter(|b| **b).count(), 3);
    }
}
