use std::num::NonZeroUsize;

use super::HashStrategy;

/// `floor((sqrt(5) - 1) / 2 * 2^32)`, Knuth's choice of multiplier.
pub const KNUTH_MULTIPLIER: u32 = 2_654_435_769;

/// Knuth's multiplicative method over 32-bit keys.
///
/// The low 32 bits of `k * S` form a binary fraction `r0 / 2^32`, which is
/// scaled onto the capacity as `floor(m * r0 / 2^32)`. The capacity does not
/// have to be a power of two.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Multiplication;

impl Multiplication {
    fn scale(key: u32, capacity: NonZeroUsize) -> usize {
        let r0 = key.wrapping_mul(KNUTH_MULTIPLIER);
        ((r0 as u128 * capacity.get() as u128) >> 32) as usize
    }
}

impl HashStrategy<u32> for Multiplication {
    fn bucket(&self, key: &u32, capacity: NonZeroUsize) -> usize {
        Self::scale(*key, capacity)
    }
}

impl HashStrategy<i32> for Multiplication {
    fn bucket(&self, key: &i32, capacity: NonZeroUsize) -> usize {
        Self::scale(*key as u32, capacity)
    }
}
