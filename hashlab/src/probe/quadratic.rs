use std::num::NonZeroUsize;

use super::{add_mod, mul_mod, ProbingStrategy};
use crate::error::{Error, Result};
use crate::hash::HashStrategy;

/// `h(k, i) = (h'(k) + c1*i + c2*i^2) mod m`.
///
/// Whether the sequence covers every slot depends on `c1`, `c2` and `m`; in
/// general it does not. With `c1 = c2 = 1` and a power-of-two capacity, for
/// example, only some of the slots are reachable. Consumers must cope with an
/// exhausted sequence.
#[derive(Debug, Clone, Copy)]
pub struct QuadraticProbing<H> {
    hash: H,
    c1: usize,
    c2: usize,
}

impl<H> QuadraticProbing<H> {
    pub fn new(hash: H, c1: usize, c2: usize) -> Result<Self> {
        if c1 == 0 {
            return Err(Error::InvalidProbeConstant {
                name: "c1",
                value: c1,
            });
        }
        if c2 == 0 {
            return Err(Error::InvalidProbeConstant {
                name: "c2",
                value: c2,
            });
        }
        Ok(Self { hash, c1, c2 })
    }
}

impl<K: ?Sized, H: HashStrategy<K>> ProbingStrategy<K> for QuadraticProbing<H> {
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize {
        let base = self.hash.bucket(key, capacity);
        let linear = mul_mod(self.c1, attempt, capacity);
        let square = mul_mod(attempt, attempt, capacity);
        let quadratic = mul_mod(self.c2, square, capacity);
        add_mod(base, add_mod(linear, quadratic, capacity), capacity)
    }
}
