//! Probing strategies generate the candidate slots an open-addressing table
//! visits for a key.

mod double;
mod linear;
mod quadratic;

pub use double::DoubleHashing;
pub use linear::LinearProbing;
pub use quadratic::QuadraticProbing;

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Produces the `attempt`-th candidate slot for a key.
pub trait ProbingStrategy<K: ?Sized> {
    /// Candidate slot for `key` on probe `attempt`, in `0..capacity`.
    ///
    /// Callers must keep `attempt < capacity`; [`ProbingStrategy::index`] is
    /// the checked entry point.
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize;

    fn index(&self, key: &K, attempt: usize, capacity: usize) -> Result<usize> {
        let capacity_nz = NonZeroUsize::new(capacity).ok_or(Error::ZeroCapacity)?;
        if attempt >= capacity {
            return Err(Error::ProbeOutOfRange { attempt, capacity });
        }
        Ok(self.probe(key, attempt, capacity_nz))
    }

    /// The full probe sequence of `key`: one candidate per attempt in
    /// `0..capacity`.
    fn sequence<'a>(&'a self, key: &'a K, capacity: NonZeroUsize) -> ProbeSequence<'a, K, Self>
    where
        Self: Sized,
    {
        ProbeSequence {
            strategy: self,
            key,
            capacity,
            attempt: 0,
        }
    }
}

impl<K: ?Sized, P: ProbingStrategy<K> + ?Sized> ProbingStrategy<K> for &P {
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize {
        (**self).probe(key, attempt, capacity)
    }
}

impl<K: ?Sized, P: ProbingStrategy<K> + ?Sized> ProbingStrategy<K> for Arc<P> {
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize {
        (**self).probe(key, attempt, capacity)
    }
}

impl<K: ?Sized, P: ProbingStrategy<K> + ?Sized> ProbingStrategy<K> for Box<P> {
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize {
        (**self).probe(key, attempt, capacity)
    }
}

/// Iterator over a key's probe sequence, see [`ProbingStrategy::sequence`].
pub struct ProbeSequence<'a, K: ?Sized, P> {
    strategy: &'a P,
    key: &'a K,
    capacity: NonZeroUsize,
    attempt: usize,
}

impl<'a, K: ?Sized, P: ProbingStrategy<K>> Iterator for ProbeSequence<'a, K, P> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempt >= self.capacity.get() {
            return None;
        }
        let slot = self.strategy.probe(self.key, self.attempt, self.capacity);
        self.attempt += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.capacity.get() - self.attempt;
        (rest, Some(rest))
    }
}

impl<'a, K: ?Sized, P: ProbingStrategy<K>> ExactSizeIterator for ProbeSequence<'a, K, P> {}

/// `(a + b) mod m` for `a, b < m`, without overflow.
pub(crate) fn add_mod(a: usize, b: usize, m: NonZeroUsize) -> usize {
    ((a as u128 + b as u128) % m.get() as u128) as usize
}

/// `(a * b) mod m`, widened so the product cannot overflow.
pub(crate) fn mul_mod(a: usize, b: usize, m: NonZeroUsize) -> usize {
    let m = m.get() as u128;
    ((a as u128 % m) * (b as u128 % m) % m) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Division;

    #[test]
    fn index_validates_arguments() {
        let linear = LinearProbing::new(Division);
        assert_eq!(linear.index(&3i32, 0, 0), Err(Error::ZeroCapacity));
        assert_eq!(
            linear.index(&3i32, 8, 8),
            Err(Error::ProbeOutOfRange {
                attempt: 8,
                capacity: 8
            })
        );
        assert_eq!(linear.index(&3i32, 7, 8), Ok(2));
    }

    #[test]
    fn sequence_yields_capacity_candidates() {
        let linear = LinearProbing::new(Division);
        let capacity = NonZeroUsize::new(5).unwrap();
        let seq: Vec<_> = linear.sequence(&3i32, capacity).collect();
        assert_eq!(seq, vec![3, 4, 0, 1, 2]);
        assert_eq!(linear.sequence(&3i32, capacity).len(), 5);
    }

    #[test]
    fn modular_helpers_do_not_overflow() {
        let m = NonZeroUsize::new(usize::MAX).unwrap();
        assert_eq!(add_mod(usize::MAX - 1, usize::MAX - 1, m), usize::MAX - 2);
        assert_eq!(mul_mod(usize::MAX - 1, 2, m), usize::MAX - 2);
    }
}
