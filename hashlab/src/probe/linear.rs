use std::num::NonZeroUsize;

use super::{add_mod, ProbingStrategy};
use crate::hash::HashStrategy;

/// `h(k, i) = (h'(k) + i) mod m`.
///
/// Attempts `0..m` visit every slot exactly once, so a probe loop bounded by
/// the capacity always finds a free slot if one exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearProbing<H> {
    hash: H,
}

impl<H> LinearProbing<H> {
    pub fn new(hash: H) -> Self {
        Self { hash }
    }
}

impl<K: ?Sized, H: HashStrategy<K>> ProbingStrategy<K> for LinearProbing<H> {
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize {
        let base = self.hash.bucket(key, capacity);
        add_mod(base, attempt, capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Division, Multiplication};
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn wraps_around_the_end() {
        let linear = LinearProbing::new(Division);
        assert_eq!(linear.index(&6i32, 0, 7).unwrap(), 6);
        assert_eq!(linear.index(&6i32, 1, 7).unwrap(), 0);
        assert_eq!(linear.index(&6i32, 6, 7).unwrap(), 5);
    }

    #[quickcheck]
    fn visits_every_slot_once(key: i32, capacity: u8) -> TestResult {
        let Some(capacity) = NonZeroUsize::new(capacity as usize) else {
            return TestResult::discard();
        };
        let linear = LinearProbing::new(Multiplication);
        let mut seen = vec![false; capacity.get()];
        for slot in linear.sequence(&key, capacity) {
            if seen[slot] {
                return TestResult::failed();
            }
            seen[slot] = true;
        }
        TestResult::from_bool(seen.iter().all(|&s| s))
    }
}
