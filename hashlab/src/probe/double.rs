use std::num::NonZeroUsize;

use super::{add_mod, mul_mod, ProbingStrategy};
use crate::hash::HashStrategy;

/// `h(k, i) = (h1(k) + i * h2(k)) mod m` with `h2(k) = 1 + h2'(k) mod (m - 1)`.
///
/// The step is never zero, so every attempt moves to a new slot. The sequence
/// covers the whole table only when the step is coprime with `m`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleHashing<H1, H2> {
    base: H1,
    step: H2,
}

impl<H1, H2> DoubleHashing<H1, H2> {
    pub fn new(base: H1, step: H2) -> Self {
        Self { base, step }
    }

    /// Step between consecutive probes of `key`, in `1..capacity`; `None` for
    /// a single-slot table, which has nowhere to step to.
    pub fn step_for<K: ?Sized>(&self, key: &K, capacity: NonZeroUsize) -> Option<usize>
    where
        H2: HashStrategy<K>,
    {
        let reduced = NonZeroUsize::new(capacity.get() - 1)?;
        Some(1 + self.step.bucket(key, reduced))
    }
}

impl<K, H1, H2> ProbingStrategy<K> for DoubleHashing<H1, H2>
where
    K: ?Sized,
    H1: HashStrategy<K>,
    H2: HashStrategy<K>,
{
    fn probe(&self, key: &K, attempt: usize, capacity: NonZeroUsize) -> usize {
        let start = self.base.bucket(key, capacity);
        match self.step_for(key, capacity) {
            None => 0,
            Some(step) => add_mod(start, mul_mod(attempt, step, capacity), capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Division, Multiplication};
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use std::sync::Arc;

    #[test]
    fn single_slot_table_always_yields_zero() {
        let dh = DoubleHashing::new(Division, Multiplication);
        assert_eq!(dh.index(&12345i32, 0, 1).unwrap(), 0);
        assert_eq!(dh.step_for(&12345i32, NonZeroUsize::new(1).unwrap()), None);
    }

    #[test]
    fn steps_by_second_hash() {
        let dh = DoubleHashing::new(Division, Division);
        // start = 10 mod 7 = 3, step = 1 + 10 mod 6 = 5
        let seq: Vec<_> = (0..7).map(|i| dh.index(&10i32, i, 7).unwrap()).collect();
        assert_eq!(seq, vec![3, 1, 6, 4, 2, 0, 5]);
    }

    #[test]
    fn shares_one_strategy_for_both_roles() {
        let shared = Arc::new(Multiplication);
        let dh = DoubleHashing::new(Arc::clone(&shared), Arc::clone(&shared));
        let idx = dh.index(&77i32, 3, 31).unwrap();
        assert!(idx < 31);
        assert_eq!(Arc::strong_count(&shared), 3);
    }

    #[quickcheck]
    fn step_is_never_zero(key: i32, capacity: u16) -> TestResult {
        if capacity < 2 {
            return TestResult::discard();
        }
        let dh = DoubleHashing::new(Division, Multiplication);
        let capacity = NonZeroUsize::new(capacity as usize).unwrap();
        match dh.step_for(&key, capacity) {
            Some(step) => TestResult::from_bool(step >= 1 && step < capacity.get()),
            None => TestResult::failed(),
        }
    }

    #[quickcheck]
    fn prime_capacity_covers_table(key: i32) -> bool {
        let dh = DoubleHashing::new(Division, Multiplication);
        let capacity = NonZeroUsize::new(101).unwrap();
        let mut seen = [false; 101];
        for slot in dh.sequence(&key, capacity) {
            seen[slot] = true;
        }
        seen.iter().all(|&s| s)
    }
}
