use std::num::NonZeroUsize;

use super::HashStrategy;

/// The division method, `h(k) = k mod m`, normalized into `0..m` for
/// negative keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Division;

macro_rules! signed_division {
    ($($t:ty),*) => {$(
        impl HashStrategy<$t> for Division {
            fn bucket(&self, key: &$t, capacity: NonZeroUsize) -> usize {
                // Euclidean remainder is never negative, and widening to i128
                // keeps every capacity representable.
                (*key as i128).rem_euclid(capacity.get() as i128) as usize
            }
        }
    )*};
}

macro_rules! unsigned_division {
    ($($t:ty),*) => {$(
        impl HashStrategy<$t> for Division {
            fn bucket(&self, key: &$t, capacity: NonZeroUsize) -> usize {
                (*key as u128 % capacity.get() as u128) as usize
            }
        }
    )*};
}

signed_division!(i32, i64);
unsigned_division!(u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn negative_keys_wrap_into_range() {
        assert_eq!(Division.index(&-1i32, 4).unwrap(), 3);
        assert_eq!(Division.index(&-4i32, 4).unwrap(), 0);
        assert_eq!(Division.index(&-9i64, 4).unwrap(), 3);
        assert_eq!(Division.index(&i32::MIN, 7).unwrap(), 5);
    }

    #[test]
    fn positive_keys_are_plain_remainders() {
        assert_eq!(Division.index(&7i32, 4).unwrap(), 3);
        assert_eq!(Division.index(&7u64, 8).unwrap(), 7);
        assert_eq!(Division.index(&1024usize, 1).unwrap(), 0);
    }

    #[quickcheck]
    fn normalized_remainder(key: i32, capacity: u16) -> TestResult {
        if capacity == 0 {
            return TestResult::discard();
        }
        let c = capacity as i64;
        let idx = Division.index(&key, capacity as usize).unwrap();
        let expected = (((key as i64 % c) + c) % c) as usize;
        TestResult::from_bool(idx < capacity as usize && idx == expected)
    }
}
