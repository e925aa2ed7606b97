//! Hash strategies map a key onto a bucket of a table with a given capacity.

mod division;
mod hashed;
mod multiplication;

pub use division::Division;
pub use hashed::Hashed;
pub use multiplication::Multiplication;

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A stateless mapping from `(key, capacity)` to a bucket index.
pub trait HashStrategy<K: ?Sized> {
    /// Bucket for `key` in a table of `capacity` buckets, always in
    /// `0..capacity`.
    fn bucket(&self, key: &K, capacity: NonZeroUsize) -> usize;

    /// Checked form of [`HashStrategy::bucket`] for callers holding a raw
    /// capacity.
    fn index(&self, key: &K, capacity: usize) -> Result<usize> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::ZeroCapacity)?;
        Ok(self.bucket(key, capacity))
    }
}

impl<K: ?Sized, H: HashStrategy<K> + ?Sized> HashStrategy<K> for &H {
    fn bucket(&self, key: &K, capacity: NonZeroUsize) -> usize {
        (**self).bucket(key, capacity)
    }
}

impl<K: ?Sized, H: HashStrategy<K> + ?Sized> HashStrategy<K> for Arc<H> {
    fn bucket(&self, key: &K, capacity: NonZeroUsize) -> usize {
        (**self).bucket(key, capacity)
    }
}

impl<K: ?Sized, H: HashStrategy<K> + ?Sized> HashStrategy<K> for Box<H> {
    fn bucket(&self, key: &K, capacity: NonZeroUsize) -> usize {
        (**self).bucket(key, capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_rejects_zero_capacity() {
        assert_eq!(Division.index(&5i32, 0), Err(Error::ZeroCapacity));
        assert_eq!(Multiplication.index(&5i32, 0), Err(Error::ZeroCapacity));
        assert_eq!(Hashed::new().index("five", 0), Err(Error::ZeroCapacity));
    }

    #[test]
    fn shared_strategies_delegate() {
        let shared = Arc::new(Multiplication);
        let boxed: Box<dyn HashStrategy<i32>> = Box::new(Multiplication);
        for key in [-7, 0, 1, 99, i32::MAX] {
            let expected = Multiplication.index(&key, 37).unwrap();
            assert_eq!(shared.index(&key, 37).unwrap(), expected);
            assert_eq!(boxed.index(&key, 37).unwrap(), expected);
            assert_eq!((&Multiplication).index(&key, 37).unwrap(), expected);
        }
    }
}
