use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::num::NonZeroUsize;

use super::HashStrategy;

/// Adapts any [`BuildHasher`] into a hash strategy, so tables can hold keys
/// that are not plain integers.
///
/// The 64-bit digest is reduced modulo the capacity.
#[derive(Debug, Default, Clone)]
pub struct Hashed<S = RandomState> {
    state: S,
}

impl Hashed<RandomState> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> Hashed<S> {
    pub fn with_hasher(state: S) -> Self {
        Self { state }
    }

    fn hash<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        let mut hasher = self.state.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }
}

impl<K, S> HashStrategy<K> for Hashed<S>
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    fn bucket(&self, key: &K, capacity: NonZeroUsize) -> usize {
        (self.hash(key) as u128 % capacity.get() as u128) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::BuildHasherDefault;

    #[test]
    fn deterministic_for_fixed_state() {
        let h = Hashed::with_hasher(BuildHasherDefault::<DefaultHasher>::default());
        let a = h.index("hello", 97).unwrap();
        let b = h.index("hello", 97).unwrap();
        assert_eq!(a, b);
        assert!(a < 97);
    }

    #[test]
    fn borrowed_and_owned_keys_agree() {
        let h = Hashed::new();
        let owned = "world".to_string();
        assert_eq!(h.index(owned.as_str(), 13), h.index("world", 13));
        assert_eq!(h.index(&owned, 13), h.index("world", 13));
    }
}
