//! Hash tables with pluggable hashing and probing strategies.
//!
//! Two collision-resolution families share one surface, the [`Map`] trait:
//! [`ChainedHashTable`] (separate chaining) and [`OpenAddressingTable`] (open
//! addressing). Bucket placement is delegated to a [`HashStrategy`]; the
//! open-addressing table walks the slots produced by a [`ProbingStrategy`].
//!
//! Tables are single-threaded. Strategies hold no mutable state and can be
//! shared between any number of tables and threads.

mod chained;
mod config;
mod error;
pub mod hash;
mod open_addressing;
pub mod probe;

pub use chained::{ChainStats, ChainedHashTable, Iter};
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_MAX_LOAD_FACTOR};
pub use error::{Error, Result};
pub use hash::HashStrategy;
pub use open_addressing::{OpenAddressingTable, ProbeStats};
pub use probe::ProbingStrategy;

/// Outcome of a lookup that also reports its cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Search<'a, V> {
    pub value: Option<&'a V>,
    /// Number of stored keys compared against the probe key, match included.
    pub comparisons: usize,
}

impl<'a, V> Search<'a, V> {
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

/// Common functionalities for hash maps.
pub trait Map {
    /// Key type for a Map implementation.
    type Key;
    /// Value type for a Map implementation.
    type Val;

    /// Get reference to a value associated with a key, if it exists.
    fn get(&self, key: &Self::Key) -> Option<&Self::Val>;

    /// Check whether the map contains a value mapped to the given key.
    fn contains(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    /// Emplaces a key-value pair into the map.
    ///
    /// If there were a key-value pair associated with this provided key,
    /// it will be overwritten and the old value returned.
    fn put(&mut self, key: Self::Key, value: Self::Val) -> Option<Self::Val>;

    /// Attempts to remove a key-value pair based on the provided key, returning
    /// whether a key-value pair was found and removed.
    fn remove(&mut self, key: &Self::Key) -> bool;

    /// Like [`Map::get`], also counting the key comparisons performed.
    fn search(&self, key: &Self::Key) -> Search<'_, Self::Val>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }
}
