use std::borrow::Borrow;
use std::fmt;
use std::mem;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::config::{grown, TableConfig, DEFAULT_BUCKETS, DEFAULT_MAX_LOAD_FACTOR};
use crate::error::Result;
use crate::hash::HashStrategy;
use crate::{Map, Search};

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

/// Shortest and longest chain of a [`ChainedHashTable`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChainStats {
    pub min: usize,
    pub max: usize,
}

/// A hash table resolving collisions by separate chaining.
///
/// Each bucket owns a singly-linked chain. The table doubles its bucket count
/// before an insertion would push the load factor above the configured
/// maximum, so `len / capacity <= max_load_factor` holds after every
/// insertion. Removal never shrinks the table.
pub struct ChainedHashTable<K, V, H> {
    hash: H,
    buckets: Vec<Link<K, V>>,
    capacity: NonZeroUsize,
    len: usize,
    max_load_factor: f64,
}

impl<K, V, H> ChainedHashTable<K, V, H> {
    /// A table with 16 buckets and a maximum load factor of 0.75.
    pub fn new(hash: H) -> Self {
        Self::build(hash, DEFAULT_BUCKETS, DEFAULT_MAX_LOAD_FACTOR)
    }

    pub fn with_capacity(hash: H, capacity: usize) -> Result<Self> {
        Self::with_config(hash, TableConfig::default().capacity(capacity))
    }

    pub fn with_config(hash: H, config: TableConfig) -> Result<Self> {
        let (capacity, max_load_factor) = config.validate()?;
        Ok(Self::build(hash, capacity, max_load_factor))
    }

    fn build(hash: H, capacity: NonZeroUsize, max_load_factor: f64) -> Self {
        Self {
            hash,
            buckets: empty_buckets(capacity),
            capacity,
            len: 0,
            max_load_factor,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity.get() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.release_chains();
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            node: None,
            remaining: self.len,
        }
    }

    /// Shortest and longest chain over all buckets.
    ///
    /// With `ignore_empty` unset the minimum counts empty buckets, so it is 0
    /// whenever any bucket is empty. With it set only non-empty chains are
    /// considered. An empty table reports `(0, 0)` either way.
    pub fn chain_length_stats(&self, ignore_empty: bool) -> ChainStats {
        if self.len == 0 {
            return ChainStats::default();
        }

        let mut min: Option<usize> = None;
        let mut max = 0;
        for head in &self.buckets {
            let length = chain_len(head);
            max = max.max(length);
            if ignore_empty && length == 0 {
                continue;
            }
            min = Some(min.map_or(length, |m| m.min(length)));
        }

        ChainStats {
            min: min.unwrap_or(0),
            max,
        }
    }

    // Iterative so that dropping a long chain cannot exhaust the stack.
    fn release_chains(&mut self) {
        for head in &mut self.buckets {
            let mut link = head.take();
            while let Some(mut node) = link {
                link = node.next.take();
            }
        }
    }
}

impl<K, V, H> ChainedHashTable<K, V, H>
where
    K: Eq,
    H: HashStrategy<K>,
{
    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// Grows before locating the bucket when one more entry would break the
    /// load factor bound, doubling as often as needed to restore it. New keys
    /// are prepended to their chain.
    pub fn add_or_update(&mut self, key: K, value: V) -> Option<V> {
        let capacity = grown(self.len + 1, self.capacity, self.max_load_factor);
        if capacity != self.capacity {
            self.resize(capacity);
        }

        let idx = self.hash.bucket(&key, self.capacity);
        let mut cur = self.buckets[idx].as_deref_mut();
        while let Some(node) = cur {
            if node.key == key {
                return Some(mem::replace(&mut node.value, value));
            }
            cur = node.next.as_deref_mut();
        }

        let next = self.buckets[idx].take();
        self.buckets[idx] = Some(Box::new(Node { key, value, next }));
        self.len += 1;
        None
    }

    // Moves every node into a fresh bucket array, reusing the allocations.
    fn resize(&mut self, capacity: NonZeroUsize) {
        let old = mem::replace(&mut self.buckets, empty_buckets(capacity));
        let old_capacity = mem::replace(&mut self.capacity, capacity);

        for mut link in old {
            while let Some(mut node) = link {
                link = node.next.take();
                let idx = self.hash.bucket(&node.key, capacity);
                node.next = self.buckets[idx].take();
                self.buckets[idx] = Some(node);
            }
        }

        debug!(
            old_capacity = old_capacity.get(),
            new_capacity = capacity.get(),
            len = self.len,
            "resized chained table"
        );
    }
}

impl<K, V, H> ChainedHashTable<K, V, H> {
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        self.search(key).value
    }

    /// Same as [`ChainedHashTable::get`].
    pub fn try_get_value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        self.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        let idx = self.hash.bucket(key, self.capacity);
        let mut cur = self.buckets[idx].as_deref_mut();
        while let Some(node) = cur {
            if node.key.borrow() == key {
                return Some(&mut node.value);
            }
            cur = node.next.as_deref_mut();
        }
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        self.get(key).is_some()
    }

    /// Looks up `key`, also reporting how many nodes were compared.
    pub fn search<Q>(&self, key: &Q) -> Search<'_, V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        let idx = self.hash.bucket(key, self.capacity);
        let mut comparisons = 0;
        let mut cur = self.buckets[idx].as_deref();
        while let Some(node) = cur {
            comparisons += 1;
            if node.key.borrow() == key {
                return Search {
                    value: Some(&node.value),
                    comparisons,
                };
            }
            cur = node.next.as_deref();
        }
        Search {
            value: None,
            comparisons,
        }
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        self.take(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashStrategy<Q>,
    {
        let idx = self.hash.bucket(key, self.capacity);
        let mut link = &mut self.buckets[idx];
        while link
            .as_ref()
            .is_some_and(|node| node.key.borrow() != key)
        {
            if let Some(node) = link {
                link = &mut node.next;
            }
        }

        let node = link.take()?;
        let Node { value, next, .. } = *node;
        *link = next;
        self.len -= 1;
        Some(value)
    }
}

impl<K, V, H> Drop for ChainedHashTable<K, V, H> {
    fn drop(&mut self) {
        self.release_chains();
    }
}

impl<K, V, H> Extend<(K, V)> for ChainedHashTable<K, V, H>
where
    K: Eq,
    H: HashStrategy<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.add_or_update(key, value);
        }
    }
}

impl<K, V, H> fmt::Debug for ChainedHashTable<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H> Map for ChainedHashTable<K, V, H>
where
    K: Eq,
    H: HashStrategy<K>,
{
    type Key = K;
    type Val = V;

    fn get(&self, key: &K) -> Option<&V> {
        self.try_get_value(key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.add_or_update(key, value)
    }

    fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    fn search(&self, key: &K) -> Search<'_, V> {
        ChainedHashTable::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

/// Borrowing iterator over the entries of a [`ChainedHashTable`], in no
/// particular order.
pub struct Iter<'a, K, V> {
    buckets: std::slice::Iter<'a, Link<K, V>>,
    node: Option<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                self.node = node.next.as_deref();
                self.remaining -= 1;
                return Some((&node.key, &node.value));
            }
            self.node = self.buckets.next()?.as_deref();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V, H> IntoIterator for &'a ChainedHashTable<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn empty_buckets<K, V>(capacity: NonZeroUsize) -> Vec<Link<K, V>> {
    std::iter::repeat_with(|| None).take(capacity.get()).collect()
}

fn chain_len<K, V>(head: &Link<K, V>) -> usize {
    let mut length = 0;
    let mut cur = head.as_deref();
    while let Some(node) = cur {
        length += 1;
        cur = node.next.as_deref();
    }
    length
}
