use std::borrow::Borrow;
use std::fmt;
use std::mem;
use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::config::{
    doubled, exceeds_load_factor, grown, TableConfig, DEFAULT_BUCKETS, DEFAULT_MAX_LOAD_FACTOR,
};
use crate::error::Result;
use crate::probe::ProbingStrategy;
use crate::{Map, Search};

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    /// Previously occupied; probes continue past it.
    Tombstone,
    Occupied(K, V),
}

impl<K, V> Slot<K, V> {
    fn into_entry(self) -> Option<(K, V)> {
        match self {
            Slot::Occupied(k, v) => Some((k, v)),
            _ => None,
        }
    }
}

enum Placement {
    Existing(usize),
    Vacant(usize),
    Exhausted,
}

/// Probe counts over the stored keys of an [`OpenAddressingTable`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProbeStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// A hash table resolving collisions by open addressing.
///
/// All entries live in one slot array. A key occupies the first free slot of
/// its probe sequence; removal leaves a tombstone so that later lookups keep
/// probing past it. Tombstones count towards the load factor and are purged
/// whenever the table rehashes.
pub struct OpenAddressingTable<K, V, P> {
    probe: P,
    slots: Vec<Slot<K, V>>,
    capacity: NonZeroUsize,
    len: usize,
    tombstones: usize,
    max_load_factor: f64,
}

impl<K, V, P> OpenAddressingTable<K, V, P> {
    pub fn new(probe: P) -> Self {
        Self::build(probe, DEFAULT_BUCKETS, DEFAULT_MAX_LOAD_FACTOR)
    }

    pub fn with_capacity(probe: P, capacity: usize) -> Result<Self> {
        Self::with_config(probe, TableConfig::default().capacity(capacity))
    }

    pub fn with_config(probe: P, config: TableConfig) -> Result<Self> {
        let (capacity, max_load_factor) = config.validate()?;
        Ok(Self::build(probe, capacity, max_load_factor))
    }

    fn build(probe: P, capacity: NonZeroUsize, max_load_factor: f64) -> Self {
        Self {
            probe,
            slots: empty_slots(capacity),
            capacity,
            len: 0,
            tombstones: 0,
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

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Empty);
        self.len = 0;
        self.tombstones = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(k, v) => Some((k, v)),
            _ => None,
        })
    }
}

impl<K, V, P> OpenAddressingTable<K, V, P>
where
    K: Eq,
    P: ProbingStrategy<K>,
{
    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// Rehashes first when one more entry plus the tombstones would exceed
    /// the load factor bound, doubling only as far as live entries need. A new
    /// key takes the first tombstone on its probe sequence, or else the
    /// first empty slot. If the sequence offers neither, the table doubles and
    /// tries again.
    pub fn add_or_update(&mut self, key: K, value: V) -> Option<V> {
        let used = self.len + self.tombstones + 1;
        if exceeds_load_factor(used, self.capacity, self.max_load_factor) {
            self.rehash(grown(self.len + 1, self.capacity, self.max_load_factor));
        }

        loop {
            match self.placement(&key) {
                Placement::Existing(idx) => {
                    let old = mem::replace(&mut self.slots[idx], Slot::Occupied(key, value));
                    return old.into_entry().map(|(_, v)| v);
                }
                Placement::Vacant(idx) => {
                    if let Slot::Tombstone = self.slots[idx] {
                        self.tombstones -= 1;
                    }
                    self.slots[idx] = Slot::Occupied(key, value);
                    self.len += 1;
                    return None;
                }
                Placement::Exhausted => {
                    trace!(
                        capacity = self.capacity.get(),
                        len = self.len,
                        "probe sequence exhausted"
                    );
                    self.rehash(doubled(self.capacity));
                }
            }
        }
    }

    fn placement(&self, key: &K) -> Placement {
        let mut first_tombstone = None;
        for idx in self.probe.sequence(key, self.capacity) {
            match &self.slots[idx] {
                Slot::Empty => return Placement::Vacant(first_tombstone.unwrap_or(idx)),
                Slot::Tombstone => {
                    first_tombstone.get_or_insert(idx);
                }
                Slot::Occupied(k, _) if k == key => return Placement::Existing(idx),
                Slot::Occupied(..) => {}
            }
        }
        first_tombstone.map_or(Placement::Exhausted, Placement::Vacant)
    }

    // Reinserts every entry into `capacity` slots, doubling further if some
    // key finds no free slot on its probe sequence.
    fn rehash(&mut self, mut capacity: NonZeroUsize) {
        let old_capacity = self.capacity;
        let mut pending: Vec<(K, V)> = mem::take(&mut self.slots)
            .into_iter()
            .filter_map(Slot::into_entry)
            .collect();

        let slots = loop {
            let mut slots = empty_slots(capacity);
            while let Some((key, value)) = pending.pop() {
                let free = self
                    .probe
                    .sequence(&key, capacity)
                    .find(|&idx| matches!(slots[idx], Slot::Empty));
                match free {
                    Some(idx) => slots[idx] = Slot::Occupied(key, value),
                    None => {
                        pending.push((key, value));
                        break;
                    }
                }
            }
            if pending.is_empty() {
                break slots;
            }
            pending.extend(slots.into_iter().filter_map(Slot::into_entry));
            capacity = doubled(capacity);
        };

        self.slots = slots;
        self.capacity = capacity;
        self.tombstones = 0;

        debug!(
            old_capacity = old_capacity.get(),
            new_capacity = capacity.get(),
            len = self.len,
            "rehashed open-addressing table"
        );
    }

    /// Minimum, maximum and mean number of probes needed to reach each
    /// stored key. An empty table reports zeros.
    pub fn probe_length_stats(&self) -> ProbeStats {
        let mut stats = ProbeStats::default();
        let mut total = 0;
        for (key, _) in self.iter() {
            let probes = self
                .probe
                .sequence(key, self.capacity)
                .position(|idx| matches!(&self.slots[idx], Slot::Occupied(k, _) if k == key))
                .map_or(self.capacity.get(), |pos| pos + 1);
            stats.min = if total == 0 { probes } else { stats.min.min(probes) };
            stats.max = stats.max.max(probes);
            total += probes;
        }
        if self.len > 0 {
            stats.mean = total as f64 / self.len as f64;
        }
        stats
    }
}

impl<K, V, P> OpenAddressingTable<K, V, P> {
    // Slot holding `key`, plus the number of stored keys compared on the way.
    fn find<Q>(&self, key: &Q) -> (Option<usize>, usize)
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        let mut comparisons = 0;
        for idx in self.probe.sequence(key, self.capacity) {
            match &self.slots[idx] {
                Slot::Empty => break,
                Slot::Tombstone => {}
                Slot::Occupied(k, _) => {
                    comparisons += 1;
                    if k.borrow() == key {
                        return (Some(idx), comparisons);
                    }
                }
            }
        }
        (None, comparisons)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        self.search(key).value
    }

    /// Same as [`OpenAddressingTable::get`].
    pub fn try_get_value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        self.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        let (idx, _) = self.find(key);
        match &mut self.slots[idx?] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        self.find(key).0.is_some()
    }

    pub fn search<Q>(&self, key: &Q) -> Search<'_, V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        let (idx, comparisons) = self.find(key);
        let value = idx.and_then(|idx| match &self.slots[idx] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        });
        Search { value, comparisons }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        self.take(key).is_some()
    }

    /// Removes `key` and returns its value, leaving a tombstone behind.
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        P: ProbingStrategy<Q>,
    {
        let (idx, _) = self.find(key);
        let (_, value) = mem::replace(&mut self.slots[idx?], Slot::Tombstone).into_entry()?;
        self.len -= 1;
        self.tombstones += 1;
        Some(value)
    }
}

impl<K, V, P> Extend<(K, V)> for OpenAddressingTable<K, V, P>
where
    K: Eq,
    P: ProbingStrategy<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.add_or_update(key, value);
        }
    }
}

impl<K, V, P> fmt::Debug for OpenAddressingTable<K, V, P>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, P> Map for OpenAddressingTable<K, V, P>
where
    K: Eq,
    P: ProbingStrategy<K>,
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
        OpenAddressingTable::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

fn empty_slots<K, V>(capacity: NonZeroUsize) -> Vec<Slot<K, V>> {
    std::iter::repeat_with(|| Slot::Empty)
        .take(capacity.get())
        .collect()
}
