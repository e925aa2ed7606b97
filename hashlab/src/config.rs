use std::num::NonZeroUsize;

use crate::error::{Error, Result};

pub const DEFAULT_CAPACITY: usize = 16;
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

pub(crate) const DEFAULT_BUCKETS: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("default capacity is zero"),
};

/// Construction parameters shared by both table families.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub capacity: usize,
    pub max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Checks both parameters, returning them in the form the tables store.
    ///
    /// Rejects NaN load factors.
    pub fn validate(&self) -> Result<(NonZeroUsize, f64)> {
        let capacity = NonZeroUsize::new(self.capacity).ok_or(Error::ZeroCapacity)?;
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(Error::InvalidLoadFactor(self.max_load_factor));
        }
        Ok((capacity, self.max_load_factor))
    }
}

/// Whether holding `len` entries in `capacity` slots stays within the bound.
pub(crate) fn exceeds_load_factor(len: usize, capacity: NonZeroUsize, max: f64) -> bool {
    len as f64 / capacity.get() as f64 > max
}

/// Growth step shared by both table families.
pub(crate) fn doubled(capacity: NonZeroUsize) -> NonZeroUsize {
    capacity.saturating_add(capacity.get())
}

/// Smallest repeated doubling of `capacity` that holds `len` entries within
/// the bound. Returns `capacity` itself when it already does.
pub(crate) fn grown(len: usize, capacity: NonZeroUsize, max: f64) -> NonZeroUsize {
    let mut capacity = capacity;
    while exceeds_load_factor(len, capacity, max) {
        let next = doubled(capacity);
        if next == capacity {
            break;
        }
        capacity = next;
    }
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let (capacity, lf) = TableConfig::default().validate().unwrap();
        assert_eq!(capacity.get(), 16);
        assert_eq!(lf, 0.75);
    }

    #[test]
    fn rejects_bad_parameters() {
        let cfg = TableConfig::default();
        assert_eq!(cfg.capacity(0).validate(), Err(Error::ZeroCapacity));
        for lf in [0.0, 1.0, -0.5, 1.5] {
            assert_eq!(
                cfg.max_load_factor(lf).validate(),
                Err(Error::InvalidLoadFactor(lf))
            );
        }
        assert!(matches!(
            cfg.max_load_factor(f64::NAN).validate(),
            Err(Error::InvalidLoadFactor(_))
        ));
    }

    #[test]
    fn load_factor_bound_is_strict() {
        let four = NonZeroUsize::new(4).unwrap();
        assert!(!exceeds_load_factor(3, four, 0.75));
        assert!(exceeds_load_factor(4, four, 0.75));
    }

    #[test]
    fn grown_doubles_until_within_bound() {
        let one = NonZeroUsize::new(1).unwrap();
        let four = NonZeroUsize::new(4).unwrap();
        assert_eq!(grown(1, one, 0.3).get(), 4);
        assert_eq!(grown(2, one, 0.3).get(), 8);
        assert_eq!(grown(1, NonZeroUsize::new(2).unwrap(), 0.2).get(), 8);
        assert_eq!(grown(3, four, 0.75), four);
        assert_eq!(grown(4, four, 0.75).get(), 8);
    }
}
