//! Capability contracts shared by the engine and its wrappers

use crate::error::Result;

/// Keyed cache operations
///
/// Every method takes `&self`; implementations synchronize internally.
pub trait Cache<K, V> {
    /// Look up `key`, touching it on a hit
    fn get(&self, key: &K) -> Option<V>;

    /// Insert a new entry, failing with `Error::AlreadyExists` if `key` is cached
    fn add(&self, key: K, value: V) -> Result<()>;

    /// Insert or replace the value for `key`
    fn set(&self, key: K, value: V);

    /// Number of entries currently cached
    fn count(&self) -> usize;
}

/// Frequency decay over every cached entry
pub trait Decay {
    /// Subtract `max(count / dividend, minimum)` from each access count,
    /// clamped so no count drops below zero. A zero `dividend` disables the
    /// proportional term.
    fn decay(&self, dividend: u64, minimum: u64);
}
