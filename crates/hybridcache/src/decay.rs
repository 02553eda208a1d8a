//! Access-driven decay scheduling
//!
//! `AutoDecayingCache` wraps any cache implementing [`Cache`] and [`Decay`]
//! and runs a decay sweep every `accesses_between_decays` calls, so access
//! counts reflect a recent window instead of the entry's whole lifetime.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{Cache, Decay};

/// When and how hard to decay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayPolicy {
    accesses_between_decays: u64,
    dividend: u64,
    minimum: u64,
}

impl DecayPolicy {
    /// Create a validated decay policy
    ///
    /// # Arguments
    /// * `accesses_between_decays` - Calls between sweeps (at least 1)
    /// * `dividend` - Each count loses `count / dividend` (at least 1)
    /// * `minimum` - Each count loses at least this much
    pub fn new(accesses_between_decays: u64, dividend: u64, minimum: u64) -> Result<Self> {
        if accesses_between_decays == 0 {
            return Err(Error::InvalidConfiguration(
                "accesses_between_decays must be at least 1".to_string(),
            ));
        }
        if dividend == 0 {
            return Err(Error::InvalidConfiguration(
                "dividend must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            accesses_between_decays,
            dividend,
            minimum,
        })
    }

    /// Get the number of calls between sweeps
    pub fn accesses_between_decays(&self) -> u64 {
        self.accesses_between_decays
    }

    /// Get the proportional divisor
    pub fn dividend(&self) -> u64 {
        self.dividend
    }

    /// Get the minimum subtrahend
    pub fn minimum(&self) -> u64 {
        self.minimum
    }
}

/// Cache wrapper that decays its inner cache on a fixed access cadence
pub struct AutoDecayingCache<C> {
    inner: C,
    policy: DecayPolicy,
    accesses: AtomicU64,
    decays: AtomicU64,
}

impl<C> AutoDecayingCache<C> {
    /// Wrap `inner` with an already validated policy
    pub fn new(inner: C, policy: DecayPolicy) -> Self {
        debug!(
            accesses_between_decays = policy.accesses_between_decays,
            dividend = policy.dividend,
            minimum = policy.minimum,
            "created auto-decaying cache"
        );

        Self {
            inner,
            policy,
            accesses: AtomicU64::new(0),
            decays: AtomicU64::new(0),
        }
    }

    /// Wrap `inner`, validating the policy parameters
    pub fn with_params(
        inner: C,
        accesses_between_decays: u64,
        dividend: u64,
        minimum: u64,
    ) -> Result<Self> {
        let policy = DecayPolicy::new(accesses_between_decays, dividend, minimum)?;
        Ok(Self::new(inner, policy))
    }

    /// Get the decay policy
    pub fn policy(&self) -> DecayPolicy {
        self.policy
    }

    /// Get the number of calls seen so far
    pub fn accesses(&self) -> u64 {
        self.accesses.load(Ordering::Relaxed)
    }

    /// Get the number of sweeps this wrapper has triggered
    pub fn decays(&self) -> u64 {
        self.decays.load(Ordering::Relaxed)
    }

    /// Borrow the wrapped cache
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the wrapped cache
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Decay> AutoDecayingCache<C> {
    /// Count one call and report whether it lands on the decay cadence
    fn tick(&self) -> bool {
        let accesses = self.accesses.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        accesses % self.policy.accesses_between_decays == 0
    }

    fn run_decay(&self) {
        self.inner.decay(self.policy.dividend, self.policy.minimum);
        let decays = self.decays.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(decays, "scheduled decay ran");
    }
}

impl<K, V, C> Cache<K, V> for AutoDecayingCache<C>
where
    C: Cache<K, V> + Decay,
{
    fn get(&self, key: &K) -> Option<V> {
        let due = self.tick();
        let value = self.inner.get(key);
        if due {
            self.run_decay();
        }
        value
    }

    fn add(&self, key: K, value: V) -> Result<()> {
        let due = self.tick();
        let result = self.inner.add(key, value);
        if due {
            self.run_decay();
        }
        result
    }

    fn set(&self, key: K, value: V) {
        let due = self.tick();
        self.inner.set(key, value);
        if due {
            self.run_decay();
        }
    }

    fn count(&self) -> usize {
        self.inner.count()
    }
}

impl<C: Decay> Decay for AutoDecayingCache<C> {
    fn decay(&self, dividend: u64, minimum: u64) {
        self.inner.decay(dividend, minimum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HybridCache;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Records every decay request it receives
    #[derive(Default)]
    struct RecordingCache {
        values: Mutex<HashMap<u32, u32>>,
        decays: Mutex<Vec<(u64, u64)>>,
    }

    impl Cache<u32, u32> for RecordingCache {
        fn get(&self, key: &u32) -> Option<u32> {
            self.values.lock().get(key).copied()
        }

        fn add(&self, key: u32, value: u32) -> Result<()> {
            let mut values = self.values.lock();
            if values.contains_key(&key) {
                return Err(Error::AlreadyExists);
            }
            values.insert(key, value);
            Ok(())
        }

        fn set(&self, key: u32, value: u32) {
            self.values.lock().insert(key, value);
        }

        fn count(&self) -> usize {
            self.values.lock().len()
        }
    }

    impl Decay for RecordingCache {
        fn decay(&self, dividend: u64, minimum: u64) {
            self.decays.lock().push((dividend, minimum));
        }
    }

    #[test]
    fn test_policy_validation() {
        assert!(matches!(
            DecayPolicy::new(0, 2, 1),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DecayPolicy::new(5, 0, 1),
            Err(Error::InvalidConfiguration(_))
        ));

        let policy = DecayPolicy::new(5, 2, 0).unwrap();
        assert_eq!(policy.accesses_between_decays(), 5);
        assert_eq!(policy.dividend(), 2);
        assert_eq!(policy.minimum(), 0);
    }

    #[test]
    fn test_decay_fires_on_cadence() {
        let cache = AutoDecayingCache::with_params(RecordingCache::default(), 5, 2, 1).unwrap();

        cache.set(1, 1);
        cache.get(&1);
        cache.get(&2);
        let _ = cache.add(1, 9);
        assert_eq!(cache.accesses(), 4);
        assert!(cache.inner().decays.lock().is_empty());

        cache.get(&1);
        assert_eq!(cache.accesses(), 5);
        assert_eq!(*cache.inner().decays.lock(), vec![(2, 1)]);
        assert_eq!(cache.decays(), 1);

        for key in 10..20 {
            cache.set(key, key);
        }
        assert_eq!(cache.accesses(), 15);
        assert_eq!(cache.decays(), 3);
    }

    #[test]
    fn test_results_pass_through() {
        let cache = AutoDecayingCache::with_params(RecordingCache::default(), 1, 1, 0).unwrap();

        assert_eq!(cache.add(1, 10), Ok(()));
        assert_eq!(cache.add(1, 11), Err(Error::AlreadyExists));
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.count(), 1);

        // Every call counts, including failures and misses
        assert_eq!(cache.accesses(), 4);
        assert_eq!(cache.decays(), 4);
    }

    #[test]
    fn test_count_does_not_tick() {
        let cache = AutoDecayingCache::with_params(RecordingCache::default(), 1, 1, 0).unwrap();

        cache.count();
        assert_eq!(cache.accesses(), 0);
        assert_eq!(cache.decays(), 0);
    }

    #[test]
    fn test_wraps_hybrid_cache() {
        let cache =
            AutoDecayingCache::with_params(HybridCache::new(4, 4).unwrap(), 10, 1, 100).unwrap();

        for _ in 0..9 {
            cache.set("a", 1);
        }
        assert_eq!(cache.inner().access_count(&"a"), Some(9));

        // Tenth call touches a (count 10) then decays it to zero
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.inner().access_count(&"a"), Some(0));
        assert_eq!(cache.inner().stats().decays(), 1);
    }

    #[test]
    fn test_wrappers_compose() {
        let inner = AutoDecayingCache::with_params(RecordingCache::default(), 2, 3, 0).unwrap();
        let outer = AutoDecayingCache::with_params(inner, 3, 7, 1).unwrap();

        for key in 0..6 {
            outer.set(key, key);
        }

        assert_eq!(outer.count(), 6);
        assert_eq!(outer.decays(), 2);
        assert_eq!(outer.inner().decays(), 3);

        let recorded = outer.into_inner().into_inner().decays.into_inner();
        assert_eq!(recorded.iter().filter(|&&call| call == (3, 0)).count(), 3);
        assert_eq!(recorded.iter().filter(|&&call| call == (7, 1)).count(), 2);
    }
}
