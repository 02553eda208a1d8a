//! Hybrid LRU/LFU cache engine
//!
//! An entry stays cached while either ordering still holds it. The recency
//! ordering evicts its tail, the frequency ordering evicts its head (lowest
//! access count), and an entry is dropped from the table only once both
//! have let it go.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::entry::{Entry, Order};
use crate::error::{Error, Result};
use crate::list::{ListEnds, Slab};
use crate::stats::CacheStats;
use crate::traits::{Cache, Decay};

/// Table and both orderings, guarded together by one lock
struct Inner<K, V> {
    map: HashMap<K, usize, RandomState>,
    slab: Slab<K, V>,
    lru: ListEnds,
    lfu: ListEnds,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone,
{
    fn new(lru_capacity: usize, lfu_capacity: usize) -> Self {
        let capacity = lru_capacity.saturating_add(lfu_capacity);

        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            slab: Slab::with_capacity(capacity),
            lru: ListEnds::new(lru_capacity),
            lfu: ListEnds::new(lfu_capacity),
        }
    }

    fn insert(&mut self, key: K, value: V, stats: &CacheStats) {
        let idx = self.slab.insert(Entry::new(key.clone(), value));
        self.map.insert(key, idx);
        stats.record_insert();
        self.touch(idx, stats);
    }

    /// Count the access, then refresh the entry's place in both orderings
    fn touch(&mut self, idx: usize, stats: &CacheStats) {
        match self.slab.get_mut(idx) {
            Some(entry) => entry.access_count = entry.access_count.saturating_add(1),
            None => return,
        }

        if !self.slab.is_linked(idx, Order::Frequency) {
            if self.lfu.is_full() {
                self.evict(Order::Frequency, stats);
            }
            self.slab.push_front(idx, Order::Frequency, &mut self.lfu);
        }
        self.promote(idx);

        if self.slab.is_linked(idx, Order::Recency) {
            self.slab.unlink(idx, Order::Recency, &mut self.lru);
        } else if self.lru.is_full() {
            self.evict(Order::Recency, stats);
        }
        self.slab.push_front(idx, Order::Recency, &mut self.lru);
    }

    /// Move `idx` forward past every entry with a strictly lower count.
    ///
    /// Counts grow by one per touch and decay never reorders, so the entry
    /// only ever needs to pass neighbours that are now below it.
    fn promote(&mut self, idx: usize) {
        let count = match self.slab.get(idx) {
            Some(entry) => entry.access_count,
            None => return,
        };

        let mut cursor = self.slab.link(idx, Order::Frequency).and_then(|link| link.next);
        let mut moved = false;
        while let Some(next_idx) = cursor {
            match self.slab.get(next_idx) {
                Some(next) if next.access_count < count => {
                    cursor = next.link(Order::Frequency).and_then(|link| link.next);
                    moved = true;
                }
                _ => break,
            }
        }

        if !moved {
            return;
        }

        self.slab.unlink(idx, Order::Frequency, &mut self.lfu);
        match cursor {
            Some(at) => self.slab.insert_before(idx, at, Order::Frequency, &mut self.lfu),
            None => self.slab.push_back(idx, Order::Frequency, &mut self.lfu),
        }
    }

    /// Free one slot in `order`, dropping the victim if no ordering holds it
    fn evict(&mut self, order: Order, stats: &CacheStats) {
        let victim = match order {
            Order::Recency => self.lru.tail,
            Order::Frequency => self.lfu.head,
        };
        let Some(idx) = victim else { return };

        match order {
            Order::Recency => {
                self.slab.unlink(idx, order, &mut self.lru);
                stats.record_lru_eviction();
            }
            Order::Frequency => {
                self.slab.unlink(idx, order, &mut self.lfu);
                stats.record_lfu_eviction();
            }
        }
        trace!(handle = idx, ?order, "evicted entry");

        if self.slab.get(idx).is_some_and(Entry::is_detached) {
            if let Some(entry) = self.slab.remove(idx) {
                self.map.remove(&entry.key);
                stats.record_removal();
                trace!(handle = idx, access_count = entry.access_count, "removed entry");
            }
        }
    }

    fn decay(&mut self, dividend: u64, minimum: u64) {
        for entry in self.slab.iter_mut() {
            entry.decay(dividend, minimum);
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.slab.clear();
        self.lru.clear();
        self.lfu.clear();
    }
}

/// Cache that keeps an entry while the LRU or the LFU ordering retains it
///
/// All operations run under a single lock because every touch rewrites
/// links in the table and in both orderings.
pub struct HybridCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    stats: CacheStats,
}

impl<K, V> HybridCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new cache with bounded recency and frequency orderings
    ///
    /// # Arguments
    /// * `lru_capacity` - Maximum members of the LRU ordering (at least 1)
    /// * `lfu_capacity` - Maximum members of the LFU ordering (at least 1)
    ///
    /// # Returns
    /// * `Result<HybridCache>` - `Error::InvalidConfiguration` if either is zero
    pub fn new(lru_capacity: usize, lfu_capacity: usize) -> Result<Self> {
        if lru_capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "lru_capacity must be at least 1".to_string(),
            ));
        }
        if lfu_capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "lfu_capacity must be at least 1".to_string(),
            ));
        }

        debug!(lru_capacity, lfu_capacity, "created hybrid cache");

        Ok(Self {
            inner: Mutex::new(Inner::new(lru_capacity, lfu_capacity)),
            stats: CacheStats::new(),
        })
    }

    /// Insert a new entry
    ///
    /// # Returns
    /// * `Result<()>` - `Error::AlreadyExists` if `key` is already cached
    pub fn add(&self, key: K, value: V) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.map.contains_key(&key) {
            return Err(Error::AlreadyExists);
        }

        inner.insert(key, value, &self.stats);
        Ok(())
    }

    /// Insert or replace the value for `key`
    pub fn set(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        match inner.map.get(&key).copied() {
            Some(idx) => {
                if let Some(entry) = inner.slab.get_mut(idx) {
                    entry.value = value;
                }
                inner.touch(idx, &self.stats);
            }
            None => inner.insert(key, value, &self.stats),
        }
    }

    /// Get a value, touching its entry on a hit
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let Some(idx) = inner.map.get(key).copied() else {
            self.stats.record_miss();
            return None;
        };

        inner.touch(idx, &self.stats);
        self.stats.record_hit();
        inner.slab.get(idx).map(|entry| entry.value.clone())
    }

    /// Lower every access count without reordering either list
    ///
    /// Each count loses `max(count / dividend, minimum)`, clamped at zero.
    /// A zero `dividend` disables the proportional term.
    pub fn decay(&self, dividend: u64, minimum: u64) {
        let mut inner = self.inner.lock();
        inner.decay(dividend, minimum);
        self.stats.record_decay();
        debug!(dividend, minimum, entries = inner.map.len(), "decayed access counts");
    }

    /// Get the number of cached entries
    pub fn count(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().map.is_empty()
    }

    /// Check whether `key` is cached, without touching it
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().map.contains_key(key)
    }

    /// Get the access count of `key`, without touching it
    pub fn access_count(&self, key: &K) -> Option<u64> {
        let inner = self.inner.lock();
        let idx = *inner.map.get(key)?;
        inner.slab.get(idx).map(|entry| entry.access_count)
    }

    /// Get the number of entries held by the LRU ordering
    pub fn lru_len(&self) -> usize {
        self.inner.lock().lru.len
    }

    /// Get the number of entries held by the LFU ordering
    pub fn lfu_len(&self) -> usize {
        self.inner.lock().lfu.len
    }

    /// Get the LRU capacity
    pub fn lru_capacity(&self) -> usize {
        self.inner.lock().lru.capacity
    }

    /// Get the LFU capacity
    pub fn lfu_capacity(&self) -> usize {
        self.inner.lock().lfu.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        self.inner.lock().clear();
        self.stats.reset();
    }
}

impl<K, V> Cache<K, V> for HybridCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        HybridCache::get(self, key)
    }

    fn add(&self, key: K, value: V) -> Result<()> {
        HybridCache::add(self, key, value)
    }

    fn set(&self, key: K, value: V) {
        HybridCache::set(self, key, value)
    }

    fn count(&self) -> usize {
        HybridCache::count(self)
    }
}

impl<K, V> Decay for HybridCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn decay(&self, dividend: u64, minimum: u64) {
        HybridCache::decay(self, dividend, minimum)
    }
}
