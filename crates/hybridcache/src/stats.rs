//! Cache statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache performance tracking
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    lru_evictions: AtomicU64,
    lfu_evictions: AtomicU64,
    removals: AtomicU64,
    decays: AtomicU64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lru_eviction(&self) {
        self.lru_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lfu_eviction(&self) {
        self.lfu_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decay(&self) {
        self.decays.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get total entries created
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Get total evictions from the recency ordering
    pub fn lru_evictions(&self) -> u64 {
        self.lru_evictions.load(Ordering::Relaxed)
    }

    /// Get total evictions from the frequency ordering
    pub fn lfu_evictions(&self) -> u64 {
        self.lfu_evictions.load(Ordering::Relaxed)
    }

    /// Get total entries dropped after leaving both orderings
    pub fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    /// Get total decay sweeps
    pub fn decays(&self) -> u64 {
        self.decays.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that hit, 0.0 before any lookup
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        match hits.saturating_add(self.misses()) {
            0 => 0.0,
            lookups => hits as f64 / lookups as f64,
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.lru_evictions,
            &self.lfu_evictions,
            &self.removals,
            &self.decays,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
