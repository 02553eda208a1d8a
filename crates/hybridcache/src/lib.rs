//! # hybridcache
//!
//! In-memory key-value cache retaining an entry while either of two eviction
//! orderings holds it.
//!
//! ## Architecture
//! - **HashMap**: AHash table from key to a stable slab handle (O(1))
//! - **LRU List**: Intrusive doubly-linked list by recency (O(1))
//! - **LFU List**: Intrusive doubly-linked list by access count, promoted by
//!   a local splice on each touch
//! - **Decay**: Bulk access-count reduction, optionally scheduled every N
//!   calls by [`AutoDecayingCache`]
//!
//! ```
//! use hybridcache::{AutoDecayingCache, Cache, HybridCache};
//!
//! let cache = AutoDecayingCache::with_params(HybridCache::new(64, 64)?, 1_000, 2, 1)?;
//! cache.set("answer", 42);
//! assert_eq!(cache.get(&"answer"), Some(42));
//! # Ok::<(), hybridcache::Error>(())
//! ```

#![warn(missing_docs)]

mod decay;
mod entry;
mod error;
mod hybrid;
mod list;
mod stats;
mod traits;

pub use decay::{AutoDecayingCache, DecayPolicy};
pub use error::{Error, Result};
pub use hybrid::HybridCache;
pub use stats::CacheStats;
pub use traits::{Cache, Decay};
