//! Cache entry shared by the recency and frequency orderings

/// Selects one of the two orderings an entry can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    /// LRU: head is most recently touched, tail is evicted first
    Recency,
    /// LFU: ascending access count, head is evicted first
    Frequency,
}

/// Neighbours of an entry within one ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

/// A single cached key/value pair
///
/// The entry lives in the table while at least one of `lru` or `lfu` is set.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) access_count: u64,
    pub(crate) lru: Option<Link>,
    pub(crate) lfu: Option<Link>,
}

impl<K, V> Entry<K, V> {
    /// Create an entry that belongs to neither ordering yet
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            access_count: 0,
            lru: None,
            lfu: None,
        }
    }

    pub(crate) fn link(&self, order: Order) -> Option<Link> {
        match order {
            Order::Recency => self.lru,
            Order::Frequency => self.lfu,
        }
    }

    pub(crate) fn link_mut(&mut self, order: Order) -> &mut Option<Link> {
        match order {
            Order::Recency => &mut self.lru,
            Order::Frequency => &mut self.lfu,
        }
    }

    /// True once the entry has been dropped from both orderings
    pub(crate) fn is_detached(&self) -> bool {
        self.lru.is_none() && self.lfu.is_none()
    }

    /// Lower the access count for a decay sweep, never below zero
    pub(crate) fn decay(&mut self, dividend: u64, minimum: u64) {
        let proportional = if dividend == 0 {
            0
        } else {
            self.access_count / dividend
        };
        let subtrahend = proportional.max(minimum).min(self.access_count);
        self.access_count -= subtrahend;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_count(count: u64) -> Entry<&'static str, u32> {
        let mut entry = Entry::new("k", 0);
        entry.access_count = count;
        entry
    }

    #[test]
    fn test_entry_starts_detached() {
        let entry = Entry::new("k", 1);
        assert!(entry.is_detached());
        assert_eq!(entry.access_count, 0);
    }

    #[test]
    fn test_link_selects_order() {
        let mut entry = Entry::new("k", 1);
        *entry.link_mut(Order::Frequency) = Some(Link::default());

        assert!(entry.link(Order::Recency).is_none());
        assert!(entry.link(Order::Frequency).is_some());
        assert!(!entry.is_detached());
    }

    #[test]
    fn test_decay_proportional() {
        let mut entry = with_count(40);
        entry.decay(4, 1);
        assert_eq!(entry.access_count, 30);
    }

    #[test]
    fn test_decay_minimum_dominates() {
        let mut entry = with_count(40);
        entry.decay(100, 5);
        assert_eq!(entry.access_count, 35);
    }

    #[test]
    fn test_decay_clamps_at_zero() {
        let mut entry = with_count(3);
        entry.decay(1, 100);
        assert_eq!(entry.access_count, 0);
    }

    #[test]
    fn test_decay_zero_dividend() {
        let mut entry = with_count(10);
        entry.decay(0, 2);
        assert_eq!(entry.access_count, 8);

        entry.decay(0, 0);
        assert_eq!(entry.access_count, 8);
    }
}
