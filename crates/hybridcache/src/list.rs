//! Entry slab with intrusive doubly-linked orderings
//!
//! Entries are addressed by stable `usize` handles. Each entry carries one
//! optional `Link` per ordering, so splicing an entry in or out of either
//! list is O(1) and never moves the entry itself.

use crate::entry::{Entry, Link, Order};

/// Head, tail and bounds of one ordering
#[derive(Debug)]
pub(crate) struct ListEnds {
    pub(crate) head: Option<usize>,
    pub(crate) tail: Option<usize>,
    pub(crate) len: usize,
    pub(crate) capacity: usize,
}

impl ListEnds {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

/// Storage for every live entry
pub(crate) struct Slab<K, V> {
    nodes: Vec<Option<Entry<K, V>>>,
    free_list: Vec<usize>,
}

impl<K, V> Slab<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Store an entry and return its handle
    pub(crate) fn insert(&mut self, entry: Entry<K, V>) -> usize {
        let idx = self.alloc_node();
        self.nodes[idx] = Some(entry);
        idx
    }

    /// Take an entry out of the slab, releasing its handle
    pub(crate) fn remove(&mut self, idx: usize) -> Option<Entry<K, V>> {
        let entry = self.nodes.get_mut(idx)?.take()?;
        self.free_list.push(idx);
        Some(entry)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&Entry<K, V>> {
        self.nodes.get(idx)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Entry<K, V>> {
        self.nodes.get_mut(idx)?.as_mut()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry<K, V>> {
        self.nodes.iter_mut().flatten()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
    }

    pub(crate) fn link(&self, idx: usize, order: Order) -> Option<Link> {
        self.get(idx).and_then(|entry| entry.link(order))
    }

    pub(crate) fn is_linked(&self, idx: usize, order: Order) -> bool {
        self.link(idx, order).is_some()
    }

    /// Link `idx` in as the new head of `order`
    pub(crate) fn push_front(&mut self, idx: usize, order: Order, ends: &mut ListEnds) {
        let old_head = ends.head;
        self.set_link(idx, order, Link { prev: None, next: old_head });

        match old_head {
            Some(head_idx) => self.set_prev(head_idx, order, Some(idx)),
            None => ends.tail = Some(idx),
        }

        ends.head = Some(idx);
        ends.len += 1;
    }

    /// Link `idx` in as the new tail of `order`
    pub(crate) fn push_back(&mut self, idx: usize, order: Order, ends: &mut ListEnds) {
        let old_tail = ends.tail;
        self.set_link(idx, order, Link { prev: old_tail, next: None });

        match old_tail {
            Some(tail_idx) => self.set_next(tail_idx, order, Some(idx)),
            None => ends.head = Some(idx),
        }

        ends.tail = Some(idx);
        ends.len += 1;
    }

    /// Link `idx` in immediately before the linked entry `at`
    pub(crate) fn insert_before(&mut self, idx: usize, at: usize, order: Order, ends: &mut ListEnds) {
        let prev = self.link(at, order).and_then(|link| link.prev);
        self.set_link(idx, order, Link { prev, next: Some(at) });
        self.set_prev(at, order, Some(idx));

        match prev {
            Some(prev_idx) => self.set_next(prev_idx, order, Some(idx)),
            None => ends.head = Some(idx),
        }

        ends.len += 1;
    }

    /// Splice `idx` out of `order` and clear its membership
    pub(crate) fn unlink(&mut self, idx: usize, order: Order, ends: &mut ListEnds) {
        let Link { prev, next } = match self.get_mut(idx).and_then(|entry| entry.link_mut(order).take()) {
            Some(link) => link,
            None => return,
        };

        match prev {
            Some(prev_idx) => self.set_next(prev_idx, order, next),
            None => ends.head = next,
        }

        match next {
            Some(next_idx) => self.set_prev(next_idx, order, prev),
            None => ends.tail = prev,
        }

        ends.len -= 1;
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn set_link(&mut self, idx: usize, order: Order, link: Link) {
        if let Some(entry) = self.get_mut(idx) {
            *entry.link_mut(order) = Some(link);
        }
    }

    fn set_prev(&mut self, idx: usize, order: Order, prev: Option<usize>) {
        if let Some(link) = self.get_mut(idx).and_then(|entry| entry.link_mut(order).as_mut()) {
            link.prev = prev;
        }
    }

    fn set_next(&mut self, idx: usize, order: Order, next: Option<usize>) {
        if let Some(link) = self.get_mut(idx).and_then(|entry| entry.link_mut(order).as_mut()) {
            link.next = next;
        }
    }
}

#[cfg(test)]
impl<K: Clone, V> Slab<K, V> {
    /// Keys of `order` from head to tail
    pub(crate) fn keys(&self, order: Order, ends: &ListEnds) -> Vec<K> {
        let mut keys = Vec::with_capacity(ends.len);
        let mut cursor = ends.head;
        while let Some(idx) = cursor {
            let Some(entry) = self.get(idx) else { break };
            keys.push(entry.key.clone());
            cursor = entry.link(order).and_then(|link| link.next);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab_with(keys: &[u32]) -> (Slab<u32, ()>, Vec<usize>) {
        let mut slab = Slab::with_capacity(keys.len());
        let handles = keys.iter().map(|&k| slab.insert(Entry::new(k, ()))).collect();
        (slab, handles)
    }

    #[test]
    fn test_push_front_and_back() {
        let (mut slab, h) = slab_with(&[1, 2, 3]);
        let mut ends = ListEnds::new(3);

        slab.push_front(h[0], Order::Recency, &mut ends);
        slab.push_front(h[1], Order::Recency, &mut ends);
        slab.push_back(h[2], Order::Recency, &mut ends);

        assert_eq!(slab.keys(Order::Recency, &ends), vec![2, 1, 3]);
        assert_eq!(ends.len, 3);
        assert!(ends.is_full());
        assert_eq!(ends.tail, Some(h[2]));
    }

    #[test]
    fn test_insert_before() {
        let (mut slab, h) = slab_with(&[1, 2, 3, 4]);
        let mut ends = ListEnds::new(4);

        slab.push_back(h[0], Order::Frequency, &mut ends);
        slab.push_back(h[1], Order::Frequency, &mut ends);
        slab.insert_before(h[2], h[1], Order::Frequency, &mut ends);
        slab.insert_before(h[3], h[0], Order::Frequency, &mut ends);

        assert_eq!(slab.keys(Order::Frequency, &ends), vec![4, 1, 3, 2]);
        assert_eq!(ends.head, Some(h[3]));
        assert_eq!(ends.len, 4);
    }

    #[test]
    fn test_unlink_middle_and_ends() {
        let (mut slab, h) = slab_with(&[1, 2, 3]);
        let mut ends = ListEnds::new(3);
        for &idx in &h {
            slab.push_back(idx, Order::Recency, &mut ends);
        }

        slab.unlink(h[1], Order::Recency, &mut ends);
        assert_eq!(slab.keys(Order::Recency, &ends), vec![1, 3]);
        assert!(!slab.is_linked(h[1], Order::Recency));

        slab.unlink(h[0], Order::Recency, &mut ends);
        slab.unlink(h[2], Order::Recency, &mut ends);
        assert!(ends.head.is_none());
        assert!(ends.tail.is_none());
        assert_eq!(ends.len, 0);

        // Unlinking twice is a no-op
        slab.unlink(h[2], Order::Recency, &mut ends);
        assert_eq!(ends.len, 0);
    }

    #[test]
    fn test_orders_are_independent() {
        let (mut slab, h) = slab_with(&[1, 2]);
        let mut lru = ListEnds::new(2);
        let mut lfu = ListEnds::new(2);

        slab.push_front(h[0], Order::Recency, &mut lru);
        slab.push_front(h[1], Order::Recency, &mut lru);
        slab.push_back(h[0], Order::Frequency, &mut lfu);
        slab.push_back(h[1], Order::Frequency, &mut lfu);

        assert_eq!(slab.keys(Order::Recency, &lru), vec![2, 1]);
        assert_eq!(slab.keys(Order::Frequency, &lfu), vec![1, 2]);

        slab.unlink(h[0], Order::Recency, &mut lru);
        assert_eq!(slab.keys(Order::Frequency, &lfu), vec![1, 2]);
    }

    #[test]
    fn test_handles_are_reused() {
        let (mut slab, h) = slab_with(&[1, 2]);

        let removed = slab.remove(h[0]);
        assert_eq!(removed.map(|e| e.key), Some(1));
        assert!(slab.get(h[0]).is_none());
        assert!(slab.remove(h[0]).is_none());

        let idx = slab.insert(Entry::new(3, ()));
        assert_eq!(idx, h[0]);
        assert_eq!(slab.iter_mut().count(), 2);
    }
}
