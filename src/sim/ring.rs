//! Fixed-capacity collection that evicts its oldest entry

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Capacity 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning the entry evicted to make room
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Remove everything, returning the drained entries oldest first
    pub fn clear(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_evicts_oldest() {
        let mut ring = RingBuffer::new(3);
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(ring.clear(), vec![2, 3, 4]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut ring = RingBuffer::new(0);
        assert_eq!(ring.capacity(), 1);
        ring.push('a');
        assert_eq!(ring.push('b'), Some('a'));
        assert_eq!(ring.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_keeps_last_n(capacity in 1usize..32, items in proptest::collection::vec(any::<u16>(), 0..200)) {
            let mut ring = RingBuffer::new(capacity);
            let mut evicted = Vec::new();
            for &item in &items {
                evicted.extend(ring.push(item));
            }
            let keep = items.len().min(capacity);
            let tail: Vec<u16> = items[items.len() - keep..].to_vec();
            prop_assert_eq!(ring.iter().copied().collect::<Vec<_>>(), tail);
            prop_assert_eq!(evicted, items[..items.len() - keep].to_vec());
        }
    }
}
