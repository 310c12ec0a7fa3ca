use crate::Timestamp;
use core::cmp::Reverse;
use std::collections::BinaryHeap;

/// A virtual-time ordered event queue.
///
/// Events pop in non-decreasing [`Timestamp`] order; events scheduled for
/// the same instant pop in insertion (FIFO) order. The tie-break is part of
/// the ordering key — a per-queue sequence number — rather than an accident
/// of heap behavior, so the relative ordering of same-instant events is
/// stable and reproducible.
pub struct EventQueue<T> {
    heap: BinaryHeap<Reverse<OrderedByTime<T>>>,
    next_seq: u64,
}

struct OrderedByTime<T> {
    at: Timestamp,
    seq: u64,
    event: T,
}

impl<T> PartialEq for OrderedByTime<T> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<T> Eq for OrderedByTime<T> {}

impl<T> PartialOrd for OrderedByTime<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for OrderedByTime<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Timestamp of the next event, without popping it.
    #[inline]
    pub fn next_event_time(&self) -> Option<Timestamp> {
        self.heap.peek().map(|v| v.0.at)
    }

    pub fn pop(&mut self) -> Option<(Timestamp, T)> {
        self.heap.pop().map(|v| (v.0.at, v.0.event))
    }

    pub fn push(&mut self, at: Timestamp, event: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(OrderedByTime { at, seq, event }))
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(millis: u64) -> Timestamp {
        Timestamp::ZERO + Duration::from_millis(millis)
    }

    #[test]
    fn empty() {
        let mut q = EventQueue::<()>::new();

        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert!(q.pop().is_none());
        assert!(q.next_event_time().is_none());
    }

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        q.push(at(300), "late");
        q.push(at(100), "early");
        q.push(at(200), "middle");

        assert_eq!(q.next_event_time(), Some(at(100)));
        assert_eq!(q.pop(), Some((at(100), "early")));
        assert_eq!(q.pop(), Some((at(200), "middle")));
        assert_eq!(q.pop(), Some((at(300), "late")));
        assert!(q.pop().is_none());
    }

    #[test]
    fn ties_break_in_insertion_order() {
        let mut q = EventQueue::new();
        q.push(at(100), "first");
        q.push(at(100), "second");
        q.push(at(100), "third");

        assert_eq!(q.pop(), Some((at(100), "first")));
        assert_eq!(q.pop(), Some((at(100), "second")));
        assert_eq!(q.pop(), Some((at(100), "third")));
    }
}
