//! Narrow band priority queue.
//!
//! Entries pop in ascending distance order. Among equal distances the entry
//! pushed first pops first, so the order matches a list kept sorted by
//! inserting each new entry after every existing entry of equal distance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One pixel waiting in the band.
#[derive(Debug, Clone, Copy)]
pub struct BandEntry {
    /// Flat pixel index.
    pub index: usize,
    /// Distance the pixel had when it was pushed.
    pub distance: f32,
    seq: u64,
}

impl PartialEq for BandEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BandEntry {}

impl PartialOrd for BandEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BandEntry {
    // Reversed: `BinaryHeap` is a max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue over [`BandEntry`] with FIFO tie-break.
#[derive(Debug, Default)]
pub struct Band {
    heap: BinaryHeap<BandEntry>,
    next_seq: u64,
}

impl Band {
    /// Create an empty band.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a pixel at `distance`.
    pub fn push(&mut self, index: usize, distance: f32) {
        self.heap.push(BandEntry {
            index,
            distance,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Remove the entry with the smallest distance, earliest pushed first.
    pub fn pop(&mut self) -> Option<BandEntry> {
        self.heap.pop()
    }

    /// Number of entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the band has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
