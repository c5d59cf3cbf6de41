//! Top-K selection over scalar scores
//!
//! Bounded-heap selection: O(N log K) time, O(K) space. Used both for the
//! full neighbor ranking (K = N - 1) and for picking the strongest
//! correlation partners of one agent.
//!
//! Ordering is total and deterministic: equal scores keep the lower index
//! first, in both directions. NaN scores are skipped.

use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Sort order for Top-K selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (smallest K values)
    Ascending,
    /// Descending order (largest K values)
    Descending,
}

// Heap item for descending order (min-heap: the weakest candidate on top,
// i.e. the smallest value, and among equal values the highest index)
#[derive(Debug)]
struct MinHeapItem {
    value: f64,
    index: usize,
}

impl PartialEq for MinHeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MinHeapItem {}

impl Ord for MinHeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for MinHeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Heap item for ascending order (max-heap: the largest value on top, and
// among equal values the highest index)
#[derive(Debug)]
struct MaxHeapItem {
    value: f64,
    index: usize,
}

impl PartialEq for MaxHeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MaxHeapItem {}

impl Ord for MaxHeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for MaxHeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Indices of the K best values, best first
///
/// With [`SortOrder::Ascending`] the K smallest values are returned in
/// ascending order; with [`SortOrder::Descending`] the K largest in
/// descending order. Ties are broken by ascending index. If `k` exceeds
/// the number of non-NaN values, all of them are returned.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `k` is zero
pub fn select_top_k(values: &[f64], k: usize, order: SortOrder) -> Result<Vec<usize>> {
    if k == 0 {
        return Err(Error::InvalidInput("k must be greater than 0".to_string()));
    }

    let candidates = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, value)| !value.is_nan());

    match order {
        SortOrder::Descending => {
            // Use min-heap to find largest K
            let mut heap: BinaryHeap<MinHeapItem> = BinaryHeap::with_capacity(k.min(values.len()));
            for (index, value) in candidates {
                let item = MinHeapItem { value, index };
                if heap.len() < k {
                    heap.push(item);
                } else if heap.peek().is_some_and(|top| item < *top) {
                    heap.pop();
                    heap.push(item);
                }
            }
            // Ascending heap order is best-first for the reversed comparison
            Ok(heap.into_sorted_vec().into_iter().map(|item| item.index).collect())
        }
        SortOrder::Ascending => {
            // Use max-heap to find smallest K
            let mut heap: BinaryHeap<MaxHeapItem> = BinaryHeap::with_capacity(k.min(values.len()));
            for (index, value) in candidates {
                let item = MaxHeapItem { value, index };
                if heap.len() < k {
                    heap.push(item);
                } else if heap.peek().is_some_and(|top| item < *top) {
                    heap.pop();
                    heap.push(item);
                }
            }
            Ok(heap.into_sorted_vec().into_iter().map(|item| item.index).collect())
        }
    }
}
