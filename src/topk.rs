//! Top-K selection and the single ranking order every strategy shares:
//! count descending, then key ascending.

use crate::date::PostDate;
use crate::error::{EngineError, Result};
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One ranked `(key, count)` entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Ranked {
    pub key: String,
    pub count: u64,
}

impl Ranked {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self { key: key.into(), count }
    }
}

impl From<(String, u64)> for Ranked {
    fn from((key, count): (String, u64)) -> Self {
        Self { key, count }
    }
}

/// A ranked date with its most active author and its post total.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ActiveDate {
    pub date: PostDate,
    pub top_author: String,
    pub total: u64,
}

/// `Less` means `a` ranks ahead of `b`.
#[inline]
pub fn rank_cmp<K: Ord + ?Sized>(a: (&K, u64), b: (&K, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Reject `n == 0` before any I/O happens.
pub fn check_top_n(n: usize) -> Result<()> {
    if n == 0 {
        return Err(EngineError::InvalidParameter { name: "n", reason: "must be at least 1".into() });
    }
    Ok(())
}

/// Heap slot ordered so that "greater" means "ranks better".
struct Slot<K> {
    count: u64,
    key: K,
}

impl<K: Ord> Ord for Slot<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_cmp((&other.key, other.count), (&self.key, self.count))
    }
}
impl<K: Ord> PartialOrd for Slot<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<K: Ord> PartialEq for Slot<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<K: Ord> Eq for Slot<K> {}

/// Bounded running top-K: keeps at most `k` entries, evicting the worst.
///
/// Costs O(m log k) over m offered entries instead of sorting all of them.
pub struct TopK<K: Ord> {
    heap: BinaryHeap<Reverse<Slot<K>>>,
    k: usize,
}

impl<K: Ord> TopK<K> {
    pub fn new(k: usize) -> Self {
        // `k` is caller-controlled; only reserve what a small ranking needs.
        Self { heap: BinaryHeap::with_capacity(k.min(1024) + 1), k }
    }

    pub fn offer(&mut self, key: K, count: u64) {
        if self.k == 0 || count == 0 {
            return;
        }
        if self.heap.len() == self.k {
            if let Some(Reverse(worst)) = self.heap.peek() {
                if rank_cmp((&key, count), (&worst.key, worst.count)) != Ordering::Less {
                    return;
                }
            }
            self.heap.pop();
        }
        self.heap.push(Reverse(Slot { count, key }));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Best first.
    pub fn into_sorted_vec(self) -> Vec<(K, u64)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(slot)| (slot.key, slot.count))
            .collect()
    }
}

/// Select the `n` best entries of a finished count mapping with a bounded heap.
pub fn top_k<K, I>(counts: I, n: usize) -> Vec<(K, u64)>
where
    K: Ord,
    I: IntoIterator<Item = (K, u64)>,
{
    let mut top = TopK::new(n);
    for (key, count) in counts {
        top.offer(key, count);
    }
    top.into_sorted_vec()
}

/// Sort everything by rank and keep the first `n`. Used by the columnar path,
/// where the groups are already materialized in a vector.
pub fn sort_then_slice<K: Ord + Send>(mut groups: Vec<(K, u64)>, n: usize) -> Vec<(K, u64)> {
    use rayon::prelude::*;
    groups.retain(|(_, c)| *c > 0);
    // rank_cmp is a total order over distinct keys, so unstable sorting is deterministic.
    groups.par_sort_unstable_by(|a, b| rank_cmp((&a.0, a.1), (&b.0, b.1)));
    groups.truncate(n);
    groups
}
