//! Key-change repair policies
//!
//! When a resident element's priority changes, the heap can either repair its
//! position straight away ([`UpdatePolicy::Immediate`]) or remember the
//! element as dirty and repair a whole batch later
//! ([`UpdatePolicy::Deferred`]). Deferred repair happens when the batch grows
//! past a threshold or when a read needs the minimum.
//!
//! | Policy      | `update`              | `top` / `pop`                     |
//! |-------------|-----------------------|-----------------------------------|
//! | `Immediate` | O(log n)              | O(1) / O(log n)                   |
//! | `Deferred`  | O(1) amortized        | O(k log n) after k pending updates |

use crate::traits::HeapError;
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// How the heap reacts to an element whose key changed
///
/// # Example
///
/// ```rust
/// use indexed_heap::{IndexedHeap, UpdatePolicy};
///
/// let policy = UpdatePolicy::deferred(32, 5).unwrap();
/// let heap: IndexedHeap<u32, u32> = IndexedHeap::new().with_update_policy(policy);
/// assert_eq!(heap.update_policy(), policy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Repair every update in place as soon as it is reported
    Immediate,
    /// Collect updated elements and repair them in one pass
    ///
    /// A flush is forced once the number of pending elements exceeds
    /// `max(min_batch, len * percent / 100)`.
    Deferred { min_batch: usize, percent: usize },
}

impl UpdatePolicy {
    pub const DEFAULT_MIN_BATCH: usize = 10;
    pub const DEFAULT_PERCENT: usize = 10;

    /// Creates a deferred policy, rejecting a percentage above 100
    pub fn deferred(min_batch: usize, percent: usize) -> Result<Self, HeapError> {
        if percent > 100 {
            return Err(HeapError::InvalidPolicy);
        }
        Ok(UpdatePolicy::Deferred { min_batch, percent })
    }

    /// Largest number of pending updates tolerated for a heap of `len` elements
    pub fn flush_threshold(&self, len: usize) -> usize {
        match *self {
            UpdatePolicy::Immediate => 0,
            UpdatePolicy::Deferred { min_batch, percent } => {
                min_batch.max(len.saturating_mul(percent) / 100)
            }
        }
    }
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        UpdatePolicy::Deferred {
            min_batch: Self::DEFAULT_MIN_BATCH,
            percent: Self::DEFAULT_PERCENT,
        }
    }
}

/// Settled/unsettled state of the heap
///
/// `Unsettled` carries the identities whose keys changed since the last
/// flush. Heap order is only guaranteed in `Settled`.
#[derive(Debug, Clone)]
pub(crate) enum Repair<I> {
    Settled,
    Unsettled { pending: FxHashSet<I> },
}

impl<I> Default for Repair<I> {
    fn default() -> Self {
        Repair::Settled
    }
}

impl<I: Eq + Hash> Repair<I> {
    pub(crate) fn is_settled(&self) -> bool {
        matches!(self, Repair::Settled)
    }

    pub(crate) fn pending(&self) -> usize {
        match self {
            Repair::Settled => 0,
            Repair::Unsettled { pending } => pending.len(),
        }
    }

    /// Records `id` as dirty and returns the new number of pending identities
    pub(crate) fn defer(&mut self, id: I) -> usize {
        match self {
            Repair::Settled => {
                let mut pending = FxHashSet::default();
                pending.insert(id);
                *self = Repair::Unsettled { pending };
                1
            }
            Repair::Unsettled { pending } => {
                pending.insert(id);
                pending.len()
            }
        }
    }

    /// Drops `id` from the pending set, settling if nothing is left
    pub(crate) fn forget(&mut self, id: &I) {
        if let Repair::Unsettled { pending } = self {
            pending.remove(id);
            if pending.is_empty() {
                *self = Repair::Settled;
            }
        }
    }

    /// Moves to `Settled`, handing back whatever was pending
    pub(crate) fn take_pending(&mut self) -> Option<FxHashSet<I>> {
        match std::mem::take(self) {
            Repair::Settled => None,
            Repair::Unsettled { pending } => Some(pending),
        }
    }
}
