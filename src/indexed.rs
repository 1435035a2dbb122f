//! Indexed binary heap
//!
//! An array-backed binary min-heap that can also find, update and remove a
//! resident element by its identity. A hash index maps each identity to the
//! slot currently holding it. The index is built lazily the first time a
//! lookup needs it, so code that only pushes and pops never pays for it.
//!
//! # Time Complexity
//!
//! | Operation    | Complexity                                   |
//! |--------------|----------------------------------------------|
//! | `push`       | O(log n)                                     |
//! | `pop`        | O(log n), plus any pending deferred repairs  |
//! | `top`        | O(1), plus any pending deferred repairs      |
//! | `get`        | O(1) amortized (O(n) once to build the index) |
//! | `update`     | O(1) amortized deferred, O(log n) immediate  |
//! | `delete`     | O(log n)                                     |
//! | `sort`       | O(n log n)                                   |
//! | `clear`      | O(n) to drop elements                        |
//!
//! # Example
//!
//! ```rust
//! use indexed_heap::IndexedHeap;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Timer {
//!     name: &'static str,
//!     fires_at: u64,
//! }
//!
//! let mut timers = IndexedHeap::with_functions(
//!     |a: &Timer, b: &Timer| a.fires_at.cmp(&b.fires_at),
//!     |t: &Timer| t.name,
//! );
//! timers.push(Timer { name: "flush", fires_at: 50 });
//! timers.push(Timer { name: "retry", fires_at: 20 });
//!
//! // Postpone the retry past the flush
//! timers.update_with(&"retry", |t| t.fires_at = 80);
//! assert_eq!(timers.pop().map(|t| t.name), Some("flush"));
//!
//! assert!(timers.delete(&"retry"));
//! assert!(timers.is_empty());
//! ```

use crate::policy::{Repair, UpdatePolicy};
use crate::traits::{Compare, HeapError, Identify, Natural, SelfIdentity};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

/// A binary min-heap with identity-based lookup, update and removal
///
/// - `T`: element type, owned by the heap while resident
/// - `I`: identity type derived from each element by `K`
/// - `C`: comparator ([`Natural`] by default)
/// - `K`: identity extractor ([`SelfIdentity`] by default)
///
/// Identities must be unique among resident elements. [`push`](Self::push)
/// trusts the caller; a duplicate silently repoints the index at the newer
/// element. Use [`try_push`](Self::try_push) when that cannot be ruled out.
pub struct IndexedHeap<T, I, C = Natural, K = SelfIdentity> {
    /// Heap-ordered elements
    data: Vec<T>,
    /// Identity to slot, absent until a lookup needs it
    index: Option<FxHashMap<I, usize>>,
    compare: C,
    identify: K,
    policy: UpdatePolicy,
    repair: Repair<I>,
}

#[inline]
fn parent(slot: usize) -> usize {
    (slot - 1) / 2
}

#[inline]
fn left_child(slot: usize) -> usize {
    2 * slot + 1
}

impl<T> IndexedHeap<T, T>
where
    T: Ord + Hash + Clone,
{
    /// Creates an empty heap ordered by `Ord` that uses each element as its
    /// own identity
    pub fn new() -> Self {
        Self::with_functions(Natural, SelfIdentity)
    }
}

impl<T> Default for IndexedHeap<T, T>
where
    T: Ord + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, I, C, K> IndexedHeap<T, I, C, K>
where
    I: Eq + Hash + Clone,
    C: Compare<T>,
    K: Identify<T, I>,
{
    /// Creates an empty heap with an explicit comparator and identity function
    pub fn with_functions(compare: C, identify: K) -> Self {
        Self {
            data: Vec::new(),
            index: None,
            compare,
            identify,
            policy: UpdatePolicy::default(),
            repair: Repair::Settled,
        }
    }

    /// Like [`with_functions`](Self::with_functions) with room for `capacity`
    /// elements
    pub fn with_capacity(capacity: usize, compare: C, identify: K) -> Self {
        let mut heap = Self::with_functions(compare, identify);
        heap.data.reserve(capacity);
        heap
    }

    /// Builds a heap by pushing every value of `values` in order
    ///
    /// Works for anything iterable: vectors, sets, or the `.into_values()`
    /// of a map.
    pub fn from_values<V>(values: V, compare: C, identify: K) -> Self
    where
        V: IntoIterator<Item = T>,
    {
        let mut heap = Self::with_functions(compare, identify);
        heap.extend(values);
        heap
    }

    /// Sets the key-change policy, flushing anything deferred under the old one
    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.flush();
        self.policy = policy;
        self
    }

    /// Returns the active key-change policy
    pub fn update_policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Number of resident elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` when no deferred key changes are waiting to be repaired
    pub fn is_settled(&self) -> bool {
        self.repair.is_settled()
    }

    /// Number of distinct elements with deferred key changes
    pub fn pending_updates(&self) -> usize {
        self.repair.pending()
    }

    /// Reserves room for `additional` more elements, in the index too once built
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
        if let Some(index) = self.index.as_mut() {
            index.reserve(additional);
        }
    }

    /// Releases spare capacity held by the elements and the index
    pub fn shrink_to_fit(&mut self) {
        self.data.shrink_to_fit();
        if let Some(index) = self.index.as_mut() {
            index.shrink_to_fit();
        }
    }

    /// Inserts an element
    ///
    /// The caller guarantees no resident element shares its identity.
    ///
    /// # Time Complexity
    /// O(log n)
    pub fn push(&mut self, item: T) -> &mut Self {
        let slot = self.data.len();
        if let Some(index) = self.index.as_mut() {
            index.insert(self.identify.identify(&item), slot);
        }
        self.data.push(item);
        self.sift_up(slot);
        self
    }

    /// Inserts an element unless one with the same identity is resident
    ///
    /// On error the rejected element is dropped. Builds the identity index
    /// unless the root already matches.
    pub fn try_push(&mut self, item: T) -> Result<&mut Self, HeapError> {
        let id = self.identify.identify(&item);
        if self.locate(&id).is_some() {
            debug!("refused push of an element with a resident identity");
            return Err(HeapError::DuplicateIdentity);
        }
        Ok(self.push(item))
    }

    /// Removes and returns the minimum element
    ///
    /// Repairs deferred key changes first.
    ///
    /// # Time Complexity
    /// O(log n) once settled
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        self.flush();

        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let top = self.data.pop()?;

        if let Some(index) = self.index.as_mut() {
            index.remove(&self.identify.identify(&top));
            if let Some(moved) = self.data.first() {
                index.insert(self.identify.identify(moved), 0);
            }
        }
        self.sift_down(0);

        Some(top)
    }

    /// Returns the minimum element without removing it
    ///
    /// Takes `&mut self` because deferred key changes are repaired first.
    pub fn top(&mut self) -> Option<&T> {
        self.flush();
        self.data.first()
    }

    /// Looks up the resident element with identity `id`
    ///
    /// Builds the identity index on first use.
    pub fn get(&mut self, id: &I) -> Option<&T> {
        let slot = self.locate(id)?;
        self.data.get(slot)
    }

    /// Returns `true` if an element with identity `id` is resident
    pub fn contains(&mut self, id: &I) -> bool {
        self.locate(id).is_some()
    }

    /// Replaces the resident element sharing `item`'s identity
    ///
    /// Returns `false`, dropping `item`, when no such element is resident.
    /// Otherwise the new key is repaired according to the
    /// [`UpdatePolicy`].
    pub fn update(&mut self, item: T) -> bool {
        let id = self.identify.identify(&item);
        let Some(slot) = self.locate(&id) else {
            return false;
        };
        self.data[slot] = item;
        self.key_changed(id, slot);
        true
    }

    /// Mutates the resident element with identity `id` in place
    ///
    /// `f` may change anything that affects ordering but must leave the
    /// identity untouched.
    pub fn update_with<F>(&mut self, id: &I, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let Some(slot) = self.locate(id) else {
            return false;
        };
        f(&mut self.data[slot]);
        debug_assert!(
            self.identify.identify(&self.data[slot]) == *id,
            "update_with changed the element's identity"
        );
        self.key_changed(id.clone(), slot);
        true
    }

    /// Removes and returns the resident element with identity `id`
    ///
    /// # Time Complexity
    /// O(log n), plus a one-off O(n) index build
    pub fn remove(&mut self, id: &I) -> Option<T> {
        let slot = self.locate(id)?;
        self.repair.forget(id);

        let last = self.data.len() - 1;
        self.data.swap(slot, last);
        let removed = self.data.pop()?;

        if let Some(index) = self.index.as_mut() {
            index.remove(id);
            if let Some(moved) = self.data.get(slot) {
                index.insert(self.identify.identify(moved), slot);
            }
        }
        if slot < self.data.len() {
            self.sift(slot);
        }

        Some(removed)
    }

    /// Removes the resident element with identity `id`
    ///
    /// Returns `false` and leaves the heap untouched if there is none.
    pub fn delete(&mut self, id: &I) -> bool {
        self.remove(id).is_some()
    }

    /// Iterates over the elements in array order, not priority order
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// The elements in array order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Removes every element and drops the identity index
    pub fn clear(&mut self) -> &mut Self {
        self.data.clear();
        self.index = None;
        self.repair = Repair::Settled;
        self
    }

    /// Restores heap order from scratch
    ///
    /// Sifts every slot up in ascending order, which is enough to recover
    /// from arbitrary reordering. The identity index is dropped and rebuilt
    /// on the next lookup, and deferred key changes are discarded as
    /// repaired.
    pub fn sort(&mut self) -> &mut Self {
        self.index = None;
        for slot in 1..self.data.len() {
            self.sift_up(slot);
        }
        self.repair = Repair::Settled;
        debug!("re-sorted heap of {} elements", self.data.len());
        self
    }

    /// Repairs all deferred key changes
    ///
    /// A single change is sifted into place. Several changes may sit on one
    /// root path, where sifting them one at a time can strand a large key in
    /// an ancestor slot, so the whole array is heapified instead.
    pub fn flush(&mut self) -> &mut Self {
        let Some(pending) = self.repair.take_pending() else {
            return self;
        };
        debug!("repairing {} deferred key changes", pending.len());
        if pending.len() == 1 {
            for id in pending {
                if let Some(slot) = self.locate(&id) {
                    self.sift(slot);
                }
            }
        } else {
            self.heapify();
        }
        self
    }

    /// Consumes the heap, returning its elements in array order
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Consumes the heap, returning its elements in ascending order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Some(item) = self.pop() {
            sorted.push(item);
        }
        sorted
    }

    /// Verifies size equality, index consistency and, when settled, heap order
    pub fn check_invariants(&self) -> Result<(), HeapError> {
        if let Some(index) = &self.index {
            if index.len() != self.data.len() {
                return Err(HeapError::IndexSizeMismatch {
                    indexed: index.len(),
                    len: self.data.len(),
                });
            }
            for (slot, item) in self.data.iter().enumerate() {
                if index.get(&self.identify.identify(item)) != Some(&slot) {
                    return Err(HeapError::IndexOutOfSync { slot });
                }
            }
        }
        if self.repair.is_settled() {
            for slot in 1..self.data.len() {
                if self.less(slot, parent(slot)) {
                    return Err(HeapError::HeapOrderViolated { slot });
                }
            }
        }
        Ok(())
    }

    fn key_changed(&mut self, id: I, slot: usize) {
        match self.policy {
            UpdatePolicy::Immediate => self.sift(slot),
            UpdatePolicy::Deferred { .. } => {
                let threshold = self.policy.flush_threshold(self.data.len());
                if self.repair.defer(id) > threshold {
                    self.flush();
                }
            }
        }
    }

    /// Finds the slot holding `id`, checking the root before the index
    fn locate(&mut self, id: &I) -> Option<usize> {
        let root = self.data.first()?;
        if self.identify.identify(root) == *id {
            return Some(0);
        }
        if self.index.is_none() {
            self.reindex();
        }
        self.index.as_ref()?.get(id).copied()
    }

    fn reindex(&mut self) {
        let mut index = FxHashMap::with_capacity_and_hasher(self.data.len(), Default::default());
        for (slot, item) in self.data.iter().enumerate() {
            index.insert(self.identify.identify(item), slot);
        }
        trace!("rebuilt identity index over {} slots", self.data.len());
        self.index = Some(index);
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        self.compare.compare(&self.data[a], &self.data[b]) == Ordering::Less
    }

    /// Swaps two slots and patches both index entries if the index exists
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.data.swap(a, b);
        if let Some(index) = self.index.as_mut() {
            index.insert(self.identify.identify(&self.data[a]), a);
            index.insert(self.identify.identify(&self.data[b]), b);
        }
    }

    /// Move element at slot up while it is strictly smaller than its parent
    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let up = parent(slot);
            if !self.less(slot, up) {
                break;
            }
            self.swap_slots(slot, up);
            slot = up;
        }
    }

    /// Move element at slot down while a child is strictly smaller
    ///
    /// Ties between the children go to the left one.
    fn sift_down(&mut self, mut slot: usize) {
        let len = self.data.len();
        loop {
            let left = left_child(slot);
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, slot) {
                break;
            }
            self.swap_slots(slot, child);
            slot = child;
        }
    }

    /// Bottom-up heap construction over the whole array, O(n)
    fn heapify(&mut self) {
        for slot in (0..self.data.len() / 2).rev() {
            self.sift_down(slot);
        }
    }

    /// Repair a single slot whose key may be too small or too large
    fn sift(&mut self, slot: usize) {
        if self.data.len() < 2 {
            return;
        }
        if slot > 0 && self.less(slot, parent(slot)) {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
    }
}

impl<T, I, C, K> Extend<T> for IndexedHeap<T, I, C, K>
where
    I: Eq + Hash + Clone,
    C: Compare<T>,
    K: Identify<T, I>,
{
    fn extend<V: IntoIterator<Item = T>>(&mut self, values: V) {
        let values = values.into_iter();
        self.reserve(values.size_hint().0);
        for item in values {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for IndexedHeap<T, T>
where
    T: Ord + Hash + Clone,
{
    fn from_iter<V: IntoIterator<Item = T>>(values: V) -> Self {
        Self::from_values(values, Natural, SelfIdentity)
    }
}

impl<T, I, C, K> IntoIterator for IndexedHeap<T, I, C, K> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T, I, C, K> IntoIterator for &'a IndexedHeap<T, I, C, K> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T: fmt::Debug, I, C, K> fmt::Debug for IndexedHeap<T, I, C, K>
where
    I: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedHeap")
            .field("data", &self.data)
            .field("indexed", &self.index.is_some())
            .field("policy", &self.policy)
            .field("pending", &self.repair.pending())
            .finish()
    }
}
