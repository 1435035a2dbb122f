//! Comparator and identity seams for [`IndexedHeap`](crate::IndexedHeap)
//!
//! The heap never inspects its elements directly. Ordering goes through a
//! [`Compare`] implementation and lookup keys go through an [`Identify`]
//! implementation, so the same container serves plain `Ord` values as well as
//! records whose priority and identity are separate fields.
//!
//! Both traits have blanket implementations for closures:
//!
//! ```rust
//! use indexed_heap::IndexedHeap;
//!
//! #[derive(Debug)]
//! struct Job {
//!     id: u32,
//!     deadline: u64,
//! }
//!
//! let mut heap = IndexedHeap::with_functions(
//!     |a: &Job, b: &Job| a.deadline.cmp(&b.deadline),
//!     |job: &Job| job.id,
//! );
//! heap.push(Job { id: 1, deadline: 30 });
//! heap.push(Job { id: 2, deadline: 10 });
//! assert_eq!(heap.top().map(|job| job.id), Some(2));
//! ```

use std::cmp::Ordering;
use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// An element with the same identity is already resident
    DuplicateIdentity,
    /// An update policy was configured with an out-of-range batch ratio
    InvalidPolicy,
    /// The element at `slot` is strictly smaller than its parent
    HeapOrderViolated { slot: usize },
    /// The identity index does not map the element at `slot` back to `slot`
    IndexOutOfSync { slot: usize },
    /// The identity index and the sequence hold different numbers of entries
    IndexSizeMismatch { indexed: usize, len: usize },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::DuplicateIdentity => {
                write!(f, "an element with the same identity is already in the heap")
            }
            HeapError::InvalidPolicy => {
                write!(f, "update batch percentage must be between 0 and 100")
            }
            HeapError::HeapOrderViolated { slot } => {
                write!(f, "element at slot {slot} is smaller than its parent")
            }
            HeapError::IndexOutOfSync { slot } => {
                write!(f, "identity index does not point back to slot {slot}")
            }
            HeapError::IndexSizeMismatch { indexed, len } => {
                write!(
                    f,
                    "identity index holds {indexed} entries but the heap holds {len}"
                )
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// Three-way comparison used to order heap elements
///
/// The heap is a min-heap under this comparison: the element for which
/// `compare` never returns `Greater` against any other sits at the top.
/// Implementations must be a total order for the heap invariant to be
/// meaningful.
pub trait Compare<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders elements by their `Ord` implementation
///
/// Wrap elements in [`std::cmp::Reverse`] for max-heap behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord> Compare<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Derives the lookup key of an element
///
/// The identity must stay stable while the element is inside the heap, and
/// no two resident elements may share one. The heap relies on this but only
/// [`try_push`](crate::IndexedHeap::try_push) checks it.
pub trait Identify<T, I> {
    fn identify(&self, item: &T) -> I;
}

impl<T, I, F> Identify<T, I> for F
where
    F: Fn(&T) -> I,
{
    #[inline]
    fn identify(&self, item: &T) -> I {
        self(item)
    }
}

/// Uses a clone of the element itself as its identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelfIdentity;

impl<T: Clone> Identify<T, T> for SelfIdentity {
    #[inline]
    fn identify(&self, item: &T) -> T {
        item.clone()
    }
}
