//! Indexed Priority Queue for Rust
//!
//! This crate provides an array-backed binary min-heap that, besides the usual
//! push / pop / peek, can find, reprioritize and remove an element that is
//! already queued, in O(log n), by its identity.
//!
//! # Features
//!
//! - **Identity index**: a hash map from identity to slot, built lazily on the
//!   first lookup and patched on every move afterwards
//! - **Deferred updates**: key changes can be batched and repaired when the
//!   minimum is next read (see [`UpdatePolicy`])
//! - **Pluggable ordering and identity**: any three-way comparator and any
//!   identity function, closures included (see [`Compare`] and [`Identify`])
//!
//! # Example
//!
//! ```rust
//! use indexed_heap::IndexedHeap;
//!
//! let mut heap = IndexedHeap::new();
//! heap.push(5).push(3).push(8).push(1);
//!
//! assert!(heap.delete(&3));
//! assert_eq!(heap.pop(), Some(1));
//! assert_eq!(heap.pop(), Some(5));
//! assert_eq!(heap.pop(), Some(8));
//! assert_eq!(heap.pop(), None);
//! ```
//!
//! # Thread Safety
//!
//! `IndexedHeap` has no internal synchronisation. Wrap it in a mutex for
//! shared access.

pub mod indexed;
pub mod policy;
pub mod traits;

pub use indexed::IndexedHeap;
pub use policy::UpdatePolicy;
pub use traits::{Compare, HeapError, Identify, Natural, SelfIdentity};
