//! Scenario tests for IndexedHeap
//!
//! Each helper takes the update policy so every scenario runs against both
//! deferred and immediate repair.

use indexed_heap::{HeapError, IndexedHeap, UpdatePolicy};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    id: &'static str,
    key: i32,
}

fn entry(id: &'static str, key: i32) -> Entry {
    Entry { id, key }
}

fn by_key(a: &Entry, b: &Entry) -> Ordering {
    a.key.cmp(&b.key)
}

fn entry_id(e: &Entry) -> &'static str {
    e.id
}

type EntryHeap =
    IndexedHeap<Entry, &'static str, fn(&Entry, &Entry) -> Ordering, fn(&Entry) -> &'static str>;

fn entry_heap(policy: UpdatePolicy) -> EntryHeap {
    IndexedHeap::with_functions(
        by_key as fn(&Entry, &Entry) -> Ordering,
        entry_id as fn(&Entry) -> &'static str,
    )
    .with_update_policy(policy)
}

const POLICIES: [UpdatePolicy; 2] = [
    UpdatePolicy::Immediate,
    UpdatePolicy::Deferred {
        min_batch: 10,
        percent: 10,
    },
];

fn drain_ids(heap: &mut EntryHeap) -> Vec<&'static str> {
    let mut ids = Vec::new();
    while let Some(e) = heap.pop() {
        ids.push(e.id);
    }
    ids
}

/// Push 5, 3, 8, 1 and pop them back in ascending order
fn test_pop_order(policy: UpdatePolicy) {
    let mut heap = IndexedHeap::new().with_update_policy(policy);
    for key in [5, 3, 8, 1] {
        heap.push(key);
    }
    let popped: Vec<i32> = std::iter::from_fn(|| heap.pop()).collect();
    assert_eq!(popped, vec![1, 3, 5, 8]);
}

/// Lowering a queued element's key makes it the next pop
fn test_update_to_new_minimum(policy: UpdatePolicy) {
    let mut heap = entry_heap(policy);
    heap.push(entry("a", 10)).push(entry("b", 5));

    assert!(heap.update(entry("a", 1)));
    assert_eq!(heap.pop(), Some(entry("a", 1)));
    assert_eq!(heap.pop(), Some(entry("b", 5)));
}

/// Deleting the minimum leaves the rest in order and unreachable by id
fn test_delete_then_drain(policy: UpdatePolicy) {
    let mut heap = entry_heap(policy);
    heap.push(entry("a", 3))
        .push(entry("b", 1))
        .push(entry("c", 2));

    assert!(heap.delete(&"b"));
    assert_eq!(heap.get(&"b"), None);
    assert_eq!(drain_ids(&mut heap), vec!["c", "a"]);
}

/// Clearing empties the heap and forgets every identity
fn test_clear_forgets(policy: UpdatePolicy) {
    let mut heap = entry_heap(policy);
    for (id, key) in [("a", 1), ("b", 2), ("c", 3)] {
        heap.push(entry(id, key));
    }
    assert_eq!(heap.get(&"c"), Some(&entry("c", 3)));

    heap.clear();
    assert_eq!(heap.len(), 0);
    for id in ["a", "b", "c"] {
        assert_eq!(heap.get(&id), None);
    }
    assert_eq!(heap.pop(), None);
}

/// Deleting an unknown identity is a no-op
fn test_idempotent_delete(policy: UpdatePolicy) {
    let mut heap = entry_heap(policy);
    assert!(!heap.delete(&"ghost"));

    heap.push(entry("a", 1)).push(entry("b", 2));
    assert!(heap.delete(&"a"));
    assert!(!heap.delete(&"a"));
    assert!(!heap.delete(&"ghost"));
    assert_eq!(heap.len(), 1);
}

/// Raising the root's key pushes it behind everything smaller
fn test_update_root_upwards(policy: UpdatePolicy) {
    let mut heap = entry_heap(policy);
    for (id, key) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
        heap.push(entry(id, key));
    }
    assert!(heap.update_with(&"a", |e| e.key = 10));
    assert_eq!(drain_ids(&mut heap), vec!["b", "c", "d", "a"]);
}

/// Index lookups stay correct through pushes, pops, updates and deletes
fn test_index_fidelity(policy: UpdatePolicy) {
    let mut heap = entry_heap(policy);
    let ids = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let mut model: HashMap<&'static str, i32> = HashMap::new();

    for (i, &id) in ids.iter().enumerate() {
        let key = (i as i32 * 7) % 5;
        heap.push(entry(id, key));
        model.insert(id, key);
    }
    heap.update(entry("c", -4));
    model.insert("c", -4);
    heap.delete(&"f");
    model.remove("f");
    let popped = heap.pop().unwrap();
    model.remove(popped.id);

    for id in ids {
        let expected = model.get(id).map(|&key| entry(id, key));
        assert_eq!(heap.get(&id).cloned(), expected, "lookup of {id}");
    }
    heap.check_invariants().unwrap();
}

/// Bulk construction from a vector, a set and a map's values
fn test_bulk_construction(policy: UpdatePolicy) {
    let from_vec = IndexedHeap::from_values(
        vec![entry("x", 4), entry("y", 2)],
        by_key as fn(&Entry, &Entry) -> Ordering,
        entry_id as fn(&Entry) -> &'static str,
    )
    .with_update_policy(policy);
    assert_eq!(from_vec.len(), 2);

    let set: BTreeSet<u32> = [7, 3, 9].into_iter().collect();
    let mut from_set: IndexedHeap<u32, u32> = set.into_iter().collect();
    assert_eq!(from_set.pop(), Some(3));

    let map: HashMap<&str, Entry> = [("k1", entry("p", 5)), ("k2", entry("q", 1))]
        .into_iter()
        .collect();
    let mut from_map = IndexedHeap::from_values(
        map.into_values(),
        by_key as fn(&Entry, &Entry) -> Ordering,
        entry_id as fn(&Entry) -> &'static str,
    );
    assert_eq!(from_map.top().map(|e| e.id), Some("q"));
}

macro_rules! for_each_policy {
    ($($name:ident => $helper:ident),* $(,)?) => {
        $(
            #[test]
            fn $name() {
                for policy in POLICIES {
                    $helper(policy);
                }
            }
        )*
    };
}

for_each_policy! {
    pop_order => test_pop_order,
    update_to_new_minimum => test_update_to_new_minimum,
    delete_then_drain => test_delete_then_drain,
    clear_forgets => test_clear_forgets,
    idempotent_delete => test_idempotent_delete,
    update_root_upwards => test_update_root_upwards,
    index_fidelity => test_index_fidelity,
    bulk_construction => test_bulk_construction,
}

#[test]
fn test_max_heap_via_reverse() {
    let mut heap: IndexedHeap<Reverse<i32>, Reverse<i32>> =
        [1, 9, 4].into_iter().map(Reverse).collect();
    assert_eq!(heap.pop(), Some(Reverse(9)));
    assert!(heap.delete(&Reverse(1)));
    assert_eq!(heap.pop(), Some(Reverse(4)));
}

#[test]
fn test_values_are_array_order() {
    let mut heap = IndexedHeap::new();
    heap.push(3).push(1).push(2);
    let values: Vec<i32> = heap.values().copied().collect();
    assert_eq!(values, heap.as_slice());
    assert_eq!(values[0], 1);
    assert_eq!((&heap).into_iter().count(), 3);

    let mut owned = heap.into_vec();
    owned.sort();
    assert_eq!(owned, vec![1, 2, 3]);
}

#[test]
fn test_try_push_and_invalid_policy() {
    let mut heap = entry_heap(UpdatePolicy::default());
    assert!(heap.try_push(entry("a", 1)).is_ok());
    assert_eq!(
        heap.try_push(entry("a", 0)).err(),
        Some(HeapError::DuplicateIdentity)
    );
    assert_eq!(
        UpdatePolicy::deferred(10, 250),
        Err(HeapError::InvalidPolicy)
    );
}

#[test]
fn test_deferred_updates_pile_up_until_read() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut heap = entry_heap(UpdatePolicy::default());
    let ids: Vec<&'static str> = vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
    for (i, &id) in ids.iter().enumerate() {
        heap.push(entry(id, i as i32));
    }

    // Reverse every key; ten pending updates do not exceed the batch floor
    for (i, &id) in ids.iter().enumerate() {
        heap.update(entry(id, -(i as i32)));
    }
    assert_eq!(heap.pending_updates(), 10);
    assert!(!heap.is_settled());
    heap.check_invariants().unwrap();

    assert_eq!(heap.top().map(|e| e.id), Some("j"));
    assert!(heap.is_settled());
    heap.check_invariants().unwrap();

    let drained = drain_ids(&mut heap);
    let expected: Vec<&'static str> = ids.iter().rev().copied().collect();
    assert_eq!(drained, expected);
}
