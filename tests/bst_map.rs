use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use twig_tree::{BstMap, Error};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 512;

/// Generates keys from a range narrow enough to force collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -64i64..64i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    GetOrInsert(i64),
    ContainsKey(i64),
    First,
    Last,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        2 => key_strategy().prop_map(MapOp::GetOrInsert),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => Just(MapOp::First),
        1 => Just(MapOp::Last),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Replays a random operation sequence on both BstMap and BTreeMap and
    /// asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut bst_map: BstMap<i64, i64> = BstMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match *op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(bst_map.insert(k, v), bt_map.insert(k, v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(bst_map.remove(&k), bt_map.remove(&k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(bst_map.get(&k).ok(), bt_map.get(&k), "get({})", k);
                }
                MapOp::GetOrInsert(k) => {
                    prop_assert_eq!(bst_map.get_or_insert(k), bt_map.entry(k).or_default(), "get_or_insert({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(bst_map.contains_key(&k), bt_map.contains_key(&k), "contains_key({})", k);
                }
                MapOp::First => {
                    prop_assert_eq!(bst_map.first(), bt_map.first_key_value(), "first");
                }
                MapOp::Last => {
                    prop_assert_eq!(bst_map.last(), bt_map.last_key_value(), "last");
                }
            }

            prop_assert_eq!(bst_map.len(), bt_map.len(), "len mismatch after {:?}", op);
        }

        let bst_items: Vec<(i64, i64)> = bst_map.iter().map(|(&k, &v)| (k, v)).collect();
        let bt_items: Vec<(i64, i64)> = bt_map.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(bst_items, bt_items, "iter() mismatch");
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn insert_replaces_on_duplicate_key() {
    let mut map = BstMap::new();
    assert_eq!(map.insert(15, "hello"), None);
    assert_eq!(map.insert(15, "world"), Some("hello"));

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&15), Ok(&"world"));
    assert_eq!(map.find(&15).value(), Some(&"world"));
}

#[test]
fn get_or_insert_creates_default_entries() {
    let mut map: BstMap<i32, String> = BstMap::new();
    assert!(!map.contains_key(&6));

    {
        let slot = map.get_or_insert(6);
        assert_eq!(slot, "");
        slot.push_str("six");
    }

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&6).map(String::as_str), Ok("six"));

    // A second access reuses the existing entry.
    assert_eq!(map.get_or_insert(6).as_str(), "six");
    assert_eq!(map.len(), 1);
}

#[test]
fn get_never_creates_entries() {
    let mut map: BstMap<i32, String> = BstMap::new();
    map.insert(1, "one".into());

    assert_eq!(map.get(&6), Err(Error::KeyNotFound));
    assert_eq!(map.len(), 1);
    assert!(!map.contains_key(&6));
}

#[test]
fn get_or_insert_with_uses_the_closure_once() {
    let mut map: BstMap<i32, i32> = BstMap::new();
    assert_eq!(*map.get_or_insert_with(3, || 42), 42);
    // Present key: the closure must not run.
    assert_eq!(*map.get_or_insert_with(3, || panic!("key already present")), 42);
}

#[test]
fn remove_returns_the_stored_value() {
    let mut map: BstMap<i32, &str> = [(2, "b"), (1, "a"), (3, "c")].into();

    assert_eq!(map.remove(&2), Some("b"));
    assert_eq!(map.remove(&2), None);
    assert_eq!(map.len(), 2);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3]);
}

#[test]
fn from_iterator_keeps_the_last_value_per_key() {
    let map: BstMap<i32, &str> = [(1, "old"), (2, "two"), (1, "new")].into_iter().collect();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Ok(&"new"));
}

#[test]
fn cursor_walks_unique_entries_in_order() {
    let map: BstMap<i32, &str> = [(2, "b"), (1, "a"), (3, "c")].into();

    let mut cursor = map.cursor_front();
    let mut seen = Vec::new();
    while let Some((&k, &v)) = cursor.key_value() {
        seen.push((k, v));
        cursor.move_next();
    }
    assert_eq!(seen, [(1, "a"), (2, "b"), (3, "c")]);
    assert_eq!(cursor, map.find(&99));
}

#[test]
fn values_mut_updates_in_place() {
    let mut map: BstMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
    for value in map.values_mut() {
        *value *= 2;
    }
    let values: Vec<i32> = map.values().copied().collect();
    assert_eq!(values, (0..10).map(|i| i * 2).collect::<Vec<_>>());
}

#[test]
fn map_equality_is_by_content() {
    let a: BstMap<i32, &str> = [(1, "a"), (2, "b")].into();
    // Different insertion order, same content.
    let b: BstMap<i32, &str> = [(2, "b"), (1, "a")].into();
    let c: BstMap<i32, &str> = [(1, "a"), (2, "x")].into();

    assert_eq!(a, b);
    assert_ne!(a, c);
}
