//! `BTreeMultiMap` behavior: duplicate keys, each occurrence carrying its
//! own value, stable insertion order among equal keys.

mod test_support;
use test_support::*;

use ordstat_btree::{BTreeConfig, BTreeMultiMap};

// Literal scenario 1 (distilled spec uses "bag" loosely for a duplicate-key
// collection with values, which this crate splits into the value-less
// `BTreeBag` and the value-carrying `BTreeMultiMap` — see DESIGN.md). Insert
// 9..=1 descending, then 1..=9 ascending; every key 1..=9 ends up with two
// occurrences.
#[test]
fn scenario_multimap_duplicate_keys_descending_then_ascending() {
    let mut m = multimap_of_order::<i32>(5);
    for i in (1..=9).rev() {
        m.insert(i, -i);
    }
    for i in 1..=9 {
        m.insert(i, -i);
    }
    assert_eq!(m.len(), 18);
    assert_eq!(m.first().unwrap(), (&1, &-1));
    assert_eq!(m.last().unwrap(), (&9, &-9));
    assert_eq!(m.get_count(&5), 2);
    assert_eq!(m.index_of(&5), Some(8));
    assert!(m.check_invariants().is_ok());
}

// Literal scenario 3: insert "0zero", then "1one" -> -1, then "1one" -> -2;
// keys[0] = "0zero", keys[1] = keys[2] = "1one", values[2] = -2.
#[test]
fn scenario_multimap_preserves_insertion_order_among_equal_keys() {
    let mut m: BTreeMultiMap<&str, i32> = BTreeMultiMap::with_config(BTreeConfig {
        order: 128,
        comparer: None,
    });
    m.insert("0zero", 0);
    m.insert("1one", -1);
    m.insert("1one", -2);

    let keys = m.keys();
    let values = m.values();
    assert_eq!(keys[0], "0zero");
    assert_eq!(keys[1], "1one");
    assert_eq!(keys[2], "1one");
    assert_eq!(values[2], -2);
    assert_eq!(values[1], -1);
}

#[test]
fn get_count_and_distinct_count_track_multiplicity() {
    let mut m = multimap_of_order::<i32>(4);
    for k in 0..5 {
        for rep in 0..(k + 1) {
            m.insert(k, rep);
        }
    }
    assert_eq!(m.len(), 15);
    assert_eq!(m.distinct_count(), 5);
    for k in 0..5 {
        assert_eq!(m.get_count(&k), (k + 1) as usize);
    }
}

#[test]
fn remove_removes_first_occurrence_only() {
    let mut m = multimap_of_order::<i32>(4);
    m.insert(1, 100);
    m.insert(1, 200);
    assert_eq!(m.remove(&1), Some(100));
    assert_eq!(m.get_count(&1), 1);
    assert_eq!(m.element_at(0).unwrap(), (&1, &200));
}

#[test]
fn remove_where_matches_on_value_not_just_key() {
    let mut m = multimap_of_order::<i32>(5);
    m.insert(1, 10);
    m.insert(1, 20);
    m.insert(2, 10);
    let removed = m.remove_where(|_, v| *v == 10);
    assert_eq!(removed, 2);
    assert_eq!(m.len(), 1);
    assert_eq!(m.element_at(0).unwrap(), (&1, &20));
    assert!(m.check_invariants().is_ok());
}

#[test]
fn boundary_orders_hold_invariants_for_multimap() {
    for &order in &[4u16, 256u16] {
        let mut m: BTreeMultiMap<i32, i32> = multimap_of_order(order);
        for k in Lcg::shuffled(order as u64 + 13, 1200) {
            m.insert(k % 40, k);
        }
        assert!(m.check_invariants().is_ok(), "order {order}");
        assert_eq!(m.len(), 1200);
        assert_eq!(m.distinct_count(), 40);
    }
}
