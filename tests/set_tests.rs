//! `BTreeSet` behavior: the uniqueness, indexing, and boundary properties
//! from the testable-properties section.

mod test_support;
use test_support::*;

use ordstat_btree::{BTreeConfig, BTreeSet};

#[test]
fn insert_returns_false_on_duplicate() {
    let mut s = set_of_order(4);
    assert!(s.insert(5));
    assert!(!s.insert(5));
    assert_eq!(s.len(), 1);
    assert!(s.check_invariants().is_ok());
}

#[test]
fn index_of_and_element_at_round_trip() {
    let mut s = set_of_order(4);
    for k in Lcg::shuffled(7, 200) {
        s.insert(k);
    }
    for k in 0..200 {
        let idx = s.index_of(&k).expect("present");
        assert_eq!(*s.element_at(idx).unwrap(), k);
    }
    assert!(s.check_invariants().is_ok());
}

#[test]
fn remove_after_add_restores_original_set() {
    let mut s = set_of_order(6);
    for k in 0..50 {
        s.insert(k);
    }
    let baseline = s.to_vec();
    assert!(s.insert(1000));
    assert!(s.remove(&1000));
    assert_eq!(s.to_vec(), baseline);
    assert!(s.check_invariants().is_ok());
}

#[test]
fn to_vec_round_trips_through_from_iter() {
    let mut s = set_of_order(5);
    for k in Lcg::shuffled(11, 80) {
        s.insert(k);
    }
    let original = s.to_vec();
    let rebuilt: BTreeSet<i32> = original.iter().copied().collect();
    assert_eq!(rebuilt.to_vec(), original);
}

// Literal scenario 2: Set {} with m = 4; add(i) for i = 0..=99 (100 keys);
// then removeAt(50); expect count = 99, elementAt(50) = 51,
// elementAt(49) = 49, indexOf(50) = ~50.
#[test]
fn scenario_set_remove_at_shifts_rank() {
    let mut s = set_of_order(4);
    for i in 0..=99 {
        s.insert(i);
    }
    assert_eq!(s.remove_at(50).unwrap(), 50);
    assert_eq!(s.len(), 99);
    assert_eq!(*s.element_at(50).unwrap(), 51);
    assert_eq!(*s.element_at(49).unwrap(), 49);
    assert_eq!(s.index_of_signed(&50), !50isize);
    assert!(s.check_invariants().is_ok());
}

#[test]
fn empty_set_boundary_conditions() {
    let s = set_of_order(4);
    assert!(s.first().is_err());
    assert!(s.last().is_err());
    let default = -1;
    assert_eq!(*s.element_at_or_default(0, &default), -1);
    assert_eq!(s.index_of_signed(&42), !0isize);
    assert!(s.check_invariants().is_ok());
}

#[test]
fn boundary_orders_hold_invariants_under_heavy_insert_and_remove() {
    for &order in &[4u16, 256u16] {
        let mut s = set_of_order(order);
        for k in Lcg::shuffled(order as u64, 2000) {
            s.insert(k);
        }
        assert!(s.check_invariants().is_ok(), "order {order} after insert");
        assert_eq!(s.len(), 2000);
        for k in (0..2000).step_by(3) {
            s.remove(&k);
        }
        assert!(s.check_invariants().is_ok(), "order {order} after remove");
        assert_eq!(s.len(), 2000 - (2000 + 2) / 3);
    }
}

#[test]
fn monotonic_append_keeps_rightmost_spine_sparse() {
    let mut s = set_of_order(4);
    for k in 0..5000 {
        s.insert(k);
    }
    assert!(s.check_invariants().is_ok());
    assert_eq!(s.len(), 5000);
    for k in 0..5000 {
        assert_eq!(*s.element_at(k as usize).unwrap(), k);
    }
}

#[test]
fn removing_down_to_empty_leaves_only_leftmost_leaf() {
    let mut s = set_of_order(4);
    for k in 0..300 {
        s.insert(k);
    }
    for k in 0..300 {
        s.remove(&k);
    }
    assert_eq!(s.len(), 0);
    assert!(s.is_empty());
    assert!(s.check_invariants().is_ok());
    assert!(s.first().is_err());
}

#[test]
fn custom_comparer_orders_by_injected_rule() {
    use std::cmp::Ordering;
    let mut s: BTreeSet<i32> = BTreeSet::with_config(BTreeConfig {
        order: 8,
        comparer: Some(std::sync::Arc::new(|a: &i32, b: &i32| b.cmp(a)) as _),
    });
    for k in [3, 1, 4, 1, 5, 9, 2, 6] {
        s.insert(k);
    }
    assert_eq!(s.to_vec(), vec![9, 6, 5, 4, 3, 2, 1]);
    assert_eq!(*s.first().unwrap(), 9);
    assert_eq!(*s.last().unwrap(), 1);
    let _ = Ordering::Equal;
}

#[test]
fn set_algebra_union_intersect_except() {
    let a: BTreeSet<i32> = (0..10).collect();
    let b: BTreeSet<i32> = (5..15).collect();

    let u = a.union(&b);
    assert_eq!(u.to_vec(), (0..15).collect::<Vec<_>>());

    let i = a.intersect(&b);
    assert_eq!(i.to_vec(), (5..10).collect::<Vec<_>>());

    let e = a.except(&b);
    assert_eq!(e.to_vec(), (0..5).collect::<Vec<_>>());

    assert!(i.is_subset_of(&a));
    assert!(i.is_subset_of(&b));
    assert!(!a.is_subset_of(&b));
}

#[test]
fn remove_where_drops_matching_keys() {
    let mut s: BTreeSet<i32> = (0..20).collect();
    let removed = s.remove_where(|k| k % 2 == 0);
    assert_eq!(removed, 10);
    assert_eq!(s.to_vec(), (0..20).filter(|k| k % 2 != 0).collect::<Vec<_>>());
    assert!(s.check_invariants().is_ok());
}

// Removing a leaf's minimum key (without triggering underflow) changes
// that leaf's first key, which must refresh the ancestor separator that
// points at it, not just the leaf's own contents.
#[test]
fn removing_leaf_minimum_keeps_ancestor_separators_correct() {
    let mut s = set_of_order(4);
    for k in 0..400 {
        s.insert(k * 2);
    }
    for k in (0..400).step_by(5) {
        assert!(s.remove(&(k * 2)));
        assert!(s.check_invariants().is_ok(), "after removing {}", k * 2);
    }
}

#[test]
fn elements_between_and_from_are_inclusive_bounds() {
    let s: BTreeSet<i32> = (0..100).collect();
    assert_eq!(s.elements_between(&10, &15), vec![10, 11, 12, 13, 14, 15]);
    assert_eq!(s.elements_from(&97), vec![97, 98, 99]);
}
