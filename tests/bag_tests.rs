//! `BTreeBag` behavior: multiplicity tracking, distinct-key iteration, and
//! the stable-insertion-order guarantee among equal keys.

mod test_support;
use test_support::*;

use ordstat_btree::BTreeBag;

#[test]
fn duplicates_increase_count_without_deduping() {
    let mut b = bag_of_order(4);
    b.insert(5);
    b.insert(5);
    b.insert(5);
    assert_eq!(b.len(), 3);
    assert_eq!(b.get_count(&5), 3);
    assert_eq!(b.distinct_count(), 1);
    assert!(b.check_invariants().is_ok());
}

#[test]
fn get_count_law_increments_by_one_per_add() {
    let mut b = bag_of_order(6);
    for k in 0..30 {
        b.insert(k % 7);
    }
    for k in 0..7 {
        let before = b.get_count(&k);
        b.insert(k);
        assert_eq!(b.get_count(&k), before + 1);
    }
    assert!(b.check_invariants().is_ok());
}

#[test]
fn insert_n_adds_exact_multiplicity() {
    let mut b = bag_of_order(5);
    b.insert_n(7, 12);
    assert_eq!(b.get_count(&7), 12);
    assert_eq!(b.len(), 12);
    b.insert_n(7, 0);
    assert_eq!(b.get_count(&7), 12);
}

#[test]
fn remove_n_removes_up_to_requested_count() {
    let mut b = bag_of_order(4);
    b.insert_n(3, 5);
    assert_eq!(b.remove_n(&3, 2), 2);
    assert_eq!(b.get_count(&3), 3);
    assert_eq!(b.remove_n(&3, 10), 3);
    assert_eq!(b.get_count(&3), 0);
    assert!(!b.contains(&3));
}

#[test]
fn distinct_yields_each_key_once_in_order() {
    let mut b = bag_of_order(5);
    for k in Lcg::shuffled(3, 40) {
        b.insert(k % 10);
    }
    let distinct = b.distinct();
    assert_eq!(distinct, (0..10).collect::<Vec<_>>());
}

#[test]
fn reverse_and_forward_iteration_are_mirror_images() {
    let mut b = bag_of_order(4);
    for k in 1..=500 {
        b.insert(k);
    }
    let forward = b.to_vec();
    let mut reversed = Vec::new();
    let mut it = b.iter_rev();
    while it.advance().unwrap() {
        reversed.push(*it.current().unwrap().0);
    }
    reversed.reverse();
    assert_eq!(forward, reversed);
    assert_eq!(forward.len(), 500);
}

#[test]
fn bag_algebra_is_multiplicity_aware() {
    let mut a = bag_of_order(6);
    a.insert_n(1, 3);
    a.insert_n(2, 1);
    let mut b = bag_of_order(6);
    b.insert_n(1, 1);
    b.insert_n(3, 2);

    let u = a.union(&b);
    assert_eq!(u.get_count(&1), 3);
    assert_eq!(u.get_count(&2), 1);
    assert_eq!(u.get_count(&3), 2);

    let i = a.intersect(&b);
    assert_eq!(i.get_count(&1), 1);
    assert_eq!(i.get_count(&2), 0);

    let e = a.except(&b);
    assert_eq!(e.get_count(&1), 2);
    assert_eq!(e.get_count(&2), 1);
    assert_eq!(e.get_count(&3), 0);
}

#[test]
fn boundary_orders_hold_invariants_for_bag() {
    for &order in &[4u16, 256u16] {
        let mut b: BTreeBag<i32> = bag_of_order(order);
        for k in Lcg::shuffled(order as u64 + 1, 1500) {
            b.insert(k % 50);
        }
        assert!(b.check_invariants().is_ok(), "order {order}");
        assert_eq!(b.len(), 1500);
        assert_eq!(b.distinct_count(), 50);
    }
}
