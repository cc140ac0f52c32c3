//! `BTreeMap` behavior: unique keys, one value per key, positional access.

mod test_support;
use test_support::*;

use ordstat_btree::BTreeMap;

#[test]
fn insert_overwrites_and_returns_previous_value() {
    let mut m = map_of_order::<&str>(4);
    assert_eq!(m.insert(1, "one"), None);
    assert_eq!(m.insert(1, "ONE"), Some("one"));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&1), Some(&"ONE"));
}

#[test]
fn keys_and_values_stay_parallel_and_sorted() {
    let mut m = map_of_order::<i32>(6);
    for k in Lcg::shuffled(5, 60) {
        m.insert(k, k * 10);
    }
    let keys = m.keys();
    let values = m.values();
    assert_eq!(keys, (0..60).collect::<Vec<_>>());
    for (k, v) in keys.iter().zip(values.iter()) {
        assert_eq!(*v, *k * 10);
    }
}

#[test]
fn remove_at_shifts_subsequent_ranks() {
    let mut m = map_of_order::<i32>(4);
    for k in 0..20 {
        m.insert(k, k);
    }
    assert_eq!(m.remove_at(5).unwrap(), (5, 5));
    assert_eq!(m.element_at(5).unwrap(), (&6, &6));
    assert_eq!(m.len(), 19);
}

#[test]
fn remove_where_filters_on_key_and_value() {
    let mut m = map_of_order::<i32>(5);
    for k in 0..30 {
        m.insert(k, k * k);
    }
    let expected = (0..30).filter(|k| (k * k) % 2 == 0).count();
    let removed = m.remove_where(|_, v| v % 2 == 0);
    assert_eq!(removed, expected);
    assert!(m.keys().into_iter().all(|k| (k * k) % 2 != 0));
    assert!(m.check_invariants().is_ok());
}

#[test]
fn elements_between_returns_inclusive_key_range() {
    let mut m = map_of_order::<i32>(4);
    for k in 0..50 {
        m.insert(k, k + 1000);
    }
    let slice = m.elements_between(&10, &12);
    assert_eq!(slice, vec![(10, 1010), (11, 1011), (12, 1012)]);
}

// Literal scenario 6: Map m = 4; insert (k, k + 1000) for k = 0..=9;
// copy_to(buffer, offset = 5); buffer[5..14] = (values of keys 0..9).
#[test]
fn scenario_copy_to_with_offset() {
    let mut m = map_of_order::<i32>(4);
    for k in 0..=9 {
        m.insert(k, k + 1000);
    }
    let mut buf = vec![(-1, -1); 15];
    m.copy_to(&mut buf, 5, None).unwrap();
    for (i, k) in (0..=9).enumerate() {
        assert_eq!(buf[5 + i], (k, k + 1000));
    }
    assert_eq!(buf[0], (-1, -1));
}

#[test]
fn copy_to_honors_an_explicit_count() {
    let mut m = map_of_order::<i32>(4);
    for k in 0..=9 {
        m.insert(k, k + 1000);
    }
    let mut buf = vec![(-1, -1); 4];
    m.copy_to(&mut buf, 0, Some(3)).unwrap();
    assert_eq!(buf[..3], [(0, 1000), (1, 1001), (2, 1002)]);
    assert_eq!(buf[3], (-1, -1));
}

#[test]
fn copy_to_rejects_undersized_buffer() {
    let mut m = map_of_order::<i32>(4);
    for k in 0..5 {
        m.insert(k, k);
    }
    let mut buf = vec![(0, 0); 6];
    assert!(m.copy_to(&mut buf, 2, None).is_err());
}

#[test]
fn empty_map_boundary_conditions() {
    let m: BTreeMap<i32, i32> = BTreeMap::new();
    assert!(m.first().is_err());
    assert!(m.last().is_err());
    assert_eq!(m.index_of_signed(&7), !0isize);
    let default: (&i32, &i32) = (&-1, &-1);
    assert_eq!(m.element_at_or_default(0, default), default);
}

#[test]
fn boundary_orders_hold_invariants_for_map() {
    for &order in &[4u16, 256u16] {
        let mut m = map_of_order::<i32>(order);
        for k in Lcg::shuffled(order as u64 + 7, 1800) {
            m.insert(k, -k);
        }
        assert!(m.check_invariants().is_ok(), "order {order}");
        for k in 0..1800 {
            assert_eq!(m.get(&k), Some(&-k));
        }
    }
}
