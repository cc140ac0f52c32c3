//! `Enumerator` state machine: `Rewound -> Active -> Consumed`, and
//! invalidation when the owning tree is mutated mid-enumeration.

mod test_support;
use test_support::*;

#[test]
fn forward_enumerator_visits_every_key_once_in_order() {
    let s = set_of_order(4);
    let mut s = s;
    for k in 0..30 {
        s.insert(k);
    }
    let mut it = s.iter();
    let mut seen = Vec::new();
    while it.advance().unwrap() {
        seen.push(*it.current().unwrap());
    }
    assert_eq!(seen, (0..30).collect::<Vec<_>>());
    assert_eq!(it.advance().unwrap(), false);
    assert!(it.current().is_none());
}

#[test]
fn current_is_none_before_first_advance() {
    let mut s = set_of_order(4);
    s.insert(1);
    let it = s.iter();
    assert!(it.current().is_none());
}

// Literal scenario 4: Bag m = 6, keys 9..1 descending; reverse-enumerate;
// when the cursor yields 4, clear the bag; the next advance() must fail
// rather than silently read freed memory.
#[test]
fn scenario_mutation_mid_reverse_enumeration_invalidates_cursor() {
    let mut b = bag_of_order(6);
    for k in (1..=9).rev() {
        b.insert(k);
    }
    let mut it = b.iter_rev();
    loop {
        assert!(it.advance().unwrap());
        let value = *it.current().unwrap();
        if value == 4 {
            break;
        }
    }
    b.clear();
    assert!(it.advance().is_err());
}

// Literal scenario 5: Set insert 1..=500, reverse-enumerate; expect
// 500, 499, ..., 1 with exactly 500 yields.
#[test]
fn scenario_large_reverse_enumeration_yields_descending_order() {
    let mut s = set_of_order(8);
    for k in 1..=500 {
        s.insert(k);
    }
    let mut it = s.iter_rev();
    let mut out = Vec::new();
    while it.advance().unwrap() {
        out.push(*it.current().unwrap());
    }
    assert_eq!(out.len(), 500);
    assert_eq!(out, (1..=500).rev().collect::<Vec<_>>());
    assert_eq!(it.advance().unwrap(), false);
}

#[test]
fn reset_replays_from_the_start_after_exhaustion() {
    let mut s = set_of_order(4);
    for k in 0..10 {
        s.insert(k);
    }
    let mut it = s.iter();
    while it.advance().unwrap() {}
    it.reset();
    let mut replay = Vec::new();
    while it.advance().unwrap() {
        replay.push(*it.current().unwrap());
    }
    assert_eq!(replay, (0..10).collect::<Vec<_>>());
}

#[test]
fn reset_after_mutation_adopts_the_new_stage() {
    let mut s = set_of_order(4);
    for k in 0..5 {
        s.insert(k);
    }
    let mut it = s.iter();
    assert!(it.advance().unwrap());
    s.insert(100);
    assert!(it.advance().is_err());
    it.reset();
    let mut replay = Vec::new();
    while it.advance().unwrap() {
        replay.push(*it.current().unwrap());
    }
    assert_eq!(replay, vec![0, 1, 2, 3, 4, 100]);
}

#[test]
fn empty_collection_enumerator_yields_nothing() {
    let s = set_of_order(4);
    let mut it = s.iter();
    assert_eq!(it.advance().unwrap(), false);
    assert!(it.current().is_none());
    let mut rit = s.iter_rev();
    assert_eq!(rit.advance().unwrap(), false);
}

#[test]
fn remove_during_enumeration_is_detected_even_without_shape_change() {
    let mut m = map_of_order::<i32>(5);
    for k in 0..10 {
        m.insert(k, k);
    }
    let mut it = m.iter();
    assert!(it.advance().unwrap());
    m.remove(&9);
    assert!(it.advance().is_err());
}
