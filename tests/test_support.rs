//! Shared helpers for this crate's integration test suite. Mirrors the
//! teacher's dangling `test_utils` module reference (see DESIGN.md) — this
//! one actually exists.

#![allow(dead_code)]

use ordstat_btree::{BTreeBag, BTreeConfig, BTreeMap, BTreeMultiMap, BTreeSet};

pub fn set_of_order(order: u16) -> BTreeSet<i32> {
    BTreeSet::with_config(BTreeConfig {
        order,
        comparer: None,
    })
}

pub fn bag_of_order(order: u16) -> BTreeBag<i32> {
    BTreeBag::with_config(BTreeConfig {
        order,
        comparer: None,
    })
}

pub fn map_of_order<V>(order: u16) -> BTreeMap<i32, V> {
    BTreeMap::with_config(BTreeConfig {
        order,
        comparer: None,
    })
}

pub fn multimap_of_order<V>(order: u16) -> BTreeMultiMap<i32, V> {
    BTreeMultiMap::with_config(BTreeConfig {
        order,
        comparer: None,
    })
}

/// A tiny deterministic linear congruential generator, so tests get a
/// reproducible shuffle without reaching for a dependency the teacher never
/// carried.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed.wrapping_mul(2).wrapping_add(1))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0
    }

    /// A deterministic permutation of `0..n` as `i32`s.
    pub fn shuffled(seed: u64, n: usize) -> Vec<i32> {
        let mut v: Vec<i32> = (0..n as i32).collect();
        let mut rng = Lcg::new(seed);
        for i in (1..v.len()).rev() {
            let j = (rng.next_u64() as usize) % (i + 1);
            v.swap(i, j);
        }
        v
    }
}
