//! Set-algebra helpers shared by the set and bag façades.
//!
//! No dedicated tree-merge algorithm: everything here is built from sorted
//! scans plus `contains`/`get_count` lookups, exactly as the distilled
//! spec's §4.9 describes it. Both sides are assumed already sorted
//! ascending by the same comparer the owning tree uses (the façades supply
//! this from their own enumerators).

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

/// `a ∪ b` for two sorted, duplicate-free slices.
pub(crate) fn set_union<K: Clone>(a: &[K], b: &[K], cmp: &dyn Fn(&K, &K) -> Ordering) -> Vec<K> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match cmp(&a[i], &b[j]) {
            Ordering::Less => {
                out.push(a[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                out.push(a[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// `a ∩ b` for two sorted, duplicate-free slices.
pub(crate) fn set_intersect<K: Clone>(a: &[K], b: &[K], cmp: &dyn Fn(&K, &K) -> Ordering) -> Vec<K> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match cmp(&a[i], &b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// `a \ b` for two sorted, duplicate-free slices.
pub(crate) fn set_except<K: Clone>(a: &[K], b: &[K], cmp: &dyn Fn(&K, &K) -> Ordering) -> Vec<K> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() {
        if j >= b.len() {
            out.push(a[i].clone());
            i += 1;
            continue;
        }
        match cmp(&a[i], &b[j]) {
            Ordering::Less => {
                out.push(a[i].clone());
                i += 1;
            }
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// `a ⊆ b`: every element of `a` satisfies `b_contains`.
pub(crate) fn set_is_subset<K>(a: &[K], b_contains: impl Fn(&K) -> bool) -> bool {
    a.iter().all(|k| b_contains(k))
}

/// `a ∪ b` over multiplicities: max count per distinct key. Both slices hold
/// `(key, count)` runs sorted ascending by key.
pub(crate) fn bag_union<K: Clone>(
    a: &[(K, usize)],
    b: &[(K, usize)],
    cmp: &dyn Fn(&K, &K) -> Ordering,
) -> Vec<(K, usize)> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match cmp(&a[i].0, &b[j].0) {
            Ordering::Less => {
                out.push(a[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                out.push((a[i].0.clone(), a[i].1.max(b[j].1)));
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// `a ∩ b` over multiplicities: min count per shared key.
pub(crate) fn bag_intersect<K: Clone>(
    a: &[(K, usize)],
    b: &[(K, usize)],
    cmp: &dyn Fn(&K, &K) -> Ordering,
) -> Vec<(K, usize)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match cmp(&a[i].0, &b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push((a[i].0.clone(), a[i].1.min(b[j].1)));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// `a \ b` over multiplicities: count subtraction clipped at zero.
pub(crate) fn bag_except<K: Clone>(
    a: &[(K, usize)],
    b: &[(K, usize)],
    cmp: &dyn Fn(&K, &K) -> Ordering,
) -> Vec<(K, usize)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() {
        if j >= b.len() || cmp(&a[i].0, &b[j].0) == Ordering::Less {
            out.push(a[i].clone());
            i += 1;
        } else if cmp(&a[i].0, &b[j].0) == Ordering::Greater {
            j += 1;
        } else {
            let remaining = a[i].1.saturating_sub(b[j].1);
            if remaining > 0 {
                out.push((a[i].0.clone(), remaining));
            }
            i += 1;
            j += 1;
        }
    }
    out
}

/// `a ⊆ b` over multiplicities: every key in `a` has count at most its
/// count via `b_count`.
pub(crate) fn bag_is_subset<K>(a: &[(K, usize)], b_count: impl Fn(&K) -> usize) -> bool {
    a.iter().all(|(k, n)| b_count(k) >= *n)
}
