//! Injected key comparer.
//!
//! The teacher hard-codes `K: Ord`. This engine instead threads an explicit
//! comparer through every tree so a caller can order keys by something
//! other than their natural `Ord` impl (case-insensitive strings, reverse
//! order, a projection, ...), matching the distilled spec's "comparer
//! injection" construction option.

use alloc::sync::Arc;
use core::cmp::Ordering;

pub type Comparer<K> = Arc<dyn Fn(&K, &K) -> Ordering>;

/// The default comparer: a key's own `Ord` implementation.
pub fn default_comparer<K: Ord + 'static>() -> Comparer<K> {
    Arc::new(|a: &K, b: &K| a.cmp(b))
}
