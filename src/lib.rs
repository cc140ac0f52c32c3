#![no_std]
#![allow(clippy::missing_safety_doc)]

//! An in-memory, order-statistics B+ tree.
//!
//! Every leaf and branch tracks its subtree size, so besides the usual
//! key lookup this engine answers "what's the Nth element" and "what's
//! this element's rank" in `O(log n)`. Four façades share one engine:
//!
//! - [`BTreeSet`] — unique keys.
//! - [`BTreeBag`] — a multiset; duplicates keep stable insertion order.
//! - [`BTreeMap`] — unique keys, one value each.
//! - [`BTreeMultiMap`] — duplicate keys, one value per occurrence.
//!
//! Keys are ordered by an injected [`Comparer`], not just `K: Ord`, so a
//! tree can be built over a custom ordering (case-insensitive strings,
//! reverse order, a projection) without wrapping `K` in a newtype.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bag;
mod comparer;
#[cfg(feature = "std")]
mod diag;
mod engine;
mod enumerator;
mod layout;
mod map;
mod multimap;
mod node;
mod node_alloc;
mod set;
mod setalg;
mod vector;

pub use bag::BTreeBag;
pub use comparer::{default_comparer, Comparer};
pub use engine::{BTreeConfig, BTreeError};
pub use enumerator::Enumerator;
pub use map::BTreeMap;
pub use multimap::BTreeMultiMap;
pub use set::BTreeSet;
