//! Low-level, type-generic helpers over a single raw node block.
//!
//! Everything here operates on a bare `NonNull<u8>` plus a precomputed
//! layout; no knowledge of the tree (comparer, stage, root pointers) lives
//! in this module. `vector.rs` and `engine.rs` build the tree-level
//! operations on top of these primitives.

use core::cmp::Ordering;
use core::ptr::NonNull;

use crate::layout::{carve_branch, carve_leaf, NodeHdr, NodeTag};

pub(crate) type NodePtr = NonNull<u8>;

#[inline]
pub(crate) unsafe fn tag_of(node: NodePtr) -> NodeTag {
    (*(node.as_ptr() as *const NodeHdr)).tag
}

#[inline]
pub(crate) unsafe fn len_of(node: NodePtr) -> usize {
    (*(node.as_ptr() as *const NodeHdr)).len as usize
}

#[inline]
pub(crate) unsafe fn set_len(node: NodePtr, len: usize) {
    (*(node.as_ptr() as *mut NodeHdr)).len = len as u16;
}

/// A node's contribution to its parent's cached weight: a leaf's key count,
/// or a branch's own cached weight.
#[inline]
pub(crate) unsafe fn subtree_weight(node: NodePtr) -> u64 {
    let hdr = &*(node.as_ptr() as *const NodeHdr);
    match hdr.tag {
        NodeTag::Leaf => hdr.len as u64,
        NodeTag::Branch => hdr.weight,
    }
}

#[inline]
pub(crate) unsafe fn branch_weight(node: NodePtr) -> u64 {
    (*(node.as_ptr() as *const NodeHdr)).weight
}

#[inline]
pub(crate) unsafe fn set_branch_weight(node: NodePtr, w: u64) {
    (*(node.as_ptr() as *mut NodeHdr)).weight = w;
}

#[inline]
pub(crate) unsafe fn add_branch_weight(node: NodePtr, delta: i64) {
    let hdr = node.as_ptr() as *mut NodeHdr;
    let w = (*hdr).weight as i64 + delta;
    debug_assert!(w >= 0, "branch weight underflow");
    (*hdr).weight = w as u64;
}

/// First index `i` with `keys[i] >= target` (standard lower bound).
pub(crate) fn lower_bound<K>(keys: &[K], target: &K, cmp: &dyn Fn(&K, &K) -> Ordering) -> usize {
    let mut lo = 0usize;
    let mut hi = keys.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(&keys[mid], target) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// First index `i` with `keys[i] > target` (standard upper bound).
pub(crate) fn upper_bound<K>(keys: &[K], target: &K, cmp: &dyn Fn(&K, &K) -> Ordering) -> usize {
    let mut lo = 0usize;
    let mut hi = keys.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(&keys[mid], target) == Ordering::Greater {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// Re-exported so callers that only need byte-level carving don't have to
/// reach into `crate::layout` directly.
pub(crate) use crate::layout::{BranchLayout, LeafLayout};

#[inline]
pub(crate) unsafe fn leaf_keys_ptr<K, V>(node: NodePtr, layout: &LeafLayout) -> *mut K {
    carve_leaf::<K, V>(node, layout).keys_ptr as *mut K
}

#[inline]
pub(crate) unsafe fn leaf_vals_ptr<K, V>(node: NodePtr, layout: &LeafLayout) -> *mut V {
    carve_leaf::<K, V>(node, layout).vals_ptr as *mut V
}

#[inline]
pub(crate) unsafe fn leaf_next(node: NodePtr, layout: &LeafLayout) -> Option<NodePtr> {
    let parts = carve_leaf::<(), ()>(node, layout);
    NonNull::new(*parts.next_ptr)
}

#[inline]
pub(crate) unsafe fn leaf_prev(node: NodePtr, layout: &LeafLayout) -> Option<NodePtr> {
    let parts = carve_leaf::<(), ()>(node, layout);
    NonNull::new(*parts.prev_ptr)
}

#[inline]
pub(crate) unsafe fn branch_keys_ptr<K>(node: NodePtr, layout: &BranchLayout) -> *mut K {
    carve_branch::<K>(node, layout).keys_ptr as *mut K
}

#[inline]
pub(crate) unsafe fn branch_children_ptr(node: NodePtr, layout: &BranchLayout) -> *mut *mut u8 {
    carve_branch::<()>(node, layout).children_ptr as *mut *mut u8
}

#[inline]
pub(crate) unsafe fn branch_child_at(node: NodePtr, layout: &BranchLayout, idx: usize) -> NodePtr {
    NonNull::new_unchecked(*branch_children_ptr(node, layout).add(idx))
}
