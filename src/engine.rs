//! `BTreeCore` — the shared order-statistics engine behind every flavor
//! façade (`set`, `bag`, `map`, `multimap`). A façade picks `unique` (set,
//! map) vs not (bag, multimap) and `V = ()` (set, bag) vs a real value
//! (map, multimap); everything else — search, insert, delete, rank,
//! enumeration, diagnostics — lives here.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicPtr, Ordering as AtomicOrdering};

use crate::comparer::{default_comparer, Comparer};
use crate::layout::{carve_branch, carve_leaf, BranchLayout, LeafLayout, NodeHdr, NodeTag};
use crate::node::NodePtr;
use crate::node_alloc::{alloc_branch_block, alloc_leaf_block, dealloc_raw};
use crate::vector::{NodeVector, PathEntry};

/// Errors this crate's operations can return. Every variant carries a short
/// message so a caller doesn't need to pattern-match to log something
/// useful.
#[derive(Debug, Clone)]
pub enum BTreeError {
    InvalidArgument(String),
    OutOfRange(String),
    NotSupported(String),
    InvalidState(String),
    DuplicateKey,
}

impl core::fmt::Display for BTreeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BTreeError::InvalidArgument(s) => write!(f, "invalid argument: {s}"),
            BTreeError::OutOfRange(s) => write!(f, "out of range: {s}"),
            BTreeError::NotSupported(s) => write!(f, "not supported: {s}"),
            BTreeError::InvalidState(s) => write!(f, "invalid state: {s}"),
            BTreeError::DuplicateKey => write!(f, "duplicate key"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BTreeError {}

/// Construction-time configuration shared by every flavor.
pub struct BTreeConfig<K> {
    /// Branching factor: every branch holds at most `order - 1` keys, at
    /// least `ceil(order/2) - 1`. Clamped to `[4, 256]`.
    pub order: u16,
    /// Custom key ordering; defaults to `K`'s own `Ord` impl.
    pub comparer: Option<Comparer<K>>,
}

impl<K: Ord + 'static> Default for BTreeConfig<K> {
    fn default() -> Self {
        BTreeConfig {
            order: 128,
            comparer: None,
        }
    }
}

pub(crate) struct BTreeCore<K, V> {
    pub(crate) root: Option<NodePtr>,
    pub(crate) leftmost: Option<NodePtr>,
    pub(crate) rightmost: Option<NodePtr>,
    pub(crate) leaf_layout: LeafLayout,
    pub(crate) branch_layout: BranchLayout,
    pub(crate) order: u16,
    pub(crate) unique: bool,
    pub(crate) cmp: Comparer<K>,
    pub(crate) stage: u64,
    pub(crate) len: usize,
    sync_root: AtomicPtr<()>,
    _marker: PhantomData<fn() -> V>,
}

unsafe impl<K: Send, V: Send> Send for BTreeCore<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for BTreeCore<K, V> {}

impl<K: Ord + Clone + 'static, V> BTreeCore<K, V> {
    pub(crate) fn new(unique: bool, config: BTreeConfig<K>) -> Self {
        let order = config.order.clamp(4, 256);
        let cmp = config.comparer.unwrap_or_else(default_comparer);
        BTreeCore {
            root: None,
            leftmost: None,
            rightmost: None,
            leaf_layout: LeafLayout::compute_for_cap::<K, V>(order - 1),
            branch_layout: BranchLayout::compute_for_cap::<K>(order - 1),
            order,
            unique,
            cmp,
            stage: 0,
            len: 0,
            sync_root: AtomicPtr::new(ptr::null_mut()),
            _marker: PhantomData,
        }
    }
}

impl<K: Clone, V> BTreeCore<K, V> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn stage(&self) -> u64 {
        self.stage
    }

    /// A stable handle for lock-free readers to hold while a writer mutates
    /// the tree. Lazily created via compare-and-set so concurrent first
    /// calls never allocate twice; every call after the first is a relaxed
    /// load.
    pub(crate) fn sync_root(&self) -> Arc<()> {
        let existing = self.sync_root.load(AtomicOrdering::Acquire);
        if !existing.is_null() {
            unsafe {
                let arc = Arc::from_raw(existing as *const ());
                let cloned = arc.clone();
                core::mem::forget(arc);
                return cloned;
            }
        }
        let fresh = Arc::new(());
        let fresh_ptr = Arc::into_raw(fresh.clone()) as *mut ();
        match self.sync_root.compare_exchange(
            ptr::null_mut(),
            fresh_ptr,
            AtomicOrdering::AcqRel,
            AtomicOrdering::Acquire,
        ) {
            Ok(_) => fresh,
            Err(winner) => {
                // SAFETY: we just created `fresh_ptr` via `into_raw` and lost
                // the race; reclaim it to balance the refcount, then defer to
                // whichever pointer won.
                unsafe {
                    drop(Arc::from_raw(fresh_ptr as *const ()));
                    let arc = Arc::from_raw(winner as *const ());
                    let cloned = arc.clone();
                    core::mem::forget(arc);
                    cloned
                }
            }
        }
    }

    #[inline]
    fn bump_stage(&mut self) {
        self.stage = self.stage.wrapping_add(1);
    }

    pub(crate) fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            unsafe { self.free_subtree(root) };
        }
        self.leftmost = None;
        self.rightmost = None;
        self.len = 0;
        self.bump_stage();
    }
}

// No `K: Clone` bound here: freeing a subtree only drops elements in place,
// it never clones one. Kept separate from the `impl<K: Clone, V>` block
// above so `Drop` below isn't forced to add a bound the struct itself
// doesn't carry (rustc rejects a `Drop` impl stricter than its type).
impl<K, V> BTreeCore<K, V> {
    unsafe fn free_subtree(&mut self, node: NodePtr) {
        let hdr = &*(node.as_ptr() as *const NodeHdr);
        match hdr.tag {
            NodeTag::Leaf => {
                let parts = carve_leaf::<K, V>(node, &self.leaf_layout);
                let len = (*parts.hdr).len as usize;
                let keys = parts.keys_ptr as *mut K;
                let vals = parts.vals_ptr as *mut V;
                for i in 0..len {
                    ptr::drop_in_place(keys.add(i));
                    ptr::drop_in_place(vals.add(i));
                }
                dealloc_raw(node, self.leaf_layout.bytes, self.leaf_layout.max_align);
            }
            NodeTag::Branch => {
                let parts = carve_branch::<K>(node, &self.branch_layout);
                let len = (*parts.hdr).len as usize;
                let keys = parts.keys_ptr as *mut K;
                for i in 0..len {
                    ptr::drop_in_place(keys.add(i));
                }
                let children = parts.children_ptr as *const *mut u8;
                for i in 0..=len {
                    self.free_subtree(NonNull::new_unchecked(*children.add(i)));
                }
                dealloc_raw(node, self.branch_layout.bytes, self.branch_layout.max_align);
            }
        }
    }
}

impl<K: Clone, V> BTreeCore<K, V> {
    fn ensure_root_leaf(&mut self) -> NodePtr {
        if let Some(r) = self.root {
            return r;
        }
        let leaf = unsafe { alloc_leaf_block(&self.leaf_layout).expect("alloc root leaf") };
        self.root = Some(leaf);
        self.leftmost = Some(leaf);
        self.rightmost = Some(leaf);
        leaf
    }

    /// Insert into a unique-key flavor. Returns the previous value on
    /// overwrite, or `None` on a fresh insert.
    pub(crate) fn insert_unique(&mut self, key: K, val: V) -> Option<V> {
        debug_assert!(self.unique);
        self.ensure_root_leaf();
        unsafe {
            let nv = self.nv_search_key(&key, true);
            if nv.found {
                let top = nv.top();
                let parts = carve_leaf::<K, V>(top.node, &self.leaf_layout);
                let slot = (parts.vals_ptr as *mut V).add(top.idx);
                let old = ptr::replace(slot, val);
                return Some(old);
            }
            self.update_weight(&nv, 1);
            self.insert_leaf_entry(&nv, key, val);
            self.len += 1;
            self.bump_stage();
            None
        }
    }

    /// Insert into a non-unique flavor (bag/multimap), always appending
    /// after any existing equal keys to keep insertion order stable among
    /// duplicates.
    pub(crate) fn insert_multi(&mut self, key: K, val: V) {
        debug_assert!(!self.unique);
        self.ensure_root_leaf();
        unsafe {
            let nv = self.nv_search_key(&key, false);
            self.update_weight(&nv, 1);
            self.insert_leaf_entry(&nv, key, val);
            self.len += 1;
            self.bump_stage();
        }
    }

    /// Insert `key` with `val` produced `count` times in a row (bag/multimap
    /// bulk insert). A `count` of zero is a no-op.
    pub(crate) fn insert_n(&mut self, key: K, val: V, count: usize)
    where
        V: Clone,
    {
        if count == 0 {
            return;
        }
        for _ in 1..count {
            self.insert_multi(key.clone(), val.clone());
        }
        self.insert_multi(key, val);
    }

    unsafe fn insert_leaf_entry(&mut self, nv: &NodeVector, key: K, val: V) {
        use alloc::vec::Vec;

        let leaf = nv.top().node;
        let idx = nv.top().idx;
        let parts = carve_leaf::<K, V>(leaf, &self.leaf_layout);
        let len = (*parts.hdr).len as usize;
        let cap = self.leaf_layout.cap as usize;

        if len < cap {
            let keys_ptr = parts.keys_ptr as *mut K;
            let vals_ptr = parts.vals_ptr as *mut V;
            ptr::copy(keys_ptr.add(idx), keys_ptr.add(idx + 1), len - idx);
            ptr::copy(vals_ptr.add(idx), vals_ptr.add(idx + 1), len - idx);
            ptr::write(keys_ptr.add(idx), key);
            ptr::write(vals_ptr.add(idx), val);
            (*parts.hdr).len = (len + 1) as u16;
            return;
        }

        // Leaf is full: split, biasing towards an empty right node when the
        // insert lands exactly at the tail of the rightmost leaf
        // (monotonic/bulk load pattern). Both halves of the detection
        // matter: `idx == len` alone also fires for a full, non-rightmost
        // leaf whose insertion point happens to land at its own tail, which
        // would leave a 1-key leaf short of the non-rightmost fill floor.
        let is_append = idx == len && (*parts.next_ptr).is_null();
        let total = len + 1;
        let mid = if is_append { len } else { (len + 1) / 2 };

        let mut keys_tmp: Vec<K> = Vec::with_capacity(total);
        let mut vals_tmp: Vec<V> = Vec::with_capacity(total);
        let keys_ptr = parts.keys_ptr as *mut K;
        let vals_ptr = parts.vals_ptr as *mut V;
        for i in 0..len {
            keys_tmp.push(ptr::read(keys_ptr.add(i)));
            vals_tmp.push(ptr::read(vals_ptr.add(i)));
        }
        keys_tmp.insert(idx, key);
        vals_tmp.insert(idx, val);

        let left_count = mid;
        let right_count = total - mid;

        let right_leaf = alloc_leaf_block(&self.leaf_layout).expect("alloc right leaf");
        let rparts = carve_leaf::<K, V>(right_leaf, &self.leaf_layout);

        let mut kit = keys_tmp.into_iter();
        let mut vit = vals_tmp.into_iter();
        for i in 0..left_count {
            ptr::write(keys_ptr.add(i), kit.next().unwrap());
            ptr::write(vals_ptr.add(i), vit.next().unwrap());
        }
        for i in 0..right_count {
            ptr::write((rparts.keys_ptr as *mut K).add(i), kit.next().unwrap());
            ptr::write((rparts.vals_ptr as *mut V).add(i), vit.next().unwrap());
        }
        (*parts.hdr).len = left_count as u16;
        (*rparts.hdr).len = right_count as u16;

        let old_next = *parts.next_ptr;
        *rparts.next_ptr = old_next;
        *rparts.prev_ptr = leaf.as_ptr();
        *parts.next_ptr = right_leaf.as_ptr();
        if !old_next.is_null() {
            let nparts = carve_leaf::<K, V>(NonNull::new_unchecked(old_next), &self.leaf_layout);
            *nparts.prev_ptr = right_leaf.as_ptr();
        } else {
            self.rightmost = Some(right_leaf);
        }

        let sep_key = (*(rparts.keys_ptr as *const K)).clone();

        if nv.path.len() == 1 {
            let new_root = alloc_branch_block(&self.branch_layout).expect("alloc new root");
            let bparts = carve_branch::<K>(new_root, &self.branch_layout);
            (*bparts.hdr).len = 1;
            ptr::write(bparts.keys_ptr as *mut K, sep_key);
            let children = bparts.children_ptr as *mut *mut u8;
            *children = leaf.as_ptr();
            *children.add(1) = right_leaf.as_ptr();
            crate::node::set_branch_weight(new_root, (left_count + right_count) as u64);
            self.root = Some(new_root);
        } else {
            self.promote(nv, sep_key, right_leaf, is_append);
        }
    }

    /// Remove the key-value pair at `nv`'s current leaf position, after
    /// which `nv` no longer denotes a valid slot. Returns the removed pair.
    unsafe fn remove_at_vector(&mut self, nv: &mut NodeVector) -> (K, V) {
        let leaf = nv.top().node;
        let idx = nv.top().idx;
        let parts = carve_leaf::<K, V>(leaf, &self.leaf_layout);
        let len = (*parts.hdr).len as usize;
        let keys_ptr = parts.keys_ptr as *mut K;
        let vals_ptr = parts.vals_ptr as *mut V;

        let removed_key = ptr::read(keys_ptr.add(idx));
        let removed_val = ptr::read(vals_ptr.add(idx));
        ptr::copy(keys_ptr.add(idx + 1), keys_ptr.add(idx), len - idx - 1);
        ptr::copy(vals_ptr.add(idx + 1), vals_ptr.add(idx), len - idx - 1);
        (*parts.hdr).len = (len - 1) as u16;

        self.update_weight(nv, -1);
        self.len -= 1;

        if (*parts.hdr).len == 0 {
            self.unlink_empty_leaf(nv, leaf);
        } else {
            // The removed entry was the leaf's first key, so any ancestor
            // separator pointing at this leaf is now stale regardless of
            // whether the leaf also underflowed. Refresh it before
            // `fix_leaf_underflow` can repoint `nv` at a different leaf.
            if idx == 0 {
                let new_first = (*keys_ptr).clone();
                self.set_pivot(nv, new_first);
            }
            self.fix_leaf_underflow(nv);
        }

        self.bump_stage();
        (removed_key, removed_val)
    }

    unsafe fn unlink_empty_leaf(&mut self, nv: &mut NodeVector, leaf: NodePtr) {
        let parts = carve_leaf::<K, V>(leaf, &self.leaf_layout);
        let prev = *parts.prev_ptr;
        let next = *parts.next_ptr;
        if !prev.is_null() {
            let pparts = carve_leaf::<K, V>(NonNull::new_unchecked(prev), &self.leaf_layout);
            *pparts.next_ptr = next;
        } else {
            self.leftmost = NonNull::new(next);
        }
        if !next.is_null() {
            let nparts = carve_leaf::<K, V>(NonNull::new_unchecked(next), &self.leaf_layout);
            *nparts.prev_ptr = prev;
        } else {
            self.rightmost = NonNull::new(prev);
        }

        if self.root == Some(leaf) {
            dealloc_raw(leaf, self.leaf_layout.bytes, self.leaf_layout.max_align);
            self.root = None;
            return;
        }

        dealloc_raw(leaf, self.leaf_layout.bytes, self.leaf_layout.max_align);
        if nv.path.len() >= 2 {
            self.demote(nv);
        }
    }

    /// Remove the first occurrence of `key`. Returns the removed pair.
    pub(crate) fn remove_key(&mut self, key: &K) -> Option<(K, V)> {
        unsafe {
            let mut nv = self.nv_search_key(key, true);
            if !nv.found {
                return None;
            }
            Some(self.remove_at_vector(&mut nv))
        }
    }

    /// Remove up to `count` occurrences of `key` (bag/multimap). Returns the
    /// number actually removed.
    pub(crate) fn remove_n(&mut self, key: &K, mut count: usize) -> usize {
        let mut removed = 0;
        while count > 0 {
            unsafe {
                let mut nv = self.nv_search_key(key, true);
                if !nv.found {
                    break;
                }
                self.remove_at_vector(&mut nv);
            }
            removed += 1;
            count -= 1;
        }
        removed
    }

    /// Remove every occurrence of `key`. Returns the number removed.
    pub(crate) fn remove_all(&mut self, key: &K) -> usize {
        self.remove_n(key, usize::MAX)
    }

    /// Remove the element at global rank `index`.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        if index >= self.len {
            return None;
        }
        unsafe {
            let mut nv = self.nv_search_index(index);
            Some(self.remove_at_vector(&mut nv))
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        unsafe {
            let nv = self.nv_search_key(key, true);
            if !nv.found {
                return None;
            }
            let top = nv.top();
            let parts = carve_leaf::<K, V>(top.node, &self.leaf_layout);
            Some(&*(parts.vals_ptr as *const V).add(top.idx))
        }
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        unsafe {
            let nv = self.nv_search_key(key, true);
            if !nv.found {
                return None;
            }
            let top = nv.top();
            let parts = carve_leaf::<K, V>(top.node, &self.leaf_layout);
            Some(&mut *(parts.vals_ptr as *mut V).add(top.idx))
        }
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        unsafe { self.nv_search_key(key, true).found }
    }

    /// Rank of the first occurrence of `key`, or `None` if absent.
    pub(crate) fn index_of(&self, key: &K) -> Option<usize> {
        unsafe {
            let nv = self.nv_search_key(key, true);
            if !nv.found {
                return None;
            }
            Some(self.rank(&nv))
        }
    }

    /// Rank of `key`'s first occurrence as a signed, bitwise-complement
    /// encoded value: non-negative if present, `!insertion_rank` (so `!n`
    /// recovers the insertion rank) if absent. Mirrors the distilled spec's
    /// `indexOf` boundary convention (`indexOf(missing) == ~insertion_rank`)
    /// alongside the idiomatic `Option`-returning `index_of` above.
    pub(crate) fn index_of_signed(&self, key: &K) -> isize {
        unsafe {
            let nv = self.nv_search_key(key, true);
            let r = self.rank(&nv) as isize;
            if nv.found {
                r
            } else {
                !r
            }
        }
    }

    /// Rank one past the last occurrence of `key`.
    pub(crate) fn index_of_upper(&self, key: &K) -> usize {
        unsafe {
            let nv = self.nv_search_key(key, false);
            self.rank(&nv)
        }
    }

    /// Number of occurrences of `key` (1 for unique flavors when present).
    pub(crate) fn get_count(&self, key: &K) -> usize {
        let lower = unsafe {
            let nv = self.nv_search_key(key, true);
            self.rank(&nv)
        };
        self.index_of_upper(key) - lower
    }

    pub(crate) fn element_at(&self, index: usize) -> Option<(&K, &V)> {
        if index >= self.len {
            return None;
        }
        unsafe {
            let nv = self.nv_search_index(index);
            let top = nv.top();
            let parts = carve_leaf::<K, V>(top.node, &self.leaf_layout);
            let k = &*(parts.keys_ptr as *const K).add(top.idx);
            let v = &*(parts.vals_ptr as *const V).add(top.idx);
            Some((k, v))
        }
    }

    pub(crate) fn first(&self) -> Option<(&K, &V)> {
        self.element_at(0)
    }

    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        if self.len == 0 {
            None
        } else {
            self.element_at(self.len - 1)
        }
    }

    pub(crate) fn cmp_keys(&self, a: &K, b: &K) -> Ordering {
        (self.cmp)(a, b)
    }

    pub(crate) fn leftmost_leaf(&self) -> Option<NodePtr> {
        self.leftmost
    }

    pub(crate) fn rightmost_leaf(&self) -> Option<NodePtr> {
        self.rightmost
    }

    /// Walk the whole structure and verify every invariant this engine
    /// relies on: fill bounds, ordering, cached weights, and sibling links.
    pub(crate) fn check_invariants(&self) -> Result<(), BTreeError> {
        let Some(root) = self.root else {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(BTreeError::InvalidState(
                    "empty root but nonzero length".into(),
                ))
            };
        };
        let mut leaf_count = 0usize;
        let weight = unsafe { self.check_node(root, true, &mut leaf_count)? };
        if weight as usize != self.len {
            return Err(BTreeError::InvalidState(alloc::format!(
                "root weight {} does not match len {}",
                weight,
                self.len
            )));
        }
        self.check_pivots()
    }

    /// Every leaf but the leftmost has an ancestor separator pointing at
    /// it; that separator must equal the leaf's own first key (the
    /// pivot-equals-first-key-of-right-subtree convention from DESIGN.md).
    fn check_pivots(&self) -> Result<(), BTreeError> {
        unsafe {
            let mut cur = self.leftmost;
            let mut first = true;
            while let Some(leaf) = cur {
                let parts = carve_leaf::<K, V>(leaf, &self.leaf_layout);
                let len = (*parts.hdr).len as usize;
                if len > 0 && !first {
                    let first_key = &*(parts.keys_ptr as *const K);
                    let nv = self.nv_search_key(first_key, true);
                    match self.get_pivot(&nv) {
                        Some(pivot) if self.cmp_keys(&pivot, first_key) == Ordering::Equal => {}
                        _ => {
                            return Err(BTreeError::InvalidState(
                                "ancestor separator does not match leaf's first key".into(),
                            ));
                        }
                    }
                }
                first = false;
                cur = crate::node::leaf_next(leaf, &self.leaf_layout);
            }
        }
        Ok(())
    }

    unsafe fn check_node(
        &self,
        node: NodePtr,
        is_root: bool,
        leaf_count: &mut usize,
    ) -> Result<u64, BTreeError> {
        let hdr = &*(node.as_ptr() as *const NodeHdr);
        match hdr.tag {
            NodeTag::Leaf => {
                let parts = carve_leaf::<K, V>(node, &self.leaf_layout);
                let len = (*parts.hdr).len as usize;
                let keys = core::slice::from_raw_parts(parts.keys_ptr as *const K, len);
                for w in keys.windows(2) {
                    let ord = self.cmp_keys(&w[0], &w[1]);
                    let bad = if self.unique {
                        ord != Ordering::Less
                    } else {
                        ord == Ordering::Greater
                    };
                    if bad {
                        return Err(BTreeError::InvalidState("leaf keys out of order".into()));
                    }
                }
                if self.rightmost != Some(node) && len < self.leaf_underflow_threshold() {
                    return Err(BTreeError::InvalidState("leaf underflow".into()));
                }
                *leaf_count += 1;
                Ok(len as u64)
            }
            NodeTag::Branch => {
                let parts = carve_branch::<K>(node, &self.branch_layout);
                let len = (*parts.hdr).len as usize;
                let min_keys = self.min_branch_keys();
                if !is_root && len < min_keys {
                    return Err(BTreeError::InvalidState("branch underflow".into()));
                }
                if len == 0 && is_root {
                    return Err(BTreeError::InvalidState("empty root branch".into()));
                }
                let children = parts.children_ptr as *const *mut u8;
                let mut total = 0u64;
                for i in 0..=len {
                    let child = NonNull::new_unchecked(*children.add(i));
                    total += self.check_node(child, false, leaf_count)?;
                }
                if total != (*parts.hdr).weight {
                    return Err(BTreeError::InvalidState("cached branch weight mismatch".into()));
                }
                Ok(total)
            }
        }
    }

    /// Remove every entry for which `pred` holds. Collects matching ranks in
    /// a single forward scan (stage is still unchanged at that point), then
    /// removes them highest-rank-first so each `remove_at` leaves the
    /// not-yet-processed ranks valid. `O(N + k log_m N)` for `k` matches,
    /// within the distilled spec's `O(N log N)` worst-case budget.
    pub(crate) fn remove_where(&mut self, mut pred: impl FnMut(&K, &V) -> bool) -> usize {
        let mut ranks: Vec<usize> = Vec::new();
        let mut cur = self.leftmost;
        let mut rank = 0usize;
        unsafe {
            while let Some(leaf) = cur {
                let parts = carve_leaf::<K, V>(leaf, &self.leaf_layout);
                let len = (*parts.hdr).len as usize;
                let keys = core::slice::from_raw_parts(parts.keys_ptr as *const K, len);
                let vals = core::slice::from_raw_parts(parts.vals_ptr as *const V, len);
                for i in 0..len {
                    if pred(&keys[i], &vals[i]) {
                        ranks.push(rank + i);
                    }
                }
                rank += len;
                cur = crate::node::leaf_next(leaf, &self.leaf_layout);
            }
        }
        let removed = ranks.len();
        for r in ranks.into_iter().rev() {
            self.remove_at(r);
        }
        removed
    }

    /// Number of distinct keys. Jumps rank-to-rank via `index_of_upper`
    /// rather than scanning every physical key, so this is `O(d log_m N)`
    /// for `d` distinct keys, not `O(N)`.
    pub(crate) fn distinct_count(&self) -> usize {
        if self.unique {
            return self.len;
        }
        let mut count = 0usize;
        let mut rank = 0usize;
        while rank < self.len {
            let (key, _) = self.element_at(rank).expect("rank within bounds");
            rank = self.index_of_upper(key);
            count += 1;
        }
        count
    }

    /// Distinct keys in ascending order, one entry per distinct key
    /// regardless of multiplicity. Same rank-jumping shape as
    /// `distinct_count`: `O(d log_m N)` for `d` distinct keys.
    pub(crate) fn distinct_keys(&self) -> Vec<K> {
        let mut out = Vec::new();
        let mut rank = 0usize;
        while rank < self.len {
            let (key, _) = self.element_at(rank).expect("rank within bounds");
            let key = key.clone();
            rank = self.index_of_upper(&key);
            out.push(key);
        }
        out
    }
}

impl<K, V> Drop for BTreeCore<K, V> {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            unsafe { self.free_subtree(root) };
        }
        let raw = self.sync_root.load(AtomicOrdering::Acquire);
        if !raw.is_null() {
            unsafe { drop(Arc::from_raw(raw as *const ())) };
        }
    }
}

#[allow(dead_code)]
fn _assert_path_entry_size() {
    let _ = core::mem::size_of::<PathEntry>();
}
