//! `NodeVector` — the root-to-leaf path that carries every mutation through
//! the tree: search, rank computation, split promotion, and
//! delete/coalesce/balance.
//!
//! The vector itself is a dumb stack of `(node, child-index)` pairs; all the
//! behavior lives in the `BTreeCore` methods in this file that take one as
//! an argument. Splitting `impl BTreeCore` across this file and `engine.rs`
//! is deliberate: this file is everything that walks or restructures a path,
//! `engine.rs` is everything that's a single public operation built from
//! these primitives.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ptr::{self, NonNull};

use crate::engine::BTreeCore;
use crate::layout::{carve_branch, carve_leaf, NodeHdr, NodeTag};
use crate::node::{
    add_branch_weight, branch_weight, lower_bound, set_branch_weight, subtree_weight, upper_bound,
    NodePtr,
};
use crate::node_alloc::{alloc_branch_block, alloc_leaf_block, dealloc_raw};

/// One level of a root-to-leaf path: the node visited, and the child index
/// chosen to descend further (or, at the final/leaf entry, the key-local
/// index the operation cares about).
#[derive(Copy, Clone)]
pub(crate) struct PathEntry {
    pub node: NodePtr,
    pub idx: usize,
}

/// A root-to-leaf path plus whether a key search landed on an exact match.
pub(crate) struct NodeVector {
    pub path: Vec<PathEntry>,
    pub found: bool,
}

impl NodeVector {
    #[inline]
    pub fn height(&self) -> usize {
        self.path.len()
    }

    #[inline]
    pub fn top(&self) -> PathEntry {
        *self.path.last().expect("node vector is never empty")
    }
}

impl<K: Clone, V> BTreeCore<K, V> {
    #[inline]
    pub(crate) fn cmp(&self, a: &K, b: &K) -> Ordering {
        (self.cmp)(a, b)
    }

    /// Build a path to the leaf that would hold `key`.
    ///
    /// `want_lower` selects lower-bound descent (leftmost matching
    /// occurrence) vs upper-bound descent (just past the last matching
    /// occurrence). Unique flavors always use upper-bound-shaped descent
    /// regardless of `want_lower`, since under this crate's
    /// pivot-equals-first-key-of-right-subtree convention an exact
    /// separator match belongs to the right subtree (see DESIGN.md).
    pub(crate) unsafe fn nv_search_key(&self, key: &K, want_lower: bool) -> NodeVector {
        let mut path = Vec::with_capacity(8);
        let mut cur = match self.root {
            Some(r) => r,
            None => return NodeVector { path, found: false },
        };
        loop {
            let hdr = &*(cur.as_ptr() as *const NodeHdr);
            match hdr.tag {
                NodeTag::Branch => {
                    let parts = carve_branch::<K>(cur, &self.branch_layout);
                    let len = (*parts.hdr).len as usize;
                    let keys = core::slice::from_raw_parts(parts.keys_ptr as *const K, len);
                    let idx = if self.unique || !want_lower {
                        upper_bound(keys, key, &*self.cmp)
                    } else {
                        lower_bound(keys, key, &*self.cmp)
                    };
                    let children = parts.children_ptr as *const *mut u8;
                    let next = NonNull::new_unchecked(*children.add(idx));
                    path.push(PathEntry { node: cur, idx });
                    cur = next;
                }
                NodeTag::Leaf => {
                    let parts = carve_leaf::<K, V>(cur, &self.leaf_layout);
                    let len = (*parts.hdr).len as usize;
                    let keys = core::slice::from_raw_parts(parts.keys_ptr as *const K, len);
                    let (idx, found) = if self.unique {
                        match keys.binary_search_by(|probe| self.cmp(probe, key)) {
                            Ok(i) => (i, true),
                            Err(i) => (i, false),
                        }
                    } else if want_lower {
                        let i = lower_bound(keys, key, &*self.cmp);
                        let found = i < len && self.cmp(&keys[i], key) == Ordering::Equal;
                        (i, found)
                    } else {
                        let i = upper_bound(keys, key, &*self.cmp);
                        let found = i > 0 && self.cmp(&keys[i - 1], key) == Ordering::Equal;
                        (i, found)
                    };
                    path.push(PathEntry { node: cur, idx });
                    return NodeVector { path, found };
                }
            }
        }
    }

    /// Build a path to the leaf (and leaf-local index) holding the `index`-th
    /// key in sorted order, descending by cached subtree weight.
    ///
    /// # Safety
    /// `index < self.len()`.
    pub(crate) unsafe fn nv_search_index(&self, mut index: usize) -> NodeVector {
        let mut path = Vec::with_capacity(8);
        let mut cur = self.root.expect("index search on empty tree");
        loop {
            let hdr = &*(cur.as_ptr() as *const NodeHdr);
            match hdr.tag {
                NodeTag::Branch => {
                    let parts = carve_branch::<K>(cur, &self.branch_layout);
                    let len = (*parts.hdr).len as usize;
                    let children = parts.children_ptr as *const *mut u8;
                    let mut chosen = len;
                    for i in 0..=len {
                        let child = NonNull::new_unchecked(*children.add(i));
                        let w = subtree_weight(child) as usize;
                        if index < w {
                            chosen = i;
                            break;
                        }
                        index -= w;
                    }
                    let next = NonNull::new_unchecked(*children.add(chosen));
                    path.push(PathEntry { node: cur, idx: chosen });
                    cur = next;
                }
                NodeTag::Leaf => {
                    path.push(PathEntry { node: cur, idx: index });
                    return NodeVector { path, found: true };
                }
            }
        }
    }

    /// 0-based global rank of the vector's current position: sum of weights
    /// skipped on every left descent, plus the leaf-local index.
    pub(crate) unsafe fn rank(&self, nv: &NodeVector) -> usize {
        if nv.path.is_empty() {
            return 0;
        }
        let mut r = 0usize;
        let last = nv.path.len() - 1;
        for (level, entry) in nv.path.iter().enumerate() {
            if level == last {
                r += entry.idx;
            } else {
                let parts = carve_branch::<K>(entry.node, &self.branch_layout);
                let children = parts.children_ptr as *const *mut u8;
                for i in 0..entry.idx {
                    let child = NonNull::new_unchecked(*children.add(i));
                    r += subtree_weight(child) as usize;
                }
            }
        }
        r
    }

    /// The leaf immediately to the left of the vector's current leaf, via
    /// its physical `prev` sibling pointer, or `None` at the head.
    pub(crate) unsafe fn left_sibling_leaf(&self, nv: &NodeVector) -> Option<NodePtr> {
        let leaf = nv.top().node;
        let parts = carve_leaf::<K, V>(leaf, &self.leaf_layout);
        NonNull::new(*parts.prev_ptr)
    }

    /// Advance every level of the path to the next leaf in sorted order:
    /// pop until a level has a right sibling, step into it, then descend
    /// leftmost. Returns `false` if the vector was already at the rightmost
    /// leaf.
    pub(crate) unsafe fn traverse_right(&self, nv: &mut NodeVector) -> bool {
        let mut level = nv.path.len();
        loop {
            if level == 0 {
                return false;
            }
            level -= 1;
            let node = nv.path[level].node;
            let hdr = &*(node.as_ptr() as *const NodeHdr);
            if !matches!(hdr.tag, NodeTag::Branch) {
                continue;
            }
            let parts = carve_branch::<K>(node, &self.branch_layout);
            let blen = (*parts.hdr).len as usize;
            if nv.path[level].idx + 1 > blen {
                continue;
            }
            nv.path[level].idx += 1;
            nv.path.truncate(level + 1);
            let children = parts.children_ptr as *const *mut u8;
            let mut cur = NonNull::new_unchecked(*children.add(nv.path[level].idx));
            loop {
                let chdr = &*(cur.as_ptr() as *const NodeHdr);
                match chdr.tag {
                    NodeTag::Branch => {
                        let cparts = carve_branch::<K>(cur, &self.branch_layout);
                        nv.path.push(PathEntry { node: cur, idx: 0 });
                        cur = NonNull::new_unchecked(*(cparts.children_ptr as *const *mut u8));
                    }
                    NodeTag::Leaf => {
                        nv.path.push(PathEntry { node: cur, idx: 0 });
                        return true;
                    }
                }
            }
        }
    }

    /// Apply `delta` to every branch's cached weight along the path.
    pub(crate) unsafe fn update_weight(&self, nv: &NodeVector, delta: i64) {
        for entry in nv.path.iter() {
            let hdr = &*(entry.node.as_ptr() as *const NodeHdr);
            if matches!(hdr.tag, NodeTag::Branch) {
                add_branch_weight(entry.node, delta);
            }
        }
    }

    /// Transfer weight between branches strictly between a leaf and the
    /// lowest common ancestor it shares with a rebalancing sibling.
    ///
    /// This crate restricts every rotate/coalesce to siblings sharing an
    /// immediate parent (the standard B-tree deletion shape), so the
    /// parent's own cached weight is already correct before and after the
    /// transfer — no branch between the two leaves ever needs adjusting.
    /// Kept as an explicit no-op step for fidelity with the distilled
    /// spec's `NodeVector` contract (see DESIGN.md, Open Question 2).
    #[inline]
    pub(crate) fn tilt_left(&self, _nv: &NodeVector, _delta: usize) {}

    /// The nearest ancestor separator for which the path took a right
    /// child: the last branch level with `idx > 0`, at key index `idx - 1`.
    unsafe fn pivot_entry(&self, nv: &NodeVector) -> Option<(NodePtr, usize)> {
        for entry in nv.path[..nv.path.len() - 1].iter().rev() {
            if entry.idx > 0 {
                return Some((entry.node, entry.idx - 1));
            }
        }
        None
    }

    pub(crate) unsafe fn get_pivot(&self, nv: &NodeVector) -> Option<K> {
        let (node, kidx) = self.pivot_entry(nv)?;
        let parts = carve_branch::<K>(node, &self.branch_layout);
        Some((*(parts.keys_ptr as *const K).add(kidx)).clone())
    }

    pub(crate) unsafe fn set_pivot(&mut self, nv: &NodeVector, new_key: K) {
        if let Some((node, kidx)) = self.pivot_entry(nv) {
            let parts = carve_branch::<K>(node, &self.branch_layout);
            let p = (parts.keys_ptr as *mut K).add(kidx);
            ptr::drop_in_place(p);
            ptr::write(p, new_key);
        }
    }

    /// Insert `(sep_key, new_child)` into the parent of the node that just
    /// split, recursively splitting ancestors and, if recursion reaches the
    /// top, grafting a new root.
    ///
    /// `nv` must still include the entry for the node that split as its
    /// last (leaf) element; the parent is `nv.path[nv.path.len() - 2]`.
    ///
    /// Weight bookkeeping: the caller is responsible for the net +1 on every
    /// branch already in `nv.path` (via `update_weight`). This function only
    /// sets *absolute* weights on nodes it splits off or creates — it never
    /// adds a relative delta to a node already in `nv.path`, since that
    /// would double-count the `update_weight` pass.
    ///
    /// `is_append` is computed once by the caller (true only when the split
    /// that triggered this promotion was a genuine tail-append at the
    /// rightmost leaf) and reused at every level, per the spec's
    /// `promote(key, newNode, isAppend)` signature — it is deliberately
    /// *not* recomputed per level from each branch's own child index, since
    /// `idx == len` alone can also be true for a full, non-rightmost branch
    /// whose split point happens to land at its own tail.
    pub(crate) unsafe fn promote(
        &mut self,
        nv: &NodeVector,
        mut sep_key: K,
        mut new_child: NodePtr,
        is_append: bool,
    ) {
        let mut level = nv.path.len() as isize - 2;
        loop {
            if level < 0 {
                let new_root = alloc_branch_block(&self.branch_layout).expect("alloc new root");
                let parts = carve_branch::<K>(new_root, &self.branch_layout);
                (*parts.hdr).len = 1;
                ptr::write(parts.keys_ptr as *mut K, sep_key);
                let children = parts.children_ptr as *mut *mut u8;
                let old_root = self.root.expect("promote without a root");
                *children = old_root.as_ptr();
                *children.add(1) = new_child.as_ptr();
                let w = subtree_weight(old_root) + subtree_weight(new_child);
                set_branch_weight(new_root, w);
                self.root = Some(new_root);
                return;
            }

            let lvl = level as usize;
            let node = nv.path[lvl].node;
            let idx = nv.path[lvl].idx;
            let parts = carve_branch::<K>(node, &self.branch_layout);
            let len = (*parts.hdr).len as usize;
            let cap = self.branch_layout.cap as usize;

            if len < cap {
                let keys_ptr = parts.keys_ptr as *mut K;
                ptr::copy(keys_ptr.add(idx), keys_ptr.add(idx + 1), len - idx);
                ptr::write(keys_ptr.add(idx), sep_key);
                let children = parts.children_ptr as *mut *mut u8;
                ptr::copy(children.add(idx + 1), children.add(idx + 2), len - idx);
                *children.add(idx + 1) = new_child.as_ptr();
                (*parts.hdr).len = (len + 1) as u16;
                return;
            }

            // Branch is full: split it, mirroring the leaf split shape,
            // using the `is_append` flag threaded in from the triggering
            // leaf split (not recomputed from this branch's own `idx`).
            let total_keys = len + 1;
            let mid = if is_append { len } else { (len + 1) / 2 };

            let mut keys_tmp: Vec<K> = Vec::with_capacity(total_keys);
            let old_keys = parts.keys_ptr as *mut K;
            for i in 0..len {
                keys_tmp.push(ptr::read(old_keys.add(i)));
            }
            keys_tmp.insert(idx, sep_key);

            let mut children_tmp: Vec<NodePtr> = Vec::with_capacity(len + 2);
            let old_children = parts.children_ptr as *const *mut u8;
            for i in 0..=len {
                children_tmp.push(NonNull::new_unchecked(*old_children.add(i)));
            }
            children_tmp.insert(idx + 1, new_child);

            let promoted = keys_tmp.remove(mid);
            let left_key_count = mid;
            let right_key_count = len - mid;
            let left_child_count = mid + 1;

            let right_branch = alloc_branch_block(&self.branch_layout).expect("alloc right branch");
            let rparts = carve_branch::<K>(right_branch, &self.branch_layout);

            let mut kit = keys_tmp.into_iter();
            for i in 0..left_key_count {
                ptr::write(old_keys.add(i), kit.next().unwrap());
            }
            for i in 0..right_key_count {
                ptr::write((rparts.keys_ptr as *mut K).add(i), kit.next().unwrap());
            }

            let mut left_weight = 0u64;
            let lchildren = parts.children_ptr as *mut *mut u8;
            for i in 0..left_child_count {
                let c = children_tmp[i];
                *lchildren.add(i) = c.as_ptr();
                left_weight += subtree_weight(c);
            }
            let mut right_weight = 0u64;
            let rchildren = rparts.children_ptr as *mut *mut u8;
            for (i, c) in children_tmp[left_child_count..].iter().enumerate() {
                *rchildren.add(i) = c.as_ptr();
                right_weight += subtree_weight(*c);
            }

            (*parts.hdr).len = left_key_count as u16;
            set_branch_weight(node, left_weight);
            (*rparts.hdr).len = right_key_count as u16;
            set_branch_weight(right_branch, right_weight);

            sep_key = promoted;
            new_child = right_branch;
            level -= 1;
        }
    }

    /// Remove the separator/child entry for an emptied or merged-away
    /// child, cascading coalesce/rotate up the path; collapses a one-child
    /// root into that child.
    ///
    /// `nv.path[level].idx` names the child slot to remove at each level;
    /// the caller must have already positioned the vector so that the
    /// first level above the emptied node carries the right index (either
    /// because it was the node's original descent index, or because
    /// `traverse_right` moved the vector there).
    pub(crate) unsafe fn demote(&mut self, nv: &mut NodeVector) {
        if nv.path.len() < 2 {
            return;
        }
        let mut level = nv.path.len() - 2;
        loop {
            let branch = nv.path[level].node;
            let removed_idx = nv.path[level].idx;
            let bparts = carve_branch::<K>(branch, &self.branch_layout);
            let blen = (*bparts.hdr).len as usize;

            let (key_rm, child_rm) = if removed_idx == 0 {
                (0usize, 0usize)
            } else {
                (removed_idx - 1, removed_idx)
            };
            let keys_ptr = bparts.keys_ptr as *mut K;
            ptr::drop_in_place(keys_ptr.add(key_rm));
            if key_rm + 1 < blen {
                ptr::copy(keys_ptr.add(key_rm + 1), keys_ptr.add(key_rm), blen - key_rm - 1);
            }
            let children = bparts.children_ptr as *mut *mut u8;
            if child_rm + 1 <= blen {
                ptr::copy(children.add(child_rm + 1), children.add(child_rm), blen - child_rm);
            }
            let new_blen = blen - 1;
            (*bparts.hdr).len = new_blen as u16;

            if self.root == Some(branch) {
                if new_blen == 0 {
                    let only_child = NonNull::new_unchecked(*children);
                    dealloc_raw(branch, self.branch_layout.bytes, self.branch_layout.max_align);
                    self.root = Some(only_child);
                }
                return;
            }

            if new_blen >= self.min_branch_keys() {
                return;
            }

            debug_assert!(level >= 1, "non-root branch must have a parent");
            let parent_level = level - 1;
            let parent = nv.path[parent_level].node;
            let my_idx = nv.path[parent_level].idx;
            let pparts = carve_branch::<K>(parent, &self.branch_layout);
            let plen = (*pparts.hdr).len as usize;
            let pchildren = pparts.children_ptr as *const *mut u8;

            if my_idx + 1 <= plen {
                let right = NonNull::new_unchecked(*pchildren.add(my_idx + 1));
                let rlen = crate::node::len_of(right);
                if new_blen + 1 + rlen <= self.branch_layout.cap as usize {
                    self.branch_coalesce(branch, parent, my_idx, right);
                    nv.path[parent_level].idx = my_idx + 1;
                    level = parent_level;
                    continue;
                } else {
                    self.branch_rotate_from_right(branch, parent, my_idx, right);
                    return;
                }
            } else if my_idx > 0 {
                let left = NonNull::new_unchecked(*pchildren.add(my_idx - 1));
                let llen = crate::node::len_of(left);
                if new_blen + 1 + llen <= self.branch_layout.cap as usize {
                    self.branch_coalesce(left, parent, my_idx - 1, branch);
                    nv.path[parent_level].idx = my_idx;
                    level = parent_level;
                    continue;
                } else {
                    self.branch_rotate_from_left(branch, parent, my_idx, left);
                    return;
                }
            } else {
                return;
            }
        }
    }

    /// Merge `right` into `left`, pulling the separator between them down
    /// from `parent` at `left_idx`. Deallocates `right`.
    unsafe fn branch_coalesce(
        &mut self,
        left: NodePtr,
        parent: NodePtr,
        left_idx: usize,
        right: NodePtr,
    ) {
        let lparts = carve_branch::<K>(left, &self.branch_layout);
        let llen = (*lparts.hdr).len as usize;
        let rparts = carve_branch::<K>(right, &self.branch_layout);
        let rlen = (*rparts.hdr).len as usize;
        let pparts = carve_branch::<K>(parent, &self.branch_layout);

        let sep = ptr::read((pparts.keys_ptr as *const K).add(left_idx));
        let lkeys = lparts.keys_ptr as *mut K;
        ptr::write(lkeys.add(llen), sep);
        let rkeys = rparts.keys_ptr as *const K;
        for i in 0..rlen {
            ptr::write(lkeys.add(llen + 1 + i), ptr::read(rkeys.add(i)));
        }
        let lchildren = lparts.children_ptr as *mut *mut u8;
        let rchildren = rparts.children_ptr as *const *mut u8;
        for i in 0..=rlen {
            *lchildren.add(llen + 1 + i) = *rchildren.add(i);
        }
        (*lparts.hdr).len = (llen + 1 + rlen) as u16;
        let moved_weight = branch_weight(right);
        add_branch_weight(left, moved_weight as i64);
        dealloc_raw(right, self.branch_layout.bytes, self.branch_layout.max_align);
    }

    /// Borrow a single child from `rich` (the right sibling of `poor`)
    /// through the separator in `parent` at index `poor_idx`.
    unsafe fn branch_rotate_from_right(
        &mut self,
        poor: NodePtr,
        parent: NodePtr,
        poor_idx: usize,
        rich: NodePtr,
    ) {
        let pparts = carve_branch::<K>(parent, &self.branch_layout);
        let poor_parts = carve_branch::<K>(poor, &self.branch_layout);
        let rich_parts = carve_branch::<K>(rich, &self.branch_layout);
        let poor_len = (*poor_parts.hdr).len as usize;
        let rich_len = (*rich_parts.hdr).len as usize;

        let sep = ptr::read((pparts.keys_ptr as *const K).add(poor_idx));
        ptr::write((poor_parts.keys_ptr as *mut K).add(poor_len), sep);

        let rchildren = rich_parts.children_ptr as *const *mut u8;
        let moved_child = NonNull::new_unchecked(*rchildren);
        let pchildren = poor_parts.children_ptr as *mut *mut u8;
        *pchildren.add(poor_len + 1) = moved_child.as_ptr();
        let moved_w = subtree_weight(moved_child);
        add_branch_weight(poor, moved_w as i64);

        let rkeys = rich_parts.keys_ptr as *mut K;
        let new_sep = ptr::read(rkeys);
        ptr::copy(rkeys.add(1), rkeys, rich_len - 1);
        let rchildren_mut = rich_parts.children_ptr as *mut *mut u8;
        ptr::copy(rchildren_mut.add(1), rchildren_mut, rich_len);
        (*rich_parts.hdr).len = (rich_len - 1) as u16;
        add_branch_weight(rich, -(moved_w as i64));

        (*poor_parts.hdr).len = (poor_len + 1) as u16;
        ptr::write((pparts.keys_ptr as *mut K).add(poor_idx), new_sep);
    }

    /// Borrow a single child from `rich` (the left sibling of `poor`)
    /// through the separator in `parent` at index `poor_idx - 1`.
    unsafe fn branch_rotate_from_left(
        &mut self,
        poor: NodePtr,
        parent: NodePtr,
        poor_idx: usize,
        rich: NodePtr,
    ) {
        let pparts = carve_branch::<K>(parent, &self.branch_layout);
        let poor_parts = carve_branch::<K>(poor, &self.branch_layout);
        let rich_parts = carve_branch::<K>(rich, &self.branch_layout);
        let poor_len = (*poor_parts.hdr).len as usize;
        let rich_len = (*rich_parts.hdr).len as usize;
        let sep_idx = poor_idx - 1;

        let sep = ptr::read((pparts.keys_ptr as *const K).add(sep_idx));
        let pkeys = poor_parts.keys_ptr as *mut K;
        ptr::copy(pkeys, pkeys.add(1), poor_len);
        ptr::write(pkeys, sep);

        let pchildren = poor_parts.children_ptr as *mut *mut u8;
        ptr::copy(pchildren, pchildren.add(1), poor_len + 1);
        let rich_children = rich_parts.children_ptr as *const *mut u8;
        let moved_child = NonNull::new_unchecked(*rich_children.add(rich_len));
        *pchildren = moved_child.as_ptr();
        let moved_w = subtree_weight(moved_child);
        add_branch_weight(poor, moved_w as i64);

        let rkeys = rich_parts.keys_ptr as *const K;
        let new_sep = ptr::read(rkeys.add(rich_len - 1));
        (*rich_parts.hdr).len = (rich_len - 1) as u16;
        add_branch_weight(rich, -(moved_w as i64));

        (*poor_parts.hdr).len = (poor_len + 1) as u16;
        ptr::write((pparts.keys_ptr as *mut K).add(sep_idx), new_sep);
    }

    #[inline]
    pub(crate) fn min_branch_keys(&self) -> usize {
        let m = self.order as usize;
        (m + 1) / 2 - 1
    }

    #[inline]
    pub(crate) fn leaf_underflow_threshold(&self) -> usize {
        (self.order as usize + 2) / 2
    }

    /// Fix an underflowing leaf at the vector's current top position by
    /// rotating from (or coalescing with) a sibling under the same
    /// immediate parent.
    pub(crate) unsafe fn fix_leaf_underflow(&mut self, nv: &mut NodeVector) {
        let leaf = nv.top().node;
        let llen = crate::node::len_of(leaf);
        if llen >= self.leaf_underflow_threshold() {
            return;
        }
        if nv.path.len() < 2 {
            return;
        }

        let parent_level = nv.path.len() - 2;
        let parent = nv.path[parent_level].node;
        let my_idx = nv.path[parent_level].idx;
        let pparts = carve_branch::<K>(parent, &self.branch_layout);
        let plen = (*pparts.hdr).len as usize;
        let pchildren = pparts.children_ptr as *const *mut u8;
        let max_keys = self.order as usize - 1;

        if my_idx + 1 <= plen {
            let right = NonNull::new_unchecked(*pchildren.add(my_idx + 1));
            let rlen = crate::node::len_of(right);
            if llen + rlen > max_keys {
                let shifts = (llen + rlen + 1 + 1) / 2 - llen;
                self.leaf_rotate_right_to_left(leaf, right, shifts);
                self.traverse_right(nv);
                let new_first = (*(crate::node::leaf_keys_ptr::<K, V>(right, &self.leaf_layout)
                    as *const K))
                    .clone();
                self.set_pivot(nv, new_first);
                self.tilt_left(nv, shifts);
            } else {
                self.leaf_coalesce_left(leaf, right);
                self.traverse_right(nv);
                self.tilt_left(nv, rlen);
                self.demote(nv);
            }
        } else if my_idx > 0 {
            let left = NonNull::new_unchecked(*pchildren.add(my_idx - 1));
            let llen2 = crate::node::len_of(left);
            if llen + llen2 > max_keys {
                let shifts = (llen + llen2 + 1 + 1) / 2 - llen;
                self.leaf_rotate_left_to_right(left, leaf, shifts);
                let new_first =
                    (*(crate::node::leaf_keys_ptr::<K, V>(leaf, &self.leaf_layout) as *const K))
                        .clone();
                self.set_pivot(nv, new_first);
                self.tilt_left(nv, shifts);
            } else {
                self.leaf_coalesce_left(left, leaf);
                self.demote(nv);
            }
        }
    }

    unsafe fn leaf_coalesce_left(&mut self, left: NodePtr, right: NodePtr) {
        let lparts = carve_leaf::<K, V>(left, &self.leaf_layout);
        let llen = (*lparts.hdr).len as usize;
        let rparts = carve_leaf::<K, V>(right, &self.leaf_layout);
        let rlen = (*rparts.hdr).len as usize;
        let lk = lparts.keys_ptr as *mut K;
        let lv = lparts.vals_ptr as *mut V;
        let rk = rparts.keys_ptr as *const K;
        let rv = rparts.vals_ptr as *const V;
        for i in 0..rlen {
            ptr::write(lk.add(llen + i), ptr::read(rk.add(i)));
            ptr::write(lv.add(llen + i), ptr::read(rv.add(i)));
        }
        (*lparts.hdr).len = (llen + rlen) as u16;

        let rnext = *rparts.next_ptr;
        *lparts.next_ptr = rnext;
        if !rnext.is_null() {
            let nparts = carve_leaf::<K, V>(NonNull::new_unchecked(rnext), &self.leaf_layout);
            *nparts.prev_ptr = left.as_ptr();
        } else {
            self.rightmost = Some(left);
        }
        dealloc_raw(right, self.leaf_layout.bytes, self.leaf_layout.max_align);
    }

    unsafe fn leaf_rotate_right_to_left(&mut self, left: NodePtr, right: NodePtr, shifts: usize) {
        let lparts = carve_leaf::<K, V>(left, &self.leaf_layout);
        let llen = (*lparts.hdr).len as usize;
        let rparts = carve_leaf::<K, V>(right, &self.leaf_layout);
        let rlen = (*rparts.hdr).len as usize;
        let lk = lparts.keys_ptr as *mut K;
        let lv = lparts.vals_ptr as *mut V;
        let rk = rparts.keys_ptr as *mut K;
        let rv = rparts.vals_ptr as *mut V;
        for i in 0..shifts {
            ptr::write(lk.add(llen + i), ptr::read(rk.add(i)));
            ptr::write(lv.add(llen + i), ptr::read(rv.add(i)));
        }
        ptr::copy(rk.add(shifts), rk, rlen - shifts);
        ptr::copy(rv.add(shifts), rv, rlen - shifts);
        (*lparts.hdr).len = (llen + shifts) as u16;
        (*rparts.hdr).len = (rlen - shifts) as u16;
    }

    unsafe fn leaf_rotate_left_to_right(&mut self, left: NodePtr, right: NodePtr, shifts: usize) {
        let lparts = carve_leaf::<K, V>(left, &self.leaf_layout);
        let llen = (*lparts.hdr).len as usize;
        let rparts = carve_leaf::<K, V>(right, &self.leaf_layout);
        let rlen = (*rparts.hdr).len as usize;
        let lk = lparts.keys_ptr as *mut K;
        let lv = lparts.vals_ptr as *mut V;
        let rk = rparts.keys_ptr as *mut K;
        let rv = rparts.vals_ptr as *mut V;
        ptr::copy(rk, rk.add(shifts), rlen);
        ptr::copy(rv, rv.add(shifts), rlen);
        for i in 0..shifts {
            ptr::write(rk.add(i), ptr::read(lk.add(llen - shifts + i)));
            ptr::write(rv.add(i), ptr::read(lv.add(llen - shifts + i)));
        }
        (*lparts.hdr).len = (llen - shifts) as u16;
        (*rparts.hdr).len = (rlen + shifts) as u16;
    }
}
