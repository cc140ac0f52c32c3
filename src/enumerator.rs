//! Single-pass forward/reverse enumerators over a snapshot of tree order.
//!
//! Mirrors a classic invalidating-enumerator contract: an enumerator starts
//! `Rewound`, `advance()` steps it to `Active`, and any structural mutation
//! to the owning tree (insert, remove, clear) bumps the tree's stage
//! counter, which the enumerator checks on every call and reports as
//! `BTreeError::InvalidState` rather than silently reading stale memory.

use crate::engine::{BTreeCore, BTreeError};
use crate::layout::{NodeHdr, NodeTag};
use crate::node::NodePtr;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum EnumeratorState {
    Rewound,
    Active,
    Consumed,
}

enum Direction {
    Forward,
    Reverse,
}

/// A single-pass cursor over a tree's elements in ascending or descending
/// key order, valid only as long as the tree isn't mutated underneath it.
pub struct Enumerator<'a, K: Clone, V> {
    tree: &'a BTreeCore<K, V>,
    stage: u64,
    state: EnumeratorState,
    dir: Direction,
    leaf: Option<NodePtr>,
    idx: usize,
}

impl<'a, K: Clone, V> Enumerator<'a, K, V> {
    pub(crate) fn forward(tree: &'a BTreeCore<K, V>) -> Self {
        Enumerator {
            tree,
            stage: tree.stage(),
            state: EnumeratorState::Rewound,
            dir: Direction::Forward,
            leaf: tree.leftmost_leaf(),
            idx: 0,
        }
    }

    pub(crate) fn reverse(tree: &'a BTreeCore<K, V>) -> Self {
        Enumerator {
            tree,
            stage: tree.stage(),
            state: EnumeratorState::Rewound,
            dir: Direction::Reverse,
            leaf: tree.rightmost_leaf(),
            idx: 0,
        }
    }

    fn check_stage(&self) -> Result<(), BTreeError> {
        if self.stage != self.tree.stage() {
            Err(BTreeError::InvalidState(
                "tree was mutated during enumeration".into(),
            ))
        } else {
            Ok(())
        }
    }

    /// Reset to the tree's current state, snapshotting the current stage.
    pub fn reset(&mut self) {
        self.stage = self.tree.stage();
        self.state = EnumeratorState::Rewound;
        match self.dir {
            Direction::Forward => {
                self.leaf = self.tree.leftmost_leaf();
                self.idx = 0;
            }
            Direction::Reverse => {
                self.leaf = self.tree.rightmost_leaf();
                self.idx = 0;
            }
        }
    }

    /// Advance to the next element. Returns `Ok(true)` while elements
    /// remain, `Ok(false)` once exhausted, or `Err` if the tree changed
    /// shape since this enumerator started or was last reset.
    pub fn advance(&mut self) -> Result<bool, BTreeError> {
        self.check_stage()?;
        if self.state == EnumeratorState::Consumed {
            return Ok(false);
        }

        let layout = &self.tree.leaf_layout;
        unsafe {
            loop {
                let Some(leaf) = self.leaf else {
                    self.state = EnumeratorState::Consumed;
                    return Ok(false);
                };
                let hdr = &*(leaf.as_ptr() as *const NodeHdr);
                debug_assert!(matches!(hdr.tag, NodeTag::Leaf));
                let len = hdr.len as usize;

                match self.dir {
                    Direction::Forward => {
                        if self.state == EnumeratorState::Rewound {
                            self.state = EnumeratorState::Active;
                            self.idx = 0;
                        } else {
                            self.idx += 1;
                        }
                        if self.idx < len {
                            return Ok(true);
                        }
                        self.leaf = crate::node::leaf_next(leaf, layout);
                        self.idx = 0;
                        if self.leaf.is_none() {
                            self.state = EnumeratorState::Consumed;
                            return Ok(false);
                        }
                        // current leaf exhausted; loop to check new leaf's len
                        self.state = EnumeratorState::Rewound;
                        continue;
                    }
                    Direction::Reverse => {
                        if self.state == EnumeratorState::Rewound {
                            if len == 0 {
                                self.leaf = crate::node::leaf_prev(leaf, layout);
                                continue;
                            }
                            self.state = EnumeratorState::Active;
                            self.idx = len - 1;
                            return Ok(true);
                        }
                        if self.idx == 0 {
                            self.leaf = crate::node::leaf_prev(leaf, layout);
                            self.state = EnumeratorState::Rewound;
                            if self.leaf.is_none() {
                                self.state = EnumeratorState::Consumed;
                                return Ok(false);
                            }
                            continue;
                        }
                        self.idx -= 1;
                        return Ok(true);
                    }
                }
            }
        }
    }

    /// The element at the enumerator's current position, or `None` before
    /// the first `advance()` or after exhaustion.
    pub fn current(&self) -> Option<(&'a K, &'a V)> {
        if self.state != EnumeratorState::Active {
            return None;
        }
        let leaf = self.leaf?;
        unsafe {
            let parts = crate::layout::carve_leaf::<K, V>(leaf, &self.tree.leaf_layout);
            let len = (*parts.hdr).len as usize;
            if self.idx >= len {
                return None;
            }
            let k = &*(parts.keys_ptr as *const K).add(self.idx);
            let v = &*(parts.vals_ptr as *const V).add(self.idx);
            Some((k, v))
        }
    }
}
