//! Diagnostics: a pretty-printed tree dump, useful in tests and when
//! debugging invariant failures. Requires the `std` feature since it builds
//! a `String`.

#![cfg(feature = "std")]

use std::fmt::Write as _;
use std::string::String;

use crate::engine::BTreeCore;
use crate::layout::{carve_branch, carve_leaf, NodeHdr, NodeTag};
use crate::node::NodePtr;

impl<K: Clone + std::fmt::Debug, V> BTreeCore<K, V> {
    /// Render the tree's shape: one line per node, indented by depth,
    /// showing each branch's keys and cached weight, and each leaf's keys.
    pub(crate) fn fmt_tree(&self) -> String {
        let mut out = String::new();
        match self.root {
            Some(root) => unsafe { self.fmt_node(root, 0, &mut out) },
            None => out.push_str("(empty)\n"),
        }
        out
    }

    unsafe fn fmt_node(&self, node: NodePtr, depth: usize, out: &mut String) {
        let hdr = &*(node.as_ptr() as *const NodeHdr);
        let indent = "  ".repeat(depth);
        match hdr.tag {
            NodeTag::Leaf => {
                let parts = carve_leaf::<K, V>(node, &self.leaf_layout);
                let len = (*parts.hdr).len as usize;
                let keys = core::slice::from_raw_parts(parts.keys_ptr as *const K, len);
                let _ = writeln!(out, "{indent}leaf {keys:?}");
            }
            NodeTag::Branch => {
                let parts = carve_branch::<K>(node, &self.branch_layout);
                let len = (*parts.hdr).len as usize;
                let keys = core::slice::from_raw_parts(parts.keys_ptr as *const K, len);
                let _ = writeln!(out, "{indent}branch {keys:?} weight={}", hdr.weight);
                let children = parts.children_ptr as *const *mut u8;
                for i in 0..=len {
                    let child = core::ptr::NonNull::new_unchecked(*children.add(i));
                    self.fmt_node(child, depth + 1, out);
                }
            }
        }
    }
}
