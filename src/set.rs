//! `BTreeSet<K>`: unique keys, no payload, ordered by an injected comparer.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::engine::{BTreeConfig, BTreeCore, BTreeError};
use crate::enumerator::Enumerator;
use crate::setalg;

pub struct BTreeSet<K: Ord + Clone + 'static> {
    core: BTreeCore<K, ()>,
}

impl<K: Ord + Clone + 'static> BTreeSet<K> {
    pub fn new() -> Self {
        BTreeSet {
            core: BTreeCore::new(true, BTreeConfig::default()),
        }
    }

    pub fn with_config(config: BTreeConfig<K>) -> Self {
        BTreeSet {
            core: BTreeCore::new(true, config),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    /// Insert `key`. Returns `true` if it was newly added, `false` if it
    /// already existed (and is left unchanged).
    pub fn insert(&mut self, key: K) -> bool {
        self.core.insert_unique(key, ()).is_none()
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.core.remove_key(key).is_some()
    }

    /// Remove every key for which `pred` returns `true`. Returns the count
    /// removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        self.core.remove_where(|k, _| pred(k))
    }

    pub fn remove_at(&mut self, index: usize) -> Result<K, BTreeError> {
        self.core
            .remove_at(index)
            .map(|(k, _)| k)
            .ok_or_else(|| BTreeError::OutOfRange("index out of range".into()))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.core.index_of(key)
    }

    /// `index_of`, bitwise-complement encoded: the rank if `key` is present,
    /// `!insertion_rank` otherwise (so `!result` recovers where it would
    /// land).
    pub fn index_of_signed(&self, key: &K) -> isize {
        self.core.index_of_signed(key)
    }

    pub fn element_at(&self, index: usize) -> Result<&K, BTreeError> {
        self.core
            .element_at(index)
            .map(|(k, _)| k)
            .ok_or_else(|| BTreeError::OutOfRange("index out of range".into()))
    }

    pub fn element_at_or_default<'a>(&'a self, index: usize, default: &'a K) -> &'a K {
        self.core.element_at(index).map(|(k, _)| k).unwrap_or(default)
    }

    pub fn first(&self) -> Result<&K, BTreeError> {
        self.core
            .first()
            .map(|(k, _)| k)
            .ok_or_else(|| BTreeError::InvalidState("tree is empty".into()))
    }

    pub fn last(&self) -> Result<&K, BTreeError> {
        self.core
            .last()
            .map(|(k, _)| k)
            .ok_or_else(|| BTreeError::InvalidState("tree is empty".into()))
    }

    pub fn min(&self) -> Result<&K, BTreeError> {
        self.first()
    }

    pub fn max(&self) -> Result<&K, BTreeError> {
        self.last()
    }

    pub fn iter(&self) -> Enumerator<'_, K, ()> {
        Enumerator::forward(&self.core)
    }

    pub fn iter_rev(&self) -> Enumerator<'_, K, ()> {
        Enumerator::reverse(&self.core)
    }

    /// Every key in `[from, to]` by comparer order, ascending.
    pub fn elements_between(&self, from: &K, to: &K) -> Vec<K> {
        let lower = self.core.index_of(from).unwrap_or_else(|| self.core.index_of_upper(from));
        let upper = self.core.index_of_upper(to);
        let mut out = Vec::new();
        for i in lower..upper.min(self.len()) {
            if let Some((k, _)) = self.core.element_at(i) {
                out.push(k.clone());
            }
        }
        out
    }

    pub fn elements_from(&self, from: &K) -> Vec<K> {
        let lower = self.core.index_of(from).unwrap_or_else(|| self.core.index_of_upper(from));
        let mut out = Vec::new();
        for i in lower..self.len() {
            if let Some((k, _)) = self.core.element_at(i) {
                out.push(k.clone());
            }
        }
        out
    }

    /// Copy keys into `buf`, starting at `buf[offset]`. `count` defaults to
    /// every remaining key when `None`; otherwise copies at most `count`.
    pub fn copy_to(
        &self,
        buf: &mut [K],
        offset: usize,
        count: Option<usize>,
    ) -> Result<(), BTreeError> {
        let n = count.unwrap_or(self.len()).min(self.len());
        if offset.checked_add(n).map_or(true, |end| end > buf.len()) {
            return Err(BTreeError::OutOfRange("destination too small".into()));
        }
        for i in 0..n {
            buf[offset + i] = self.core.element_at(i).unwrap().0.clone();
        }
        Ok(())
    }

    pub fn to_vec(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.len());
        let mut it = self.iter();
        while it.advance().unwrap_or(false) {
            out.push(it.current().unwrap().0.clone());
        }
        out
    }

    pub fn check_invariants(&self) -> Result<(), BTreeError> {
        self.core.check_invariants()
    }

    #[cfg(feature = "std")]
    pub fn fmt_tree(&self) -> alloc::string::String
    where
        K: core::fmt::Debug,
    {
        self.core.fmt_tree()
    }

    fn cmp_of(&self) -> impl Fn(&K, &K) -> Ordering + '_ {
        move |a, b| self.core.cmp_keys(a, b)
    }

    pub fn union(&self, other: &BTreeSet<K>) -> BTreeSet<K> {
        let merged = setalg::set_union(&self.to_vec(), &other.to_vec(), &self.cmp_of());
        let mut out = BTreeSet::new();
        for k in merged {
            out.insert(k);
        }
        out
    }

    pub fn intersect(&self, other: &BTreeSet<K>) -> BTreeSet<K> {
        let merged = setalg::set_intersect(&self.to_vec(), &other.to_vec(), &self.cmp_of());
        let mut out = BTreeSet::new();
        for k in merged {
            out.insert(k);
        }
        out
    }

    pub fn except(&self, other: &BTreeSet<K>) -> BTreeSet<K> {
        let merged = setalg::set_except(&self.to_vec(), &other.to_vec(), &self.cmp_of());
        let mut out = BTreeSet::new();
        for k in merged {
            out.insert(k);
        }
        out
    }

    pub fn is_subset_of(&self, other: &BTreeSet<K>) -> bool {
        setalg::set_is_subset(&self.to_vec(), |k| other.contains(k))
    }
}

impl<K: Ord + Clone + 'static> Default for BTreeSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + 'static> FromIterator<K> for BTreeSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = BTreeSet::new();
        for k in iter {
            set.insert(k);
        }
        set
    }
}
