//! `BTreeBag<K>`: a multiset. Duplicate keys are kept in stable insertion
//! order among themselves; distinct keys are ordered by the injected
//! comparer.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::engine::{BTreeConfig, BTreeCore, BTreeError};
use crate::enumerator::Enumerator;
use crate::setalg;

pub struct BTreeBag<K: Ord + Clone + 'static> {
    core: BTreeCore<K, ()>,
}

impl<K: Ord + Clone + 'static> BTreeBag<K> {
    pub fn new() -> Self {
        BTreeBag {
            core: BTreeCore::new(false, BTreeConfig::default()),
        }
    }

    pub fn with_config(config: BTreeConfig<K>) -> Self {
        BTreeBag {
            core: BTreeCore::new(false, config),
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

    pub fn insert(&mut self, key: K) {
        self.core.insert_multi(key, ());
    }

    pub fn insert_n(&mut self, key: K, count: usize) {
        self.core.insert_n(key, (), count);
    }

    /// Remove one occurrence of `key`. Returns `true` if one was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        self.core.remove_key(key).is_some()
    }

    pub fn remove_n(&mut self, key: &K, count: usize) -> usize {
        self.core.remove_n(key, count)
    }

    pub fn remove_all(&mut self, key: &K) -> usize {
        self.core.remove_all(key)
    }

    /// Remove every occurrence for which `pred` returns `true`. Returns the
    /// count removed.
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

    pub fn get_count(&self, key: &K) -> usize {
        self.core.get_count(key)
    }

    pub fn distinct_count(&self) -> usize {
        self.core.distinct_count()
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.core.index_of(key)
    }

    /// `index_of`, bitwise-complement encoded: the rank of the leftmost
    /// occurrence if `key` is present, `!insertion_rank` otherwise.
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

    pub fn to_vec(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.len());
        let mut it = self.iter();
        while it.advance().unwrap_or(false) {
            out.push(it.current().unwrap().0.clone());
        }
        out
    }

    /// Every occurrence in `[from, to]` by comparer order, ascending.
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

    /// Distinct keys, ascending, each appearing once regardless of
    /// multiplicity.
    pub fn distinct(&self) -> Vec<K> {
        self.core.distinct_keys()
    }

    fn runs(&self) -> Vec<(K, usize)> {
        self.distinct()
            .into_iter()
            .map(|k| {
                let n = self.get_count(&k);
                (k, n)
            })
            .collect()
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

    pub fn union(&self, other: &BTreeBag<K>) -> BTreeBag<K> {
        let merged = setalg::bag_union(&self.runs(), &other.runs(), &self.cmp_of());
        let mut out = BTreeBag::new();
        for (k, n) in merged {
            out.insert_n(k, n);
        }
        out
    }

    pub fn intersect(&self, other: &BTreeBag<K>) -> BTreeBag<K> {
        let merged = setalg::bag_intersect(&self.runs(), &other.runs(), &self.cmp_of());
        let mut out = BTreeBag::new();
        for (k, n) in merged {
            out.insert_n(k, n);
        }
        out
    }

    pub fn except(&self, other: &BTreeBag<K>) -> BTreeBag<K> {
        let merged = setalg::bag_except(&self.runs(), &other.runs(), &self.cmp_of());
        let mut out = BTreeBag::new();
        for (k, n) in merged {
            out.insert_n(k, n);
        }
        out
    }

    pub fn is_subset_of(&self, other: &BTreeBag<K>) -> bool {
        setalg::bag_is_subset(&self.runs(), |k| other.get_count(k))
    }
}

impl<K: Ord + Clone + 'static> Default for BTreeBag<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + 'static> FromIterator<K> for BTreeBag<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut bag = BTreeBag::new();
        for k in iter {
            bag.insert(k);
        }
        bag
    }
}
