//! `BTreeMap<K, V>`: unique keys, one value per key, ordered by an injected
//! comparer over `K`.

extern crate alloc;

use alloc::vec::Vec;

use crate::engine::{BTreeConfig, BTreeCore, BTreeError};
use crate::enumerator::Enumerator;

pub struct BTreeMap<K: Ord + Clone + 'static, V> {
    core: BTreeCore<K, V>,
}

impl<K: Ord + Clone + 'static, V> BTreeMap<K, V> {
    pub fn new() -> Self {
        BTreeMap {
            core: BTreeCore::new(true, BTreeConfig::default()),
        }
    }

    pub fn with_config(config: BTreeConfig<K>) -> Self {
        BTreeMap {
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

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.core.insert_unique(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.core.remove_key(key).map(|(_, v)| v)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<(K, V), BTreeError> {
        self.core
            .remove_at(index)
            .ok_or_else(|| BTreeError::OutOfRange("index out of range".into()))
    }

    /// Remove every pair for which `pred` returns `true`. Returns the count
    /// removed.
    pub fn remove_where(&mut self, pred: impl FnMut(&K, &V) -> bool) -> usize {
        self.core.remove_where(pred)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.core.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.core.get_mut(key)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.core.index_of(key)
    }

    /// `index_of`, bitwise-complement encoded: the rank if `key` is
    /// present, `!insertion_rank` otherwise.
    pub fn index_of_signed(&self, key: &K) -> isize {
        self.core.index_of_signed(key)
    }

    pub fn element_at(&self, index: usize) -> Result<(&K, &V), BTreeError> {
        self.core
            .element_at(index)
            .ok_or_else(|| BTreeError::OutOfRange("index out of range".into()))
    }

    pub fn element_at_or_default<'a>(
        &'a self,
        index: usize,
        default: (&'a K, &'a V),
    ) -> (&'a K, &'a V) {
        self.core.element_at(index).unwrap_or(default)
    }

    pub fn first(&self) -> Result<(&K, &V), BTreeError> {
        self.core
            .first()
            .ok_or_else(|| BTreeError::InvalidState("tree is empty".into()))
    }

    pub fn last(&self) -> Result<(&K, &V), BTreeError> {
        self.core
            .last()
            .ok_or_else(|| BTreeError::InvalidState("tree is empty".into()))
    }

    pub fn min(&self) -> Result<(&K, &V), BTreeError> {
        self.first()
    }

    pub fn max(&self) -> Result<(&K, &V), BTreeError> {
        self.last()
    }

    pub fn iter(&self) -> Enumerator<'_, K, V> {
        Enumerator::forward(&self.core)
    }

    pub fn iter_rev(&self) -> Enumerator<'_, K, V> {
        Enumerator::reverse(&self.core)
    }

    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.len());
        let mut it = self.iter();
        while it.advance().unwrap_or(false) {
            out.push(it.current().unwrap().0.clone());
        }
        out
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        let mut it = self.iter();
        while it.advance().unwrap_or(false) {
            out.push(it.current().unwrap().1.clone());
        }
        out
    }

    /// Every pair whose key is in `[from, to]` by comparer order, ascending.
    pub fn elements_between(&self, from: &K, to: &K) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let lower = self.core.index_of(from).unwrap_or_else(|| self.core.index_of_upper(from));
        let upper = self.core.index_of_upper(to);
        let mut out = Vec::new();
        for i in lower..upper.min(self.len()) {
            if let Some((k, v)) = self.core.element_at(i) {
                out.push((k.clone(), v.clone()));
            }
        }
        out
    }

    pub fn elements_from(&self, from: &K) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let lower = self.core.index_of(from).unwrap_or_else(|| self.core.index_of_upper(from));
        let mut out = Vec::new();
        for i in lower..self.len() {
            if let Some((k, v)) = self.core.element_at(i) {
                out.push((k.clone(), v.clone()));
            }
        }
        out
    }

    /// Copy pairs into `buf`, starting at `buf[offset]`. `count` defaults to
    /// every remaining pair when `None`; otherwise copies at most `count`.
    pub fn copy_to(
        &self,
        buf: &mut [(K, V)],
        offset: usize,
        count: Option<usize>,
    ) -> Result<(), BTreeError>
    where
        V: Clone,
    {
        let n = count.unwrap_or(self.len()).min(self.len());
        if offset.checked_add(n).map_or(true, |end| end > buf.len()) {
            return Err(BTreeError::OutOfRange("destination too small".into()));
        }
        let mut it = self.iter();
        let mut i = offset;
        let mut copied = 0usize;
        while copied < n && it.advance().unwrap_or(false) {
            let (k, v) = it.current().unwrap();
            buf[i] = (k.clone(), v.clone());
            i += 1;
            copied += 1;
        }
        Ok(())
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
}

impl<K: Ord + Clone + 'static, V> Default for BTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + 'static, V> FromIterator<(K, V)> for BTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
