//! `HopscotchSet`: the value-less façade over `HopscotchTable`.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

use crate::config::{TableConfig, DEFAULT_NEIGHBORHOOD_SIZE};
use crate::engine::{DefaultHashBuilder, HopscotchTable, RawIntoIter, RawIter};
use crate::error::Result;
use crate::policy::{BucketPolicy, PowerOfTwoPolicy};
use crate::select::SetKeySelect;

/// A hash set backed by the same hopscotch engine as `HopscotchMap`, with `K`
/// stored directly as the entry (no value slot).
pub struct HopscotchSet<
    K,
    P = PowerOfTwoPolicy,
    H = DefaultHashBuilder,
    const N: usize = DEFAULT_NEIGHBORHOOD_SIZE,
> {
    table: HopscotchTable<K, SetKeySelect, P, H, N>,
}

impl<K> HopscotchSet<K>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_config_and_hasher(
            capacity,
            TableConfig::new(DEFAULT_NEIGHBORHOOD_SIZE),
            DefaultHashBuilder::default(),
        )
    }
}

impl<K> Default for HopscotchSet<K>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P, H, const N: usize> HopscotchSet<K, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    pub fn with_hasher(hash_builder: H) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: H) -> Self {
        Self::with_capacity_config_and_hasher(capacity, TableConfig::new(N), hash_builder)
    }

    pub fn with_capacity_config_and_hasher(
        capacity: usize,
        config: TableConfig,
        hash_builder: H,
    ) -> Self {
        Self {
            table: HopscotchTable::with_capacity_and_hasher(capacity, config, hash_builder),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Number of entries currently living in the overflow list rather than a
    /// home bucket's neighborhood.
    #[inline]
    pub fn overflow_len(&self) -> usize {
        self.table.overflow_len()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Ensures the set can hold `self.len() + additional` entries without a
    /// rehash. Growing past what `P` or the allocator can provide is
    /// reported rather than causing a panic.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.table.reserve(additional)
    }

    /// Forces the bucket count to at least `bucket_count`, rounded up by the
    /// growth policy in use.
    pub fn rehash(&mut self, bucket_count: usize) -> Result<()> {
        self.table.rehash(bucket_count)
    }

    /// `0` or `1` occurrences of `key` — a set never has more.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.contains(key) as usize
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key)
    }

    /// Inserts `key`, returning `true` if it wasn't already present — the
    /// `std::collections::HashSet::insert` contract.
    pub fn insert(&mut self, key: K) -> bool {
        self.table.insert_if_absent(key).is_ok()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove(key).is_some()
    }

    pub fn iter(&self) -> Iter<'_, K, N> {
        Iter {
            inner: self.table.iter(),
        }
    }
}

impl<K, P, H, const N: usize> IntoIterator for HopscotchSet<K, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    type Item = K;
    type IntoIter = IntoIter<K, N>;

    fn into_iter(self) -> IntoIter<K, N> {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, P, H, const N: usize> IntoIterator for &'a HopscotchSet<K, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    type Item = &'a K;
    type IntoIter = Iter<'a, K, N>;

    fn into_iter(self) -> Iter<'a, K, N> {
        self.iter()
    }
}

pub struct Iter<'a, K, const N: usize> {
    inner: RawIter<'a, K, N>,
}

impl<'a, K, const N: usize> Iterator for Iter<'a, K, N> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

pub struct IntoIter<K, const N: usize> {
    inner: RawIntoIter<K, N>,
}

impl<K, const N: usize> Iterator for IntoIter<K, N> {
    type Item = K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<K, P, H, const N: usize> Extend<K> for HopscotchSet<K, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let _ = self.reserve(lower);
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K> FromIterator<K> for HopscotchSet<K>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = HopscotchSet::new();
        set.extend(iter);
        set
    }
}

impl<K, P, H, const N: usize> fmt::Debug for HopscotchSet<K, P, H, N>
where
    K: Hash + Eq + fmt::Debug,
    P: BucketPolicy,
    H: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, P, H, const N: usize> PartialEq for HopscotchSet<K, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K, P, H, const N: usize> Eq for HopscotchSet<K, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_remove() {
        let mut s: HopscotchSet<i32> = HopscotchSet::new();
        assert!(s.insert(1));
        assert!(!s.insert(1));
        assert!(s.contains(&1));
        assert!(s.remove(&1));
        assert!(!s.contains(&1));
    }

    #[test]
    fn from_iterator_dedups() {
        let s: HopscotchSet<i32> = vec![1, 2, 2, 3, 3, 3].into_iter().collect();
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn into_iter_consumes_all_keys() {
        let s: HopscotchSet<i32> = (0..30).collect();
        let mut keys: Vec<i32> = s.into_iter().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn move_only_values_survive_growth() {
        let mut s: HopscotchSet<String> = HopscotchSet::new();
        for i in 0..5000 {
            s.insert(format!("key-{i}"));
        }
        assert_eq!(s.len(), 5000);
        for i in 0..5000 {
            assert!(s.contains(format!("key-{i}").as_str()));
        }
    }
}
