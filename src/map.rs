//! `HopscotchMap`: the key/value façade over `HopscotchTable`.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

use crate::config::{TableConfig, DEFAULT_NEIGHBORHOOD_SIZE};
use crate::engine::{DefaultHashBuilder, HopscotchTable, RawIntoIter, RawIter, RawIterMut};
use crate::error::{HopscotchError, Result};
use crate::policy::{BucketPolicy, PowerOfTwoPolicy};
use crate::select::MapKeySelect;

/// An associative container backed by hopscotch hashing.
///
/// Lookup, insertion, and removal are all expected O(1): every key lives
/// either in its home bucket's fixed-size neighborhood or, rarely, in a side
/// overflow list. See `crate::engine` for the placement algorithm.
pub struct HopscotchMap<
    K,
    V,
    P = PowerOfTwoPolicy,
    H = DefaultHashBuilder,
    const N: usize = DEFAULT_NEIGHBORHOOD_SIZE,
> {
    table: HopscotchTable<(K, V), MapKeySelect, P, H, N>,
}

impl<K, V> HopscotchMap<K, V>
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

impl<K, V> Default for HopscotchMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P, H, const N: usize> HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    pub fn with_hasher(hash_builder: H) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: H) -> Self {
        Self::with_capacity_config_and_hasher(
            capacity,
            TableConfig::new(N),
            hash_builder,
        )
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

    #[inline]
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Number of entries currently living in the overflow list rather than a
    /// home bucket's neighborhood. Useful for diagnosing congestion; not
    /// part of any correctness contract.
    #[inline]
    pub fn overflow_len(&self) -> usize {
        self.table.overflow_len()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Ensures the map can hold `self.len() + additional` entries without a
    /// rehash, same contract as `std::collections::HashMap::reserve` except
    /// that growing past what `P` or the allocator can provide is reported
    /// rather than causing a panic.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.table.reserve(additional)
    }

    /// Forces the bucket count to at least `bucket_count`, rounded up by the
    /// growth policy in use.
    pub fn rehash(&mut self, bucket_count: usize) -> Result<()> {
        self.table.rehash(bucket_count)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key).map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find_mut(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key).map(|(k, v)| (k, v))
    }

    /// Checked lookup returning `HopscotchError::KeyNotFound` on a miss,
    /// matching the original `at()` accessor rather than panicking.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(HopscotchError::KeyNotFound)
    }

    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).ok_or(HopscotchError::KeyNotFound)
    }

    /// Inserts `key`/`value`, replacing and returning any previous value —
    /// the familiar `std::collections::HashMap::insert` contract.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.table.find_mut(&key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.table
            .insert_if_absent((key, value))
            .unwrap_or_else(|_| unreachable!("find_mut just proved the key absent"));
        None
    }

    /// Same contract as [`insert`](Self::insert); kept as an explicit alias
    /// for callers translating from the node-based-map vocabulary where
    /// insertion and assignment are named separately.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    /// Inserts only if `key` is absent. On a duplicate key, the key/value
    /// pair is handed back unconsumed rather than silently dropped.
    pub fn try_insert(&mut self, key: K, value: V) -> std::result::Result<(), (K, V)> {
        self.table.insert_if_absent((key, value))
    }

    /// `0` or `1` occurrences of `key` — a unique-key map never has more.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.contains_key(key) as usize
    }

    /// Returns the value for `key`, inserting `V::default()` first if it's
    /// absent. The explicit-method form of a panicking index operator that
    /// inserts on miss, kept out of the `Index` trait so the insert is
    /// visible at the call site.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
        K: Clone,
    {
        if !self.contains_key(&key) {
            self.table
                .insert_if_absent((key.clone(), V::default()))
                .unwrap_or_else(|_| unreachable!("just proved the key absent"));
        }
        self.get_mut(&key).expect("just inserted")
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove(key)
    }

    pub fn iter(&self) -> Iter<'_, K, V, N> {
        Iter {
            inner: self.table.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, N> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V, N> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, N> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, N> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V, P, H, const N: usize> IntoIterator for HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, N>;

    fn into_iter(self) -> IntoIter<K, V, N> {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, P, H, const N: usize> IntoIterator for &'a HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, N>;

    fn into_iter(self) -> Iter<'a, K, V, N> {
        self.iter()
    }
}

impl<'a, K, V, P, H, const N: usize> IntoIterator for &'a mut HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, N>;

    fn into_iter(self) -> IterMut<'a, K, V, N> {
        self.iter_mut()
    }
}

pub struct IntoIter<K, V, const N: usize> {
    inner: RawIntoIter<(K, V), N>,
}

impl<K, V, const N: usize> Iterator for IntoIter<K, V, N> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

pub struct Iter<'a, K, V, const N: usize> {
    inner: RawIter<'a, (K, V), N>,
}

impl<'a, K, V, const N: usize> Iterator for Iter<'a, K, V, N> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }
}

pub struct IterMut<'a, K, V, const N: usize> {
    inner: RawIterMut<'a, (K, V), N>,
}

impl<'a, K, V, const N: usize> Iterator for IterMut<'a, K, V, N> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }
}

pub struct Keys<'a, K, V, const N: usize> {
    inner: Iter<'a, K, V, N>,
}

impl<'a, K, V, const N: usize> Iterator for Keys<'a, K, V, N> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

pub struct Values<'a, K, V, const N: usize> {
    inner: Iter<'a, K, V, N>,
}

impl<'a, K, V, const N: usize> Iterator for Values<'a, K, V, N> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

pub struct ValuesMut<'a, K, V, const N: usize> {
    inner: IterMut<'a, K, V, N>,
}

impl<'a, K, V, const N: usize> Iterator for ValuesMut<'a, K, V, N> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V, P, H, const N: usize> Extend<(K, V)> for HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        // Best-effort: a size hint that turns out to ask for more capacity
        // than the policy/allocator can give doesn't abort `extend` — the
        // per-entry `insert` below will grow incrementally as needed.
        let _ = self.reserve(lower);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for HopscotchMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HopscotchMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V, P, H, const N: usize> fmt::Debug for HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    P: BucketPolicy,
    H: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, P, H, const N: usize> PartialEq for HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    V: PartialEq,
    P: BucketPolicy,
    H: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, P, H, const N: usize> Eq for HopscotchMap<K, V, P, H, N>
where
    K: Hash + Eq,
    V: Eq,
    P: BucketPolicy,
    H: BuildHasher,
{
}
