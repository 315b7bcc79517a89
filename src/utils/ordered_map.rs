// src/utils/ordered_map.rs
use std::borrow::Borrow;
use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use thiserror::Error;

/// Failures of the unconditional-access APIs (`lookup`, `at`).
/// The `get`/`get_mut` family never produces these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderedMapError {
    #[error("key is not in this ordered map")]
    KeyNotFound,

    #[error("position {index} out of range in ordered map of size {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A key-unique map that iterates in first-insertion order.
///
/// Values live in a hash map for O(1) average lookup; a side vector records the
/// order keys were first inserted. Replacing the value of an existing key keeps
/// its position. Removal scans the order record, so it costs O(n).
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    map: HashMap<K, V>,
    order: Vec<K>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// A new key is appended to the iteration order. An existing key keeps its
    /// position and the value it held is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.map.entry(key) {
            Entry::Occupied(mut slot) => Some(slot.insert(value)),
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(value);
                None
            }
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Removes `key` and hands back the value it held, or `None` if it was absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.map.remove(key)?;
        if let Some(position) = self.order.iter().position(|k| <K as Borrow<Q>>::borrow(k) == key) {
            self.order.remove(position);
        }
        Some(value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_mut(key)
    }

    /// Like [`get`](Self::get), for callers that have already established the key exists.
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).ok_or(OrderedMapError::KeyNotFound)
    }

    pub fn lookup_mut<Q>(&mut self, key: &Q) -> Result<&mut V, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_mut(key).ok_or(OrderedMapError::KeyNotFound)
    }

    /// Entry at `position` in iteration order.
    pub fn at(&self, position: usize) -> Result<(&K, &V), OrderedMapError> {
        let key = self.order.get(position).ok_or(OrderedMapError::IndexOutOfRange {
            index: position,
            len: self.order.len(),
        })?;
        self.map
            .get_key_value(key)
            .ok_or(OrderedMapError::KeyNotFound)
    }

    pub fn at_mut(&mut self, position: usize) -> Result<(&K, &mut V), OrderedMapError> {
        let len = self.order.len();
        let key = self
            .order
            .get(position)
            .ok_or(OrderedMapError::IndexOutOfRange { index: position, len })?;
        let value = self.map.get_mut(key).ok_or(OrderedMapError::KeyNotFound)?;
        Ok((key, value))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn keys(&self) -> std::slice::Iter<'_, K> {
        self.order.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: &self.map,
            order: self.order.iter(),
        }
    }

    /// Iterates in insertion order with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let mut slots: HashMap<&K, &mut V> = self.map.iter_mut().collect();
        let entries: Vec<(&K, &mut V)> = self
            .order
            .iter()
            .filter_map(|key| slots.remove_entry(key))
            .collect();
        IterMut {
            entries: entries.into_iter(),
        }
    }
}

/// Borrowing iterator over `(key, value)` pairs in insertion order.
pub struct Iter<'a, K, V> {
    map: &'a HashMap<K, V>,
    order: std::slice::Iter<'a, K>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            order: self.order.clone(),
        }
    }
}

impl<'a, K: Hash + Eq, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.order.next()?;
        self.map.get_key_value(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K: Hash + Eq, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K: Hash + Eq, V> FusedIterator for Iter<'_, K, V> {}

pub struct IterMut<'a, K, V> {
    entries: std::vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

pub struct IntoIter<K, V> {
    map: HashMap<K, V>,
    order: std::vec::IntoIter<K>,
}

impl<K: Hash + Eq, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.order.next()?;
        let value = self.map.remove(&key)?;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V>
where
    K: Hash + Eq,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            map: self.map,
            order: self.order.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

// Two maps are equal only if they hold the same entries in the same order.
impl<K, V> PartialEq for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K, V> Eq for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Eq,
{
}

impl<K, V> fmt::Debug for OrderedMap<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> OrderedMap<String, i32> {
        let mut m = OrderedMap::new();
        m.insert("a".to_string(), 1);
        m.insert("b".to_string(), 2);
        m.insert("c".to_string(), 3);
        m
    }

    #[test]
    fn test_set_read() {
        let mut m = OrderedMap::new();
        m.insert("key".to_string(), "val".to_string());
        assert_eq!(m.len(), 1);
        assert!(!m.is_empty());
        assert_eq!(m.lookup("key").unwrap(), "val");
        let (k, v) = m.at(0).unwrap();
        assert_eq!(k, "key");
        assert_eq!(v, "val");
    }

    #[test]
    fn test_clear() {
        let mut m = abc();
        m.clear();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
        assert_eq!(m.iter().count(), 0);
    }

    #[test]
    fn test_insert_existing_keeps_position() {
        let mut m = abc();
        assert_eq!(m.insert("a".to_string(), 10), Some(1));
        assert_eq!(m.len(), 3);
        assert_eq!(m.at(0).unwrap(), (&"a".to_string(), &10));
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_erase_middle() {
        let mut m = abc();
        assert_eq!(m.remove("b"), Some(2));

        let entries: Vec<(&str, i32)> = m.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(entries, vec![("a", 1), ("c", 3)]);
        assert_eq!(m.at(0).unwrap(), (&"a".to_string(), &1));
        assert_eq!(m.at(1).unwrap(), (&"c".to_string(), &3));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_erase_missing() {
        let mut m = abc();
        assert_eq!(m.remove("z"), None);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_erase_then_reinsert_goes_last() {
        let mut m = abc();
        m.remove("a");
        m.insert("a".to_string(), 7);
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_lookup_missing_key() {
        let m = abc();
        assert_eq!(m.lookup("nope"), Err(OrderedMapError::KeyNotFound));
        assert_eq!(m.get("nope"), None);
        assert!(m.contains_key("a"));
        assert!(!m.contains_key("nope"));
    }

    #[test]
    fn test_at_out_of_range() {
        let m = abc();
        assert_eq!(
            m.at(3),
            Err(OrderedMapError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_lookup_mut_and_at_mut() {
        let mut m = abc();
        *m.lookup_mut("b").unwrap() = 20;
        *m.at_mut(2).unwrap().1 = 30;
        assert_eq!(m.get("b"), Some(&20));
        assert_eq!(m.get("c"), Some(&30));
        assert!(m.lookup_mut("zz").is_err());
    }

    #[test]
    fn test_iterator_is_restartable() {
        let m = abc();
        let first: Vec<i32> = m.iter().map(|(_, v)| *v).collect();
        let second: Vec<i32> = m.values().copied().collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);
        assert_eq!(m.iter().len(), 3);
    }

    #[test]
    fn test_iterator_edit() {
        let mut m = abc();
        for (_, v) in m.iter_mut() {
            *v *= 100;
        }
        let entries: Vec<(&str, i32)> = m.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(entries, vec![("a", 100), ("b", 200), ("c", 300)]);
    }

    #[test]
    fn test_boxed_values_are_moved_not_copied() {
        let mut m: OrderedMap<String, Box<i32>> = OrderedMap::new();
        let first = Box::new(1);
        let second = Box::new(2);
        let first_ptr: *const i32 = &*first;
        let second_ptr: *const i32 = &*second;

        m.insert("key".to_string(), first);
        assert!(std::ptr::eq(&**m.get("key").unwrap(), first_ptr));

        let old = m.insert("key".to_string(), second).unwrap();
        assert!(std::ptr::eq(&*old, first_ptr));
        assert!(std::ptr::eq(&**m.at(0).unwrap().1, second_ptr));
    }

    #[test]
    fn test_into_iter_and_collect() {
        let m: OrderedMap<&str, i32> = vec![("z", 1), ("y", 2), ("x", 3)].into_iter().collect();
        let owned: Vec<(&str, i32)> = m.into_iter().collect();
        assert_eq!(owned, vec![("z", 1), ("y", 2), ("x", 3)]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let forward: OrderedMap<&str, i32> = vec![("a", 1), ("b", 2)].into_iter().collect();
        let backward: OrderedMap<&str, i32> = vec![("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(forward, backward);
        assert_eq!(forward, forward.clone());
    }

    #[test]
    fn test_order_record_matches_map_after_mixed_operations() {
        let mut m: OrderedMap<u32, u32> = OrderedMap::new();
        for i in 0..50 {
            m.insert(i % 17, i);
            if i % 5 == 0 {
                m.remove(&(i % 7));
            }
        }
        assert_eq!(m.keys().len(), m.len());
        assert_eq!(m.iter().count(), m.len());
        let mut seen = std::collections::HashSet::new();
        assert!(m.keys().all(|k| seen.insert(*k)));
    }
}
