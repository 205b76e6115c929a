//! Structural hashing of logic nodes

use log::debug;

use crate::network::fcode::Fcode;

/// Key of a logic node in the structural hash: canonical function code and sorted fanins
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct StrashKey {
    /// Canonical function code
    pub fcode: Fcode,
    /// Id of the first fanin
    pub fanin0: usize,
    /// Id of the second fanin
    pub fanin1: usize,
}

/// Default number of buckets
const DEFAULT_CAPACITY: usize = 1024;

/// Maximum number of entries per bucket on average before the table grows
const MAX_LOAD: f64 = 1.8;

/// Chained hash table from structural keys to logic nodes
///
/// The number of buckets is always a power of two. It doubles, and all entries are rehashed,
/// when the number of entries exceeds 1.8 times the number of buckets.
#[derive(Debug, Clone)]
pub struct StrashTable {
    buckets: Vec<Vec<(StrashKey, usize)>>,
    len: usize,
}

impl Default for StrashTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl StrashTable {
    /// Create a table with the default number of buckets
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with at least the given number of buckets
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        StrashTable {
            buckets: vec![Vec::new(); capacity],
            len: 0,
        }
    }

    /// Number of buckets
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket(&self, key: &StrashKey) -> usize {
        (fxhash::hash64(key) as usize) & (self.buckets.len() - 1)
    }

    /// Find the node registered under a key
    pub fn find(&self, key: &StrashKey) -> Option<usize> {
        self.buckets[self.bucket(key)]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, n)| *n)
    }

    /// Register a node under a key, growing the table if needed
    pub fn insert(&mut self, key: StrashKey, node: usize) {
        assert!(
            self.find(&key).is_none(),
            "Structural hash already contains {key:?}"
        );
        if (self.len + 1) as f64 > MAX_LOAD * self.capacity() as f64 {
            self.grow();
        }
        let b = self.bucket(&key);
        self.buckets[b].push((key, node));
        self.len += 1;
    }

    /// Unregister a node; returns whether it was present
    pub fn remove(&mut self, key: &StrashKey, node: usize) -> bool {
        let b = self.bucket(key);
        let bucket = &mut self.buckets[b];
        match bucket.iter().position(|(k, n)| k == key && *n == node) {
            Some(i) => {
                bucket.swap_remove(i);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = &(StrashKey, usize)> + '_ {
        self.buckets.iter().flatten()
    }

    /// Remove all entries, keeping the current number of buckets
    pub fn clear(&mut self) {
        for b in self.buckets.iter_mut() {
            b.clear();
        }
        self.len = 0;
    }

    /// Double the number of buckets and rehash all entries
    fn grow(&mut self) {
        let new_capacity = 2 * self.capacity();
        debug!(
            "Growing structural hash from {} to {} buckets ({} entries)",
            self.capacity(),
            new_capacity,
            self.len
        );
        let old = std::mem::replace(&mut self.buckets, vec![Vec::new(); new_capacity]);
        for (key, node) in old.into_iter().flatten() {
            let b = self.bucket(&key);
            self.buckets[b].push((key, node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: usize) -> StrashKey {
        StrashKey {
            fcode: Fcode::AND,
            fanin0: i,
            fanin1: i + 1,
        }
    }

    #[test]
    fn test_power_of_two() {
        assert_eq!(StrashTable::new().capacity(), 1024);
        assert_eq!(StrashTable::with_capacity(0).capacity(), 1);
        assert_eq!(StrashTable::with_capacity(5).capacity(), 8);
        assert_eq!(StrashTable::with_capacity(16).capacity(), 16);
    }

    #[test]
    fn test_find_remove() {
        let mut t = StrashTable::new();
        t.insert(key(0), 10);
        t.insert(key(1), 11);
        let xor = StrashKey {
            fcode: Fcode::XOR,
            ..key(0)
        };
        assert_eq!(t.find(&key(0)), Some(10));
        assert_eq!(t.find(&key(1)), Some(11));
        assert_eq!(t.find(&xor), None);
        assert!(!t.remove(&key(0), 11));
        assert!(t.remove(&key(0), 10));
        assert_eq!(t.find(&key(0)), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_growth() {
        let mut t = StrashTable::with_capacity(4);
        // 4 * 1.8 = 7.2 entries fit before growing
        for i in 0..7 {
            t.insert(key(i), i);
        }
        assert_eq!(t.capacity(), 4);
        t.insert(key(7), 7);
        assert_eq!(t.capacity(), 8);
        for i in 8..100 {
            t.insert(key(i), i);
        }
        assert!(t.capacity().is_power_of_two());
        assert!(t.len() as f64 <= 1.8 * t.capacity() as f64);
        for i in 0..100 {
            assert_eq!(t.find(&key(i)), Some(i));
        }
        assert_eq!(t.iter().count(), 100);
    }

    #[test]
    #[should_panic]
    fn test_duplicate() {
        let mut t = StrashTable::new();
        t.insert(key(0), 1);
        t.insert(key(0), 2);
    }
}
