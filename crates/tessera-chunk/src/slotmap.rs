use std::hash::Hash;

use hashbrown::HashMap;

/// Dense key ↔ slot bijection. Live slots are always exactly `0..len()`;
/// removal moves the last slot into the hole.
#[derive(Clone, Debug)]
pub struct DenseSlotMap<K> {
    forward: HashMap<K, usize>,
    inverse: HashMap<usize, K>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> DenseSlotMap<K> {
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            inverse: HashMap::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            forward: HashMap::with_capacity(cap),
            inverse: HashMap::with_capacity(cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    #[inline]
    pub fn slot_of(&self, key: &K) -> Option<usize> {
        self.forward.get(key).copied()
    }

    #[inline]
    pub fn key_at(&self, slot: usize) -> Option<K> {
        self.inverse.get(&slot).copied()
    }

    /// Appends `key` at slot `len()`. Inserting a live key is a caller bug.
    pub fn insert(&mut self, key: K) -> usize {
        assert!(
            !self.forward.contains_key(&key),
            "DenseSlotMap: key {:?} inserted twice",
            key
        );
        let slot = self.forward.len();
        self.forward.insert(key, slot);
        self.inverse.insert(slot, key);
        slot
    }

    /// Swap-removes `key`. When the last slot is moved into the freed one,
    /// `on_move(from, to)` runs before the maps are updated so callers can
    /// copy payload. Returns the freed slot, or `None` if `key` was absent.
    pub fn remove<F: FnMut(usize, usize)>(&mut self, key: &K, mut on_move: F) -> Option<usize> {
        let slot = self.forward.remove(key)?;
        let last = self.forward.len();
        if self.inverse.remove(&slot).is_none() {
            panic!("DenseSlotMap: slot {} of key {:?} missing from inverse map", slot, key);
        }
        if slot != last {
            let moved = self.inverse.remove(&last).unwrap_or_else(|| {
                panic!("DenseSlotMap: last slot {} missing from inverse map", last)
            });
            on_move(last, slot);
            self.forward.insert(moved, slot);
            self.inverse.insert(slot, moved);
        }
        Some(slot)
    }

    /// `(slot, key)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, K)> + '_ {
        (0..self.len()).filter_map(move |s| self.key_at(s).map(|k| (s, k)))
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.inverse.clear();
    }

    /// True when both maps agree and slots are exactly `0..len()`.
    pub fn is_consistent(&self) -> bool {
        self.forward.len() == self.inverse.len()
            && self
                .forward
                .iter()
                .all(|(k, &s)| s < self.forward.len() && self.inverse.get(&s) == Some(k))
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> Default for DenseSlotMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_appends() {
        let mut m = DenseSlotMap::new();
        assert_eq!(m.insert(10u32), 0);
        assert_eq!(m.insert(20), 1);
        assert_eq!(m.insert(30), 2);
        assert_eq!(m.key_at(1), Some(20));
        assert!(m.is_consistent());
    }

    #[test]
    fn remove_moves_last_into_hole() {
        let mut m = DenseSlotMap::new();
        for k in [10u32, 20, 30, 40] {
            m.insert(k);
        }
        let mut moves = Vec::new();
        assert_eq!(m.remove(&10, |from, to| moves.push((from, to))), Some(0));
        assert_eq!(moves, vec![(3, 0)]);
        assert_eq!(m.slot_of(&40), Some(0));
        assert_eq!(m.key_at(3), None);
        assert_eq!(m.len(), 3);
        assert!(m.is_consistent());
    }

    #[test]
    fn removing_last_slot_moves_nothing() {
        let mut m = DenseSlotMap::new();
        m.insert(1u32);
        m.insert(2);
        let mut called = false;
        assert_eq!(m.remove(&2, |_, _| called = true), Some(1));
        assert!(!called);
        assert_eq!(m.remove(&2, |_, _| called = true), None);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    #[should_panic(expected = "inserted twice")]
    fn double_insert_panics() {
        let mut m = DenseSlotMap::new();
        m.insert(5u32);
        m.insert(5);
    }

    #[test]
    #[should_panic(expected = "missing from inverse map")]
    fn corrupted_inverse_panics() {
        let mut m = DenseSlotMap::new();
        m.insert(1u32);
        m.insert(2);
        m.inverse.remove(&1);
        m.remove(&1, |_, _| {});
    }
}
