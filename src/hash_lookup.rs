//! Bidirectional mapping between items and their insertion index.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::ops::Index;

#[derive(Debug, Clone)]
pub struct HashLookup<T: Eq + Hash> {
    item_to_index: FxHashMap<T, usize>,
    index_to_item: Vec<T>,
}
impl<T: Eq + Hash + Clone> HashLookup<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            item_to_index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            index_to_item: Vec::with_capacity(capacity),
        }
    }

    /// Appends an item that must not already be present, returning its index.
    pub fn push(&mut self, item: T) -> usize {
        let index = self.index_to_item.len();
        if let Some(existing_index) = self.item_to_index.insert(item.clone(), index) {
            self.item_to_index.insert(item, existing_index);
            panic!("duplicate item at index {index}, previously at {existing_index}")
        }
        self.index_to_item.push(item);
        index
    }

    /// Resolves the index of an item, appending it first if it has not been seen before. The
    /// second element is `true` if the item was appended.
    pub fn index_or_push(&mut self, item: T) -> (usize, bool) {
        match self.item_to_index.get(&item) {
            Some(&index) => (index, false),
            None => (self.push(item), true),
        }
    }

    pub fn item_at(&self, index: usize) -> Option<&T> {
        self.index_to_item.get(index)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.item_to_index.get(item).copied()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.item_to_index.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.index_to_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_item.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.index_to_item
    }
}

impl<T: Eq + Hash + Clone> Default for HashLookup<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Eq + Hash + Clone> Index<usize> for HashLookup<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.item_at(index)
            .unwrap_or_else(|| panic!("no item at index {index}"))
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for HashLookup<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut lookup = Self::with_capacity(iter.size_hint().0);
        for item in iter {
            lookup.push(item);
        }
        lookup
    }
}
