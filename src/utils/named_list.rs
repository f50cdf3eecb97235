//! Insertion-ordered collection with unique names.
//!
//! Backs both the track list of an animation and the animation list of a
//! controller: lookups by name go through a hash index, iteration and
//! positional access follow insertion order.

use rustc_hash::FxHashMap;

/// Items stored in a [`NamedList`].
pub trait Named {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct NamedList<T: Named> {
    items: Vec<T>,
    index: FxHashMap<String, usize>,
}

impl<T: Named> Default for NamedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: Named> NamedList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.position(name).map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.position(name).map(|i| &mut self.items[i])
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Appends `item`; hands it back if the name is already taken.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.contains(item.name()) {
            return Err(item);
        }
        self.index.insert(item.name().to_string(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Replaces the item with the same name in place, or appends it.
    pub fn replace(&mut self, item: T) -> Option<T> {
        match self.position(item.name()) {
            Some(i) => Some(std::mem::replace(&mut self.items[i], item)),
            None => {
                self.index.insert(item.name().to_string(), self.items.len());
                self.items.push(item);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        let position = self.index.remove(name)?;
        let item = self.items.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Removes and yields every item in order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.index.clear();
        self.items.drain(..)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Named::name)
    }
}

impl<'a, T: Named> IntoIterator for &'a NamedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
