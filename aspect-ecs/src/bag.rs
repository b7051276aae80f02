// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Growable dense array
//!
//! A [`Bag`] is an index-stable array that grows on write. Reads past the
//! filled range return `None` instead of failing, which makes it suitable
//! for storage keyed by entity index or component type id.

const DEFAULT_CAPACITY: usize = 16;

/// An auto-expanding array of optional slots
///
/// `count` is the highest filled index plus one; slots below it may still
/// be empty.
#[derive(Debug, Clone)]
pub struct Bag<T> {
    items: Vec<Option<T>>,
    count: usize,
}

impl<T> Bag<T> {
    /// Create a bag with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bag with room for `capacity` slots before growing
    pub fn with_capacity(capacity: usize) -> Self {
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(capacity, || None);
        Bag { items, count: 0 }
    }

    /// Get the value at `index`, or `None` when the slot is empty or out of range
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Mutable variant of [`Bag::get`]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index).and_then(Option::as_mut)
    }

    /// Store `value` at `index`, growing the backing storage so the index is
    /// addressable. Returns the value previously held by the slot.
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        if index >= self.items.len() {
            self.grow(index + 1);
        }
        if index >= self.count {
            self.count = index + 1;
        }
        self.items[index].replace(value)
    }

    /// Get the value at `index`, inserting one built by `make` when empty
    pub fn get_or_insert_with(&mut self, index: usize, make: impl FnOnce() -> T) -> &mut T {
        if index >= self.items.len() {
            self.grow(index + 1);
        }
        if index >= self.count {
            self.count = index + 1;
        }
        self.items[index].get_or_insert_with(make)
    }

    /// Append `value` after the last filled slot
    pub fn add(&mut self, value: T) {
        let index = self.count;
        self.set(index, value);
    }

    /// Empty the slot at `index` and return its value
    pub fn take(&mut self, index: usize) -> Option<T> {
        let value = self.items.get_mut(index).and_then(Option::take);
        if value.is_some() && index + 1 == self.count {
            self.shrink_count();
        }
        value
    }

    /// Remove the value at `index`, moving the last filled value into its place
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let last = self.count - 1;
        let value = self.items[index].take();
        if index != last {
            self.items[index] = self.items[last].take();
        }
        self.shrink_count();
        value
    }

    /// Remove and return the value in the highest filled slot
    pub fn remove_last(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let value = self.items[self.count - 1].take();
        self.shrink_count();
        value
    }

    /// Empty every slot, keeping the allocated capacity
    pub fn clear(&mut self) {
        for slot in &mut self.items[..self.count] {
            *slot = None;
        }
        self.count = 0;
    }

    /// Highest filled index plus one
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of addressable slots before the next growth
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// True when no slot is filled
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over filled slots as `(index, value)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items[..self.count]
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Mutable variant of [`Bag::iter`]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.items[..self.count]
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i, v)))
    }

    fn grow(&mut self, min_len: usize) {
        let new_len = (self.items.len() * 2).max(min_len).max(DEFAULT_CAPACITY);
        self.items.resize_with(new_len, || None);
    }

    fn shrink_count(&mut self) {
        while self.count > 0 && self.items[self.count - 1].is_none() {
            self.count -= 1;
        }
    }
}

impl<T: PartialEq> Bag<T> {
    /// True when some filled slot equals `value`
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|(_, v)| v == value)
    }
}

impl<T> Default for Bag<T> {
    fn default() -> Self {
        Self::new()
    }
}
