// Fri Jan 16 2026 - Alex

use std::collections::BTreeMap;
use std::ops::Range;

// Results keyed by index. Workers finishing out of order still read out
// in index order.
#[derive(Debug, Clone)]
pub struct ResultStore<T> {
    slots: BTreeMap<usize, T>,
    insert_index: usize,
    ready_count: usize,
}

impl<T> ResultStore<T> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            insert_index: 0,
            ready_count: 0,
        }
    }

    /// Stores `value` at `index`, or appends when `index` is `None`.
    /// Returns the index the value landed on.
    pub fn add_result(&mut self, index: Option<usize>, value: T) -> usize {
        let index = index.unwrap_or(self.insert_index);
        self.slots.insert(index, value);
        self.insert_index = self.insert_index.max(index + 1);
        self.sync_ready_count();
        index
    }

    pub fn add_results(&mut self, begin: Option<usize>, values: Vec<T>) -> Range<usize> {
        let begin = begin.unwrap_or(self.insert_index);
        let end = begin + values.len();
        for (offset, value) in values.into_iter().enumerate() {
            self.slots.insert(begin + offset, value);
        }
        if end > begin {
            self.insert_index = self.insert_index.max(end);
        }
        self.sync_ready_count();
        begin..end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.slots.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(&index)
    }

    /// Length of the contiguous prefix of results starting at index 0.
    pub fn count(&self) -> usize {
        self.ready_count
    }

    pub fn stored_count(&self) -> usize {
        self.slots.len()
    }

    /// One past the highest index written so far.
    pub fn len(&self) -> usize {
        self.insert_index
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn sync_ready_count(&mut self) {
        while self.slots.contains_key(&self.ready_count) {
            self.ready_count += 1;
        }
    }
}

impl<T: Clone> ResultStore<T> {
    pub fn values(&self) -> Vec<T> {
        self.slots.values().cloned().collect()
    }

    pub fn slots(&self) -> Vec<Option<T>> {
        (0..self.insert_index)
            .map(|i| self.slots.get(&i).cloned())
            .collect()
    }
}

impl<T> Default for ResultStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
