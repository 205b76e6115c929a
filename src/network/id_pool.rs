//! Allocation of reusable ids

use std::collections::BTreeSet;

/// Pool of small non-negative integer ids
///
/// Allocation always returns the smallest id that is currently free: either a released id
/// or, if none was released, the next id after all the ids ever allocated.
/// A released id may be returned again by the very next allocation.
#[derive(Debug, Clone, Default)]
pub struct IdPool {
    /// Released ids available for reuse
    free: BTreeSet<usize>,
    /// Number of ids ever handed out; all live ids are below this bound
    capacity: usize,
}

impl IdPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the smallest free id
    pub fn alloc(&mut self) -> usize {
        match self.free.pop_first() {
            Some(id) => id,
            None => {
                self.capacity += 1;
                self.capacity - 1
            }
        }
    }

    /// Release an id so that it can be reused
    pub fn release(&mut self, id: usize) {
        assert!(self.is_allocated(id), "Id {id} is not allocated");
        self.free.insert(id);
    }

    /// Returns whether the id is currently allocated
    pub fn is_allocated(&self, id: usize) -> bool {
        id < self.capacity && !self.free.contains(&id)
    }

    /// Bound on the allocated ids; never decreases until the pool is cleared
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of ids currently allocated
    pub fn nb_allocated(&self) -> usize {
        self.capacity - self.free.len()
    }

    /// Release all ids
    pub fn clear(&mut self) {
        self.free.clear();
        self.capacity = 0;
    }
}
