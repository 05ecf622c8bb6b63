//! Canonicalizing value reuser.
//!
//! [`Reuser`] maps every value it sees to a single representative instance:
//! `reuse(a)` and `reuse(b)` return clones of the same stored value whenever
//! `a == b` structurally. Because the payload types are `Rc`-backed, the
//! returned clone shares storage with the canonical instance, so repeated
//! structurally-equal inputs collapse to one allocation and one cache-key
//! shape downstream.
//!
//! Lookups go through the standard `HashMap`, so a hash collision between
//! unequal values can never return the wrong canonical instance; the map's
//! own equality check settles it.
//!
//! The bounded variant evicts the oldest entry, one per insertion, once the
//! configured capacity is exceeded. Unbounded reusers grow for the life of
//! the process, which is acceptable for short-lived tools but a real risk for
//! long-lived renderers; capacity is therefore a first-class knob.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Canonicalizes structurally-equal values to one representative instance.
pub struct Reuser<T> {
    entries: HashMap<T, T>,
    /// Insertion order, oldest first. Only tracked when bounded.
    order: VecDeque<T>,
    capacity: Option<usize>,
}

impl<T: Hash + Eq + Clone> Reuser<T> {
    /// An unbounded reuser. Grows for the life of the process.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: None,
        }
    }

    /// A bounded reuser: once more than `capacity` entries are stored, each
    /// insertion evicts the oldest entry.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    /// Return the canonical instance for `value`, registering it as canonical
    /// if it has not been seen before.
    pub fn reuse(&mut self, value: T) -> T {
        if let Some(existing) = self.entries.get(&value) {
            return existing.clone();
        }

        if self.capacity.is_some() {
            self.order.push_back(value.clone());
        }
        self.entries.insert(value.clone(), value.clone());

        // Evict after inserting so the stored count never exceeds the bound.
        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        value
    }

    /// Number of canonical entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Change the capacity. Shrinking evicts oldest entries immediately;
    /// `None` removes the bound.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        if let Some(capacity) = capacity {
            while self.entries.len() > capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    // Entries inserted while unbounded are untracked; nothing
                    // left to evict in order.
                    None => break,
                }
            }
        }
    }
}

impl<T: Hash + Eq + Clone> Default for Reuser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Reuser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reuser")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
