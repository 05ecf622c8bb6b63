//! Process-unique object identities.
//!
//! Composers, configuration slots, and themes each carry an [`ObjectId`]
//! minted at construction. Identities are stored inline in the owning object
//! rather than in a side table, so holding an id never extends anything's
//! lifetime, and an object's id is stable for as long as the object exists.
//!
//! The counter is thread-local: this crate's caches are single-threaded by
//! design (see the crate docs), so each thread gets its own id space.

use std::cell::Cell;

/// A stable, process-unique identity for a non-primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

impl ObjectId {
    /// Mint a fresh identity. Never returns the same id twice on one thread.
    pub fn next() -> Self {
        NEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ObjectId(id)
        })
    }

    /// The raw numeric identity.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = ObjectId::next();
        let b = ObjectId::next();
        let c = ObjectId::next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a < b && b < c);
    }

    #[test]
    fn ids_are_copy_and_hashable() {
        use std::collections::HashSet;
        let ids: HashSet<ObjectId> = (0..100).map(|_| ObjectId::next()).collect();
        assert_eq!(ids.len(), 100);
    }
}
