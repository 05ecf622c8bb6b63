//! Configuration slots: named, defaulted attachment points for non-fragment
//! builder state.
//!
//! A slot is an identity-keyed handle. Concrete style builders each create
//! one slot (color config, size config, ...) and attach values to any
//! composer through it without the composer knowing the slot's shape.

use std::rc::Rc;

use crate::identity::ObjectId;
use crate::value::ValueMap;

struct SlotInner {
    id: ObjectId,
    name: &'static str,
    default: ValueMap,
    cache: bool,
}

/// An identity-based configuration key with a default value.
#[derive(Clone)]
pub struct ConfigSlot {
    inner: Rc<SlotInner>,
}

impl ConfigSlot {
    /// Create a slot with a default value. Derivations through this slot are
    /// memoized.
    pub fn new(name: &'static str, default: ValueMap) -> Self {
        Self::build(name, default, true)
    }

    /// Create a slot whose derivations bypass the memoization cache. Useful
    /// when changes are expected to be unique per call site.
    pub fn uncached(name: &'static str, default: ValueMap) -> Self {
        Self::build(name, default, false)
    }

    fn build(name: &'static str, default: ValueMap, cache: bool) -> Self {
        Self {
            inner: Rc::new(SlotInner {
                id: ObjectId::next(),
                name,
                default,
                cache,
            }),
        }
    }

    /// The slot's identity.
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// The slot's debug name.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// The value a composer reports when this slot was never set on it.
    pub fn default(&self) -> &ValueMap {
        &self.inner.default
    }

    /// Whether derivations through this slot are memoized.
    pub fn is_cached(&self) -> bool {
        self.inner.cache
    }
}

impl PartialEq for ConfigSlot {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ConfigSlot {}

impl std::fmt::Debug for ConfigSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSlot")
            .field("name", &self.inner.name)
            .field("id", &self.inner.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_map;

    #[test]
    fn slots_are_identity_keyed() {
        let a = ConfigSlot::new("color", value_map! { "color": "#000000" });
        let b = ConfigSlot::new("color", value_map! { "color": "#000000" });
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn default_is_exposed() {
        let slot = ConfigSlot::new("size", value_map! { "value": 0 });
        assert_eq!(slot.default(), &value_map! { "value": 0 });
        assert!(slot.is_cached());
    }

    #[test]
    fn uncached_slot_opts_out() {
        let slot = ConfigSlot::uncached("scratch", ValueMap::new());
        assert!(!slot.is_cached());
    }
}
