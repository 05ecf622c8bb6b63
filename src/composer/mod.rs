//! The immutable, chainable builder core.
//!
//! A [`Composer`] holds an ordered list of style fragments and a map of
//! configuration-slot values. Every mutating-looking operation returns a new
//! instance; the receiver is never touched. Derivations are memoized per
//! (receiver, operation, arguments), so repeating the same call on the same
//! composer returns the *identical* derived instance — downstream layers key
//! their own caches on composer identity and rely on this.

pub mod config;
pub mod proto;

pub use config::ConfigSlot;
pub use proto::{MemberKind, MemberResult, Prototype, PrototypeBuilder};

use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::identity::ObjectId;
use crate::map::{DeepMap, KeyPart, Reuser};
use crate::style::compile::{compile_fragments, CompiledStyles};
use crate::style::fragment::StyleFragment;
use crate::value::{Value, ValueMap};

const DEFAULT_REUSE_CAPACITY: usize = 4096;

thread_local! {
    /// Process-wide canonicalization caches. Single-threaded by design: every
    /// thread gets its own caches, so the read-then-write on a miss needs no
    /// locking.
    static FRAGMENT_REUSER: RefCell<Reuser<StyleFragment>> =
        RefCell::new(Reuser::bounded(DEFAULT_REUSE_CAPACITY));
    static CONFIG_REUSER: RefCell<Reuser<ValueMap>> =
        RefCell::new(Reuser::bounded(DEFAULT_REUSE_CAPACITY));
}

/// Reconfigure the bounded canonicalization caches backing fragment and
/// config reuse. `None` removes the bound (entries then live for the life of
/// the thread).
pub fn set_reuse_capacity(capacity: Option<usize>) {
    FRAGMENT_REUSER.with(|r| r.borrow_mut().set_capacity(capacity));
    CONFIG_REUSER.with(|r| r.borrow_mut().set_capacity(capacity));
}

fn reuse_fragment(fragment: StyleFragment) -> StyleFragment {
    FRAGMENT_REUSER.with(|r| r.borrow_mut().reuse(fragment))
}

fn reuse_config(config: ValueMap) -> ValueMap {
    CONFIG_REUSER.with(|r| r.borrow_mut().reuse(config))
}

struct ComposerInner {
    id: ObjectId,
    proto: Rc<Prototype>,
    styles: Vec<StyleFragment>,
    configs: BTreeMap<ObjectId, ValueMap>,
    /// Memoized derivations keyed on (operation, arguments).
    derived: RefCell<DeepMap<Composer>>,
    compiled: OnceCell<CompiledStyles>,
}

/// An immutable style builder.
///
/// Cheap to clone; equality and hashing are by identity. Structurally-equal
/// derivations are reference-equal by construction, so identity comparison is
/// the correct crate-level semantic.
///
/// ```
/// use weft::{Composer, value_map};
///
/// let base = Composer::new();
/// let red = base.add_style(value_map! { "color": "red" });
/// // Memoized: the same chain yields the same instance.
/// assert_eq!(red, base.add_style(value_map! { "color": "red" }));
/// assert_eq!(red.compile().rules(), ["color: red;"]);
/// ```
#[derive(Clone)]
pub struct Composer {
    inner: Rc<ComposerInner>,
}

impl Composer {
    /// A plain composer with no chainable members, no fragments, and no
    /// configuration.
    pub fn new() -> Composer {
        Prototype::base().instantiate()
    }

    /// The zero-state root for a prototype. Called by
    /// [`Prototype::instantiate`], which also applies the init hook.
    pub(crate) fn root(proto: Rc<Prototype>) -> Composer {
        Composer::construct(proto, Vec::new(), BTreeMap::new())
    }

    fn construct(
        proto: Rc<Prototype>,
        styles: Vec<StyleFragment>,
        configs: BTreeMap<ObjectId, ValueMap>,
    ) -> Composer {
        Composer {
            inner: Rc::new(ComposerInner {
                id: ObjectId::next(),
                proto,
                styles,
                configs,
                derived: RefCell::new(DeepMap::new()),
                compiled: OnceCell::new(),
            }),
        }
    }

    /// This composer's identity.
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// The member table this composer was instantiated from.
    pub fn proto(&self) -> &Rc<Prototype> {
        &self.inner.proto
    }

    /// The ordered fragment list.
    pub fn styles(&self) -> &[StyleFragment] {
        &self.inner.styles
    }

    fn cached_derivation(&self, key: &[KeyPart]) -> Option<Composer> {
        self.inner.derived.borrow().get(key).cloned()
    }

    fn store_derivation(&self, key: &[KeyPart], derived: &Composer) {
        self.inner.derived.borrow_mut().set(key, derived.clone());
    }

    /// Append a style fragment, returning the derived composer.
    ///
    /// Memoized per (receiver, fragment): structurally-equal fragments on the
    /// same receiver return the identical derived instance. The fragment is
    /// canonicalized first so equal payloads share storage.
    pub fn add_style(&self, fragment: impl Into<StyleFragment>) -> Composer {
        let fragment = reuse_fragment(fragment.into());
        let key = [KeyPart::Op("add_style"), KeyPart::Fragment(fragment.clone())];

        if let Some(existing) = self.cached_derivation(&key) {
            return existing;
        }

        let mut styles = self.inner.styles.clone();
        styles.push(fragment);
        let derived = Composer::construct(
            Rc::clone(&self.inner.proto),
            styles,
            self.inner.configs.clone(),
        );

        self.store_derivation(&key, &derived);
        derived
    }

    /// Shallow-merge `changes` over this composer's value for `slot` (or the
    /// slot's default if unset), returning the derived composer.
    ///
    /// Memoized per (receiver, slot, changes) unless the slot opted out of
    /// caching.
    pub fn update_config(&self, slot: &ConfigSlot, changes: ValueMap) -> Composer {
        let key = [
            KeyPart::Op("update_config"),
            KeyPart::Id(slot.id()),
            KeyPart::Value(Value::Map(changes.clone())),
        ];

        if slot.is_cached() {
            if let Some(existing) = self.cached_derivation(&key) {
                return existing;
            }
        }

        let merged = reuse_config(self.get_config(slot).merge(&changes));
        let mut configs = self.inner.configs.clone();
        configs.insert(slot.id(), merged);
        let derived = Composer::construct(
            Rc::clone(&self.inner.proto),
            self.inner.styles.clone(),
            configs,
        );

        if slot.is_cached() {
            self.store_derivation(&key, &derived);
        }
        derived
    }

    /// The current value for `slot`, or the slot's default if never set.
    /// Never fails.
    pub fn get_config(&self, slot: &ConfigSlot) -> ValueMap {
        self.inner
            .configs
            .get(&slot.id())
            .cloned()
            .unwrap_or_else(|| slot.default().clone())
    }

    /// Flatten and serialize the fragment list. Cached: every call returns a
    /// clone of the same [`CompiledStyles`] instance.
    pub fn compile(&self) -> CompiledStyles {
        self.inner
            .compiled
            .get_or_init(|| compile_fragments(&self.inner.styles))
            .clone()
    }

    /// Compile with one extra trailing fragment. Not cached on the composer;
    /// the receiver's own compiled output is unaffected.
    pub fn compile_with(&self, extra: impl Into<StyleFragment>) -> CompiledStyles {
        let mut fragments = self.inner.styles.clone();
        fragments.push(reuse_fragment(extra.into()));
        compile_fragments(&fragments)
    }

    /// Dynamic member dispatch: evaluate a declared getter by name.
    pub fn get_member(&self, name: &str) -> Option<MemberResult> {
        self.inner.proto.get(self, name)
    }

    /// Dynamic member dispatch: invoke a declared method by name.
    pub fn call_member(&self, name: &str, args: &[Value]) -> Option<MemberResult> {
        self.inner.proto.call(self, name, args)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Composer::new()
    }
}

impl PartialEq for Composer {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Composer {}

impl std::hash::Hash for Composer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("proto", &self.inner.proto.name())
            .field("id", &self.inner.id)
            .field("styles", &self.inner.styles.len())
            .field("configs", &self.inner.configs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_map;

    fn slot() -> ConfigSlot {
        ConfigSlot::new("test", value_map! { "color": "#000000" })
    }

    #[test]
    fn add_style_is_memoized_per_receiver() {
        let base = Composer::new();
        let a = base.add_style("color: red;");
        let b = base.add_style("color: red;");
        assert_eq!(a, b);
        assert!(Rc::ptr_eq(&a.inner, &b.inner));
    }

    #[test]
    fn structurally_equal_fragments_hit_the_cache() {
        let base = Composer::new();
        let a = base.add_style(value_map! { "color": "red", "width": "100%" });
        let b = base.add_style(value_map! { "width": "100%", "color": "red" });
        assert_eq!(a, b);
    }

    #[test]
    fn different_fragments_derive_different_instances() {
        let base = Composer::new();
        assert_ne!(base.add_style("color: red;"), base.add_style("color: blue;"));
    }

    #[test]
    fn add_style_does_not_mutate_receiver() {
        let base = Composer::new();
        let derived = base.add_style("color: red;");
        assert!(base.styles().is_empty());
        assert_eq!(derived.styles().len(), 1);
    }

    #[test]
    fn fragments_append_in_order() {
        let composer = Composer::new()
            .add_style("display: flex;")
            .add_style("color: red;");
        assert_eq!(
            composer.compile().rules(),
            ["display: flex;", "color: red;"]
        );
    }

    #[test]
    fn get_config_falls_back_to_default() {
        let slot = slot();
        let composer = Composer::new();
        assert_eq!(composer.get_config(&slot), *slot.default());
    }

    #[test]
    fn update_config_merges_shallowly() {
        let slot = slot();
        let composer = Composer::new()
            .update_config(&slot, value_map! { "hover": "#222222" })
            .update_config(&slot, value_map! { "color": "#ffffff" });
        let config = composer.get_config(&slot);
        // Later updates merge onto earlier state; unspecified keys survive.
        assert_eq!(config.get("color"), Some(&Value::from("#ffffff")));
        assert_eq!(config.get("hover"), Some(&Value::from("#222222")));
    }

    #[test]
    fn update_config_is_memoized() {
        let slot = slot();
        let base = Composer::new();
        let a = base.update_config(&slot, value_map! { "color": "red" });
        let b = base.update_config(&slot, value_map! { "color": "red" });
        assert_eq!(a, b);
    }

    #[test]
    fn uncached_slot_skips_memoization() {
        let slot = ConfigSlot::uncached("scratch", ValueMap::new());
        let base = Composer::new();
        let a = base.update_config(&slot, value_map! { "n": 1 });
        let b = base.update_config(&slot, value_map! { "n": 1 });
        assert_ne!(a, b);
        // Still structurally the same configuration.
        assert_eq!(a.get_config(&slot), b.get_config(&slot));
    }

    #[test]
    fn distinct_slots_do_not_collide() {
        let a = ConfigSlot::new("a", value_map! { "v": 1 });
        let b = ConfigSlot::new("b", value_map! { "v": 2 });
        let composer = Composer::new().update_config(&a, value_map! { "v": 10 });
        assert_eq!(composer.get_config(&a), value_map! { "v": 10 });
        assert_eq!(composer.get_config(&b), value_map! { "v": 2 });
    }

    #[test]
    fn compile_is_reference_stable() {
        let composer = Composer::new().add_style("color: red;");
        let first = composer.compile();
        let second = composer.compile();
        assert!(CompiledStyles::ptr_eq(&first, &second));
    }

    #[test]
    fn compile_with_extra_leaves_cache_alone() {
        let composer = Composer::new().add_style("color: red;");
        let with_extra = composer.compile_with("outline: none;");
        assert_eq!(with_extra.rules(), ["color: red;", "outline: none;"]);
        assert_eq!(composer.compile().rules(), ["color: red;"]);
    }

    #[test]
    fn nested_composers_compile_in_place() {
        let inner = Composer::new().add_style("color: red;");
        let outer = Composer::new()
            .add_style("display: flex;")
            .add_style(inner);
        assert_eq!(
            outer.compile().rules(),
            ["display: flex;", "color: red;"]
        );
    }

    #[test]
    fn chained_derivations_are_reference_stable_end_to_end() {
        let slot = slot();
        let base = Composer::new();
        let a = base
            .add_style("display: flex;")
            .update_config(&slot, value_map! { "color": "red" })
            .add_style(value_map! { "gap": "1rem" });
        let b = base
            .add_style("display: flex;")
            .update_config(&slot, value_map! { "color": "red" })
            .add_style(value_map! { "gap": "1rem" });
        assert_eq!(a, b);
    }
}
