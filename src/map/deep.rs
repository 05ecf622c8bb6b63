//! Multi-key memoization map.
//!
//! [`DeepMap`] caches derived results keyed on an ordered tuple of values
//! (operation tag, argument payloads, slot identities). Internally it is a
//! trie: each tuple element is one level of nesting, and every node carries a
//! dedicated leaf slot, so a value stored at `[a, b]` is distinct from one
//! stored at `[a, b, c]`. An absent optional argument is encoded as
//! [`KeyPart::Missing`], which keeps "argument was omitted" distinguishable
//! from "no entry at this path".
//!
//! Trie nodes live in a slotmap arena; the map owns all of its nodes and
//! never leaks them (removing a leaf keeps interior nodes for reuse).

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::identity::ObjectId;
use crate::style::fragment::StyleFragment;
use crate::value::Value;

new_key_type! {
    struct NodeKey;
}

/// One element of a cache-key tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Sentinel for an omitted optional argument.
    Missing,
    /// Operation tag (`"add_style"`, `"update_config"`, ...).
    Op(&'static str),
    /// Identity of a non-structural object (config slot, composer).
    Id(ObjectId),
    /// Structural payload.
    Value(Value),
    /// A style fragment (structural, with composers keyed by identity).
    Fragment(StyleFragment),
}

struct Node<V> {
    leaf: Option<V>,
    children: HashMap<KeyPart, NodeKey>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self {
            leaf: None,
            children: HashMap::new(),
        }
    }
}

/// A trie-backed map from key tuples to values.
pub struct DeepMap<V> {
    nodes: SlotMap<NodeKey, Node<V>>,
    root: NodeKey,
}

impl<V> Default for DeepMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DeepMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new());
        Self { nodes, root }
    }

    fn descend(&self, path: &[KeyPart]) -> Option<NodeKey> {
        let mut current = self.root;
        for part in path {
            current = *self.nodes[current].children.get(part)?;
        }
        Some(current)
    }

    fn descend_or_create(&mut self, path: &[KeyPart]) -> NodeKey {
        let mut current = self.root;
        for part in path {
            if let Some(&child) = self.nodes[current].children.get(part) {
                current = child;
                continue;
            }
            let child = self.nodes.insert(Node::new());
            self.nodes[current].children.insert(part.clone(), child);
            current = child;
        }
        current
    }

    /// Look up the value stored at exactly this path.
    pub fn get(&self, path: &[KeyPart]) -> Option<&V> {
        let node = self.descend(path)?;
        self.nodes[node].leaf.as_ref()
    }

    /// Store a value at this path, replacing any previous value.
    pub fn set(&mut self, path: &[KeyPart], value: V) {
        let node = self.descend_or_create(path);
        self.nodes[node].leaf = Some(value);
    }

    /// Returns `true` if a value is stored at exactly this path.
    pub fn has(&self, path: &[KeyPart]) -> bool {
        self.descend(path)
            .is_some_and(|node| self.nodes[node].leaf.is_some())
    }

    /// Remove and return the value at this path. Longer paths sharing this
    /// prefix are unaffected.
    pub fn remove(&mut self, path: &[KeyPart]) -> Option<V> {
        let node = self.descend(path)?;
        self.nodes[node].leaf.take()
    }

    /// Look up the value at this path, inserting `create()` on a miss.
    pub fn get_or_insert_with(&mut self, path: &[KeyPart], create: impl FnOnce() -> V) -> &V {
        let node = self.descend_or_create(path);
        self.nodes[node].leaf.get_or_insert_with(create)
    }
}

impl<V> std::fmt::Debug for DeepMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepMap")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(tag: &'static str, n: i64) -> Vec<KeyPart> {
        vec![KeyPart::Op(tag), KeyPart::Value(Value::from(n))]
    }

    #[test]
    fn set_then_get() {
        let mut map = DeepMap::new();
        map.set(&key("op", 1), "one");
        assert_eq!(map.get(&key("op", 1)), Some(&"one"));
        assert_eq!(map.get(&key("op", 2)), None);
    }

    #[test]
    fn prefix_is_not_a_hit() {
        let mut map = DeepMap::new();
        map.set(&key("op", 1), "one");
        assert_eq!(map.get(&[KeyPart::Op("op")]), None);
        assert!(!map.has(&[KeyPart::Op("op")]));
    }

    #[test]
    fn value_at_prefix_and_extension_coexist() {
        let mut map = DeepMap::new();
        map.set(&[KeyPart::Op("op")], "short");
        map.set(&key("op", 1), "long");
        assert_eq!(map.get(&[KeyPart::Op("op")]), Some(&"short"));
        assert_eq!(map.get(&key("op", 1)), Some(&"long"));
    }

    #[test]
    fn missing_sentinel_differs_from_absent_path() {
        let mut map = DeepMap::new();
        map.set(&[KeyPart::Op("compile"), KeyPart::Missing], "no-arg");
        assert_eq!(
            map.get(&[KeyPart::Op("compile"), KeyPart::Missing]),
            Some(&"no-arg")
        );
        assert_eq!(map.get(&[KeyPart::Op("compile")]), None);
    }

    #[test]
    fn remove_clears_only_the_leaf() {
        let mut map = DeepMap::new();
        map.set(&[KeyPart::Op("a")], 1);
        map.set(&[KeyPart::Op("a"), KeyPart::Missing], 2);
        assert_eq!(map.remove(&[KeyPart::Op("a")]), Some(1));
        assert_eq!(map.get(&[KeyPart::Op("a")]), None);
        assert_eq!(map.get(&[KeyPart::Op("a"), KeyPart::Missing]), Some(&2));
    }

    #[test]
    fn get_or_insert_with_only_creates_once() {
        let mut map = DeepMap::new();
        let mut calls = 0;
        let path = key("derive", 7);
        map.get_or_insert_with(&path, || {
            calls += 1;
            "made"
        });
        map.get_or_insert_with(&path, || {
            calls += 1;
            "remade"
        });
        assert_eq!(calls, 1);
        assert_eq!(map.get(&path), Some(&"made"));
    }

    #[test]
    fn structural_values_hit_the_same_slot() {
        use crate::value_map;
        let mut map = DeepMap::new();
        let a = vec![KeyPart::Value(Value::Map(value_map! { "color": "red" }))];
        let b = vec![KeyPart::Value(Value::Map(value_map! { "color": "red" }))];
        map.set(&a, "cached");
        assert_eq!(map.get(&b), Some(&"cached"));
    }
}
