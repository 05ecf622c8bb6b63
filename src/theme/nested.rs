//! Nested theme input and dotted-path flattening.
//!
//! Theme authors describe a theme as a nested record; internally a theme is a
//! flat map from dotted paths (`"colors.primary"`) to leaves. [`flatten`]
//! performs that walk.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::composer::Composer;
use crate::value::Value;

/// One node of a nested theme input record.
#[derive(Debug, Clone)]
pub enum ThemeNode {
    /// A primitive leaf.
    Value(Value),
    /// A composer leaf.
    Composer(Composer),
    /// A nested record.
    Nested(BTreeMap<String, ThemeNode>),
}

impl ThemeNode {
    /// Build a nested record node from `(key, node)` pairs.
    pub fn nested<K: Into<String>>(entries: impl IntoIterator<Item = (K, ThemeNode)>) -> Self {
        ThemeNode::Nested(
            entries
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
        )
    }
}

impl From<Composer> for ThemeNode {
    fn from(value: Composer) -> Self {
        ThemeNode::Composer(value)
    }
}

impl From<Value> for ThemeNode {
    fn from(value: Value) -> Self {
        ThemeNode::Value(value)
    }
}

impl From<&str> for ThemeNode {
    fn from(value: &str) -> Self {
        ThemeNode::Value(value.into())
    }
}

impl From<i64> for ThemeNode {
    fn from(value: i64) -> Self {
        ThemeNode::Value(value.into())
    }
}

impl From<i32> for ThemeNode {
    fn from(value: i32) -> Self {
        ThemeNode::Value(value.into())
    }
}

impl From<f64> for ThemeNode {
    fn from(value: f64) -> Self {
        ThemeNode::Value(value.into())
    }
}

impl From<bool> for ThemeNode {
    fn from(value: bool) -> Self {
        ThemeNode::Value(value.into())
    }
}

/// A flattened theme leaf: what lives at the end of a dotted path.
#[derive(Debug, Clone)]
pub enum ThemeLeaf {
    Value(Value),
    Composer(Composer),
}

fn join_path(current: &str, key: &str) -> Rc<str> {
    if current.is_empty() {
        Rc::from(key)
    } else {
        Rc::from(format!("{current}.{key}"))
    }
}

fn walk(current: &str, node: &ThemeNode, out: &mut BTreeMap<Rc<str>, ThemeLeaf>) {
    match node {
        ThemeNode::Value(value) => {
            out.insert(Rc::from(current), ThemeLeaf::Value(value.clone()));
        }
        ThemeNode::Composer(composer) => {
            out.insert(Rc::from(current), ThemeLeaf::Composer(composer.clone()));
        }
        ThemeNode::Nested(entries) => {
            for (key, child) in entries {
                let path = join_path(current, key);
                match child {
                    ThemeNode::Nested(_) => walk(&path, child, out),
                    ThemeNode::Value(value) => {
                        out.insert(path, ThemeLeaf::Value(value.clone()));
                    }
                    ThemeNode::Composer(composer) => {
                        out.insert(path, ThemeLeaf::Composer(composer.clone()));
                    }
                }
            }
        }
    }
}

/// Flatten a nested record into dotted-path → leaf pairs.
pub(crate) fn flatten(input: &ThemeNode) -> BTreeMap<Rc<str>, ThemeLeaf> {
    let mut out = BTreeMap::new();
    // A bare leaf flattens to the empty path.
    walk("", input, &mut out);
    out
}

/// Build a nested [`ThemeNode`] record from `key: value` pairs. Nest by
/// passing another `theme!` invocation as a value.
///
/// ```
/// use weft::{theme, Composer};
///
/// let input = theme! {
///     "foo": 42,
///     "colors": theme! { "primary": Composer::new() },
/// };
/// ```
#[macro_export]
macro_rules! theme {
    // Empty records need a concrete key type to spell out.
    () => {
        $crate::theme::ThemeNode::nested(::std::iter::empty::<(
            ::std::string::String,
            $crate::theme::ThemeNode,
        )>())
    };
    ($($key:literal : $value:expr),+ $(,)?) => {
        $crate::theme::ThemeNode::nested([
            $( ($key, $crate::theme::ThemeNode::from($value)) ),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_nested_records_to_dotted_paths() {
        let input = theme! {
            "foo": 42,
            "colors": theme! { "primary": "red", "accent": "blue" },
        };
        let flat = flatten(&input);
        let paths: Vec<&str> = flat.keys().map(|k| k.as_ref()).collect();
        assert_eq!(paths, ["colors.accent", "colors.primary", "foo"]);
    }

    #[test]
    fn composer_leaves_are_preserved() {
        let composer = Composer::new().add_style("color: red;");
        let input = theme! { "colors": theme! { "primary": composer.clone() } };
        let flat = flatten(&input);
        match flat.get("colors.primary") {
            Some(ThemeLeaf::Composer(found)) => assert_eq!(*found, composer),
            other => panic!("expected composer leaf, got {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_builds_full_paths() {
        let input = theme! {
            "a": theme! { "b": theme! { "c": 1 } },
        };
        let flat = flatten(&input);
        assert!(flat.contains_key("a.b.c"));
    }

    #[test]
    fn empty_record_flattens_to_nothing() {
        let flat = flatten(&theme! {});
        assert!(flat.is_empty());
    }
}
