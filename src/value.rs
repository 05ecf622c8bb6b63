//! Structural value model: the payload type for style properties and configs.
//!
//! Everything a composer stores — structured property maps, configuration
//! values, recorded call arguments — is a [`Value`]. The whole tree derives
//! `Hash` and `Eq`, so structurally-equal payloads hash identically and can be
//! used directly as cache keys. Map keys are kept sorted (`BTreeMap`) so the
//! derived hash is deterministic regardless of insertion order.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A numeric value with total equality.
///
/// Wraps `f64` but hashes and compares by bit pattern, which makes it usable
/// as a cache key. CSS output prints integral values without a fractional
/// part (`4` rather than `4.0`).
#[derive(Debug, Clone, Copy)]
pub struct Number(f64);

impl Number {
    /// Wrap a float.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The underlying float.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl std::hash::Hash for Number {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

/// A structural value: the unit of data flowing through composers and themes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Serialize for CSS output. Strings pass through verbatim; numbers use
    /// the integral-friendly formatting of [`Number`].
    pub fn to_css(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_css).collect();
                parts.join(", ")
            }
            Value::Map(map) => map.to_css(),
        }
    }

    /// Returns `true` for the leaf kinds a theme treats as primitive
    /// (everything except maps).
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Map(_))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value.as_str()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::new(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::from(value as i64))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

/// An immutable, sorted string-keyed map of [`Value`]s.
///
/// Cheap to clone (`Rc`-backed). This is both the structured-property-map
/// style fragment payload and the configuration-slot value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValueMap(Rc<BTreeMap<Rc<str>, Value>>);

impl ValueMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.0.iter()
    }

    /// Shallow merge: `other`'s keys win, everything else is kept from
    /// `self`. Returns a new map; neither input is mutated.
    pub fn merge(&self, other: &ValueMap) -> ValueMap {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut merged = (*self.0).clone();
        for (key, value) in other.0.iter() {
            merged.insert(Rc::clone(key), value.clone());
        }
        ValueMap(Rc::new(merged))
    }

    /// Serialize as `prop: value;` declarations, keys converted from
    /// camelCase to kebab-case, joined with single spaces.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.0.iter() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&to_kebab_case(key));
            out.push_str(": ");
            out.push_str(&value.to_css());
            out.push(';');
        }
        out
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map: BTreeMap<Rc<str>, Value> = iter
            .into_iter()
            .map(|(k, v)| (Rc::from(k.into().as_str()), v.into()))
            .collect();
        ValueMap(Rc::new(map))
    }
}

/// Convert a camelCase property name to kebab-case (`fontSize` →
/// `font-size`). Names already in kebab-case pass through unchanged.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Build a [`ValueMap`] from `key: value` pairs.
///
/// ```
/// use weft::value_map;
/// let props = value_map! { "fontSize": "1rem", "lineHeight": 1.5 };
/// assert_eq!(props.len(), 2);
/// ```
#[macro_export]
macro_rules! value_map {
    () => { $crate::value::ValueMap::new() };
    ($($key:literal : $value:expr),+ $(,)?) => {
        [$(($key, $crate::value::Value::from($value))),+]
            .into_iter()
            .collect::<$crate::value::ValueMap>()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_display_trims_integral() {
        assert_eq!(Number::new(4.0).to_string(), "4");
        assert_eq!(Number::new(0.5).to_string(), "0.5");
        assert_eq!(Number::new(-2.0).to_string(), "-2");
    }

    #[test]
    fn number_hash_equality() {
        assert_eq!(Number::new(1.5), Number::new(1.5));
        assert_ne!(Number::new(1.5), Number::new(2.5));
    }

    #[test]
    fn value_map_equality_ignores_insertion_order() {
        let a: ValueMap = [("color", "red"), ("width", "100%")].into_iter().collect();
        let b: ValueMap = [("width", "100%"), ("color", "red")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn merge_other_wins() {
        let base = value_map! { "color": "red", "width": "100%" };
        let changes = value_map! { "color": "blue" };
        let merged = base.merge(&changes);
        assert_eq!(merged.get("color"), Some(&Value::from("blue")));
        assert_eq!(merged.get("width"), Some(&Value::from("100%")));
    }

    #[test]
    fn merge_empty_is_identity() {
        let base = value_map! { "color": "red" };
        assert_eq!(base.merge(&ValueMap::new()), base);
        assert_eq!(ValueMap::new().merge(&base), base);
    }

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(to_kebab_case("fontSize"), "font-size");
        assert_eq!(to_kebab_case("color"), "color");
        assert_eq!(to_kebab_case("borderTopWidth"), "border-top-width");
        assert_eq!(to_kebab_case("font-size"), "font-size");
    }

    #[test]
    fn to_css_declarations() {
        let props = value_map! { "fontSize": "1rem", "color": "red" };
        // BTreeMap iterates in key order: color before fontSize.
        assert_eq!(props.to_css(), "color: red; font-size: 1rem;");
    }

    #[test]
    fn list_to_css_joins_with_commas() {
        let v = Value::List(vec![Value::from("serif"), Value::from("monospace")]);
        assert_eq!(v.to_css(), "serif, monospace");
    }
}
