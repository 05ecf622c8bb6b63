//! Style fragments: the units of style data a composer accumulates.
//!
//! A fragment is opaque to this crate — nothing here interprets CSS. Order is
//! significant: later fragments serialize later and therefore win under
//! cascade semantics.

use std::rc::Rc;

use crate::composer::Composer;
use crate::style::compile::CompiledStyles;
use crate::value::ValueMap;

/// One unit of style data held inside a composer.
///
/// Structural `Hash`/`Eq`: literals and property maps compare by content,
/// nested composers by identity (a composer's derivation discipline already
/// guarantees structurally-equal composers are the same instance), and
/// compiled rule-sets by their rule strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleFragment {
    /// A literal style string, e.g. `"display: flex;"`.
    Literal(Rc<str>),
    /// A structured property map, e.g. `{ fontSize: "1rem" }`.
    Properties(ValueMap),
    /// Another composer, composed in place.
    Composer(Composer),
    /// A previously-compiled rule-set.
    Compiled(CompiledStyles),
}

impl From<&str> for StyleFragment {
    fn from(value: &str) -> Self {
        StyleFragment::Literal(Rc::from(value))
    }
}

impl From<String> for StyleFragment {
    fn from(value: String) -> Self {
        StyleFragment::Literal(Rc::from(value.as_str()))
    }
}

impl From<ValueMap> for StyleFragment {
    fn from(value: ValueMap) -> Self {
        StyleFragment::Properties(value)
    }
}

impl From<Composer> for StyleFragment {
    fn from(value: Composer) -> Self {
        StyleFragment::Composer(value)
    }
}

impl From<CompiledStyles> for StyleFragment {
    fn from(value: CompiledStyles) -> Self {
        StyleFragment::Compiled(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_map;

    #[test]
    fn literal_fragments_compare_by_content() {
        let a = StyleFragment::from("color: red;");
        let b = StyleFragment::from(String::from("color: red;"));
        assert_eq!(a, b);
    }

    #[test]
    fn property_fragments_compare_structurally() {
        let a = StyleFragment::from(value_map! { "color": "red", "width": "100%" });
        let b = StyleFragment::from(value_map! { "width": "100%", "color": "red" });
        assert_eq!(a, b);
    }

    #[test]
    fn different_kinds_never_compare_equal() {
        let literal = StyleFragment::from("color: red;");
        let props = StyleFragment::from(value_map! { "color": "red" });
        assert_ne!(literal, props);
    }
}
