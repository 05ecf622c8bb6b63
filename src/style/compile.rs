//! Flattening and serializing fragment lists into final CSS output.

use std::rc::Rc;

use crate::style::fragment::StyleFragment;

/// The result of compiling a composer's fragment list: an ordered list of CSS
/// rule strings.
///
/// Cheap to clone (`Rc`-backed). Compilation caches hand out clones of one
/// instance, so [`CompiledStyles::ptr_eq`] can verify reference stability;
/// `PartialEq` compares rule content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledStyles {
    rules: Rc<[String]>,
}

impl CompiledStyles {
    /// Wrap a list of rule strings.
    pub fn new(rules: Vec<String>) -> Self {
        Self {
            rules: Rc::from(rules),
        }
    }

    /// The compiled rule strings, in cascade order.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Join all rules into one CSS string.
    pub fn to_css(&self) -> String {
        self.rules.join(" ")
    }

    /// Returns `true` when both handles share the same underlying rule list
    /// (not merely equal content).
    pub fn ptr_eq(a: &CompiledStyles, b: &CompiledStyles) -> bool {
        Rc::ptr_eq(&a.rules, &b.rules)
    }
}

/// Collapse runs of whitespace in a literal style string and trim it.
/// Empty results are dropped by the caller.
fn simplify_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut last_was_space = false;
    for ch in literal.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

/// Flatten an ordered fragment list into compiled CSS rules.
///
/// Literals are whitespace-simplified, property maps serialize to
/// declarations, nested composers contribute their own compiled output in
/// place, and pre-compiled rule-sets are spliced as-is. Fragment order is
/// preserved so later fragments override earlier ones under cascade
/// semantics.
pub fn compile_fragments(fragments: &[StyleFragment]) -> CompiledStyles {
    let mut rules: Vec<String> = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        match fragment {
            StyleFragment::Literal(literal) => {
                let simplified = simplify_literal(literal);
                if !simplified.is_empty() {
                    rules.push(simplified);
                }
            }
            StyleFragment::Properties(props) => {
                if !props.is_empty() {
                    rules.push(props.to_css());
                }
            }
            StyleFragment::Composer(composer) => {
                rules.extend(composer.compile().rules().iter().cloned());
            }
            StyleFragment::Compiled(compiled) => {
                rules.extend(compiled.rules().iter().cloned());
            }
        }
    }

    CompiledStyles::new(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_map;

    #[test]
    fn literals_are_whitespace_simplified() {
        let compiled = compile_fragments(&[StyleFragment::from(
            "  display:   flex;\n  align-items: center;  ",
        )]);
        assert_eq!(compiled.rules(), ["display: flex; align-items: center;"]);
    }

    #[test]
    fn empty_literals_are_dropped() {
        let compiled = compile_fragments(&[
            StyleFragment::from("   "),
            StyleFragment::from("color: red;"),
        ]);
        assert_eq!(compiled.rules(), ["color: red;"]);
    }

    #[test]
    fn property_maps_serialize_to_declarations() {
        let compiled =
            compile_fragments(&[StyleFragment::from(value_map! { "fontSize": "1rem" })]);
        assert_eq!(compiled.rules(), ["font-size: 1rem;"]);
    }

    #[test]
    fn precompiled_rules_are_spliced() {
        let inner = CompiledStyles::new(vec!["color: red;".into()]);
        let compiled = compile_fragments(&[
            StyleFragment::from("display: flex;"),
            StyleFragment::from(inner),
        ]);
        assert_eq!(compiled.rules(), ["display: flex;", "color: red;"]);
    }

    #[test]
    fn order_is_preserved() {
        let compiled = compile_fragments(&[
            StyleFragment::from("color: red;"),
            StyleFragment::from("color: blue;"),
        ]);
        assert_eq!(compiled.rules(), ["color: red;", "color: blue;"]);
    }

    #[test]
    fn ptr_eq_distinguishes_identity_from_equality() {
        let a = CompiledStyles::new(vec!["color: red;".into()]);
        let b = CompiledStyles::new(vec!["color: red;".into()]);
        assert_eq!(a, b);
        assert!(!CompiledStyles::ptr_eq(&a, &b));
        assert!(CompiledStyles::ptr_eq(&a, &a.clone()));
    }
}
