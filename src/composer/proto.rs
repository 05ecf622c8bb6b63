//! Per-composer-type member tables.
//!
//! Dynamic languages can enumerate an object's getters and methods at
//! runtime; here each composer type declares its chainable members up front
//! in a [`Prototype`]: a table mapping member names to getter or method
//! implementations. The theming layer drives this table generically — it
//! records member names without knowing what any member does, and replays
//! them against whichever concrete composer a theme supplies.

use std::collections::HashMap;
use std::rc::Rc;

use crate::composer::Composer;
use crate::style::compile::CompiledStyles;
use crate::value::Value;

/// How a chainable member resolves on a concrete composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A property access that immediately yields a derived composer.
    Getter,
    /// A named operation that must be invoked with arguments.
    Method,
}

/// What a member produced. Theming replay requires [`MemberResult::Composer`]
/// at every chain position; the other kinds exist so that a member *can*
/// return something else and be caught as a contract violation.
#[derive(Debug, Clone)]
pub enum MemberResult {
    Composer(Composer),
    Value(Value),
    Compiled(CompiledStyles),
}

impl MemberResult {
    /// The composer inside, if this result is one.
    pub fn into_composer(self) -> Option<Composer> {
        match self {
            MemberResult::Composer(composer) => Some(composer),
            _ => None,
        }
    }
}

impl From<Composer> for MemberResult {
    fn from(value: Composer) -> Self {
        MemberResult::Composer(value)
    }
}

impl From<Value> for MemberResult {
    fn from(value: Value) -> Self {
        MemberResult::Value(value)
    }
}

impl From<CompiledStyles> for MemberResult {
    fn from(value: CompiledStyles) -> Self {
        MemberResult::Compiled(value)
    }
}

type GetterFn = Box<dyn Fn(&Composer) -> MemberResult>;
type MethodFn = Box<dyn Fn(&Composer, &[Value]) -> MemberResult>;
type InitFn = Box<dyn Fn(Composer) -> Composer>;

/// The declared member table for one composer type.
pub struct Prototype {
    name: &'static str,
    init: Option<InitFn>,
    getters: HashMap<&'static str, GetterFn>,
    methods: HashMap<&'static str, MethodFn>,
}

impl Prototype {
    /// Start declaring a member table.
    pub fn builder(name: &'static str) -> PrototypeBuilder {
        PrototypeBuilder {
            proto: Prototype {
                name,
                init: None,
                getters: HashMap::new(),
                methods: HashMap::new(),
            },
        }
    }

    /// The shared prototype for plain composers with no chainable members.
    pub fn base() -> Rc<Prototype> {
        thread_local! {
            static BASE: Rc<Prototype> = Prototype::builder("composer").build();
        }
        BASE.with(Rc::clone)
    }

    /// The composer type's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Create a root composer of this type: empty styles and configs, with
    /// the init hook (if any) applied to seed baseline state.
    pub fn instantiate(self: &Rc<Self>) -> Composer {
        let root = Composer::root(Rc::clone(self));
        match &self.init {
            Some(init) => init(root),
            None => root,
        }
    }

    /// Is `name` a declared getter or method?
    pub fn member_kind(&self, name: &str) -> Option<MemberKind> {
        if self.methods.contains_key(name) {
            Some(MemberKind::Method)
        } else if self.getters.contains_key(name) {
            Some(MemberKind::Getter)
        } else {
            None
        }
    }

    /// Evaluate a getter on a concrete composer.
    pub fn get(&self, composer: &Composer, name: &str) -> Option<MemberResult> {
        self.getters.get(name).map(|getter| getter(composer))
    }

    /// Invoke a method on a concrete composer.
    pub fn call(&self, composer: &Composer, name: &str, args: &[Value]) -> Option<MemberResult> {
        self.methods.get(name).map(|method| method(composer, args))
    }
}

impl std::fmt::Debug for Prototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prototype")
            .field("name", &self.name)
            .field("getters", &self.getters.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Builder for [`Prototype`] member tables.
pub struct PrototypeBuilder {
    proto: Prototype,
}

impl PrototypeBuilder {
    /// Set the init hook run on every fresh instance.
    pub fn init(mut self, init: impl Fn(Composer) -> Composer + 'static) -> Self {
        self.proto.init = Some(Box::new(init));
        self
    }

    /// Declare a getter member.
    pub fn getter<R: Into<MemberResult>>(
        mut self,
        name: &'static str,
        getter: impl Fn(&Composer) -> R + 'static,
    ) -> Self {
        self.proto
            .getters
            .insert(name, Box::new(move |composer| getter(composer).into()));
        self
    }

    /// Declare a method member.
    pub fn method<R: Into<MemberResult>>(
        mut self,
        name: &'static str,
        method: impl Fn(&Composer, &[Value]) -> R + 'static,
    ) -> Self {
        self.proto.methods.insert(
            name,
            Box::new(move |composer, args| method(composer, args).into()),
        );
        self
    }

    /// Finish the table.
    pub fn build(self) -> Rc<Prototype> {
        Rc::new(self.proto)
    }
}

/// Declare a [`Prototype`] member table in one expression.
///
/// ```
/// use weft::composer_proto;
///
/// let color = composer_proto!("color", init = |c| c.add_style("color: red;"), {
///     getter "hover" => |c| c.add_style("filter: brightness(1.1);"),
///     method "alpha" => |c, args| c.add_style(format!("opacity: {};", args[0].to_css())),
/// });
/// let root = color.instantiate();
/// assert_eq!(root.compile().rules(), ["color: red;"]);
/// ```
#[macro_export]
macro_rules! composer_proto {
    ($name:literal, init = $init:expr, { $($kind:ident $member:literal => $f:expr),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut builder = $crate::composer::Prototype::builder($name).init($init);
        $( builder = builder.$kind($member, $f); )*
        builder.build()
    }};
    ($name:literal, { $($kind:ident $member:literal => $f:expr),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut builder = $crate::composer::Prototype::builder($name);
        $( builder = builder.$kind($member, $f); )*
        builder.build()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_kind_prefers_declared_table() {
        let proto = composer_proto!("test", {
            getter "hover" => |c: &Composer| c.clone(),
            method "pad" => |c: &Composer, _args: &[Value]| c.clone(),
        });
        assert_eq!(proto.member_kind("hover"), Some(MemberKind::Getter));
        assert_eq!(proto.member_kind("pad"), Some(MemberKind::Method));
        assert_eq!(proto.member_kind("missing"), None);
    }

    #[test]
    fn init_hook_seeds_baseline_state() {
        let proto = composer_proto!("flex", init = |c| c.add_style("display: flex;"), {});
        let root = proto.instantiate();
        assert_eq!(root.compile().rules(), ["display: flex;"]);
    }

    #[test]
    fn base_prototype_is_shared() {
        assert!(Rc::ptr_eq(&Prototype::base(), &Prototype::base()));
    }

    #[test]
    fn getter_evaluates_against_receiver() {
        let proto = composer_proto!("test", {
            getter "red" => |c: &Composer| c.add_style("color: red;"),
        });
        let root = proto.instantiate();
        let derived = proto.get(&root, "red").unwrap().into_composer().unwrap();
        assert_eq!(derived.compile().rules(), ["color: red;"]);
    }

    #[test]
    fn method_receives_arguments() {
        let proto = composer_proto!("test", {
            method "size" => |c: &Composer, args: &[Value]| {
                c.add_style(format!("width: {};", args[0].to_css()))
            },
        });
        let root = proto.instantiate();
        let derived = proto
            .call(&root, "size", &[Value::from("100%")])
            .unwrap()
            .into_composer()
            .unwrap();
        assert_eq!(derived.compile().rules(), ["width: 100%;"]);
    }
}
