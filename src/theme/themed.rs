//! Themed values: chain recording, replay, and resolution.
//!
//! When a composer is placed into a theme it is replaced by a
//! [`ThemedComposer`]: a wrapper that records member accesses and method
//! calls as a replayable step sequence instead of executing them. Only at
//! resolution time — when a caller supplies a theme, a variant, or nothing —
//! does the wrapper pick the concrete composer for its path, replay every
//! recorded step against it, and compile the result.
//!
//! Wrappers are memoized two ways: recording the same step from the same
//! wrapper returns the identical child wrapper, and resolving the same
//! wrapper against the same concrete composer returns the identical compiled
//! output. Rendering layers shallow-compare both.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::composer::{Composer, MemberKind};
use crate::identity::ObjectId;
use crate::style::compile::CompiledStyles;
use crate::theme::error::ThemeError;
use crate::theme::nested::ThemeLeaf;
use crate::theme::{theme_from_arg, ThemeArg};
use crate::value::Value;

/// One recorded link of a themed composer chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// A member access, tagged with how the member is declared.
    Get { property: Rc<str>, kind: MemberKind },
    /// Application of the pending method reference.
    Apply { args: Vec<Value> },
}

/// Replay a recorded step sequence against a concrete starting composer.
///
/// Every getter step must yield a composer and every method application must
/// return one; anything else means the composer type's shape no longer
/// matches the recorded chain, and the replay fails naming the member.
fn repeat_steps(start: &Composer, steps: &[Step]) -> Result<Composer, ThemeError> {
    let mut current = start.clone();
    let mut pending: Option<Rc<str>> = None;

    for step in steps {
        match step {
            Step::Get {
                property,
                kind: MemberKind::Getter,
            } => {
                let result =
                    current
                        .get_member(property)
                        .ok_or_else(|| ThemeError::UnknownMember {
                            property: property.to_string(),
                        })?;
                current = result
                    .into_composer()
                    .ok_or_else(|| ThemeError::GetterNotComposer {
                        property: property.to_string(),
                    })?;
            }
            Step::Get {
                property,
                kind: MemberKind::Method,
            } => {
                pending = Some(Rc::clone(property));
            }
            Step::Apply { args } => {
                let property = pending.take().ok_or(ThemeError::CallOnNonMethod)?;
                let result =
                    current
                        .call_member(&property, args)
                        .ok_or_else(|| ThemeError::UnknownMember {
                            property: property.to_string(),
                        })?;
                current = result
                    .into_composer()
                    .ok_or_else(|| ThemeError::MethodNotComposer {
                        property: property.to_string(),
                    })?;
            }
        }
    }

    if pending.is_some() {
        return Err(ThemeError::ResolvePendingMethod);
    }

    Ok(current)
}

/// Shared, step-independent data for one themed composer entry.
struct ThemedInfo {
    default_composer: Composer,
    path: Rc<str>,
}

struct ThemedComposerInner {
    info: Rc<ThemedInfo>,
    steps: Vec<Step>,
    /// Same next step from this wrapper → identical child wrapper.
    step_cache: RefCell<HashMap<Step, ThemedComposer>>,
    /// Same resolved concrete composer → identical compiled output.
    resolve_cache: RefCell<HashMap<ObjectId, CompiledStyles>>,
}

/// The result of a member access on a themed composer.
#[derive(Debug, Clone)]
pub enum ThemedAccess {
    /// The access was recorded; keep chaining on the returned wrapper.
    Chained(ThemedComposer),
    /// The name is not a chainable member (or a method reference is already
    /// pending); the access is forwarded to the default composer, unrecorded.
    Default(Composer),
}

impl ThemedAccess {
    /// The chained wrapper, if the access was recorded.
    pub fn into_chained(self) -> Option<ThemedComposer> {
        match self {
            ThemedAccess::Chained(themed) => Some(themed),
            ThemedAccess::Default(_) => None,
        }
    }
}

/// A composer-backed theme entry: records chains, replays them at resolution.
#[derive(Clone)]
pub struct ThemedComposer {
    inner: Rc<ThemedComposerInner>,
}

impl ThemedComposer {
    /// Wrap the default composer registered at `path`.
    pub(crate) fn root(default_composer: Composer, path: Rc<str>) -> Self {
        Self::with_steps(
            Rc::new(ThemedInfo {
                default_composer,
                path,
            }),
            Vec::new(),
        )
    }

    fn with_steps(info: Rc<ThemedInfo>, steps: Vec<Step>) -> Self {
        Self {
            inner: Rc::new(ThemedComposerInner {
                info,
                steps,
                step_cache: RefCell::new(HashMap::new()),
                resolve_cache: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The dotted path this entry is registered at.
    pub fn path(&self) -> &str {
        &self.inner.info.path
    }

    /// The un-themed composer this entry falls back to.
    pub fn default_composer(&self) -> &Composer {
        &self.inner.info.default_composer
    }

    /// The property name of the trailing method-reference step, if the last
    /// recorded step is one.
    fn pending_method(&self) -> Option<&Rc<str>> {
        match self.inner.steps.last() {
            Some(Step::Get {
                property,
                kind: MemberKind::Method,
            }) => Some(property),
            _ => None,
        }
    }

    /// Record `step`, returning the child wrapper. Memoized: the same step
    /// from the same wrapper returns the identical child.
    fn record(&self, step: Step) -> ThemedComposer {
        if let Some(existing) = self.inner.step_cache.borrow().get(&step) {
            return existing.clone();
        }

        let mut steps = self.inner.steps.clone();
        steps.push(step.clone());
        let child = ThemedComposer::with_steps(Rc::clone(&self.inner.info), steps);

        self.inner
            .step_cache
            .borrow_mut()
            .insert(step, child.clone());
        child
    }

    /// Access a member by name.
    ///
    /// Declared getters and methods are recorded as steps. Anything else —
    /// including any access while a method reference is pending — is routed
    /// to the default composer without being recorded.
    pub fn access(&self, name: &str) -> ThemedAccess {
        if self.pending_method().is_some() {
            return ThemedAccess::Default(self.inner.info.default_composer.clone());
        }

        match self.inner.info.default_composer.proto().member_kind(name) {
            Some(kind) => ThemedAccess::Chained(self.record(Step::Get {
                property: Rc::from(name),
                kind,
            })),
            None => ThemedAccess::Default(self.inner.info.default_composer.clone()),
        }
    }

    /// Apply arguments to the pending method reference.
    ///
    /// Only legal when the last recorded step is a method reference.
    pub fn call(&self, args: Vec<Value>) -> Result<ThemedComposer, ThemeError> {
        if self.pending_method().is_none() {
            return Err(ThemeError::CallOnNonMethod);
        }
        Ok(self.record(Step::Apply { args }))
    }

    /// Resolve against a theme, a variant, props, or nothing: pick the
    /// concrete composer for this entry's path, replay every recorded step
    /// against it, and compile.
    ///
    /// A path absent from the supplied theme falls back to the default
    /// composer — partial themes and variants are always valid.
    pub fn resolve(&self, arg: impl Into<ThemeArg>) -> Result<CompiledStyles, ThemeError> {
        if self.pending_method().is_some() {
            return Err(ThemeError::ResolvePendingMethod);
        }

        let source = self.source_composer(&arg.into())?;

        if let Some(cached) = self.inner.resolve_cache.borrow().get(&source.id()) {
            return Ok(cached.clone());
        }

        let replayed = repeat_steps(&source, &self.inner.steps)?;
        let compiled = replayed.compile();

        self.inner
            .resolve_cache
            .borrow_mut()
            .insert(source.id(), compiled.clone());
        Ok(compiled)
    }

    /// Which concrete composer does this resolution argument select?
    fn source_composer(&self, arg: &ThemeArg) -> Result<Composer, ThemeError> {
        let theme = match theme_from_arg(arg)? {
            Some(theme) => theme,
            None => return Ok(self.inner.info.default_composer.clone()),
        };

        match theme.lookup(self.path()) {
            None => Ok(self.inner.info.default_composer.clone()),
            Some(ThemeLeaf::Composer(composer)) => Ok(composer.clone()),
            Some(ThemeLeaf::Value(_)) => Err(ThemeError::ValueNotComposer {
                path: self.path().to_string(),
            }),
        }
    }
}

impl PartialEq for ThemedComposer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ThemedComposer {}

impl std::fmt::Debug for ThemedComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemedComposer")
            .field("path", &self.inner.info.path)
            .field("steps", &self.inner.steps.len())
            .finish()
    }
}

struct ThemedValueInner {
    path: Rc<str>,
    default: Value,
}

/// A primitive theme entry: resolves to whichever value the active theme
/// carries at its path, falling back to the default.
#[derive(Clone)]
pub struct ThemedValue {
    inner: Rc<ThemedValueInner>,
}

impl ThemedValue {
    pub(crate) fn root(default: Value, path: Rc<str>) -> Self {
        Self {
            inner: Rc::new(ThemedValueInner { path, default }),
        }
    }

    /// The dotted path this entry is registered at.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// The value used when no theme overrides this path.
    pub fn default_value(&self) -> &Value {
        &self.inner.default
    }

    /// Resolve against a theme, a variant, props, or nothing.
    pub fn get(&self, arg: impl Into<ThemeArg>) -> Result<Value, ThemeError> {
        let theme = match theme_from_arg(&arg.into())? {
            Some(theme) => theme,
            None => return Ok(self.inner.default.clone()),
        };

        match theme.lookup(&self.inner.path) {
            None => Ok(self.inner.default.clone()),
            Some(ThemeLeaf::Value(value)) => Ok(value.clone()),
            Some(ThemeLeaf::Composer(_)) => Err(ThemeError::ValueNotPrimitive {
                path: self.inner.path.to_string(),
            }),
        }
    }
}

impl PartialEq for ThemedValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ThemedValue {}

impl std::fmt::Debug for ThemedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemedValue")
            .field("path", &self.inner.path)
            .field("default", &self.inner.default)
            .finish()
    }
}
