//! Themes, variants, and themed entry points.
//!
//! A [`Theme`] is built once from a nested record of primitives and
//! composers. Construction flattens the record to dotted paths and wraps
//! every leaf in a themed handle ([`ThemedValue`] or [`ThemedComposer`]) that
//! callers chain on and later resolve against a theme, a variant, or nothing.
//! Handles are built at construction and returned by reference-stable lookup,
//! so two accesses of the same path yield the identical handle.
//!
//! A [`ThemeVariant`] overrides a subset of a base theme's paths. Variants of
//! the same base compose; paths no variant overrides keep the base's leaves.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::identity::ObjectId;
use crate::value::Value;

mod error;
mod nested;
mod themed;

pub use error::ThemeError;
pub use nested::{ThemeLeaf, ThemeNode};
pub use themed::{Step, ThemedAccess, ThemedComposer, ThemedValue};

use nested::flatten;

/// A themed handle wrapping one leaf of a theme.
#[derive(Debug, Clone)]
pub enum ThemeEntry {
    Value(ThemedValue),
    Composer(ThemedComposer),
}

struct ThemeInner {
    id: ObjectId,
    /// Raw leaves by dotted path.
    properties: BTreeMap<Rc<str>, ThemeLeaf>,
    /// Wrapped handles by dotted path, built once at construction.
    entries: BTreeMap<Rc<str>, ThemeEntry>,
}

/// A base theme: a flat map from dotted paths to leaves, plus the themed
/// handles wrapping them.
#[derive(Clone)]
pub struct Theme {
    inner: Rc<ThemeInner>,
}

impl Theme {
    /// Build a theme from a nested record.
    pub fn new(input: &ThemeNode) -> Self {
        let properties = flatten(input);
        let entries = properties
            .iter()
            .map(|(path, leaf)| {
                let entry = match leaf {
                    ThemeLeaf::Value(value) => {
                        ThemeEntry::Value(ThemedValue::root(value.clone(), Rc::clone(path)))
                    }
                    ThemeLeaf::Composer(composer) => ThemeEntry::Composer(ThemedComposer::root(
                        composer.clone(),
                        Rc::clone(path),
                    )),
                };
                (Rc::clone(path), entry)
            })
            .collect();

        Self {
            inner: Rc::new(ThemeInner {
                id: ObjectId::next(),
                properties,
                entries,
            }),
        }
    }

    /// This theme's identity.
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// The themed handle at `path`, if any. Reference-stable: the same path
    /// always yields the identical handle.
    pub fn entry(&self, path: &str) -> Option<&ThemeEntry> {
        self.inner.entries.get(path)
    }

    /// The composer handle at `path`, if the leaf there is a composer.
    pub fn composer(&self, path: &str) -> Option<ThemedComposer> {
        match self.inner.entries.get(path) {
            Some(ThemeEntry::Composer(themed)) => Some(themed.clone()),
            _ => None,
        }
    }

    /// The primitive handle at `path`, if the leaf there is a primitive.
    pub fn value(&self, path: &str) -> Option<ThemedValue> {
        match self.inner.entries.get(path) {
            Some(ThemeEntry::Value(themed)) => Some(themed.clone()),
            _ => None,
        }
    }

    /// All registered dotted paths, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.inner.entries.keys().map(|path| path.as_ref())
    }

    /// Derive a variant overriding the paths in `changes`.
    pub fn variant(&self, changes: &ThemeNode) -> ThemeVariant {
        let changed = flatten(changes);
        ThemeVariant {
            inner: Rc::new(VariantInner {
                base: self.clone(),
                lookup: changed.clone(),
                changed,
            }),
        }
    }
}

impl PartialEq for Theme {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Theme {}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("id", &self.inner.id)
            .field("paths", &self.inner.entries.len())
            .finish()
    }
}

struct VariantInner {
    base: Theme,
    /// The leaves consulted at resolution. For a plain variant this holds
    /// only the overridden paths; a path absent here resolves through the
    /// entry's default. Composed variants carry the base's full map merged
    /// with every override.
    lookup: BTreeMap<Rc<str>, ThemeLeaf>,
    /// The overridden paths alone, kept for further composition.
    changed: BTreeMap<Rc<str>, ThemeLeaf>,
}

/// A variant of a base theme: the same paths with some leaves overridden.
#[derive(Clone)]
pub struct ThemeVariant {
    inner: Rc<VariantInner>,
}

impl ThemeVariant {
    /// The theme this variant was derived from.
    pub fn base(&self) -> &Theme {
        &self.inner.base
    }

    /// The dotted paths this variant overrides, in sorted order.
    pub fn changed_paths(&self) -> impl Iterator<Item = &str> {
        self.inner.changed.keys().map(|path| path.as_ref())
    }
}

impl PartialEq for ThemeVariant {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ThemeVariant {}

impl std::fmt::Debug for ThemeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeVariant")
            .field("base", &self.inner.base)
            .field("changed", &self.inner.changed.len())
            .finish()
    }
}

/// Either a base theme or one of its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeOrVariant {
    Theme(Theme),
    Variant(ThemeVariant),
}

impl ThemeOrVariant {
    pub fn is_theme(&self) -> bool {
        matches!(self, ThemeOrVariant::Theme(_))
    }

    pub fn is_variant(&self) -> bool {
        matches!(self, ThemeOrVariant::Variant(_))
    }

    /// The base theme: the theme itself, or the variant's origin.
    pub fn base(&self) -> &Theme {
        match self {
            ThemeOrVariant::Theme(theme) => theme,
            ThemeOrVariant::Variant(variant) => variant.base(),
        }
    }

    /// The leaf this theme or variant supplies at `path`. `None` means the
    /// resolving handle falls back to its default.
    pub fn lookup(&self, path: &str) -> Option<&ThemeLeaf> {
        match self {
            ThemeOrVariant::Theme(theme) => theme.inner.properties.get(path),
            ThemeOrVariant::Variant(variant) => variant.inner.lookup.get(path),
        }
    }
}

impl From<Theme> for ThemeOrVariant {
    fn from(value: Theme) -> Self {
        ThemeOrVariant::Theme(value)
    }
}

impl From<ThemeVariant> for ThemeOrVariant {
    fn from(value: ThemeVariant) -> Self {
        ThemeOrVariant::Variant(value)
    }
}

/// Build a theme from a nested record.
pub fn create_theme(input: &ThemeNode) -> Theme {
    Theme::new(input)
}

/// Derive a variant from a base theme.
///
/// Fails with [`ThemeError::VariantFromVariant`] when `source` is itself a
/// variant; variants always hang directly off a base theme.
pub fn create_theme_variant(
    source: &ThemeOrVariant,
    changes: &ThemeNode,
) -> Result<ThemeVariant, ThemeError> {
    match source {
        ThemeOrVariant::Theme(theme) => Ok(theme.variant(changes)),
        ThemeOrVariant::Variant(_) => Err(ThemeError::VariantFromVariant),
    }
}

/// Merge several variants of the same base into one.
///
/// The result's lookup map carries the base's full leaf set with every
/// variant's overrides applied on top, later variants winning on overlap.
/// Fails with [`ThemeError::MixedVariantSources`] when any variant hangs off
/// a different base.
pub fn compose_theme_variants(
    base: &Theme,
    variants: &[ThemeVariant],
) -> Result<ThemeVariant, ThemeError> {
    let mut changed: BTreeMap<Rc<str>, ThemeLeaf> = BTreeMap::new();
    for variant in variants {
        if variant.base() != base {
            return Err(ThemeError::MixedVariantSources);
        }
        for (path, leaf) in &variant.inner.changed {
            changed.insert(Rc::clone(path), leaf.clone());
        }
    }

    let mut lookup = base.inner.properties.clone();
    for (path, leaf) in &changed {
        lookup.insert(Rc::clone(path), leaf.clone());
    }

    Ok(ThemeVariant {
        inner: Rc::new(VariantInner {
            base: base.clone(),
            lookup,
            changed,
        }),
    })
}

/// The `theme` field of a props record, before validation.
#[derive(Debug, Clone)]
pub enum ThemeField {
    /// A recognized theme or variant.
    Theme(ThemeOrVariant),
    /// Anything else that ended up in the field.
    Other(Value),
}

/// A props record as passed to a resolving render call. Only the `theme`
/// field matters here; an absent field resolves against defaults.
#[derive(Debug, Clone, Default)]
pub struct ThemeProps {
    pub theme: Option<ThemeField>,
}

/// What a themed handle is resolved against.
#[derive(Debug, Clone)]
pub enum ThemeArg {
    /// No theme: resolve against defaults.
    None,
    Theme(Theme),
    Variant(ThemeVariant),
    /// A props record whose `theme` field is consulted.
    Props(ThemeProps),
}

impl From<Theme> for ThemeArg {
    fn from(value: Theme) -> Self {
        ThemeArg::Theme(value)
    }
}

impl From<&Theme> for ThemeArg {
    fn from(value: &Theme) -> Self {
        ThemeArg::Theme(value.clone())
    }
}

impl From<ThemeVariant> for ThemeArg {
    fn from(value: ThemeVariant) -> Self {
        ThemeArg::Variant(value)
    }
}

impl From<&ThemeVariant> for ThemeArg {
    fn from(value: &ThemeVariant) -> Self {
        ThemeArg::Variant(value.clone())
    }
}

impl From<ThemeOrVariant> for ThemeArg {
    fn from(value: ThemeOrVariant) -> Self {
        match value {
            ThemeOrVariant::Theme(theme) => ThemeArg::Theme(theme),
            ThemeOrVariant::Variant(variant) => ThemeArg::Variant(variant),
        }
    }
}

impl From<ThemeProps> for ThemeArg {
    fn from(value: ThemeProps) -> Self {
        ThemeArg::Props(value)
    }
}

/// Extract the theme or variant a resolution argument selects. `Ok(None)`
/// means resolve against defaults.
pub(crate) fn theme_from_arg(arg: &ThemeArg) -> Result<Option<ThemeOrVariant>, ThemeError> {
    match arg {
        ThemeArg::None => Ok(None),
        ThemeArg::Theme(theme) => Ok(Some(ThemeOrVariant::Theme(theme.clone()))),
        ThemeArg::Variant(variant) => Ok(Some(ThemeOrVariant::Variant(variant.clone()))),
        ThemeArg::Props(props) => match &props.theme {
            None => Ok(None),
            Some(ThemeField::Theme(source)) => Ok(Some(source.clone())),
            Some(ThemeField::Other(_)) => Err(ThemeError::MalformedThemeArg),
        },
    }
}
