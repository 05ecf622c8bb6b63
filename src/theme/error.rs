//! Errors from theme construction and themed-composer resolution.
//!
//! All failures here are immediate and synchronous: a failed operation never
//! produces a derived value, and the prior value remains fully usable.

/// Errors from theme construction and resolution.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    /// A variant can only be created from a base theme, never from another
    /// variant.
    #[error("can only create a theme variant from a base theme")]
    VariantFromVariant,

    /// Composed variants must all share the same base theme.
    #[error("all variants must share the same base theme")]
    MixedVariantSources,

    /// A props object carried something in its `theme` field that is neither
    /// absent nor a recognized theme or variant.
    #[error("props carry a theme field that is not a recognized theme or variant")]
    MalformedThemeArg,

    /// A themed composer's path resolved to a primitive leaf in the theme.
    #[error("theme value at `{path}` is not a composer")]
    ValueNotComposer { path: String },

    /// A themed primitive's path resolved to a composer leaf in the theme.
    #[error("theme value at `{path}` is not a primitive")]
    ValueNotPrimitive { path: String },

    /// A recorded getter step resolved to something other than a composer:
    /// the composer type's shape changed incompatibly with the recorded
    /// chain.
    #[error("themed composer getter `{property}` did not yield a composer")]
    GetterNotComposer { property: String },

    /// A recorded method step's invocation did not return a composer.
    #[error("themed composer method `{property}` did not return a composer")]
    MethodNotComposer { property: String },

    /// A recorded member is not declared on the composer the theme supplied.
    #[error("member `{property}` is not declared on the resolved composer")]
    UnknownMember { property: String },

    /// Arguments were applied to something that is not a pending method
    /// reference.
    #[error("only a pending method reference can be called with arguments")]
    CallOnNonMethod,

    /// Resolution was requested while a method reference was pending; it must
    /// be called with arguments first.
    #[error("cannot resolve while a method reference is pending")]
    ResolvePendingMethod,
}
