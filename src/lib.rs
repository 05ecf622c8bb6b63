//! # weft
//!
//! A fluent, immutable style-composition and theming library for generating
//! CSS.
//!
//! weft builds styles the way a builder API builds values: every operation on
//! a [`Composer`] returns a new composer and leaves the receiver untouched.
//! Underneath, an aggressive memoization layer guarantees that structurally
//! identical derivations are *the same object*, so downstream consumers can
//! shallow-compare styles by identity instead of deep-comparing their
//! contents.
//!
//! ## Core Systems
//!
//! - **[`value`]** — Structural values and ordered value maps with CSS serialization
//! - **[`identity`]** — Process-unique object identities for cache keys
//! - **[`map`]** — Slotmap-backed deep multi-key map and value canonicalization
//! - **[`style`]** — Style fragments and compilation into deduplicated rule lists
//! - **[`composer`]** — The immutable composer, config slots, and member tables
//! - **[`theme`]** — Themes, variants, and recorded-chain themed composers

// Foundation
pub mod identity;
pub mod value;

// Memoization machinery
pub mod map;

// Style composition
pub mod composer;
pub mod style;

// Theming
pub mod theme;

pub use composer::{set_reuse_capacity, Composer, ConfigSlot, MemberKind, MemberResult, Prototype};
pub use style::{compile_fragments, CompiledStyles, StyleFragment};
pub use theme::{
    compose_theme_variants, create_theme, create_theme_variant, Theme, ThemeArg, ThemeEntry,
    ThemeError, ThemeField, ThemeLeaf, ThemeNode, ThemeOrVariant, ThemeProps, ThemeVariant,
    ThemedAccess, ThemedComposer, ThemedValue,
};
pub use value::{Number, Value, ValueMap};
