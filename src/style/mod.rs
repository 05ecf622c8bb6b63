//! Style data: fragments held by composers and their compilation to CSS.

pub mod compile;
pub mod fragment;

pub use compile::{compile_fragments, CompiledStyles};
pub use fragment::StyleFragment;
