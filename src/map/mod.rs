//! Memoization maps: the multi-key trie and the canonicalizing reuser.

pub mod deep;
pub mod reuse;

pub use deep::{DeepMap, KeyPart};
pub use reuse::Reuser;
