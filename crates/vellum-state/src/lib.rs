#![forbid(unsafe_code)]

//! Path resolver and state store for the vellum binding engine.
//!
//! The state tree is a single rooted [`serde_json::Value`] object, addressed
//! by dot-separated paths (`"user.tags.0"`). A purely-numeric path string is
//! a literal addressing mode: it denotes the number itself, never a tree
//! location — list item templates rely on this to pass literal indices
//! where a path is expected.
//!
//! # Invariants
//!
//! 1. **No fatal path**: resolution of a missing segment yields
//!    [`serde_json::Value::Null`], never an error; mutations on nonsense
//!    input degrade to no-ops with a tracing event.
//! 2. **Object writes merge**: editing a path with a plain object fans out
//!    into per-leaf writes, so sibling keys at the target survive, and
//!    exactly one [`Change`] is reported (at the object's own path).
//! 3. **Empty-after-pull collapses to null**: removing the last element of
//!    an array writes `null` at the path, distinguishing "no list" from
//!    "empty list" for conditional rendering.
//! 4. **Deep writes create intermediates**: editing a previously-absent
//!    path materializes empty objects along the way instead of erroring.

pub mod path;
mod store;

pub use serde_json::Value;
pub use store::{Change, SnapshotError, Store};
