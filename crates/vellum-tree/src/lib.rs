#![forbid(unsafe_code)]

//! Headless document arena for the vellum binding engine.
//!
//! A [`Document`] is an arena of element nodes: tag, ordered attribute list,
//! text content, form value, and parent/child links. It stands in for a live
//! HTML document — the binding engine scans it by attribute query, clones
//! subtrees for list templates, and writes projected values back into it.
//!
//! # Invariants
//!
//! 1. **Document order is deterministic**: traversal and attribute queries
//!    visit elements in pre-order from the root; two passes over an
//!    unchanged document yield identical sequences.
//! 2. **Attribute order is declaration order**: setting an existing
//!    attribute updates it in place; new attributes append at the end.
//! 3. **Detached nodes are invisible to queries**: only elements reachable
//!    from the root are returned by [`Document::with_attr`] and friends.
//!    Detached subtrees (captured templates) stay alive in the arena until
//!    explicitly removed.
//! 4. **Slot reuse never aliases**: a freed slot may be reused by a later
//!    `create_element`, but no freed [`NodeId`] is ever handed back to the
//!    caller by the document itself.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Accessor on a freed/foreign id | Empty/default result, `warn!` |
//! | Mutator on a freed/foreign id | No-op, `warn!` |
//! | `append` creating a cycle | No-op, `warn!` |

mod document;
mod node;

pub use document::Document;
pub use node::NodeId;
