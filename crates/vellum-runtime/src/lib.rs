#![forbid(unsafe_code)]

//! The reactive core of vellum: one state tree, one document, one bounded
//! synchronization pass per mutation.
//!
//! Control flow: external event (load, input, remote completion) →
//! [`Engine`] mutation → feeds reconciled → exact-match bindings
//! re-projected → overlapping dependent bindings recomputed → persistence
//! snapshot taken.
//!
//! # Invariants
//!
//! 1. **Run to completion**: a synchronization pass finishes before the
//!    next triggering event is processed; the engine is plain owned data on
//!    one thread, so nothing can interleave.
//! 2. **One pass per mutation**: every store mutation reports exactly one
//!    changed path, and the engine runs exactly one pass for it (object
//!    writes fan out inside the store, not here).
//! 3. **Deterministic evaluation order**: elements are visited in document
//!    order and each is evaluated at most once per pass, keeping the
//!    attribute backup bookkeeping consistent between runs.
//! 4. **Fail silent, stay consistent**: no operation in the core has a
//!    fatal path — bad paths, malformed rules, and bad remote responses
//!    degrade to no-ops with at most a tracing event.
//!
//! # Known hazards (documented, not fixed)
//!
//! - A feed does not reflow when an element mutates in place at unchanged
//!   list length; only length changes trigger a re-render.
//! - Remote responses carry no correlation: the last response to arrive
//!   for a pointer wins, even over a newer local write.

pub mod engine;
pub mod evaluate;
pub mod feed;
pub mod page;
pub mod remote;
pub mod rules;
pub mod storage;
pub mod value;
pub mod vocab;

pub use engine::Engine;
pub use remote::{NullTransport, Request, Response, Transport, Verb};
pub use rules::{Comparator, RuleAction, WhenRule};
pub use storage::{FileStorage, MemoryStorage, Storage};
