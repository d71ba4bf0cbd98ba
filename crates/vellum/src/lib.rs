#![forbid(unsafe_code)]

//! Vellum: declarative data binding driven entirely by markup attributes.
//!
//! Mark elements up with `data-view`, `data-sync`, `data-feed`, `data-echo`,
//! and `data-when:` attributes, hand the document to an [`Engine`], and
//! every state mutation keeps the document in step:
//!
//! ```
//! use vellum::prelude::*;
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let greeting = doc.create_element("h1");
//! doc.set_attr(greeting, "data-view", "user.name");
//! doc.append(root, greeting);
//!
//! let mut engine = Engine::new(doc);
//! engine.edit("user.name", json!("Ann"));
//! assert_eq!(engine.document().text(greeting), "Ann");
//! ```
//!
//! The workspace splits along the data flow: [`vellum_tree`] owns the
//! document arena, [`vellum_state`] owns the path-addressed state tree,
//! and [`vellum_runtime`] owns the engine that binds the two together.

pub use vellum_runtime as runtime;
pub use vellum_state as state;
pub use vellum_tree as tree;

pub use vellum_runtime::{
    Engine, FileStorage, MemoryStorage, NullTransport, Request, Response, Storage, Transport, Verb,
};
pub use vellum_state::{Store, Value};
pub use vellum_tree::{Document, NodeId};

/// Everything a typical embedding needs in one import.
pub mod prelude {
    pub use crate::runtime::page;
    pub use crate::{
        Document, Engine, FileStorage, MemoryStorage, NodeId, Storage, Store, Transport, Value,
        Verb,
    };
    pub use serde_json::json;
}
