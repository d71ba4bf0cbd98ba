//! Page switching: swap the `main` region's content for a named template.
//!
//! Pages are declared as `<template data-type="name">` elements anywhere
//! in the document. Template content is inert until expanded: nothing
//! inside renders, feeds included. `goto` clones the named template's
//! children into the first `main` element, tearing the previous page (and
//! its feed state) down first, then runs a full synchronization pass so
//! the new page binds immediately.

use tracing::warn;
use vellum_tree::NodeId;

use crate::engine::Engine;
use crate::vocab;

/// Switch the `main` region to the page template named `name`.
///
/// Returns `false` (and changes nothing) when there is no such template
/// or no `main` element.
pub fn goto(engine: &mut Engine, name: &str) -> bool {
    let Some(template) = find_template(engine, name) else {
        warn!(page = %name, "no template for page");
        return false;
    };
    let Some(main) = find_main(engine) else {
        warn!("document has no main element");
        return false;
    };

    for child in engine.doc.take_children(main) {
        engine.feeds.forget_subtree(&mut engine.doc, child);
        engine.doc.remove_subtree(child);
    }
    for child in engine.doc.children(template).to_vec() {
        if let Some(copy) = engine.doc.clone_subtree(child) {
            engine.doc.append(main, copy);
        }
    }

    engine.sync(None);
    true
}

fn find_template(engine: &Engine, name: &str) -> Option<NodeId> {
    engine
        .doc
        .with_attr_eq(vocab::PAGE_TYPE, name)
        .into_iter()
        .find(|&id| engine.doc.tag(id).eq_ignore_ascii_case("template"))
}

fn find_main(engine: &Engine) -> Option<NodeId> {
    engine
        .doc
        .all_elements()
        .into_iter()
        .find(|&id| engine.doc.tag(id).eq_ignore_ascii_case("main"))
}
