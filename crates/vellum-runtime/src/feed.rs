//! List projection: repeat a captured template per array element.
//!
//! A `data-feed="<path>"` element's initial children are captured ONCE as
//! its template and detached into the cache. On every pass that touches the
//! feed, the array at the path is resolved and the children are rebuilt:
//! one template instantiation per element, with `..value` rewritten to the
//! element's own path (`<path>.<i>`) and `..index` to the 1-based position
//! in every attribute name and value of the clone.
//!
//! # Invariants
//!
//! 1. The template is captured before the first render and never
//!    overwritten, so re-renders always start from the original markup.
//! 2. A feed whose resolved length equals its last rendered length is left
//!    alone (in-place element mutation does not reflow; see the crate
//!    docs).
//! 3. A non-array resolution (the missing sentinel included) renders as
//!    length zero.
//! 4. Removing rendered children also evicts any nested feed state they
//!    carried, so recycled node ids can never inherit a stale template.

use ahash::AHashMap;
use serde_json::Value;
use tracing::warn;
use vellum_state::Store;
use vellum_tree::{Document, NodeId};

use crate::evaluate;
use crate::vocab;

/// Nesting cutoff for feeds instantiated inside feed clones. Legitimate
/// nesting is bounded by the data tree; hitting this means a template
/// re-binds its own path.
const MAX_FEED_DEPTH: usize = 16;

#[derive(Debug, Default)]
struct FeedState {
    /// The captured template children, detached and owned by the cache.
    template: Vec<NodeId>,
    /// Length of the last render; `None` before the first.
    len: Option<usize>,
}

/// Per-document feed bookkeeping: captured templates and rendered lengths.
#[derive(Debug, Default)]
pub struct FeedCache {
    states: AHashMap<NodeId, FeedState>,
}

impl FeedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all feed state under `root` (inclusive), freeing any captured
    /// template subtrees. Call before removing rendered markup.
    pub fn forget_subtree(&mut self, doc: &mut Document, root: NodeId) {
        for id in doc.descendants(root) {
            if let Some(state) = self.states.remove(&id) {
                for node in state.template {
                    doc.remove_subtree(node);
                }
            }
        }
    }
}

/// Reconcile feeds against the store.
///
/// With a `path`, only feeds bound to exactly that path are considered
/// (prefix overlap is the synchronizer's job; it passes the feed's own
/// path back in). Without one, every attached feed is reconciled.
pub fn render_feeds(doc: &mut Document, store: &Store, cache: &mut FeedCache, path: Option<&str>) {
    let feeds = match path {
        Some(p) => doc.with_attr_eq(vocab::FEED, p),
        None => doc.with_attr(vocab::FEED),
    };
    for feed in feeds {
        // Capturing an earlier feed's template can detach later entries
        // (a nested feed is part of that template); only feeds still
        // attached render here. Feeds inside an unexpanded page template
        // stay untouched.
        if doc.is_ancestor(doc.root(), feed) && !doc.is_inert(feed) {
            render_one(doc, store, cache, feed, 0);
        }
    }
}

fn render_one(
    doc: &mut Document,
    store: &Store,
    cache: &mut FeedCache,
    feed: NodeId,
    depth: usize,
) {
    let Some(feed_path) = doc.attr(feed, vocab::FEED).map(str::to_string) else {
        return;
    };
    if depth >= MAX_FEED_DEPTH {
        warn!(%feed_path, "feed nesting cutoff reached; not rendered");
        return;
    }

    // First sight of this feed: its current children ARE the template.
    if !cache.states.contains_key(&feed) {
        let template = doc.take_children(feed);
        cache.states.insert(
            feed,
            FeedState {
                template,
                len: None,
            },
        );
    }

    let len = match store.get(&feed_path) {
        Value::Array(items) => items.len(),
        _ => 0,
    };
    if cache.states[&feed].len == Some(len) {
        return;
    }

    for child in doc.take_children(feed) {
        cache.forget_subtree(doc, child);
        doc.remove_subtree(child);
    }

    let template: Vec<NodeId> = cache.states[&feed].template.clone();
    for index in 0..len {
        let item_path = format!("{feed_path}.{index}");
        let position = (index + 1).to_string();
        for &node in &template {
            let Some(copy) = doc.clone_subtree(node) else {
                continue;
            };
            rewrite_placeholders(doc, copy, &item_path, &position);
            instantiate(doc, store, cache, copy, depth + 1);
            doc.append(feed, copy);
        }
    }

    if let Some(state) = cache.states.get_mut(&feed) {
        state.len = Some(len);
    }
}

/// Evaluate every element of a fresh clone and render the feeds it
/// contains, in the same pass. Recursion depth is bounded by the data
/// tree. Children of a nested feed are its template and are left alone
/// here; its own `render_one` instantiates them.
fn instantiate(
    doc: &mut Document,
    store: &Store,
    cache: &mut FeedCache,
    root: NodeId,
    depth: usize,
) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        evaluate::evaluate(doc, store, id);
        if doc.has_attr(id, vocab::FEED) {
            render_one(doc, store, cache, id, depth);
        } else {
            stack.extend(doc.children(id).iter().rev().copied());
        }
    }
}

/// Substitute `..value` and `..index` throughout the clone's attribute
/// names and values.
///
/// A nested feed's attributes (its path in particular) belong to this
/// scope, but its children are the nested template: their placeholders
/// are the inner scope's to rewrite, so the walk stops there.
fn rewrite_placeholders(doc: &mut Document, root: NodeId, item_path: &str, position: &str) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let attrs: Vec<(String, String)> = doc.attrs(id).to_vec();
        for (name, value) in attrs {
            let new_name = substitute(&name, item_path, position);
            let new_value = substitute(&value, item_path, position);
            if new_name != name {
                doc.remove_attr(id, &name);
                doc.set_attr(id, new_name, new_value);
            } else if new_value != value {
                doc.set_attr(id, name, new_value);
            }
        }
        if !doc.has_attr(id, vocab::FEED) {
            stack.extend(doc.children(id).iter().rev().copied());
        }
    }
}

fn substitute(text: &str, item_path: &str, position: &str) -> String {
    text.replace(vocab::VALUE_TOKEN, item_path)
        .replace(vocab::INDEX_TOKEN, position)
}
