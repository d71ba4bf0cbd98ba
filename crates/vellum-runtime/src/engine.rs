//! The engine: owns the document, the store, and the bookkeeping, and runs
//! one synchronization pass per mutation.

use serde_json::Value;
use tracing::{debug, warn};
use vellum_state::{path, Change, Store};
use vellum_tree::{Document, NodeId};

use crate::evaluate;
use crate::feed::{self, FeedCache};
use crate::remote::{Request, Response, Transport, Verb};
use crate::rules::{self, Comparator};
use crate::storage::{MemoryStorage, Storage};
use crate::vocab;

/// Default persistence key, mirroring the single-tree model: one snapshot
/// per engine.
const DEFAULT_STORAGE_KEY: &str = "data";

/// One document, one state tree, and the machinery keeping them aligned.
///
/// All mutations flow through the engine so that every change triggers
/// exactly one synchronization pass and one persistence snapshot. Direct
/// access to the document is available for building markup; call
/// [`Engine::sync`] with `None` afterwards to bring bindings up to date.
pub struct Engine {
    pub(crate) doc: Document,
    pub(crate) store: Store,
    pub(crate) feeds: FeedCache,
    storage: Box<dyn Storage>,
    transport: Box<dyn Transport>,
    storage_key: String,
}

impl Engine {
    /// Wrap a document with an empty store, in-memory persistence, and no
    /// transport.
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            store: Store::new(),
            feeds: FeedCache::new(),
            storage: Box::new(MemoryStorage::new()),
            transport: Box::new(crate::remote::NullTransport),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Replace the persistence backend.
    #[must_use]
    pub fn with_storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    /// Replace the remote transport.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    /// Persist under a different key (for several engines sharing one
    /// backend).
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Write a value and run the resulting pass.
    pub fn edit(&mut self, path: &str, value: Value) {
        if let Some(change) = self.store.edit(path, value) {
            self.after_change(&change);
        }
    }

    /// Append to the array at `path`; `expr` resolves as a path
    /// expression.
    pub fn push(&mut self, path: &str, expr: &str) {
        if let Some(change) = self.store.push(path, expr) {
            self.after_change(&change);
        }
    }

    /// Remove the `index`-th element (1-based) of the array at `path`.
    pub fn pull(&mut self, path: &str, index: usize) {
        if let Some(change) = self.store.pull(path, index) {
            self.after_change(&change);
        }
    }

    /// Deliver user input to an editable element: update its form value
    /// and write it through the element's edit path.
    pub fn input(&mut self, node: NodeId, text: &str) {
        self.doc.set_value(node, text);
        let Some(path) = evaluate::write_path(&self.doc, node) else {
            debug!(node = %node, "input on an unbound element");
            return;
        };
        self.edit(&path, Value::String(text.to_string()));
    }

    fn after_change(&mut self, change: &Change) {
        let scope = if change.path.is_empty() {
            None
        } else {
            Some(change.path.as_str())
        };
        self.sync(scope);
        self.persist();
    }

    // ── Synchronization ─────────────────────────────────────────────

    /// Bring bindings in line with the store.
    ///
    /// With a path, only feeds and bindings whose dependency overlaps it
    /// (segment-prefix, either direction) are recomputed; with `None`,
    /// every binding is.
    pub fn sync(&mut self, path: Option<&str>) {
        match path {
            None => feed::render_feeds(&mut self.doc, &self.store, &mut self.feeds, None),
            Some(changed) => {
                let mut feed_paths: Vec<String> = Vec::new();
                for id in self.doc.with_attr(vocab::FEED) {
                    if let Some(feed_path) = self.doc.attr(id, vocab::FEED) {
                        if path::overlaps(feed_path, changed)
                            && !feed_paths.iter().any(|p| p == feed_path)
                        {
                            feed_paths.push(feed_path.to_string());
                        }
                    }
                }
                for feed_path in feed_paths {
                    feed::render_feeds(
                        &mut self.doc,
                        &self.store,
                        &mut self.feeds,
                        Some(&feed_path),
                    );
                }
            }
        }
        // Feeds first: the element set below must not contain nodes a
        // feed re-render is about to tear down.
        for id in self.doc.all_elements() {
            if !self.doc.is_inert(id) && self.depends_on(id, path) {
                evaluate::evaluate(&mut self.doc, &self.store, id);
            }
        }
    }

    /// Whether the element has a binding invalidated by a change at
    /// `path` (`None` means "everything is invalidated").
    fn depends_on(&self, id: NodeId, path: Option<&str>) -> bool {
        let doc = &self.doc;
        let Some(changed) = path else {
            return evaluate::read_path(doc, id).is_some()
                || doc.has_attr(id, vocab::ECHO)
                || doc
                    .attrs(id)
                    .iter()
                    .any(|(name, _)| name.starts_with(vocab::WHEN_PREFIX));
        };
        if let Some(read) = evaluate::read_path(doc, id) {
            if path::overlaps(&read, changed) {
                return true;
            }
        }
        if let Some(args) = doc.attr(id, vocab::ARGS) {
            if args
                .split_whitespace()
                .any(|arg| path::overlaps(arg, changed))
            {
                return true;
            }
        }
        doc.attrs(id)
            .iter()
            .filter_map(|(name, value)| rules::parse_when(name, value))
            .any(|rule| {
                path::overlaps(&rule.dep, changed)
                    || matches!(&rule.comparator,
                        Comparator::Equals(arg) if path::overlaps(arg, changed))
            })
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Restore state: replay the stored snapshot if one exists and is
    /// usable, otherwise ask the server for the whole tree.
    pub fn load(&mut self) {
        if let Some(text) = self.storage.get(&self.storage_key) {
            match self.store.load_snapshot(&text) {
                Ok(_) => {
                    self.sync(None);
                    return;
                }
                Err(err) => warn!(%err, "stored snapshot unusable; fetching fresh"),
            }
        }
        self.request(Verb::Get, "");
    }

    fn persist(&mut self) {
        let snapshot = self.store.snapshot();
        self.storage.set(&self.storage_key, &snapshot);
    }

    // ── Remote operations ───────────────────────────────────────────

    /// Run a server operation at `pointer`. A transport that answers
    /// immediately has its response folded in before this returns.
    pub fn request(&mut self, verb: Verb, pointer: &str) {
        let request = Request::new(verb, pointer, &self.store);
        let pointer = pointer.to_string();
        if let Some(response) = self.transport.send(request) {
            self.complete(&pointer, verb, response);
        }
    }

    /// Send a patch document to the server subtree at `pointer`.
    pub fn patch(&mut self, pointer: &str, patch: &Value) {
        let request = Request::patch(pointer, patch);
        let pointer = pointer.to_string();
        if let Some(response) = self.transport.send(request) {
            self.complete(&pointer, Verb::Patch, response);
        }
    }

    /// Fold a completed server operation back in.
    ///
    /// Only response-bearing verbs touch state; failures and unparsable
    /// bodies are logged and dropped, leaving state as it was.
    pub fn complete(&mut self, pointer: &str, verb: Verb, response: Response) {
        if !verb.expects_response() {
            return;
        }
        if !response.ok() {
            warn!(%verb, %pointer, status = response.status, "server operation failed");
            return;
        }
        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => {
                // A server answer refreshes every binding, not just the
                // pointer's overlap set.
                if self.store.edit(pointer, value).is_some() {
                    self.sync(None);
                    self.persist();
                }
            }
            Err(err) => {
                warn!(%verb, %pointer, %err, "server response is not JSON");
            }
        }
    }
}
