//! The arena document: slot storage, structure edits, and queries.

use tracing::warn;

use crate::node::{Node, NodeId};

/// Tags treated as editable form elements.
const INPUT_TAGS: [&str; 3] = ["input", "textarea", "select"];

/// An arena-allocated element tree with a fixed root.
///
/// Freed slots are recycled through a free list; see the crate docs for the
/// aliasing and determinism invariants.
#[derive(Clone, Debug)]
pub struct Document {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding a single root element (tag `body`).
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Node::new("body"))],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// The fixed root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live (non-freed) elements, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the document holds only the root element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        match self.slots.get(id.0) {
            Some(Some(node)) => Some(node),
            _ => {
                warn!(node = %id, "access to freed or foreign node");
                None
            }
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => Some(node),
            _ => {
                warn!(node = %id, "mutation of freed or foreign node");
                None
            }
        }
    }

    // ── Creation and structure ──────────────────────────────────────

    /// Create a new, detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        let node = Node::new(tag);
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Appending an ancestor to its own descendant
    /// is refused.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if parent == child || self.is_ancestor(child, parent) {
            warn!(parent = %parent, child = %child, "append would create a cycle");
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Whether the element sits under a `template` element. Queries still
    /// see template content; rendering machinery treats it as inert.
    #[must_use]
    pub fn is_inert(&self, id: NodeId) -> bool {
        let mut cursor = self.node(id).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if self.tag(current).eq_ignore_ascii_case("template") {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    /// Whether `ancestor` is on the parent chain of `id` (strictly above it).
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.node(id).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    /// Detach `id` from its parent. The subtree stays alive in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Detach all children of `parent`, returning them in order.
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children = match self.node_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Vec::new(),
        };
        for &child in &children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
        children
    }

    /// Detach and free the subtree rooted at `id`. The root element itself
    /// cannot be removed.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if id == self.root {
            warn!("refusing to remove the document root");
            return;
        }
        if self.node(id).is_none() {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.slots[current.0].take() {
                stack.extend(node.children);
                self.free.push(current.0);
            }
        }
    }

    /// Deep-copy the subtree rooted at `id`; the copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let source = self.node(id)?.clone();
        let copy = self.create_element(source.tag);
        if let Some(node) = self.node_mut(copy) {
            node.attrs = source.attrs;
            node.text = source.text;
            node.value = source.value;
        }
        for child in source.children {
            if let Some(child_copy) = self.clone_subtree(child) {
                self.append(copy, child_copy);
            }
        }
        Some(copy)
    }

    // ── Element accessors ───────────────────────────────────────────

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| n.tag.as_str())
    }

    /// Whether the element is an editable form element.
    #[must_use]
    pub fn is_input(&self, id: NodeId) -> bool {
        let tag = self.tag(id);
        INPUT_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
    }

    /// The element's text content.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| n.text.as_str())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(node) = self.node_mut(id) {
            node.text = text.into();
        }
    }

    /// The element's form value.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| n.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(node) = self.node_mut(id) {
            node.value = value.into();
        }
    }

    /// The element's parent, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// The element's children, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    // ── Attributes ──────────────────────────────────────────────────

    /// The ordered attribute list.
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        self.node(id).map_or(&[], |n| n.attrs.as_slice())
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present (possibly with an empty value).
    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute, updating in place when it already exists.
    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        if let Some(node) = self.node_mut(id) {
            match node.attrs.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value,
                None => node.attrs.push((name, value)),
            }
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attrs.retain(|(n, _)| n != name);
        }
    }

    // ── Traversal and queries ───────────────────────────────────────

    /// Pre-order traversal of the subtree rooted at `id`, inclusive.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(id).is_none() {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.node(current) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// All elements attached under the root, in document order.
    #[must_use]
    pub fn all_elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
    }

    /// Attached elements carrying attribute `name`, in document order.
    #[must_use]
    pub fn with_attr(&self, name: &str) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|&id| self.has_attr(id, name))
            .collect()
    }

    /// Attached elements where attribute `name` equals `value` exactly.
    #[must_use]
    pub fn with_attr_eq(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|&id| self.attr(id, name) == Some(value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_doc() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let list = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        let root = doc.root();
        doc.append(root, list);
        doc.append(list, a);
        doc.append(list, b);
        (doc, list, a, b)
    }

    #[test]
    fn append_sets_links() {
        let (doc, list, a, b) = small_doc();
        assert_eq!(doc.children(list), &[a, b]);
        assert_eq!(doc.parent(a), Some(list));
        assert_eq!(doc.parent(list), Some(doc.root()));
    }

    #[test]
    fn append_reparents() {
        let (mut doc, list, a, b) = small_doc();
        let other = doc.create_element("ol");
        let root = doc.root();
        doc.append(root, other);
        doc.append(other, a);
        assert_eq!(doc.children(list), &[b]);
        assert_eq!(doc.parent(a), Some(other));
    }

    #[test]
    fn append_refuses_cycle() {
        let (mut doc, list, a, _) = small_doc();
        doc.append(a, list);
        assert_eq!(doc.parent(list), Some(doc.root()));
        doc.append(list, list);
        assert_eq!(doc.parent(list), Some(doc.root()));
    }

    #[test]
    fn detach_hides_from_queries() {
        let (mut doc, list, a, _) = small_doc();
        doc.set_attr(a, "data-view", "x");
        assert_eq!(doc.with_attr("data-view"), vec![a]);
        doc.detach(list);
        assert!(doc.with_attr("data-view").is_empty());
        // Subtree is still alive.
        assert_eq!(doc.attr(a, "data-view"), Some("x"));
    }

    #[test]
    fn take_children_detaches_in_order() {
        let (mut doc, list, a, b) = small_doc();
        let taken = doc.take_children(list);
        assert_eq!(taken, vec![a, b]);
        assert!(doc.children(list).is_empty());
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn remove_subtree_frees_slots() {
        let (mut doc, list, _, _) = small_doc();
        let before = doc.len();
        doc.remove_subtree(list);
        assert_eq!(doc.len(), before - 3);
        // Freed slots are recycled.
        let fresh = doc.create_element("p");
        assert!(doc.attr(fresh, "anything").is_none());
        assert_eq!(doc.tag(fresh), "p");
    }

    #[test]
    fn remove_subtree_keeps_root() {
        let mut doc = Document::new();
        doc.remove_subtree(doc.root());
        assert_eq!(doc.tag(doc.root()), "body");
    }

    #[test]
    fn clone_subtree_is_deep_and_detached() {
        let (mut doc, list, a, _) = small_doc();
        doc.set_attr(a, "class", "item");
        doc.set_text(a, "hello");
        let copy = doc.clone_subtree(list).unwrap();
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.children(copy).len(), 2);
        let copy_a = doc.children(copy)[0];
        assert_ne!(copy_a, a);
        assert_eq!(doc.attr(copy_a, "class"), Some("item"));
        assert_eq!(doc.text(copy_a), "hello");
        // Mutating the copy leaves the original alone.
        doc.set_text(copy_a, "changed");
        assert_eq!(doc.text(a), "hello");
    }

    #[test]
    fn attrs_update_in_place_preserving_order() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.set_attr(el, "one", "1");
        doc.set_attr(el, "two", "2");
        doc.set_attr(el, "one", "updated");
        let names: Vec<&str> = doc.attrs(el).iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert_eq!(doc.attr(el, "one"), Some("updated"));
    }

    #[test]
    fn remove_attr_is_idempotent() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.set_attr(el, "hidden", "");
        doc.remove_attr(el, "hidden");
        doc.remove_attr(el, "hidden");
        assert!(!doc.has_attr(el, "hidden"));
    }

    #[test]
    fn document_order_is_preorder() {
        let (mut doc, list, a, b) = small_doc();
        let tail = doc.create_element("footer");
        let root = doc.root();
        doc.append(root, tail);
        assert_eq!(doc.all_elements(), vec![root, list, a, b, tail]);
    }

    #[test]
    fn with_attr_eq_matches_exactly() {
        let (mut doc, _, a, b) = small_doc();
        doc.set_attr(a, "data-sync", "user.name");
        doc.set_attr(b, "data-sync", "user.names");
        assert_eq!(doc.with_attr_eq("data-sync", "user.name"), vec![a]);
    }

    #[test]
    fn template_content_is_inert() {
        let mut doc = Document::new();
        let tpl = doc.create_element("template");
        let inner = doc.create_element("div");
        let deep = doc.create_element("span");
        doc.append(tpl, inner);
        doc.append(inner, deep);
        let root = doc.root();
        doc.append(root, tpl);

        assert!(!doc.is_inert(tpl));
        assert!(doc.is_inert(inner));
        assert!(doc.is_inert(deep));

        // An expanded copy placed outside the template is live.
        let copy = doc.clone_subtree(inner).unwrap();
        doc.append(root, copy);
        assert!(!doc.is_inert(copy));
    }

    #[test]
    fn input_detection() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        let area = doc.create_element("TEXTAREA");
        let div = doc.create_element("div");
        assert!(doc.is_input(input));
        assert!(doc.is_input(area));
        assert!(!doc.is_input(div));
    }

    #[test]
    fn freed_id_degrades_quietly() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let root = doc.root();
        doc.append(root, el);
        doc.remove_subtree(el);
        assert_eq!(doc.tag(el), "");
        assert_eq!(doc.attr(el, "x"), None);
        doc.set_text(el, "ignored");
    }
}
