//! Node identity and the element record stored per arena slot.

use core::fmt;

/// Handle to an element in a [`Document`](crate::Document) arena.
///
/// Ids are only meaningful for the document that produced them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element: tag, ordered attributes, text content, form value, links.
#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
    pub tag: String,
    /// Ordered `(name, value)` pairs; set-in-place preserves position.
    pub attrs: Vec<(String, String)>,
    /// Rendered text content (the `innerHTML`/`innerText` stand-in).
    pub text: String,
    /// Editable value for form elements.
    pub value: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }
}
