//! The remote gateway: verbs, request construction, and the transport seam.
//!
//! The engine never performs I/O itself. It builds a [`Request`] describing
//! what should happen at the server and hands it to the configured
//! [`Transport`]. A transport that answers immediately returns the
//! [`Response`]; one that defers returns `None` and later feeds the
//! response back through [`Engine::complete`](crate::Engine::complete).
//!
//! # Failure modes
//!
//! | condition                | behavior                                   |
//! |--------------------------|--------------------------------------------|
//! | no transport configured  | request logged and dropped                 |
//! | non-200 response         | logged and dropped, state untouched        |
//! | non-JSON body on success | logged and dropped, state untouched        |

use serde_json::Value;
use tracing::debug;
use vellum_state::Store;

/// Content type of state-carrying request bodies.
const JSON: &str = "application/json";
/// Content type of patch documents.
const JSON_PATCH: &str = "application/json-patch+json";

/// The operations the gateway can ask of a server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verb {
    /// Fetch the subtree at the pointer.
    Get,
    /// Query with the local subtree as criteria; the match comes back.
    Search,
    /// Create from the local subtree; the stored form comes back.
    Post,
    /// Replace the server subtree with the local one.
    Put,
    /// Delete the server subtree.
    Delete,
    /// Apply a patch document to the server subtree.
    Patch,
}

impl Verb {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Search => "SEARCH",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Whether a successful response body should be folded back into the
    /// store at the request's pointer.
    #[must_use]
    pub fn expects_response(self) -> bool {
        matches!(self, Self::Get | Self::Search | Self::Post)
    }

    /// Whether the request carries the local subtree as its body.
    #[must_use]
    pub fn sends_state(self) -> bool {
        matches!(self, Self::Search | Self::Post | Self::Put)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound server operation, fully described.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub verb: Verb,
    /// The state path the operation addresses (`""` for the whole tree).
    pub pointer: String,
    /// Target URL, derived from the pointer.
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

impl Request {
    /// Build a request for `verb` at `pointer`, serializing the local
    /// subtree as the body when the verb calls for it.
    #[must_use]
    pub fn new(verb: Verb, pointer: &str, store: &Store) -> Self {
        let body = verb
            .sends_state()
            .then(|| store.get(pointer))
            .map(|value| serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string()));
        let content_type = body.is_some().then_some(JSON);
        Self {
            verb,
            pointer: pointer.to_string(),
            url: url_for(pointer),
            body,
            content_type,
        }
    }

    /// Build a `PATCH` request carrying an explicit patch document.
    #[must_use]
    pub fn patch(pointer: &str, patch: &Value) -> Self {
        Self {
            verb: Verb::Patch,
            pointer: pointer.to_string(),
            url: url_for(pointer),
            body: Some(serde_json::to_string(patch).unwrap_or_else(|_| "null".to_string())),
            content_type: Some(JSON_PATCH),
        }
    }
}

fn url_for(pointer: &str) -> String {
    format!("/data/{pointer}")
}

/// A completed server operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn ok(&self) -> bool {
        self.status == 200
    }
}

/// The I/O seam.
///
/// Return `Some` to complete the operation synchronously (the engine folds
/// the response in before the call returns); return `None` to take
/// ownership of delivery and complete later via
/// [`Engine::complete`](crate::Engine::complete).
pub trait Transport {
    fn send(&mut self, request: Request) -> Option<Response>;
}

/// The default transport: logs and drops every request.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, request: Request) -> Option<Response> {
        debug!(verb = %request.verb, url = %request.url, "no transport configured; request dropped");
        None
    }
}
