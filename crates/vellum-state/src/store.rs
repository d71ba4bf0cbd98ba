//! The state store: one mutable JSON tree plus the mutation operations the
//! synchronizer reacts to.
//!
//! Every mutating operation reports the single path at which the engine
//! must synchronize (or `None` when nothing changed). The store itself
//! knows nothing about documents or bindings; it only owns the tree.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::path;

/// The path at which a synchronization pass is due after a mutation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Change {
    pub path: String,
}

impl Change {
    fn at(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Errors from snapshot replay.
#[derive(Debug)]
pub enum SnapshotError {
    /// The snapshot text was not valid JSON.
    Parse(serde_json::Error),
    /// The snapshot parsed but its root was not an object.
    NotAnObject,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "snapshot is not valid JSON: {err}"),
            Self::NotAnObject => write!(f, "snapshot root is not an object"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// The single mutable state tree.
///
/// The root is always an object; `edit("", null)` resets it to `{}`.
#[derive(Clone, Debug)]
pub struct Store {
    root: Value,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store with an empty root object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Read-only view of the whole tree.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Resolve a path to its value.
    ///
    /// Numeric literals resolve to themselves, the empty path to the whole
    /// tree, and any missing segment to [`Value::Null`].
    #[must_use]
    pub fn get(&self, path: &str) -> Value {
        if path.is_empty() {
            return self.root.clone();
        }
        if let Some(number) = path::literal(path) {
            return Value::Number(number);
        }
        let mut current = &self.root;
        for segment in path::segments(path) {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => {
                    debug!(%path, %segment, "segment not found");
                    return Value::Null;
                }
            }
        }
        current.clone()
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Write a value at a path.
    ///
    /// Plain objects fan out recursively into per-leaf writes (merging with
    /// whatever already lives under the path) and report one change at the
    /// object's own path. Scalars, arrays, and `null` are assigned as
    /// leaves, creating intermediate objects as needed.
    pub fn edit(&mut self, path: &str, value: Value) -> Option<Change> {
        match value {
            Value::Object(map) => {
                for (child_key, child_value) in map {
                    let child_path = join(path, &child_key);
                    self.write(&child_path, child_value);
                }
                Some(Change::at(path))
            }
            value if path.is_empty() => {
                if value.is_null() {
                    self.root = Value::Object(Map::new());
                    Some(Change::at(""))
                } else {
                    warn!("refusing to replace the root with a non-object value");
                    None
                }
            }
            value => {
                *self.leaf_slot(path) = value;
                Some(Change::at(path))
            }
        }
    }

    /// Recursive write helper for object fan-out: same traversal as
    /// [`Store::edit`] but without change reporting.
    fn write(&mut self, path: &str, value: Value) {
        match value {
            Value::Object(map) => {
                for (child_key, child_value) in map {
                    let child_path = join(path, &child_key);
                    self.write(&child_path, child_value);
                }
            }
            value => *self.leaf_slot(path) = value,
        }
    }

    /// Append to the array at `path`.
    ///
    /// `expr` is itself resolved as a path expression, so callers can append
    /// "the value currently at this other path" or a literal index. An
    /// absent or null target becomes a fresh one-element array; anything
    /// else that is not an array is left alone.
    pub fn push(&mut self, path: &str, expr: &str) -> Option<Change> {
        let value = self.get(expr);
        match self.get(path) {
            Value::Null => self.edit(path, Value::Array(vec![value])),
            Value::Array(_) => {
                if let Value::Array(items) = self.leaf_slot(path) {
                    items.push(value);
                }
                Some(Change::at(path))
            }
            _ => {
                warn!(%path, "push target is not an array");
                None
            }
        }
    }

    /// Remove the `index`-th element (1-based) of the array at `path`.
    ///
    /// Removing the last remaining element writes `null` at the path.
    /// A missing or non-array target is a no-op; an out-of-range index
    /// removes nothing but still reports the path.
    pub fn pull(&mut self, path: &str, index: usize) -> Option<Change> {
        let emptied = match self.resolve_mut(path) {
            Some(Value::Array(items)) => {
                if index >= 1 && index <= items.len() {
                    items.remove(index - 1);
                }
                items.is_empty()
            }
            _ => {
                debug!(%path, "pull target is not an array");
                return None;
            }
        };
        if emptied {
            *self.leaf_slot(path) = Value::Null;
        }
        Some(Change::at(path))
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Serialize the whole tree as JSON text.
    #[must_use]
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.root).unwrap_or_else(|err| {
            warn!(%err, "snapshot serialization failed");
            "{}".to_string()
        })
    }

    /// Replay a snapshot through `edit("", …)`.
    pub fn load_snapshot(&mut self, text: &str) -> Result<Change, SnapshotError> {
        let value: Value = serde_json::from_str(text).map_err(SnapshotError::Parse)?;
        if !value.is_object() {
            return Err(SnapshotError::NotAnObject);
        }
        Ok(self
            .edit("", value)
            .expect("object edits always report a change"))
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Mutable slot at `path`, creating intermediate objects along the way.
    /// Array intermediates are indexed (padding with `null` past the end);
    /// scalar intermediates are replaced by empty objects.
    fn leaf_slot(&mut self, path: &str) -> &mut Value {
        let mut current = &mut self.root;
        for segment in path::segments(path) {
            let index = if current.is_array() {
                segment.parse::<usize>().ok()
            } else {
                None
            };
            current = if let Some(index) = index {
                let items = current.as_array_mut().expect("checked is_array");
                if index >= items.len() {
                    items.resize(index + 1, Value::Null);
                }
                &mut items[index]
            } else {
                if !current.is_object() {
                    *current = Value::Object(Map::new());
                }
                object_entry(current, segment)
            };
        }
        current
    }

    /// Mutable slot at `path` without creating anything.
    fn resolve_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for segment in path::segments(path) {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                Value::Array(items) => {
                    let index = segment.parse::<usize>().ok()?;
                    items.get_mut(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

fn join(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

fn object_entry<'a>(value: &'a mut Value, key: &str) -> &'a mut Value {
    value
        .as_object_mut()
        .expect("caller just ensured an object")
        .entry(key.to_string())
        .or_insert(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edit_then_get_round_trips_scalars() {
        let mut store = Store::new();
        store.edit("user.name", json!("Ann"));
        assert_eq!(store.get("user.name"), json!("Ann"));
        store.edit("user.age", json!(41));
        assert_eq!(store.get("user.age"), json!(41));
        store.edit("user.active", json!(true));
        assert_eq!(store.get("user.active"), json!(true));
        store.edit("user.note", Value::Null);
        assert_eq!(store.get("user.note"), Value::Null);
    }

    #[test]
    fn edit_round_trips_arrays_as_leaves() {
        let mut store = Store::new();
        store.edit("user.tags", json!(["x", "y"]));
        assert_eq!(store.get("user.tags"), json!(["x", "y"]));
        assert_eq!(store.get("user.tags.1"), json!("y"));
    }

    #[test]
    fn object_edit_fans_out_with_one_change() {
        let mut store = Store::new();
        let change = store
            .edit("user", json!({"name": "Ann", "tags": ["x"], "pet": {"name": "Rex"}}))
            .unwrap();
        assert_eq!(change.path, "user");
        assert_eq!(store.get("user.name"), json!("Ann"));
        assert_eq!(store.get("user.tags"), json!(["x"]));
        assert_eq!(store.get("user.pet.name"), json!("Rex"));
    }

    #[test]
    fn object_edit_merges_instead_of_replacing() {
        let mut store = Store::new();
        store.edit("user.name", json!("Ann"));
        store.edit("user", json!({"age": 41}));
        assert_eq!(store.get("user.name"), json!("Ann"));
        assert_eq!(store.get("user.age"), json!(41));
    }

    #[test]
    fn deep_write_creates_intermediates() {
        let mut store = Store::new();
        let change = store.edit("a.b.c.d", json!(1)).unwrap();
        assert_eq!(change.path, "a.b.c.d");
        assert_eq!(store.get("a.b.c.d"), json!(1));
        assert_eq!(store.get("a.b"), json!({"c": {"d": 1}}));
    }

    #[test]
    fn scalar_intermediate_is_replaced() {
        let mut store = Store::new();
        store.edit("a", json!(5));
        store.edit("a.b", json!(1));
        assert_eq!(store.get("a.b"), json!(1));
    }

    #[test]
    fn array_index_write_pads_with_null() {
        let mut store = Store::new();
        store.edit("arr", json!([1]));
        store.edit("arr.3", json!(9));
        assert_eq!(store.get("arr"), json!([1, null, null, 9]));
    }

    #[test]
    fn get_numeric_literal_ignores_tree() {
        let mut store = Store::new();
        store.edit("3", json!("shadow"));
        assert_eq!(store.get("3"), json!(3));
        assert_eq!(store.get("2.5"), json!(2.5));
    }

    #[test]
    fn get_missing_is_null() {
        let store = Store::new();
        assert_eq!(store.get("nope.nothing"), Value::Null);
    }

    #[test]
    fn get_empty_path_is_root() {
        let mut store = Store::new();
        store.edit("k", json!(1));
        assert_eq!(store.get(""), json!({"k": 1}));
    }

    #[test]
    fn push_on_absent_creates_singleton() {
        let mut store = Store::new();
        store.edit("draft", json!("hello"));
        let change = store.push("items", "draft").unwrap();
        assert_eq!(change.path, "items");
        assert_eq!(store.get("items"), json!(["hello"]));
    }

    #[test]
    fn push_appends_preserving_order() {
        let mut store = Store::new();
        store.edit("items", json!(["a"]));
        store.push("items", "7");
        assert_eq!(store.get("items"), json!(["a", 7]));
    }

    #[test]
    fn push_on_scalar_is_noop() {
        let mut store = Store::new();
        store.edit("items", json!("not a list"));
        assert!(store.push("items", "1").is_none());
        assert_eq!(store.get("items"), json!("not a list"));
    }

    #[test]
    fn pull_is_one_based_and_collapses_to_null() {
        let mut store = Store::new();
        store.edit("user.tags", json!(["x", "y"]));
        store.pull("user.tags", 1);
        assert_eq!(store.get("user.tags"), json!(["y"]));
        store.pull("user.tags", 1);
        assert_eq!(store.get("user.tags"), Value::Null);
    }

    #[test]
    fn pull_out_of_range_removes_nothing() {
        let mut store = Store::new();
        store.edit("tags", json!(["x"]));
        assert!(store.pull("tags", 5).is_some());
        assert_eq!(store.get("tags"), json!(["x"]));
        assert!(store.pull("missing", 1).is_none());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut store = Store::new();
        store.edit("user", json!({"name": "Ann", "tags": ["x", "y"]}));
        let text = store.snapshot();

        let mut restored = Store::new();
        let change = restored.load_snapshot(&text).unwrap();
        assert_eq!(change.path, "");
        assert_eq!(restored.get("user.name"), json!("Ann"));
        assert_eq!(restored.get("user.tags"), json!(["x", "y"]));
    }

    #[test]
    fn load_snapshot_rejects_garbage() {
        let mut store = Store::new();
        store.edit("k", json!(1));
        assert!(matches!(
            store.load_snapshot("not json"),
            Err(SnapshotError::Parse(_))
        ));
        assert!(matches!(
            store.load_snapshot("[1,2]"),
            Err(SnapshotError::NotAnObject)
        ));
        assert_eq!(store.get("k"), json!(1));
    }

    #[test]
    fn edit_root_null_resets() {
        let mut store = Store::new();
        store.edit("k", json!(1));
        store.edit("", Value::Null);
        assert_eq!(store.get(""), json!({}));
    }

    #[test]
    fn end_to_end_scenario() {
        let mut store = Store::new();
        store.edit("user", json!({"name": "Ann", "tags": ["x", "y"]}));
        store.edit("user.name", json!("Bo"));
        assert_eq!(store.get("user.name"), json!("Bo"));
        store.pull("user.tags", 1);
        assert_eq!(store.get("user.tags"), json!(["y"]));
        store.pull("user.tags", 1);
        assert_eq!(store.get("user.tags"), Value::Null);
    }
}

#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,6}"
    }

    fn tree_path() -> impl Strategy<Value = String> {
        proptest::collection::vec(segment(), 1..4).prop_map(|segs| segs.join("."))
    }

    fn leaf_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[ -~]{0,12}".prop_map(Value::String),
            proptest::collection::vec(any::<i32>(), 0..4).prop_map(|v| json!(v)),
        ]
    }

    proptest! {
        #[test]
        fn edit_get_round_trip(path in tree_path(), value in leaf_value()) {
            let mut store = Store::new();
            store.edit(&path, value.clone());
            prop_assert_eq!(store.get(&path), value);
        }

        #[test]
        fn push_then_pull_restores(path in tree_path(), items in proptest::collection::vec(any::<i32>(), 1..5)) {
            let mut store = Store::new();
            store.edit(&path, json!(items.clone()));
            store.push(&path, "42");
            store.pull(&path, items.len() + 1);
            prop_assert_eq!(store.get(&path), json!(items));
        }

        #[test]
        fn numeric_literals_resolve_to_themselves(n in any::<i64>()) {
            let store = Store::new();
            prop_assert_eq!(store.get(&n.to_string()), json!(n));
        }
    }
}
