//! Overlay merge of two trees.
//!
//! For every key in both inputs the overlay wins, unless both values are
//! trees, in which case they are merged recursively. A type mismatch at a
//! shared key is not a conflict: the overlay value replaces the base value.

use serde_json::{Map, Value};
use tracing::trace;

use crate::node::{Node, Tree};

/// Merge `overlay` onto `base`, returning a new tree.
///
/// Neither input is modified. Nested trees in the result are freshly
/// allocated; leaf values are shared with whichever input they came from.
pub fn merge<K: Ord + Clone>(base: &Tree<K>, overlay: &Tree<K>) -> Tree<K> {
    trace!(base = base.len(), overlay = overlay.len(), "merging trees");

    let mut entries = base.entries.clone();
    for (key, value) in &overlay.entries {
        let merged = match (entries.get(key), value) {
            (Some(Node::Tree(existing)), Node::Tree(incoming)) => {
                Node::Tree(merge(existing, incoming))
            }
            _ => value.clone(),
        };
        entries.insert(key.clone(), merged);
    }

    Tree { entries }
}

/// Merge `overlay` onto `base` for `serde_json` objects.
///
/// Same rules as [`merge`]: objects on both sides merge recursively, any
/// other overlay value replaces the base value.
pub fn merge_objects(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut out = base.clone();
    for (key, value) in overlay {
        let merged = match (out.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(merge_objects(existing, incoming))
            }
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}
