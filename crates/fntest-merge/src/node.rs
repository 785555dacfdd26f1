//! The recursive tree model the merge operates on.
//!
//! A [`Tree`] maps keys to [`Node`]s. Leaves (scalars and sequences) are
//! reference counted so that cloning a tree allocates fresh mappings while
//! sharing every leaf with the original.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

/// A non-tree, non-sequence leaf value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
}

/// A value stored in a [`Tree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node<K> {
    /// A nested mapping. Merged recursively when both sides hold one.
    Tree(Tree<K>),
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered sequence. Always replaced as a whole, never merged.
    Sequence(Arc<[Node<K>]>),
}

impl<K> Node<K> {
    /// Returns the nested tree, if this node is one.
    pub fn as_tree(&self) -> Option<&Tree<K>> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Returns `true` if this node is a nested tree.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }
}

impl<K> From<Scalar> for Node<K> {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl<K> From<bool> for Node<K> {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl<K> From<i64> for Node<K> {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl<K> From<i32> for Node<K> {
    fn from(n: i32) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl<K> From<&str> for Node<K> {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.into()))
    }
}

impl<K> From<String> for Node<K> {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s.into()))
    }
}

impl<K> From<Vec<Node<K>>> for Node<K> {
    fn from(items: Vec<Node<K>>) -> Self {
        Self::Sequence(items.into())
    }
}

impl<K> From<Tree<K>> for Node<K> {
    fn from(tree: Tree<K>) -> Self {
        Self::Tree(tree)
    }
}

/// A key/value mapping whose values may recursively be further trees.
///
/// Keys are unique and iterate in key order; insertion order carries no
/// meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree<K> {
    pub(crate) entries: BTreeMap<K, Node<K>>,
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Tree<K> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: K, value: impl Into<Node<K>>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: K, value: impl Into<Node<K>>) -> Option<Node<K>> {
        self.entries.insert(key, value.into())
    }

    pub fn get(&self, key: &K) -> Option<&Node<K>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, Node<K>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Ord> FromIterator<(K, Node<K>)> for Tree<K> {
    fn from_iter<I: IntoIterator<Item = (K, Node<K>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, K> IntoIterator for &'a Tree<K> {
    type Item = (&'a K, &'a Node<K>);
    type IntoIter = btree_map::Iter<'a, K, Node<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---- serde_json interop ----

impl From<Value> for Node<String> {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s.into())),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Self::Tree(map.into()),
        }
    }
}

impl From<Map<String, Value>> for Tree<String> {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Node::from(v))).collect()
    }
}

impl From<&Node<String>> for Value {
    fn from(node: &Node<String>) -> Self {
        match node {
            Node::Tree(tree) => Value::Object(tree.into()),
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            Node::Scalar(Scalar::String(s)) => Value::String(s.to_string()),
            Node::Sequence(items) => Value::Array(items.iter().map(Value::from).collect()),
        }
    }
}

impl From<&Tree<String>> for Map<String, Value> {
    fn from(tree: &Tree<String>) -> Self {
        tree.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect()
    }
}

impl From<Tree<String>> for Value {
    fn from(tree: Tree<String>) -> Self {
        Value::Object((&tree).into())
    }
}
