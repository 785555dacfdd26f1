//! Unstructured manifests.
//!
//! An [`Object`] is a JSON object with conventional `apiVersion`, `kind` and
//! `metadata` fields. Accessors return empty values for missing fields
//! rather than failing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Struct;

/// Group, version and kind identifying an object's type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Split an `apiVersion` (`group/version`, or `version` for the core
    /// group) and pair it with `kind`.
    pub fn from_api_version_kind(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((g, v)) => (g, v),
            None => ("", api_version),
        };
        Self::new(group, version, kind)
    }

    /// The `apiVersion` string for this group and version.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

/// An unstructured object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object {
    content: Struct,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_struct(content: Struct) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &Struct {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Struct {
        &mut self.content
    }

    pub fn into_content(self) -> Struct {
        self.content
    }

    pub fn api_version(&self) -> &str {
        self.string_field(&["apiVersion"])
    }

    pub fn set_api_version(&mut self, api_version: impl Into<String>) {
        self.content
            .insert("apiVersion".into(), Value::String(api_version.into()));
    }

    pub fn kind(&self) -> &str {
        self.string_field(&["kind"])
    }

    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.content.insert("kind".into(), Value::String(kind.into()));
    }

    pub fn name(&self) -> &str {
        self.string_field(&["metadata", "name"])
    }

    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version_kind(self.api_version(), self.kind())
    }

    pub fn set_group_version_kind(&mut self, gvk: &GroupVersionKind) {
        self.set_api_version(gvk.api_version());
        self.set_kind(gvk.kind.clone());
    }

    /// Annotations with string values. Non-string values are skipped.
    pub fn annotations(&self) -> BTreeMap<String, String> {
        match self.nested(&["metadata", "annotations"]) {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.nested(&["metadata", "annotations", key])
            .and_then(Value::as_str)
    }

    /// Replace all annotations. `None` removes the field entirely.
    pub fn set_annotations(&mut self, annotations: Option<BTreeMap<String, String>>) {
        match annotations {
            Some(annotations) => {
                let map: Map<String, Value> = annotations
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                self.metadata_mut().insert("annotations".into(), Value::Object(map));
            }
            None => self.remove_nested_field(&["metadata", "annotations"]),
        }
    }

    /// Remove a single annotation, returning its value.
    pub fn remove_annotation(&mut self, key: &str) -> Option<String> {
        let metadata = match self.content.get_mut("metadata") {
            Some(Value::Object(m)) => m,
            _ => return None,
        };
        match metadata.get_mut("annotations") {
            Some(Value::Object(annotations)) => match annotations.remove(key) {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    /// Look up a value by field path.
    pub fn nested(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.content.get(*first)?;
        for field in rest {
            current = current.as_object()?.get(*field)?;
        }
        Some(current)
    }

    /// Remove the value at a field path. Missing intermediate fields are a
    /// no-op.
    pub fn remove_nested_field(&mut self, path: &[&str]) {
        remove_nested_field(&mut self.content, path);
    }

    fn string_field(&self, path: &[&str]) -> &str {
        self.nested(path).and_then(Value::as_str).unwrap_or("")
    }

    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        let entry = self
            .content
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("metadata was just set to an object"),
        }
    }
}

impl From<Struct> for Object {
    fn from(content: Struct) -> Self {
        Self::from_struct(content)
    }
}

impl From<Object> for Struct {
    fn from(object: Object) -> Self {
        object.content
    }
}

/// Remove the value at `path` from `map`. Missing intermediate fields or
/// non-object intermediates are a no-op.
pub fn remove_nested_field(map: &mut Struct, path: &[&str]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = map;
    for field in parents {
        match current.get_mut(*field) {
            Some(Value::Object(next)) => current = next,
            _ => return,
        }
    }
    current.remove(*last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accessors_on_populated_object() {
        let o = object(json!({
            "apiVersion": "example.org/v1",
            "kind": "Bucket",
            "metadata": {"name": "b1", "annotations": {"a": "1", "b": "2"}}
        }));
        assert_eq!(o.api_version(), "example.org/v1");
        assert_eq!(o.kind(), "Bucket");
        assert_eq!(o.name(), "b1");
        assert_eq!(o.annotation("a"), Some("1"));
        assert_eq!(o.annotations().len(), 2);
        assert_eq!(
            o.group_version_kind(),
            GroupVersionKind::new("example.org", "v1", "Bucket")
        );
    }

    #[test]
    fn accessors_on_empty_object() {
        let o = Object::new();
        assert_eq!(o.api_version(), "");
        assert_eq!(o.name(), "");
        assert!(o.annotations().is_empty());
        assert!(o.annotation("x").is_none());
    }

    #[test]
    fn core_group_api_version() {
        let gvk = GroupVersionKind::from_api_version_kind("v1", "Secret");
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.api_version(), "v1");
        assert_eq!(gvk.to_string(), "/v1, Kind=Secret");
    }

    #[test]
    fn set_group_version_kind_writes_fields() {
        let mut o = Object::new();
        o.set_group_version_kind(&GroupVersionKind::new("internal.example.io", "v1alpha1", "Environment"));
        assert_eq!(o.api_version(), "internal.example.io/v1alpha1");
        assert_eq!(o.kind(), "Environment");
    }

    #[test]
    fn remove_annotation_leaves_others() {
        let mut o = object(json!({"metadata": {"annotations": {"a": "1", "b": "2"}}}));
        assert_eq!(o.remove_annotation("a"), Some("1".to_string()));
        assert_eq!(o.remove_annotation("a"), None);
        assert_eq!(o.annotation("b"), Some("2"));
    }

    #[test]
    fn set_annotations_none_removes_field() {
        let mut o = object(json!({"metadata": {"name": "x", "annotations": {}}}));
        o.set_annotations(None);
        assert_eq!(Value::Object(o.into_content()), json!({"metadata": {"name": "x"}}));
    }

    #[test]
    fn set_annotations_creates_metadata() {
        let mut o = Object::new();
        o.set_annotations(Some(BTreeMap::from([("k".to_string(), "v".to_string())])));
        assert_eq!(o.annotation("k"), Some("v"));
    }

    #[test]
    fn remove_nested_field_paths() {
        let mut o = object(json!({"spec": {"a": {"b": 1, "c": 2}}, "status": "x"}));
        o.remove_nested_field(&["spec", "a", "b"]);
        o.remove_nested_field(&["status", "nope"]);
        o.remove_nested_field(&["missing", "field"]);
        o.remove_nested_field(&[]);
        assert_eq!(
            Value::Object(o.into_content()),
            json!({"spec": {"a": {"c": 2}}, "status": "x"})
        );
    }

    #[test]
    fn non_object_rejected_on_deserialize() {
        assert!(serde_json::from_value::<Object>(json!([1, 2])).is_err());
    }
}
