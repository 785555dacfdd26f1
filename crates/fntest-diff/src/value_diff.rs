//! Field-level diff: compare two JSON values path by path.
//!
//! Objects recurse per key. Arrays of equal length recurse per index; arrays
//! of different length and values of different types compare whole.

use std::fmt;

use serde_json::Value;

/// The result of comparing an expected value to an actual one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueDiff {
    pub changes: Vec<FieldChange>,
}

impl ValueDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Fields present only in the actual value.
    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Added { .. }))
            .count()
    }

    /// Fields missing from the actual value.
    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Removed { .. }))
            .count()
    }

    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Modified { .. }))
            .count()
    }
}

impl fmt::Display for ValueDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.changes {
            writeln!(f, "{change}")?;
        }
        Ok(())
    }
}

/// A single difference between two values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldChange {
    /// The field is present only in the actual value.
    Added { path: String, value: Value },
    /// The field is present only in the expected value.
    Removed { path: String, value: Value },
    /// The field is present in both with different values.
    Modified { path: String, old: Value, new: Value },
}

impl FieldChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { path, value } => write!(f, "+ {}: {}", display_path(path), value),
            Self::Removed { path, value } => write!(f, "- {}: {}", display_path(path), value),
            Self::Modified { path, old, new } => {
                write!(f, "~ {}: {} -> {}", display_path(path), old, new)
            }
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Compute the field-level diff from `want` to `got`.
pub fn diff_values(want: &Value, got: &Value) -> ValueDiff {
    let mut changes = Vec::new();
    walk(String::new(), want, got, &mut changes);
    ValueDiff { changes }
}

fn walk(path: String, want: &Value, got: &Value, changes: &mut Vec<FieldChange>) {
    match (want, got) {
        (Value::Object(w), Value::Object(g)) => {
            for (key, w_val) in w {
                let child = join_key(&path, key);
                match g.get(key) {
                    Some(g_val) => walk(child, w_val, g_val, changes),
                    None => changes.push(FieldChange::Removed {
                        path: child,
                        value: w_val.clone(),
                    }),
                }
            }
            for (key, g_val) in g {
                if !w.contains_key(key) {
                    changes.push(FieldChange::Added {
                        path: join_key(&path, key),
                        value: g_val.clone(),
                    });
                }
            }
        }
        (Value::Array(w), Value::Array(g)) if w.len() == g.len() => {
            for (i, (w_val, g_val)) in w.iter().zip(g).enumerate() {
                walk(format!("{path}[{i}]"), w_val, g_val, changes);
            }
        }
        _ => {
            if want != got {
                changes.push(FieldChange::Modified {
                    path,
                    old: want.clone(),
                    new: got.clone(),
                });
            }
        }
    }
}

fn join_key(path: &str, key: &str) -> String {
    let segment = if key.contains('.') || key.contains('[') {
        format!("[{key:?}]")
    } else {
        key.to_string()
    };
    if path.is_empty() || segment.starts_with('[') {
        format!("{path}{segment}")
    } else {
        format!("{path}.{segment}")
    }
}
