//! Field and array path discovery
//!
//! A single depth-first walk over a document collects every leaf-reachable
//! field path and every array path (a sequence of mappings, where one record
//! fans out into many). Each recursive call builds its own [`Discovery`] and
//! hands it back to the caller for merging, so no accumulator outlives the
//! call that created it.

use crate::types::FieldPath;
use crate::value::is_mapping_sequence;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Result of walking one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Every leaf-reachable path
    pub fields: BTreeSet<FieldPath>,

    /// Every path holding a non-empty sequence of mappings
    pub arrays: BTreeSet<FieldPath>,
}

impl Discovery {
    fn merge(&mut self, other: Discovery) {
        self.fields.extend(other.fields);
        self.arrays.extend(other.arrays);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.arrays.is_empty()
    }

    pub fn is_field(&self, path: &FieldPath) -> bool {
        self.fields.contains(path)
    }

    pub fn is_array(&self, path: &FieldPath) -> bool {
        self.arrays.contains(path)
    }

    /// Array paths ordered by depth, deepest first. Paths of equal depth keep
    /// their lexicographic order so the result is deterministic.
    pub fn arrays_deepest_first(&self) -> Vec<&FieldPath> {
        let mut arrays: Vec<&FieldPath> = self.arrays.iter().collect();
        arrays.sort_by(|a, b| b.depth().cmp(&a.depth()).then_with(|| a.cmp(b)));
        arrays
    }

    /// Fields rendered with `delimiter`, sorted lexicographically.
    pub fn list_fields(&self, delimiter: &str) -> Vec<String> {
        let mut rendered: Vec<String> = self.fields.iter().map(|p| p.render(delimiter)).collect();
        rendered.sort();
        rendered
    }
}

/// Walk `tree` and collect its field and array paths.
pub fn discover(tree: &Value) -> Discovery {
    let mut found = walk(tree, &FieldPath::root());

    // A path that is empty in one record and a sequence of mappings in
    // another is a branch point, not a leaf.
    let arrays = &found.arrays;
    found.fields.retain(|p| !arrays.contains(p));

    debug!(
        fields = found.fields.len(),
        arrays = found.arrays.len(),
        "Discovered document paths"
    );
    found
}

fn walk(tree: &Value, prefix: &FieldPath) -> Discovery {
    match tree {
        Value::Object(map) => walk_mapping(map, prefix),
        Value::Array(items) => walk_sequence(items, prefix),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Discovery::default(),
    }
}

/// Only sequences of mappings are descended; a sequence of scalars was
/// already recorded as a field by the caller.
fn walk_sequence(items: &[Value], prefix: &FieldPath) -> Discovery {
    let mut found = Discovery::default();

    if !matches!(items.first(), Some(Value::Object(_))) {
        return found;
    }

    for item in items {
        if let Value::Object(map) = item {
            found.merge(walk_mapping(map, prefix));
        }
    }

    found
}

fn walk_mapping(map: &Map<String, Value>, prefix: &FieldPath) -> Discovery {
    let mut found = Discovery::default();

    for (key, value) in map.iter() {
        let path = prefix.child(key);

        match value {
            Value::Object(sub) => {
                found.merge(walk_mapping(sub, &path));
            }
            Value::Array(items) if is_mapping_sequence(value) => {
                found.merge(walk_sequence(items, &path));
                found.arrays.insert(path);
            }
            // Scalars, nulls, empty sequences and sequences of non-mappings
            // are all single (possibly multi-valued) fields.
            Value::Array(_) | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                found.fields.insert(path);
            }
        }
    }

    found
}
