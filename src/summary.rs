//! Per-field summaries
//!
//! A summary is computed by walking a *frontier* of values down one field
//! path. At each segment the frontier is projected through the key, missing
//! entries are counted and dropped, and whenever the whole frontier consists
//! of sequences it is flattened one level and the crossing is recorded as an
//! array point.

use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::types::FieldPath;
use crate::value::dtype_of;
use serde::Serialize;
use serde_json::Value;

/// Data characteristics of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    /// Every present (non-null) value found at the path, in document order
    pub sample: Vec<Value>,

    /// Type name of the first present value, `list of <type>` for sequences,
    /// `unknown` if nothing is present
    pub dtype: String,

    /// Sequence boundaries crossed while resolving the path
    pub array_points: Vec<FieldPath>,

    /// `missing / (missing + count)`, zero when both are zero
    pub na_fraction: f64,

    /// Number of present values
    pub count: usize,

    /// Number of records where the path was absent or null
    pub missing: usize,

    /// Format shared by every present value, if all are strings
    pub format: Option<Format>,
}

/// Summarizes fields of one document, rejecting paths discovery never produced
pub struct FieldSummarizer<'a> {
    tree: &'a Value,
    discovery: &'a Discovery,
}

impl<'a> FieldSummarizer<'a> {
    pub fn new(tree: &'a Value, discovery: &'a Discovery) -> Self {
        FieldSummarizer { tree, discovery }
    }

    pub fn summarize(&self, path: &FieldPath) -> Result<FieldSummary> {
        if !self.discovery.is_field(path) {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(summarize(self.tree, path))
    }
}

/// Summarize the values found at `path`. Total over any tree and path; a path
/// that never occurs yields an empty summary.
pub fn summarize(tree: &Value, path: &FieldPath) -> FieldSummary {
    let mut frontier: Vec<&Value> = match tree {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![tree],
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Vec::new(),
    };
    let mut array_points = Vec::new();
    let mut missing = 0;

    for (depth, segment) in path.segments().iter().enumerate() {
        if !frontier.is_empty() && frontier.iter().all(|v| v.is_array()) {
            frontier = flatten(frontier);
            array_points.push(path.prefix(depth));
        }

        let mut next = Vec::with_capacity(frontier.len());
        for value in frontier {
            match value.get(segment) {
                Some(Value::Null) | None => missing += 1,
                Some(found) => next.push(found),
            }
        }
        frontier = next;
    }

    if matches!(frontier.first(), Some(Value::Array(_))) {
        array_points.push(path.clone());
    }

    let count = frontier.len();
    let total = missing + count;
    let na_fraction = if total == 0 {
        0.0
    } else {
        missing as f64 / total as f64
    };

    FieldSummary {
        dtype: frontier
            .first()
            .map(|first| dtype_of(first))
            .unwrap_or_else(|| String::from("unknown")),
        format: Format::common(frontier.iter().copied()),
        sample: frontier.into_iter().cloned().collect(),
        array_points,
        na_fraction,
        count,
        missing,
    }
}

fn flatten(frontier: Vec<&Value>) -> Vec<&Value> {
    frontier
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s, ".")
    }

    #[test]
    fn test_scalar_field() {
        let tree = json!({"a": 1, "b": {"c": "x"}});
        let summary = summarize(&tree, &path("b.c"));

        assert_eq!(summary.dtype, "str");
        assert_eq!(summary.count, 1);
        assert_eq!(summary.na_fraction, 0.0);
        assert_eq!(summary.sample, vec![json!("x")]);
        assert!(summary.array_points.is_empty());
    }

    #[test]
    fn test_scalar_array_field() {
        let tree = json!({"tags": ["x", "y"]});
        let summary = summarize(&tree, &path("tags"));

        assert_eq!(summary.dtype, "list of str");
        assert_eq!(summary.count, 1);
        assert_eq!(summary.array_points, vec![path("tags")]);
    }

    #[test]
    fn test_null_field() {
        let summary = summarize(&json!({"a": null}), &path("a"));

        assert_eq!(summary.na_fraction, 1.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.dtype, "unknown");
        assert!(summary.sample.is_empty());
    }

    #[test]
    fn test_field_below_array() {
        let tree = json!({
            "items": [{"x": 1}, {"x": 2}, {"y": 3}, {"x": null}]
        });
        let summary = summarize(&tree, &path("items.x"));

        assert_eq!(summary.count, 2);
        assert_eq!(summary.missing, 2);
        assert_eq!(summary.na_fraction, 0.5);
        assert_eq!(summary.array_points, vec![path("items")]);
        assert_eq!(summary.sample, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_nested_arrays_record_each_crossing() {
        let tree = json!({
            "orders": [
                {"lines": [{"sku": "a"}, {"sku": "b"}]},
                {"lines": [{"sku": "c"}]}
            ]
        });
        let summary = summarize(&tree, &path("orders.lines.sku"));

        assert_eq!(summary.count, 3);
        assert_eq!(summary.array_points, vec![path("orders"), path("orders.lines")]);
    }

    #[test]
    fn test_top_level_sequence() {
        let tree = json!([{"a": 1}, {"a": 2}, {"b": {"c": 3}}]);
        let summary = summarize(&tree, &path("a"));

        assert_eq!(summary.count, 2);
        assert_eq!(summary.missing, 1);
        assert!(summary.array_points.is_empty());
    }

    #[test]
    fn test_path_never_present() {
        let summary = summarize(&json!([]), &path("a"));
        assert_eq!(summary.na_fraction, 0.0);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_empty_list_dtype() {
        let summary = summarize(&json!({"tags": []}), &path("tags"));
        assert_eq!(summary.dtype, "list of unknown");
    }

    #[test]
    fn test_format_hint() {
        let tree = json!([{"at": "2021-01-01"}, {"at": "2021-02-01"}]);
        assert_eq!(summarize(&tree, &path("at")).format, Some(Format::Date));
    }

    #[test]
    fn test_summarizer_rejects_undiscovered_path() {
        let tree = json!({"a": 1});
        let discovery = discover(&tree);
        let summarizer = FieldSummarizer::new(&tree, &discovery);

        assert!(summarizer.summarize(&path("a")).is_ok());
        assert!(matches!(
            summarizer.summarize(&path("b")),
            Err(Error::InvalidPath(_))
        ));
    }
}
