use crate::relational::frame::{Column, Frame};
use crate::types::FieldPath;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

/// Flattens mapping-valued columns of a frame into one column per key
///
/// Array paths are division points and are never flattened here, with one
/// exception: the `start` column of a freshly exploded child table, whose
/// rows hold the individual array elements.
pub(crate) struct TableExpander<'a> {
    arrays: &'a BTreeSet<FieldPath>,
}

impl<'a> TableExpander<'a> {
    pub fn new(arrays: &'a BTreeSet<FieldPath>) -> Self {
        TableExpander { arrays }
    }

    /// Expand until no column holding a nested mapping remains.
    pub fn expand(&self, mut frame: Frame, start: Option<&FieldPath>) -> Frame {
        while let Some(index) = self.next_expandable(&frame, start) {
            self.expand_column(&mut frame, index);
        }
        frame
    }

    fn next_expandable(&self, frame: &Frame, start: Option<&FieldPath>) -> Option<usize> {
        frame.columns.iter().enumerate().find_map(|(index, column)| {
            let Column::Field(path) = column else {
                return None;
            };
            if self.arrays.contains(path) && start != Some(path) {
                return None;
            }
            frame
                .rows
                .iter()
                .any(|row| row[index].is_object())
                .then_some(index)
        })
    }

    /// Spread each row's mapping into `<path><delimiter><key>` columns placed
    /// where the original column was. Non-mapping values stay in the original
    /// column, which is dropped once it holds nothing but nulls.
    fn expand_column(&self, frame: &mut Frame, index: usize) {
        let Column::Field(path) = frame.columns[index].clone() else {
            return;
        };

        let values = frame.take_column(index);
        let mut sub_keys: Vec<String> = Vec::new();
        for value in &values {
            if let Value::Object(map) = value {
                for key in map.keys() {
                    if !sub_keys.contains(key) {
                        sub_keys.push(key.clone());
                    }
                }
            }
        }

        let mut spread: Vec<Vec<Value>> = vec![Vec::with_capacity(values.len()); sub_keys.len()];
        let mut leftovers = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::Object(mut map) => {
                    for (key, column) in sub_keys.iter().zip(spread.iter_mut()) {
                        column.push(map.remove(key).unwrap_or(Value::Null));
                    }
                    leftovers.push(Value::Null);
                }
                other => {
                    for column in spread.iter_mut() {
                        column.push(Value::Null);
                    }
                    leftovers.push(other);
                }
            }
        }

        let mut insert_at = index;
        if leftovers.iter().all(Value::is_null) {
            frame.remove_column(index);
        } else {
            for (row, value) in frame.rows.iter_mut().zip(leftovers) {
                row[index] = value;
            }
            insert_at += 1;
        }

        trace!(table = %frame.name, column = %path, keys = sub_keys.len(), "Expanding nested column");

        for (key, values) in sub_keys.iter().zip(spread) {
            frame.insert_column(insert_at, Column::Field(path.child(key)), values);
            insert_at += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn frame_of(values: &[Value]) -> Frame {
        let records: Vec<&Map<String, Value>> =
            values.iter().filter_map(Value::as_object).collect();
        Frame::from_records("t", records)
    }

    fn names(frame: &Frame) -> Vec<String> {
        frame.field_paths().map(|p| p.render(".")).collect()
    }

    #[test]
    fn test_expands_nested_mappings() {
        let docs = [json!({"a": 1, "b": {"c": 2, "d": {"e": 3}}, "z": 0})];
        let arrays = BTreeSet::new();
        let frame = TableExpander::new(&arrays).expand(frame_of(&docs), None);

        assert_eq!(names(&frame), vec!["a", "b.c", "b.d.e", "z"]);
        assert_eq!(frame.rows, vec![vec![json!(1), json!(2), json!(3), json!(0)]]);
    }

    #[test]
    fn test_missing_keys_become_null() {
        let docs = [json!({"b": {"c": 1}}), json!({"b": {"d": 2}}), json!({"b": null})];
        let arrays = BTreeSet::new();
        let frame = TableExpander::new(&arrays).expand(frame_of(&docs), None);

        assert_eq!(names(&frame), vec!["b.c", "b.d"]);
        assert_eq!(frame.rows[0], vec![json!(1), Value::Null]);
        assert_eq!(frame.rows[1], vec![Value::Null, json!(2)]);
        assert_eq!(frame.rows[2], vec![Value::Null, Value::Null]);
    }

    #[test]
    fn test_heterogeneous_column_keeps_scalars() {
        let docs = [json!({"b": 5}), json!({"b": {"c": 1}})];
        let arrays = BTreeSet::new();
        let frame = TableExpander::new(&arrays).expand(frame_of(&docs), None);

        assert_eq!(names(&frame), vec!["b", "b.c"]);
        assert_eq!(frame.rows[0], vec![json!(5), Value::Null]);
        assert_eq!(frame.rows[1], vec![Value::Null, json!(1)]);
    }

    #[test]
    fn test_array_paths_are_left_alone() {
        let docs = [json!({"meta": {"items": [{"x": 1}]}})];
        let arrays: BTreeSet<FieldPath> = [FieldPath::new(["meta", "items"])].into();
        let frame = TableExpander::new(&arrays).expand(frame_of(&docs), None);

        assert_eq!(names(&frame), vec!["meta.items"]);
        assert_eq!(frame.rows[0][0], json!([{"x": 1}]));
    }

    #[test]
    fn test_start_column_may_expand() {
        let items = FieldPath::new(["items"]);
        let arrays: BTreeSet<FieldPath> = [items.clone()].into();
        let mut frame = Frame::new("items");
        frame.columns.push(Column::Field(items.clone()));
        frame.rows = vec![vec![json!({"x": 1})], vec![json!({"x": 2})]];

        let expander = TableExpander::new(&arrays);
        assert_eq!(names(&expander.expand(frame.clone(), None)), vec!["items"]);

        let expanded = expander.expand(frame, Some(&items));
        assert_eq!(names(&expanded), vec!["items.x"]);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let docs = [json!({"a": {"b": {"c": 1}}, "d": [1, 2]})];
        let arrays = BTreeSet::new();
        let expander = TableExpander::new(&arrays);

        let once = expander.expand(frame_of(&docs), None);
        let twice = expander.expand(once.clone(), None);
        assert_eq!(once, twice);
    }
}
