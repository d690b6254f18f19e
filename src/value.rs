//! Shape classification over parsed documents.
//!
//! Documents are plain `serde_json::Value` trees (built with `preserve_order`,
//! so mapping keys keep document order). Every traversal in the crate matches
//! on [`Shape`] or on `Value` directly so that all six variants are handled.
//!
//! Sequences are homogeneous by convention: wherever a sequence's shape
//! matters, only its first element is inspected.

use serde_json::Value;

/// A parsed document, immutable once handed to the engine.
pub type ValueTree = Value;

/// Type identifier for document values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Sequence,
    Mapping,
}

impl Shape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Shape::Int
                } else {
                    Shape::Float
                }
            }
            Value::String(_) => Shape::Str,
            Value::Array(_) => Shape::Sequence,
            Value::Object(_) => Shape::Mapping,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Float => "float",
            Shape::Str => "str",
            Shape::Sequence => "list",
            Shape::Mapping => "dict",
        }
    }
}

/// A non-empty sequence whose first element is a mapping: a one-to-many branch.
pub fn is_mapping_sequence(value: &Value) -> bool {
    match value {
        Value::Array(items) => matches!(items.first(), Some(Value::Object(_))),
        _ => false,
    }
}

/// Type name reported for a field whose first present value is `value`.
///
/// Sequences report `list of <first element type>`, or `list of unknown` when
/// empty.
pub fn dtype_of(value: &Value) -> String {
    match value {
        Value::Array(items) => match items.first() {
            Some(first) => format!("list of {}", Shape::of(first).type_name()),
            None => String::from("list of unknown"),
        },
        other => Shape::of(other).type_name().to_string(),
    }
}
