//! Structural fingerprints of input trees.
//!
//! An [`InputShape`] keeps the key names and nesting of a [`Record`] and
//! replaces every leaf with its type name. Two cows with equal shapes can
//! safely share one argument mapping.
//!
//! # Examples
//!
//! ```
//! use moo_core::{InputShape, Record};
//!
//! let a: Record = serde_json::from_str(r#"{"milk": {"morning": 10}, "weight": 500}"#).unwrap();
//! let b: Record = serde_json::from_str(r#"{"weight": 740, "milk": {"morning": 12}}"#).unwrap();
//! let c: Record = serde_json::from_str(r#"{"milk": {"morning": 10.5}, "weight": 500}"#).unwrap();
//!
//! assert_eq!(InputShape::of_record(&a), InputShape::of_record(&b));
//! assert_ne!(InputShape::of_record(&a), InputShape::of_record(&c));
//! ```

use crate::{Record, Value};

/// The structure of a [`Value`] with leaf values erased.
#[derive(Debug, Clone)]
pub enum InputShape {
    /// A non-mapping value, identified by [`Value::type_name`].
    Leaf(&'static str),
    /// A mapping, with child shapes in stored key order.
    Map(Vec<(String, InputShape)>),
}

impl InputShape {
    /// Fingerprints a single value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Map(record) => Self::of_record(record),
            other => Self::Leaf(other.type_name()),
        }
    }

    /// Fingerprints a record.
    #[must_use]
    pub fn of_record(record: &Record) -> Self {
        Self::Map(
            record
                .iter()
                .map(|(key, value)| (key.to_owned(), Self::of(value)))
                .collect(),
        )
    }

    /// Converts the shape into a [`Value`] tree whose leaves are type names.
    ///
    /// ```
    /// use moo_core::{InputShape, Record, Value};
    ///
    /// let input: Record = serde_json::from_str(r#"{"weight": 500}"#).unwrap();
    /// let shape = InputShape::of_record(&input).to_value();
    /// assert_eq!(shape.to_string(), r#"{"weight":"int"}"#);
    /// ```
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Leaf(name) => Value::from(*name),
            Self::Map(children) => Value::Map(
                children
                    .iter()
                    .map(|(key, shape)| (key.as_str(), shape.to_value()))
                    .collect(),
            ),
        }
    }

    fn child(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Leaf(_) => None,
            Self::Map(children) => children
                .iter()
                .find_map(|(k, shape)| (k == key).then_some(shape)),
        }
    }
}

/// Key order is not part of a shape's identity.
impl PartialEq for InputShape {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(key, shape)| other.child(key) == Some(shape))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_shape_to_value_matches_type_names() {
        let input = record(
            r#"{
                "milk": {"morning": 10, "evening": 8},
                "weight": 500,
                "health": {"temperature": 101.5, "heart_rate": 60}
            }"#,
        );
        let expected = record(
            r#"{
                "milk": {"morning": "int", "evening": "int"},
                "weight": "int",
                "health": {"temperature": "float", "heart_rate": "int"}
            }"#,
        );
        assert_eq!(
            InputShape::of_record(&input).to_value(),
            Value::Map(expected)
        );
    }

    #[test]
    fn test_missing_nested_key_differs() {
        let full = record(r#"{"milk": {"morning": 10, "evening": 8}}"#);
        let partial = record(r#"{"milk": {"morning": 10}}"#);
        assert_ne!(InputShape::of_record(&full), InputShape::of_record(&partial));
    }

    #[test]
    fn test_leaf_versus_map_differs() {
        let nested = record(r#"{"milk": {"morning": 10}}"#);
        let flat = record(r#"{"milk": 18}"#);
        assert_ne!(InputShape::of_record(&nested), InputShape::of_record(&flat));
    }

    #[test]
    fn test_list_is_a_leaf() {
        let shape = InputShape::of(&Value::List(vec![Value::Int(1)]));
        assert_eq!(shape, InputShape::Leaf("list"));
    }
}
