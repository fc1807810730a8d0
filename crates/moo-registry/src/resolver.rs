//! Parameter-to-input-path resolution.
//!
//! [`resolve_mapping`] walks a reference input tree and, for each declared
//! parameter, records the dotted path to the first key with the same name.
//!
//! # Traversal Order
//!
//! Entries are visited in their stored order. When an entry's value is a
//! nested mapping, the walk descends into it immediately, before the next
//! sibling is visited, and only while some parameter is still unmatched.
//! The first match wins:
//!
//! ```text
//! {                               f(milk, weight)
//!   "milk": {"morning", ..},  ->  milk   = "milk"        (matched before descending)
//!   "weight": 500,            ->  weight = "weight"
//!   "health": {..}                (never visited, all matched)
//! }
//! ```
//!
//! A match inside an earlier branch beats a shallower key in a later branch,
//! so this is an order-dependent search, not a shortest-path search.

use std::fmt;

use moo_core::{FieldPath, FxHashSet, Record, Value, fx_hash_set_with_capacity};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelSignature;

/// A model's parameter → input path binding.
///
/// Only parameters that matched a key appear in the mapping. Bindings keep
/// the order in which the resolver discovered them; equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct Mapping(Vec<(String, FieldPath)>);

impl Mapping {
    /// Creates an empty mapping.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Binds `param` to `path`, replacing any previous binding in place.
    pub fn insert(&mut self, param: impl Into<String>, path: FieldPath) -> Option<FieldPath> {
        let param = param.into();
        if let Some((_, slot)) = self.0.iter_mut().find(|(p, _)| *p == param) {
            return Some(std::mem::replace(slot, path));
        }
        self.0.push((param, path));
        None
    }

    /// Returns the path bound to `param`.
    #[must_use]
    pub fn get(&self, param: &str) -> Option<&FieldPath> {
        self.0
            .iter()
            .find_map(|(p, path)| (p == param).then_some(path))
    }

    /// Returns `true` if `param` is bound.
    #[inline]
    #[must_use]
    pub fn contains(&self, param: &str) -> bool {
        self.get(param).is_some()
    }

    /// Returns the parameter bound to `path`, if any.
    #[must_use]
    pub fn param_for(&self, path: &FieldPath) -> Option<&str> {
        self.0
            .iter()
            .find_map(|(param, p)| (p == path).then_some(param.as_str()))
    }

    /// Iterates bindings in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldPath)> {
        self.0.iter().map(|(param, path)| (param.as_str(), path))
    }

    /// Returns the number of bound parameters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the declared parameters of `signature` that are not bound.
    pub fn unbound<'a>(&'a self, signature: &'a ModelSignature) -> impl Iterator<Item = &'a str> {
        signature.param_names().filter(|name| !self.contains(name))
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(param, path)| other.get(param) == Some(path))
    }
}

impl Eq for Mapping {}

impl<S: Into<String>, P: Into<FieldPath>> FromIterator<(S, P)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (param, path) in iter {
            mapping.insert(param, path.into());
        }
        mapping
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (param, path) in &self.0 {
            map.serialize_entry(param, path)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = Mapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to dotted paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Mapping, A::Error> {
                let mut mapping = Mapping::new();
                while let Some((param, path)) = access.next_entry::<String, FieldPath>()? {
                    mapping.insert(param, path);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// Computes the mapping for every parameter of `signature` against `schema`.
///
/// # Examples
///
/// ```
/// use moo_core::Record;
/// use moo_registry::{ModelSignature, resolve_mapping};
///
/// let schema: Record = serde_json::from_str(r#"{
///     "milk": {"morning": 10, "evening": 8},
///     "weight": 500,
///     "health": {"temperature": 101.5, "heart_rate": 60}
/// }"#).unwrap();
///
/// let signature = ModelSignature::new("f").param("morning").param("heart_rate").param("age");
/// let mapping = resolve_mapping(&signature, &schema);
///
/// assert_eq!(mapping.get("morning").map(|p| p.as_str()), Some("milk.morning"));
/// assert_eq!(mapping.get("heart_rate").map(|p| p.as_str()), Some("health.heart_rate"));
/// assert!(!mapping.contains("age"));
/// ```
#[must_use]
pub fn resolve_mapping(signature: &ModelSignature, schema: &Record) -> Mapping {
    resolve_paths(signature.param_names(), schema)
}

/// Computes the mapping for an arbitrary list of parameter names.
pub fn resolve_paths<'a>(params: impl IntoIterator<Item = &'a str>, schema: &Record) -> Mapping {
    let params = params.into_iter();
    let mut pending: FxHashSet<&str> = fx_hash_set_with_capacity(params.size_hint().0);
    pending.extend(params);

    let mut mapping = Mapping::new();
    let mut path = Vec::new();
    search(schema, &mut path, &mut pending, &mut mapping);
    mapping
}

fn search<'s>(
    record: &'s Record,
    path: &mut Vec<&'s str>,
    pending: &mut FxHashSet<&str>,
    mapping: &mut Mapping,
) {
    for (key, value) in record.iter() {
        if pending.is_empty() {
            return;
        }

        path.push(key);
        if pending.remove(key) {
            mapping.insert(key, FieldPath::from_segments(path.iter().copied()));
        }
        match value {
            Value::Map(child) if !pending.is_empty() => search(child, path, pending, mapping),
            _ => {}
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    fn cow_schema() -> Record {
        record(
            r#"{
                "milk": {"morning": 10, "evening": 8},
                "weight": 500,
                "health": {"temperature": 101.5, "heart_rate": 60}
            }"#,
        )
    }

    #[test]
    fn test_top_level_parameters() {
        let signature = ModelSignature::new("model_function").param("milk").param("weight");
        let mapping = resolve_mapping(&signature, &cow_schema());
        assert_eq!(
            mapping,
            [("milk", "milk"), ("weight", "weight")]
                .into_iter()
                .collect::<Mapping>()
        );
    }

    #[test]
    fn test_nested_parameters() {
        let mapping = resolve_paths(["evening", "temperature"], &cow_schema());
        assert_eq!(
            mapping,
            [("evening", "milk.evening"), ("temperature", "health.temperature")]
                .into_iter()
                .collect::<Mapping>()
        );
    }

    #[test]
    fn test_unmatched_parameters_are_omitted() {
        let mapping = resolve_paths(["weight", "age"], &cow_schema());
        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains("weight"));
        assert!(!mapping.contains("age"));
    }

    #[test]
    fn test_earlier_branch_beats_shallower_later_key() {
        let schema = record(r#"{"a": {"weight": 1}, "weight": 2}"#);
        let mapping = resolve_paths(["weight"], &schema);
        assert_eq!(mapping.get("weight"), Some(&FieldPath::new("a.weight")));
    }

    #[test]
    fn test_top_level_key_beats_later_nested_key() {
        let schema = record(r#"{"weight": 2, "a": {"weight": 1}}"#);
        let mapping = resolve_paths(["weight"], &schema);
        assert_eq!(mapping.get("weight"), Some(&FieldPath::new("weight")));
    }

    #[test]
    fn test_key_matching_parent_still_descends_for_others() {
        let schema = record(r#"{"milk": {"morning": 10}}"#);
        let mapping = resolve_paths(["milk", "morning"], &schema);
        assert_eq!(mapping.get("milk"), Some(&FieldPath::new("milk")));
        assert_eq!(mapping.get("morning"), Some(&FieldPath::new("milk.morning")));
    }

    #[test]
    fn test_lists_are_not_descended() {
        let schema = record(r#"{"milk": [{"morning": 10}]}"#);
        let mapping = resolve_paths(["morning"], &schema);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_deep_first_match() {
        let schema = record(r#"{"a": {"b": {"c": {"target": 1}}}, "target": 2}"#);
        let mapping = resolve_paths(["target"], &schema);
        assert_eq!(mapping.get("target"), Some(&FieldPath::new("a.b.c.target")));
    }

    #[test]
    fn test_empty_schema() {
        let mapping = resolve_paths(["milk"], &Record::new());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_param_for_and_unbound() {
        let signature = ModelSignature::new("f").param("weight").param("age");
        let mapping = resolve_mapping(&signature, &cow_schema());
        assert_eq!(mapping.param_for(&FieldPath::new("weight")), Some("weight"));
        assert_eq!(mapping.unbound(&signature).collect::<Vec<_>>(), ["age"]);
    }

    #[test]
    fn test_mapping_keeps_discovery_order() {
        let signature = ModelSignature::new("f").param("weight").param("heart_rate").param("morning");
        let mapping = resolve_mapping(&signature, &cow_schema());
        assert_eq!(
            mapping.iter().map(|(param, _)| param).collect::<Vec<_>>(),
            ["morning", "weight", "heart_rate"]
        );

        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(
            json,
            r#"{"morning":"milk.morning","weight":"weight","heart_rate":"health.heart_rate"}"#
        );
        let parsed: Mapping = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.iter().map(|(param, _)| param).collect::<Vec<_>>(),
            ["morning", "weight", "heart_rate"]
        );
    }

    #[test]
    fn test_mapping_serializes_as_object() {
        let mapping: Mapping = [("milk", "milk.morning")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&mapping).unwrap(),
            r#"{"milk":"milk.morning"}"#
        );
    }
}
