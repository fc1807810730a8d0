//! A single simulated subject.
//!
//! A [`Cow`] owns its input tree and the results of every model run against
//! it. Results and their [`RunMetadata`] are written together, under the
//! same result id, and only when the run succeeds.
//!
//! # Examples
//!
//! ```
//! use moo_core::{Record, Value};
//! use moo_herd::Cow;
//! use moo_registry::{Mapping, Model, ModelSignature};
//!
//! let input: Record = serde_json::from_str(
//!     r#"{"milk": {"morning": 10, "evening": 8}, "weight": 500}"#,
//! ).unwrap();
//! let mut cow = Cow::new(1, input);
//!
//! let model = Model::new(ModelSignature::new("total").param("milk").param("weight"), |args| {
//!     let milk = args.record("milk")?;
//!     let yield_ = milk.iter().filter_map(|(_, v)| v.as_i64()).sum::<i64>();
//!     Ok(Value::Int(yield_ + args.require("weight")?.as_i64().unwrap_or(0)))
//! });
//! let mapping: Mapping = [("milk", "milk"), ("weight", "weight")].into_iter().collect();
//!
//! let result_id = cow.run_model(&model, &mapping).unwrap();
//! assert_eq!(cow.get_result(&result_id), Some(&Value::Int(518)));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use moo_core::{CowId, FieldPath, InputShape, PathError, Record, Value};
use moo_registry::{Mapping, Model};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RunError;

/// What happened during one successful model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The model's declared name.
    pub model_name: String,
    /// Wall-clock time the invocation started.
    pub start_time: DateTime<Utc>,
    /// Wall-clock time the invocation returned.
    pub end_time: DateTime<Utc>,
    /// Elapsed seconds, measured with a monotonic clock.
    pub run_time: f64,
    /// The arguments resolved from the cow's input and passed to the model.
    pub input_args: Record,
    /// Defaulted parameters that had no mapped input, with the defaults used.
    pub default_args: Record,
}

/// One entity in a herd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cow {
    cow_id: CowId,
    input: Record,
    /// Insertion ordered, so listings show runs in execution order.
    #[serde(default)]
    results: Record,
    #[serde(default)]
    metadata: BTreeMap<String, RunMetadata>,
    /// Successful runs so far; the suffix of the next result id.
    #[serde(default)]
    runs: u64,
}

impl Cow {
    /// Creates a cow with no results.
    ///
    /// The identifier is coerced to a string: `Cow::new(1, ..)` has id `"1"`.
    pub fn new(id: impl fmt::Display, input: Record) -> Self {
        Self {
            cow_id: CowId::new(id),
            input,
            results: Record::new(),
            metadata: BTreeMap::new(),
            runs: 0,
        }
    }

    /// Returns the cow's identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &CowId {
        &self.cow_id
    }

    /// Returns the cow's input tree.
    #[inline]
    #[must_use]
    pub const fn input(&self) -> &Record {
        &self.input
    }

    /// Returns the structural fingerprint of the input tree.
    #[must_use]
    pub fn input_shape(&self) -> InputShape {
        InputShape::of_record(&self.input)
    }

    /// Resolves a dotted path against the input tree.
    pub fn get_nested_value(&self, path: &FieldPath) -> Result<&Value, PathError> {
        self.input.resolve(path)
    }

    /// Resolves every mapped path, producing the keyword arguments for a run.
    pub fn resolve_args(&self, mapping: &Mapping) -> Result<Record, PathError> {
        let mut args = Record::with_capacity(mapping.len());
        for (param, path) in mapping.iter() {
            args.insert(param, self.input.resolve(path)?.clone());
        }
        Ok(args)
    }

    /// Runs `model` with arguments taken from this cow's input via `mapping`.
    ///
    /// Returns the id the result was stored under, of the form
    /// `<model>_<YYYYMMDDTHHMMSS>_<run>`. The run number is per cow and
    /// strictly increasing, so ids never collide.
    ///
    /// # Errors
    ///
    /// - [`RunError::Lookup`] if a mapped path is missing from the input
    /// - [`RunError::Invocation`] if binding fails or the model errors
    ///
    /// On error the cow is left unchanged.
    pub fn run_model(&mut self, model: &Model, mapping: &Mapping) -> Result<String, RunError> {
        let input_args = self.resolve_args(mapping)?;
        let default_args: Record = model
            .signature()
            .defaulted()
            .filter(|param| !mapping.contains(&param.name))
            .filter_map(|param| Some((param.name.as_str(), param.default.clone()?)))
            .collect();

        let start_time = Utc::now();
        let started = Instant::now();
        let result = model.call(&input_args)?;
        let run_time = started.elapsed().as_secs_f64();
        let end_time = Utc::now();

        self.runs += 1;
        let result_id = stamp_id(model.name(), start_time, self.runs);
        debug!(cow = %self.cow_id, result = %result_id, run_time, "Model run complete");

        self.results.insert(result_id.clone(), result);
        self.metadata.insert(
            result_id.clone(),
            RunMetadata {
                model_name: model.name().to_owned(),
                start_time,
                end_time,
                run_time,
                input_args,
                default_args,
            },
        );
        Ok(result_id)
    }

    /// Returns all results keyed by result id, in execution order.
    #[inline]
    #[must_use]
    pub const fn results(&self) -> &Record {
        &self.results
    }

    /// Returns all run metadata keyed by result id.
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, RunMetadata> {
        &self.metadata
    }

    /// Iterates result ids in execution order.
    pub fn result_ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys()
    }

    /// Returns the result stored under `result_id`.
    #[inline]
    #[must_use]
    pub fn get_result(&self, result_id: &str) -> Option<&Value> {
        self.results.get(result_id)
    }

    /// Returns the metadata stored under `result_id`.
    #[inline]
    #[must_use]
    pub fn get_metadata(&self, result_id: &str) -> Option<&RunMetadata> {
        self.metadata.get(result_id)
    }

    /// Returns the number of stored results.
    #[inline]
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Renders one `<result id> | <value>` line per result.
    #[must_use]
    pub fn result_table(&self) -> String {
        use std::fmt::Write;

        let width = self.results.keys().map(str::len).max().unwrap_or(0);
        let mut table = String::new();
        for (id, value) in self.results.iter() {
            let _ = writeln!(table, "{id:<width$} | {value}");
        }
        table
    }
}

/// Builds a result or sweep id from a name, a start time, and a sequence
/// number.
pub(crate) fn stamp_id(name: &str, at: DateTime<Utc>, seq: u64) -> String {
    format!("{name}_{}_{seq}", at.format("%Y%m%dT%H%M%S"))
}

#[cfg(test)]
mod tests {
    use moo_registry::{InvocationError, ModelSignature};

    use super::*;

    fn cow() -> Cow {
        let input = serde_json::from_str(
            r#"{
                "milk": {"morning": 10, "evening": 8},
                "weight": 500,
                "health": {"temperature": 101.5, "heart_rate": 60}
            }"#,
        )
        .unwrap();
        Cow::new(1, input)
    }

    fn dummy_model() -> Model {
        let signature = ModelSignature::new("dummy_model").param("milk").param("weight");
        Model::new(signature, |args| {
            let milk = args.record("milk")?;
            let morning = milk.get("morning").and_then(Value::as_i64).unwrap_or(0);
            let evening = milk.get("evening").and_then(Value::as_i64).unwrap_or(0);
            let weight = args.require("weight")?.as_i64().unwrap_or(0);
            Ok(Value::Int(morning + evening + weight))
        })
    }

    fn dummy_mapping() -> Mapping {
        [("milk", "milk"), ("weight", "weight")].into_iter().collect()
    }

    #[test]
    fn test_initialization() {
        let cow = cow();
        assert_eq!(cow.id().as_str(), "1");
        assert_eq!(cow.input().len(), 3);
        assert!(cow.results().is_empty());
        assert!(cow.metadata().is_empty());
    }

    #[test]
    fn test_run_model() {
        let mut cow = cow();
        let result_id = cow.run_model(&dummy_model(), &dummy_mapping()).unwrap();

        assert_eq!(cow.result_count(), 1);
        assert_eq!(cow.metadata().len(), 1);
        assert_eq!(cow.get_result(&result_id), Some(&Value::Int(518)));

        let metadata = cow.get_metadata(&result_id).unwrap();
        assert_eq!(metadata.model_name, "dummy_model");
        assert!(metadata.end_time >= metadata.start_time);
        assert!(metadata.run_time >= 0.0);
        assert_eq!(metadata.input_args.get("milk"), cow.input().get("milk"));
        assert_eq!(metadata.input_args.get("weight"), Some(&Value::Int(500)));
        assert!(metadata.default_args.is_empty());
    }

    #[test]
    fn test_result_ids_are_unique_per_run() {
        let mut cow = cow();
        let first = cow.run_model(&dummy_model(), &dummy_mapping()).unwrap();
        let second = cow.run_model(&dummy_model(), &dummy_mapping()).unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("dummy_model_"));
        assert!(first.ends_with("_1"));
        assert!(second.ends_with("_2"));
        assert_eq!(cow.result_count(), 2);
    }

    #[test]
    fn test_default_args_reported() {
        let signature = ModelSignature::new("scaled")
            .param("weight")
            .param_with_default("factor", 2)
            .param_with_default("heart_rate", 0);
        let model = Model::new(signature, |args| {
            Ok(Value::Float(args.f64("weight")? * args.f64("factor")? + args.f64("heart_rate")?))
        });
        let mapping: Mapping = [("weight", "weight"), ("heart_rate", "health.heart_rate")]
            .into_iter()
            .collect();

        let mut cow = cow();
        let result_id = cow.run_model(&model, &mapping).unwrap();
        assert_eq!(cow.get_result(&result_id), Some(&Value::Float(1060.0)));

        let metadata = cow.get_metadata(&result_id).unwrap();
        assert_eq!(metadata.default_args.keys().collect::<Vec<_>>(), ["factor"]);
        assert_eq!(metadata.default_args.get("factor"), Some(&Value::Int(2)));
        assert!(!metadata.input_args.contains_key("factor"));
    }

    #[test]
    fn test_missing_path_leaves_cow_unchanged() {
        let mut cow = cow();
        let mapping: Mapping = [("milk", "milk.noon"), ("weight", "weight")].into_iter().collect();
        let err = cow.run_model(&dummy_model(), &mapping).unwrap_err();

        assert!(err.is_lookup());
        assert!(cow.results().is_empty());
        assert!(cow.metadata().is_empty());
    }

    #[test]
    fn test_model_error_leaves_cow_unchanged() {
        let failing = Model::new(ModelSignature::new("failing").param("weight"), |_| {
            anyhow::bail!("negative energy balance")
        });
        let mapping: Mapping = [("weight", "weight")].into_iter().collect();

        let mut cow = cow();
        let err = cow.run_model(&failing, &mapping).unwrap_err();
        assert!(matches!(err, RunError::Invocation(InvocationError::Failed { .. })));
        assert!(err.to_string().contains("negative energy balance"));
        assert_eq!(cow.result_count(), 0);
    }

    #[test]
    fn test_unmapped_required_parameter_fails_at_call() {
        let mapping: Mapping = [("milk", "milk")].into_iter().collect();
        let mut cow = cow();
        let err = cow.run_model(&dummy_model(), &mapping).unwrap_err();
        assert!(matches!(
            err,
            RunError::Invocation(InvocationError::MissingArgument { ref param, .. }) if param == "weight"
        ));
    }

    #[test]
    fn test_get_nested_value() {
        let cow = cow();
        let value = cow.get_nested_value(&FieldPath::new("milk.morning")).unwrap();
        assert_eq!(value, &Value::Int(10));
    }

    #[test]
    fn test_get_input_structure() {
        let expected: Record = serde_json::from_str(
            r#"{
                "milk": {"morning": "int", "evening": "int"},
                "weight": "int",
                "health": {"temperature": "float", "heart_rate": "int"}
            }"#,
        )
        .unwrap();
        assert_eq!(cow().input_shape().to_value(), Value::Map(expected));
    }

    #[test]
    fn test_result_table() {
        let mut cow = cow();
        let result_id = cow.run_model(&dummy_model(), &dummy_mapping()).unwrap();
        let table = cow.result_table();
        assert_eq!(table, format!("{result_id} | 518\n"));
    }

    #[test]
    fn test_stamp_id_format() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T06:30:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(stamp_id("model1", at, 3), "model1_20240501T063009_3");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut cow = cow();
        cow.run_model(&dummy_model(), &dummy_mapping()).unwrap();
        let json = serde_json::to_string(&cow).unwrap();
        let restored: Cow = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cow);
    }
}
