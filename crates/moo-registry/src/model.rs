//! Model functions and their declared parameter schemas.
//!
//! A [`Model`] pairs a named [`ModelSignature`] with a callable. The
//! signature is what the resolver binds against: each [`Param`] is looked up
//! by name in a cow's input tree, and parameters with a default may be left
//! unbound.
//!
//! # Examples
//!
//! ```
//! use moo_core::{Record, Value};
//! use moo_registry::{Model, ModelSignature};
//!
//! let signature = ModelSignature::new("body_mass_index")
//!     .param("weight")
//!     .param("height")
//!     .param_with_default("scale", 1.0);
//!
//! let model = Model::new(signature, |args| {
//!     let bmi = args.f64("weight")? / args.f64("height")?.powi(2);
//!     Ok(Value::Float(bmi * args.f64("scale")?))
//! });
//!
//! let kwargs: Record = [("weight", 500.0), ("height", 10.0)].into_iter().collect();
//! assert_eq!(model.call(&kwargs).unwrap(), Value::Float(5.0));
//! ```

use std::fmt;
use std::sync::Arc;

use moo_core::{Record, Value};
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;

use crate::InvocationError;

/// A declared model parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// The parameter name, matched against input keys.
    pub name: String,

    /// Value used when no input key is bound to this parameter.
    ///
    /// An absent field means required; an explicit `null` is a null default.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_default"
    )]
    pub default: Option<Value>,
}

fn present_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Param {
    /// Creates a parameter that must be bound.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// Creates a parameter that falls back to `default`.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// Returns `true` if the parameter has no default.
    #[inline]
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// The name and ordered parameter list of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSignature {
    name: String,
    params: SmallVec<[Param; 8]>,
}

impl ModelSignature {
    /// Creates a signature with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: SmallVec::new(),
        }
    }

    /// Creates a signature from an existing parameter list.
    pub fn with_params(name: impl Into<String>, params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    /// Appends a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    /// Appends a parameter with a default value.
    #[must_use]
    pub fn param_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param::optional(name, default));
        self
    }

    /// Returns the model name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters in declaration order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Iterates parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    /// Iterates the parameters that carry a default.
    pub fn defaulted(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !p.is_required())
    }

    /// Returns `true` if both signatures declare the same parameter names in
    /// the same order.
    #[must_use]
    pub fn same_params(&self, other: &Self) -> bool {
        self.param_names().eq(other.param_names())
    }
}

/// Arguments bound for a single model invocation.
///
/// Every declared parameter is present, either from the cow's input or from
/// its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    values: Record,
}

impl Args {
    /// Returns the bound value for `name`, if declared.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the bound value for `name`.
    pub fn require(&self, name: &str) -> anyhow::Result<&Value> {
        self.get(name)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not declared"))
    }

    /// Returns the bound value for `name` as a number.
    pub fn f64(&self, name: &str) -> anyhow::Result<f64> {
        let value = self.require(name)?;
        value
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' must be numeric, got {}", value.type_name()))
    }

    /// Returns the bound value for `name` as a nested record.
    pub fn record(&self, name: &str) -> anyhow::Result<&Record> {
        let value = self.require(name)?;
        value
            .as_record()
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' must be a mapping, got {}", value.type_name()))
    }

    /// Returns all bound values in declaration order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &Record {
        &self.values
    }
}

/// The callable body of a model.
pub type ModelFn = dyn Fn(&Args) -> anyhow::Result<Value> + Send + Sync;

/// A named, invocable model.
///
/// Cloning is cheap; the callable is shared.
#[derive(Clone)]
pub struct Model {
    signature: ModelSignature,
    func: Arc<ModelFn>,
}

impl Model {
    /// Creates a model from a signature and its body.
    pub fn new<F>(signature: ModelSignature, func: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Arc::new(func),
        }
    }

    /// Returns the model name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// Returns the model signature.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    /// Binds keyword arguments to the signature and invokes the model.
    ///
    /// Each declared parameter takes its value from `kwargs`, else from its
    /// default. Binding is checked here, at call time, and nowhere earlier.
    ///
    /// # Errors
    ///
    /// - [`InvocationError::UnexpectedArgument`] if `kwargs` names an
    ///   undeclared parameter
    /// - [`InvocationError::MissingArgument`] if a required parameter is
    ///   unbound
    /// - [`InvocationError::Failed`] if the model body returns an error
    pub fn call(&self, kwargs: &Record) -> Result<Value, InvocationError> {
        if let Some(extra) = kwargs
            .keys()
            .find(|key| !self.signature.param_names().any(|name| name == *key))
        {
            return Err(InvocationError::unexpected(self.name(), extra));
        }

        let mut values = Record::with_capacity(self.signature.params.len());
        for param in &self.signature.params {
            let value = kwargs
                .get(&param.name)
                .or(param.default.as_ref())
                .ok_or_else(|| InvocationError::missing(self.name(), &param.name))?;
            values.insert(param.name.as_str(), value.clone());
        }

        (self.func)(&Args { values }).map_err(|cause| InvocationError::Failed {
            model: self.name().to_owned(),
            cause,
        })
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_model() -> Model {
        let signature = ModelSignature::new("sum")
            .param("a")
            .param_with_default("b", 10);
        Model::new(signature, |args| {
            Ok(Value::Float(args.f64("a")? + args.f64("b")?))
        })
    }

    #[test]
    fn test_call_uses_default_when_unbound() {
        let kwargs: Record = [("a", 1)].into_iter().collect();
        assert_eq!(sum_model().call(&kwargs).unwrap(), Value::Float(11.0));
    }

    #[test]
    fn test_call_overrides_default() {
        let kwargs: Record = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(sum_model().call(&kwargs).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn test_call_missing_required() {
        let err = sum_model().call(&Record::new()).unwrap_err();
        assert!(matches!(
            err,
            InvocationError::MissingArgument { ref param, .. } if param == "a"
        ));
    }

    #[test]
    fn test_call_unexpected_argument() {
        let kwargs: Record = [("a", 1), ("c", 2)].into_iter().collect();
        let err = sum_model().call(&kwargs).unwrap_err();
        assert!(matches!(
            err,
            InvocationError::UnexpectedArgument { ref param, .. } if param == "c"
        ));
    }

    #[test]
    fn test_call_body_error() {
        let kwargs: Record = [("a", "not a number")].into_iter().collect();
        let err = sum_model().call(&kwargs).unwrap_err();
        assert!(matches!(err, InvocationError::Failed { .. }));
        assert!(err.to_string().contains("must be numeric"));
    }

    #[test]
    fn test_signature_defaulted() {
        let model = sum_model();
        let defaulted: Vec<_> = model.signature().defaulted().map(|p| p.name.as_str()).collect();
        assert_eq!(defaulted, ["b"]);
        assert_eq!(model.signature().param_names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_param_null_default_survives_serde() {
        let param = Param::optional("note", Value::Null);
        let json = serde_json::to_string(&param).unwrap();
        assert_eq!(json, r#"{"name":"note","default":null}"#);
        let parsed: Param = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, param);
        assert!(!parsed.is_required());

        let required: Param = serde_json::from_str(r#"{"name":"age"}"#).unwrap();
        assert!(required.is_required());
    }

    #[test]
    fn test_debug_hides_callable() {
        let debug = format!("{:?}", sum_model());
        assert!(debug.contains("sum"));
    }
}
