//! The model registry.
//!
//! [`ModelRegistry`] stores each [`Model`] together with the [`Mapping`]
//! computed for it at registration time, keyed by the model's declared name.
//!
//! # Usage
//!
//! ```
//! use moo_core::Record;
//! use moo_registry::{Model, ModelRegistry, ModelSignature, Removal};
//!
//! let schema: Record = serde_json::from_str(r#"{"milk": {"morning": 10}, "weight": 500}"#).unwrap();
//! let model = Model::new(ModelSignature::new("weigh").param("weight"), |args| {
//!     Ok(args.require("weight")?.clone())
//! });
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(model, &schema);
//!
//! let (_, mapping) = registry.get("weigh").unwrap();
//! assert_eq!(mapping.get("weight").map(|p| p.as_str()), Some("weight"));
//!
//! assert_eq!(registry.remove("weigh"), Removal::Removed);
//! assert_eq!(registry.remove("weigh"), Removal::NotRegistered);
//! ```

use std::collections::hash_map::Entry;

use moo_core::{FxHashMap, Record};
use tracing::{debug, info, warn};

use crate::{Mapping, Model, RegistryError, resolve_mapping};

/// A stored model and its computed mapping.
#[derive(Debug, Clone)]
pub struct RegisteredModel {
    /// The model.
    pub model: Model,
    /// The parameter → path binding computed at registration.
    pub mapping: Mapping,
}

/// One row of [`ModelRegistry::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelListing {
    /// The model name.
    pub name: String,
    /// Declared parameter names, in declaration order.
    pub params: Vec<String>,
    /// The computed mapping.
    pub mapping: Mapping,
}

/// Outcome of [`ModelRegistry::remove`].
///
/// Removal is advisory: asking to remove an unknown model is reported, not
/// raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Removal {
    /// The model was registered and has been removed.
    Removed,
    /// No model was registered under that name.
    NotRegistered,
}

impl Removal {
    /// Returns `true` if a model was removed.
    #[inline]
    #[must_use]
    pub const fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}

/// Registry of models keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: FxHashMap<String, RegisteredModel>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the mapping of `model` against `schema` and stores both.
    ///
    /// A model already registered under the same name is replaced.
    pub fn register(&mut self, model: Model, schema: &Record) -> &Mapping {
        let mapping = resolve_mapping(model.signature(), schema);
        let unbound: Vec<&str> = mapping.unbound(model.signature()).collect();
        if !unbound.is_empty() {
            debug!(model = model.name(), ?unbound, "Parameters without an input path");
        }
        self.register_with_mapping(model, mapping)
    }

    /// Stores `model` with a precomputed mapping.
    pub fn register_with_mapping(&mut self, model: Model, mapping: Mapping) -> &Mapping {
        let name = model.name().to_owned();
        info!(model = %name, bound = mapping.len(), "Registered model");
        let entry = RegisteredModel { model, mapping };
        let slot = match self.models.entry(name) {
            Entry::Occupied(mut occupied) => {
                debug!(model = %occupied.key(), "Replacing existing registration");
                occupied.insert(entry);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(entry),
        };
        &slot.mapping
    }

    /// Returns the model and mapping registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] if no such model exists.
    pub fn get(&self, name: &str) -> Result<(&Model, &Mapping), RegistryError> {
        self.models
            .get(name)
            .map(|entry| (&entry.model, &entry.mapping))
            .ok_or_else(|| RegistryError::not_registered(name))
    }

    /// Returns `true` if a model is registered under `name`.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Removes the model registered under `name`.
    pub fn remove(&mut self, name: &str) -> Removal {
        if self.models.remove(name).is_some() {
            info!(model = name, "Removed model");
            Removal::Removed
        } else {
            warn!(model = name, "Cannot remove unregistered model");
            Removal::NotRegistered
        }
    }

    /// Returns registered model names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns every registration, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<ModelListing> {
        let mut listings: Vec<ModelListing> = self
            .models
            .iter()
            .map(|(name, entry)| ModelListing {
                name: name.clone(),
                params: entry
                    .model
                    .signature()
                    .param_names()
                    .map(str::to_owned)
                    .collect(),
                mapping: entry.mapping.clone(),
            })
            .collect();
        listings.sort_by(|a, b| a.name.cmp(&b.name));
        listings
    }

    /// Iterates registrations in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.values()
    }

    /// Returns the number of registered models.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no models are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use moo_core::Value;

    use super::*;
    use crate::ModelSignature;

    fn schema() -> Record {
        serde_json::from_str(r#"{"milk": {"morning": 10, "evening": 8}}"#).unwrap()
    }

    fn identity(name: &str, param: &str) -> Model {
        let param_name = param.to_owned();
        Model::new(ModelSignature::new(name).param(param), move |args| {
            Ok(args.require(&param_name)?.clone())
        })
    }

    #[test]
    fn test_initialization() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_register_model() {
        let mut registry = ModelRegistry::new();
        let mapping = registry.register(identity("lambda", "milk"), &schema()).clone();
        assert_eq!(mapping, [("milk", "milk")].into_iter().collect::<Mapping>());
        assert!(registry.contains("lambda"));
    }

    #[test]
    fn test_get_model() {
        let mut registry = ModelRegistry::new();
        registry.register(identity("lambda", "milk"), &schema());

        let (model, mapping) = registry.get("lambda").unwrap();
        assert_eq!(model.name(), "lambda");
        assert_eq!(mapping.get("milk").map(|p| p.as_str()), Some("milk"));
    }

    #[test]
    fn test_get_model_not_registered() {
        let registry = ModelRegistry::new();
        let err = registry.get("non_existent_model").unwrap_err();
        assert_eq!(err, RegistryError::not_registered("non_existent_model"));
        assert_eq!(err.to_string(), "model non_existent_model is not registered");
    }

    #[test]
    fn test_reregistering_overwrites() {
        let mut registry = ModelRegistry::new();
        registry.register(identity("replaced", "milk"), &schema());
        registry.register(identity("replaced", "morning"), &schema());

        assert_eq!(registry.len(), 1);
        let (model, mapping) = registry.get("replaced").unwrap();
        assert_eq!(model.signature().param_names().collect::<Vec<_>>(), ["morning"]);
        assert_eq!(mapping.get("morning").map(|p| p.as_str()), Some("milk.morning"));
        assert!(!mapping.contains("milk"));
    }

    #[test]
    fn test_remove_model() {
        let mut registry = ModelRegistry::new();
        registry.register(identity("lambda", "milk"), &schema());
        assert!(registry.remove("lambda").is_removed());
        assert!(!registry.contains("lambda"));
        assert_eq!(registry.remove("lambda"), Removal::NotRegistered);
    }

    #[test]
    fn test_list_sorted_with_params() {
        let mut registry = ModelRegistry::new();
        registry.register(identity("zeta", "milk"), &schema());
        registry.register(identity("alpha", "evening"), &schema());

        assert_eq!(registry.names(), ["alpha", "zeta"]);
        let listings = registry.list();
        assert_eq!(listings[0].name, "alpha");
        assert_eq!(listings[0].params, ["evening"]);
        assert_eq!(
            listings[0].mapping.get("evening").map(|p| p.as_str()),
            Some("milk.evening")
        );
    }

    #[test]
    fn test_registered_model_is_callable() {
        let mut registry = ModelRegistry::new();
        registry.register(identity("lambda", "milk"), &schema());
        let (model, _) = registry.get("lambda").unwrap();
        let kwargs: Record = [("milk", 18)].into_iter().collect();
        assert_eq!(model.call(&kwargs).unwrap(), Value::Int(18));
    }
}
