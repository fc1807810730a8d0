//! Named model catalogs.
//!
//! Registrations hold callables, which cannot be persisted. A
//! [`ModelCatalog`] is the set of models a program knows how to build, used
//! to re-attach callables to registrations restored from a snapshot.

use moo_core::{FxHashMap, fx_hash_map_with_capacity};

use crate::Model;

/// A name → [`Model`] lookup table.
///
/// # Examples
///
/// ```
/// use moo_core::Value;
/// use moo_registry::{Model, ModelCatalog, ModelSignature};
///
/// let catalog = ModelCatalog::new()
///     .with(Model::new(ModelSignature::new("noop"), |_| Ok(Value::Null)));
///
/// assert!(catalog.get("noop").is_some());
/// assert!(catalog.get("model1").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: FxHashMap<String, Model>,
}

impl ModelCatalog {
    /// Creates an empty catalog.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model, replacing any model with the same name.
    #[must_use]
    pub fn with(mut self, model: Model) -> Self {
        self.insert(model);
        self
    }

    /// Adds a model, replacing any model with the same name.
    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.name().to_owned(), model);
    }

    /// Returns the model named `name`.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Iterates the catalog's models in arbitrary order.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Returns the number of models.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if the catalog is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<Model> for ModelCatalog {
    fn from_iter<I: IntoIterator<Item = Model>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut catalog = Self {
            models: fx_hash_map_with_capacity(iter.size_hint().0),
        };
        for model in iter {
            catalog.insert(model);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use moo_core::Value;

    use super::*;
    use crate::ModelSignature;

    fn noop(name: &str) -> Model {
        Model::new(ModelSignature::new(name), |_| Ok(Value::Null))
    }

    #[test]
    fn test_from_iter_and_replace() {
        let mut catalog: ModelCatalog = [noop("a"), noop("b")].into_iter().collect();
        assert_eq!(catalog.len(), 2);

        catalog.insert(Model::new(ModelSignature::new("a").param("weight"), |_| Ok(Value::Null)));
        assert_eq!(catalog.len(), 2);
        let replaced = catalog.get("a").unwrap();
        assert_eq!(replaced.signature().param_names().collect::<Vec<_>>(), ["weight"]);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ModelCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.get("model1").is_none());
    }
}
