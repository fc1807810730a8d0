//! Error types for the moo-registry crate.
//!
//! - [`RegistryError`] - lookup of a model that was never registered
//! - [`InvocationError`] - binding or running a model failed

/// Errors raised by [`ModelRegistry`](crate::ModelRegistry) lookups.
///
/// # Examples
///
/// ```
/// use moo_registry::{ModelRegistry, RegistryError};
///
/// let registry = ModelRegistry::new();
/// let err = registry.get("non_existent_model").unwrap_err();
/// assert_eq!(err.to_string(), "model non_existent_model is not registered");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No model is registered under the requested name.
    #[error("model {name} is not registered")]
    NotRegistered {
        /// The requested model name.
        name: String,
    },
}

impl RegistryError {
    /// Creates a new [`RegistryError::NotRegistered`] error.
    #[inline]
    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered { name: name.into() }
    }
}

/// Errors raised while invoking a [`Model`](crate::Model).
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// A required parameter had neither a bound value nor a default.
    #[error("model '{model}' is missing required argument '{param}'")]
    MissingArgument {
        /// The model name.
        model: String,
        /// The unbound parameter.
        param: String,
    },

    /// A keyword argument does not name a declared parameter.
    #[error("model '{model}' got an unexpected argument '{param}'")]
    UnexpectedArgument {
        /// The model name.
        model: String,
        /// The undeclared parameter.
        param: String,
    },

    /// The model body returned an error.
    #[error("model '{model}' failed: {cause:#}")]
    Failed {
        /// The model name.
        model: String,
        /// The error returned by the model body.
        cause: anyhow::Error,
    },
}

impl InvocationError {
    /// Creates a new [`InvocationError::MissingArgument`] error.
    #[inline]
    pub fn missing(model: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingArgument {
            model: model.into(),
            param: param.into(),
        }
    }

    /// Creates a new [`InvocationError::UnexpectedArgument`] error.
    #[inline]
    pub fn unexpected(model: impl Into<String>, param: impl Into<String>) -> Self {
        Self::UnexpectedArgument {
            model: model.into(),
            param: param.into(),
        }
    }

    /// Returns `true` if the failure happened while binding arguments,
    /// before the model body ran.
    #[inline]
    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::UnexpectedArgument { .. }
        )
    }
}
