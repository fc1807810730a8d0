//! Error types for the moo-core crate.
//!
//! - [`PathError`] - a dotted path does not resolve against an input tree
//! - [`ParseModeError`] - an execution mode string is not recognised
//! - [`ConfigError`] - configuration loading failed

use camino::Utf8PathBuf;

use crate::FieldPath;

/// A [`FieldPath`] failed to resolve against a [`Record`](crate::Record).
///
/// # Examples
///
/// ```
/// use moo_core::{FieldPath, PathError};
///
/// let error = PathError::missing_key(&FieldPath::new("milk.noon"), "noon");
/// assert!(error.to_string().contains("noon"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A segment of the path has no matching key.
    #[error("key '{segment}' not found while resolving '{path}'")]
    MissingKey {
        /// The full path being resolved.
        path: FieldPath,
        /// The segment that was missing.
        segment: String,
    },

    /// A non-final segment points at a value that is not a mapping.
    #[error("value at '{segment}' is not a mapping while resolving '{path}'")]
    NotAMap {
        /// The full path being resolved.
        path: FieldPath,
        /// The segment whose value could not be descended into.
        segment: String,
    },
}

impl PathError {
    /// Creates a new [`PathError::MissingKey`] error.
    #[inline]
    pub fn missing_key(path: &FieldPath, segment: impl Into<String>) -> Self {
        Self::MissingKey {
            path: path.clone(),
            segment: segment.into(),
        }
    }

    /// Creates a new [`PathError::NotAMap`] error.
    #[inline]
    pub fn not_a_map(path: &FieldPath, segment: impl Into<String>) -> Self {
        Self::NotAMap {
            path: path.clone(),
            segment: segment.into(),
        }
    }

    /// Returns the path that failed to resolve.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::MissingKey { path, .. } | Self::NotAMap { path, .. } => path,
        }
    }
}

/// An execution mode string did not name a known mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid execution mode '{mode}': expected one of linear, cpu, gpu")]
pub struct ParseModeError {
    /// The rejected input.
    pub mode: String,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
