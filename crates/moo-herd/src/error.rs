//! Error types for the moo-herd crate.
//!
//! # Error Recovery Strategy
//!
//! - **Per-cow errors** ([`RunError`]): caught at the sweep boundary, recorded
//!   against the cow's id, and the sweep continues
//! - **Herd errors** ([`HerdError`]): fatal to the call, propagated
//!   immediately

use camino::Utf8PathBuf;
use moo_core::{CowId, ExecutionMode, ParseModeError, PathError};
use moo_registry::{InvocationError, RegistryError};

/// A single cow failed to run a model.
///
/// Neither variant leaves a partial result on the cow.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A mapped path does not resolve against this cow's input.
    #[error(transparent)]
    Lookup(#[from] PathError),

    /// The model rejected its arguments or failed while running.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl RunError {
    /// Returns `true` if the cow's input did not contain a mapped path.
    #[inline]
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }
}

/// Errors raised by [`Herd`](crate::Herd) operations.
#[derive(Debug, thiserror::Error)]
pub enum HerdError {
    /// A model cannot be registered before any cow provides a reference
    /// input.
    #[error("cannot register model '{model}': the herd has no cows")]
    NoCows {
        /// The model being registered.
        model: String,
    },

    /// The requested execution mode string is not recognised.
    #[error(transparent)]
    InvalidMode(#[from] ParseModeError),

    /// The requested execution mode is reserved but not implemented.
    #[error("execution mode '{mode}' is not supported yet")]
    Unsupported {
        /// The requested mode.
        mode: ExecutionMode,
    },

    /// A registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// No cow exists at the requested position.
    #[error("no cow at index {index} (herd has {len} cows)")]
    CowIndex {
        /// The requested index.
        index: usize,
        /// The number of cows in the herd.
        len: usize,
    },

    /// A cow operation failed outside a sweep, where failures are not
    /// isolated.
    #[error("cow {cow}: {source}")]
    Run {
        /// The cow the operation failed on.
        cow: CowId,
        /// The underlying run failure.
        #[source]
        source: RunError,
    },

    /// Saving or restoring a snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Loading cows from a file failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl HerdError {
    /// Returns `true` if the error is a reference to something that does not
    /// exist (an unregistered model or an out-of-range cow).
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Registry(_) | Self::CowIndex { .. })
    }
}

/// Errors raised while encoding, decoding, or rebinding a herd snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read or written.
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        /// The snapshot path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot bytes could not be encoded or decoded.
    #[error("invalid snapshot data: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A registered model has no callable in the catalog.
    #[error("snapshot references model '{name}' which is not in the catalog")]
    UnknownModel {
        /// The model name.
        name: String,
    },

    /// A cow holds an infinite or NaN float, which JSON cannot encode.
    #[error("cow {cow}: '{key}' holds a non-finite float and cannot be saved")]
    NonFinite {
        /// The cow holding the value.
        cow: CowId,
        /// The input key or result id holding the value.
        key: String,
    },

    /// The catalog's model declares different parameters than the snapshot.
    #[error("model '{name}' in the catalog does not match the snapshot's parameters")]
    SignatureMismatch {
        /// The model name.
        name: String,
    },
}

/// Errors raised while loading cows from a JSON file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read cow file {path}: {source}")]
    Read {
        /// The file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON array of cow records.
    #[error("failed to parse cow records: {0}")]
    Parse(#[from] serde_json::Error),
}
