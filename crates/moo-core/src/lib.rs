//! Core types, errors, and configuration for the simoolator harness.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Value`] and [`Record`], the nested input tree every cow carries
//! - [`InputShape`], a structural fingerprint used for consistency checks
//! - [`FieldPath`], the dotted key path a model parameter is bound to
//! - [`CowId`] and [`ExecutionMode`]
//! - Error types ([`PathError`], [`ConfigError`], [`ParseModeError`])
//! - Configuration structures ([`Config`])
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{ColorScheme, Config, DisplayConfig, RunConfig, SnapshotConfig};
pub use error::{ConfigError, ParseModeError, PathError};
pub use hash::{FxHashMap, FxHashSet, fx_hash_map_with_capacity, fx_hash_set_with_capacity};
pub use types::{CowId, ExecutionMode, FieldPath, InputShape, Record, Value};
