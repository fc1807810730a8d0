//! Domain types for the simoolator harness.
//!
//! # Module Organization
//!
//! - [`value`] - The [`Value`] input tree and the ordered [`Record`] map
//! - [`shape`] - Structural fingerprints of input trees
//! - [`path`] - Dotted key paths into a [`Record`]
//! - [`id`] - Cow identifiers
//! - [`mode`] - Execution modes for model sweeps
//!
//! All public types are re-exported at this module level and at the crate
//! root:
//!
//! ```
//! use moo_core::{CowId, FieldPath, Record, Value};
//! ```

pub mod id;
pub mod mode;
pub mod path;
pub mod shape;
pub mod value;

pub use id::CowId;
pub use mode::ExecutionMode;
pub use path::FieldPath;
pub use shape::InputShape;
pub use value::{Record, Value};
