//! Model registry with automatic argument binding.
//!
//! This crate answers one question for the harness: given a model's declared
//! parameters and a cow's nested input, where does each argument come from?
//!
//! # Overview
//!
//! - [`ModelSignature`] / [`Param`]: the explicit parameter schema of a model
//! - [`Model`]: a signature plus a shared callable
//! - [`resolve_mapping`]: binds parameter names to dotted input paths
//! - [`ModelRegistry`]: stores models with the mapping computed for them
//! - [`ModelCatalog`]: re-attaches callables when restoring snapshots
//!
//! # Architecture
//!
//! ```text
//! register(model, schema)
//!     │
//!     ├── resolve_mapping (first-match walk over schema)
//!     │
//!     └── ModelRegistry { name → (Model, Mapping) }
//!             │
//!             └── get(name) → (&Model, &Mapping) → Cow::run_model
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod catalog;
mod error;
mod model;
mod registry;
mod resolver;

pub use catalog::ModelCatalog;
pub use error::{InvocationError, RegistryError};
pub use model::{Args, Model, ModelFn, ModelSignature, Param};
pub use registry::{ModelListing, ModelRegistry, RegisteredModel, Removal};
pub use resolver::{Mapping, resolve_mapping, resolve_paths};
