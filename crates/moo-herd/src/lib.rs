//! Cows, herds, and model sweeps.
//!
//! - [`Cow`]: one entity with nested input, results, and run metadata
//! - [`Herd`]: an ordered set of cows sharing a model registry
//! - [`HerdSnapshot`]: the persisted form of a herd
//! - [`loader`]: reading cows from JSON files
//!
//! # Example
//!
//! ```
//! use moo_core::{ExecutionMode, Record, Value};
//! use moo_herd::{Cow, Herd};
//! use moo_registry::{Model, ModelSignature};
//!
//! let input: Record = serde_json::from_str(r#"{"body": {"weight": 500, "height": 140}}"#).unwrap();
//! let mut herd = Herd::new("Demo");
//! herd.add_cow(Cow::new(1, input));
//!
//! let model = Model::new(ModelSignature::new("ratio").param("weight").param("height"), |args| {
//!     Ok(Value::Float(args.f64("weight")? / args.f64("height")?))
//! });
//! let mapping = herd.register_model(model).unwrap();
//! assert_eq!(mapping.get("weight").map(|p| p.as_str()), Some("body.weight"));
//!
//! let report = herd.execute_model("ratio", ExecutionMode::Linear).unwrap();
//! assert_eq!(report.succeeded, 1);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod cow;
mod error;
mod herd;
pub mod loader;
mod snapshot;

pub use cow::{Cow, RunMetadata};
pub use error::{HerdError, LoadError, RunError, SnapshotError};
pub use herd::{ConsistencyReport, CowOperation, Herd, OperationOutcome, SweepMetadata, SweepReport};
pub use snapshot::{HerdSnapshot, RegistrySnapshot};
