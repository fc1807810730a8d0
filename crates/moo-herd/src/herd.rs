//! The herd orchestrator.
//!
//! A [`Herd`] owns an ordered list of cows, one [`ModelRegistry`], and the
//! metadata of every sweep it has run. Models are registered against the
//! first cow's input, which acts as the reference schema for the whole herd.
//!
//! # Sweeps
//!
//! ```text
//! execute_model(name, mode)
//!     │
//!     ├── registry.get(name) ──► (Model, Mapping)
//!     ├── mode check ──► Unsupported for cpu / gpu
//!     │
//!     └── for cow in cows:
//!             cow.run_model(model, mapping)
//!                 ├── Ok  → succeeded += 1
//!                 └── Err → errors[cow_id] = message   (sweep continues)
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use moo_core::{CowId, ExecutionMode, InputShape, Record, Value};
use moo_registry::{Mapping, Model, ModelListing, ModelRegistry, Removal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cow::stamp_id;
use crate::{Cow, HerdError};

/// What happened during one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepMetadata {
    /// The model that was swept.
    pub model_name: String,
    /// The execution mode the sweep ran in.
    pub mode: ExecutionMode,
    /// Wall-clock time the sweep started.
    pub start_time: DateTime<Utc>,
    /// Wall-clock time the sweep finished.
    pub end_time: DateTime<Utc>,
    /// Elapsed seconds.
    pub run_time: f64,
    /// Failure messages keyed by the id of the cow that failed.
    pub errors: BTreeMap<CowId, String>,
}

/// The outcome of [`Herd::execute_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Key of the stored [`SweepMetadata`].
    pub sweep_id: String,
    /// Number of cows that produced a result.
    pub succeeded: usize,
    /// Failure messages keyed by cow id.
    pub failed: BTreeMap<CowId, String>,
}

impl SweepReport {
    /// Returns `true` if every cow produced a result.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// One line per failed cow, `cow <id>: <message>`.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|(cow, message)| format!("cow {cow}: {message}"))
            .collect()
    }
}

/// The outcome of [`Herd::check_data_consistency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// `true` if every cow's input has the reference shape.
    pub consistent: bool,
    /// Cows whose input shape differs from the first cow's.
    pub mismatched: Vec<CowId>,
}

/// An operation applied to every cow in turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CowOperation {
    /// Run a registered model. The first failure aborts the operation.
    RunModel {
        /// The registered model name.
        model: String,
    },
    /// Count the cow's stored results.
    ResultCount,
    /// Fingerprint the cow's input.
    InputShape,
}

/// The per-cow value produced by a [`CowOperation`].
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// Id of the stored result.
    ResultId(String),
    /// Number of stored results.
    ResultCount(usize),
    /// Structural fingerprint of the input.
    Shape(InputShape),
}

/// A named collection of cows sharing one model registry.
#[derive(Debug, Clone, Default)]
pub struct Herd {
    pub(crate) name: String,
    pub(crate) cows: Vec<Cow>,
    pub(crate) registry: ModelRegistry,
    pub(crate) metadata: BTreeMap<String, SweepMetadata>,
    pub(crate) sweeps: u64,
}

impl Herd {
    /// Creates an empty herd.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the herd's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a cow.
    pub fn add_cow(&mut self, cow: Cow) {
        debug!(herd = %self.name, cow = %cow.id(), "Added cow");
        self.cows.push(cow);
    }

    /// Appends every cow in `cows`, in order.
    pub fn add_cows(&mut self, cows: impl IntoIterator<Item = Cow>) {
        for cow in cows {
            self.add_cow(cow);
        }
    }

    /// Returns the cows in insertion order.
    #[inline]
    #[must_use]
    pub fn cows(&self) -> &[Cow] {
        &self.cows
    }

    /// Returns the cow at `index`.
    pub fn cow(&self, index: usize) -> Result<&Cow, HerdError> {
        self.cows.get(index).ok_or(HerdError::CowIndex {
            index,
            len: self.cows.len(),
        })
    }

    /// Returns the first cow with the given id.
    #[must_use]
    pub fn cow_by_id(&self, id: &str) -> Option<&Cow> {
        self.cows.iter().find(|cow| cow.id().as_str() == id)
    }

    /// Returns the number of cows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cows.len()
    }

    /// Returns `true` if the herd has no cows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cows.is_empty()
    }

    /// Returns the model registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Returns the metadata of every sweep, keyed by sweep id.
    #[inline]
    #[must_use]
    pub const fn sweep_metadata(&self) -> &BTreeMap<String, SweepMetadata> {
        &self.metadata
    }

    /// Registers `model`, binding its parameters against the first cow's
    /// input.
    ///
    /// Returns the computed mapping. Registering a name again replaces the
    /// earlier model and mapping.
    ///
    /// # Errors
    ///
    /// Returns [`HerdError::NoCows`] if the herd is empty.
    pub fn register_model(&mut self, model: Model) -> Result<Mapping, HerdError> {
        let Some(reference) = self.cows.first() else {
            return Err(HerdError::NoCows {
                model: model.name().to_owned(),
            });
        };
        Ok(self.registry.register(model, reference.input()).clone())
    }

    /// Returns the model registered under `name`, if any.
    #[must_use]
    pub fn get_model(&self, name: &str) -> Option<&Model> {
        match self.registry.get(name) {
            Ok((model, _)) => Some(model),
            Err(err) => {
                debug!(herd = %self.name, "{err}");
                None
            }
        }
    }

    /// Removes the model registered under `name`.
    pub fn remove_model(&mut self, name: &str) -> Removal {
        self.registry.remove(name)
    }

    /// Returns every registration, sorted by model name.
    #[must_use]
    pub fn list_models(&self) -> Vec<ModelListing> {
        self.registry.list()
    }

    /// Runs the model registered under `name` against every cow.
    ///
    /// A cow that fails is recorded in the report and in the stored
    /// [`SweepMetadata`]; the remaining cows still run.
    ///
    /// # Errors
    ///
    /// - [`HerdError::Registry`] if no model is registered under `name`
    /// - [`HerdError::Unsupported`] for [`ExecutionMode::Cpu`] and
    ///   [`ExecutionMode::Gpu`], before any cow is touched
    pub fn execute_model(&mut self, name: &str, mode: ExecutionMode) -> Result<SweepReport, HerdError> {
        let (model, mapping) = self.registry.get(name)?;
        let (model, mapping) = (model.clone(), mapping.clone());

        match mode {
            ExecutionMode::Linear => Ok(self.linear_sweep(&model, &mapping)),
            ExecutionMode::Cpu | ExecutionMode::Gpu => Err(HerdError::Unsupported { mode }),
        }
    }

    /// Like [`execute_model`](Self::execute_model), parsing the mode name
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`HerdError::InvalidMode`] if `mode` is not one of `linear`,
    /// `cpu` or `gpu`, otherwise as [`execute_model`](Self::execute_model).
    pub fn execute_model_str(&mut self, name: &str, mode: &str) -> Result<SweepReport, HerdError> {
        let mode: ExecutionMode = mode.parse()?;
        self.execute_model(name, mode)
    }

    fn linear_sweep(&mut self, model: &Model, mapping: &Mapping) -> SweepReport {
        let start_time = Utc::now();
        let started = Instant::now();

        let mut succeeded = 0;
        let mut errors = BTreeMap::new();
        for cow in &mut self.cows {
            match cow.run_model(model, mapping) {
                Ok(_) => succeeded += 1,
                Err(err) => {
                    errors.insert(cow.id().clone(), err.to_string());
                }
            }
        }

        let run_time = started.elapsed().as_secs_f64();
        let end_time = Utc::now();

        self.sweeps += 1;
        let sweep_id = stamp_id(model.name(), start_time, self.sweeps);
        for (cow, message) in &errors {
            warn!(herd = %self.name, model = model.name(), %cow, "{message}");
        }
        info!(
            herd = %self.name,
            sweep = %sweep_id,
            succeeded,
            failed = errors.len(),
            run_time,
            "Sweep complete"
        );

        self.metadata.insert(
            sweep_id.clone(),
            SweepMetadata {
                model_name: model.name().to_owned(),
                mode: ExecutionMode::Linear,
                start_time,
                end_time,
                run_time,
                errors: errors.clone(),
            },
        );

        SweepReport {
            sweep_id,
            succeeded,
            failed: errors,
        }
    }

    /// Compares every cow's input shape against the first cow's.
    ///
    /// An empty herd is consistent.
    #[must_use]
    pub fn check_data_consistency(&self) -> ConsistencyReport {
        let Some((reference, rest)) = self.cows.split_first() else {
            return ConsistencyReport {
                consistent: true,
                mismatched: Vec::new(),
            };
        };

        let expected = reference.input_shape();
        let mismatched: Vec<CowId> = rest
            .iter()
            .filter(|cow| cow.input_shape() != expected)
            .map(|cow| cow.id().clone())
            .collect();

        if mismatched.is_empty() {
            debug!(herd = %self.name, cows = self.cows.len(), "Input data is consistent");
        } else {
            for cow in &mismatched {
                warn!(herd = %self.name, %cow, "Input shape differs from the reference cow");
            }
        }

        ConsistencyReport {
            consistent: mismatched.is_empty(),
            mismatched,
        }
    }

    /// Returns the first cow's input, which models are registered against.
    #[must_use]
    pub fn reference_input(&self) -> Option<&Record> {
        self.cows.first().map(Cow::input)
    }

    /// Returns the reference input together with the mapping of `name`.
    ///
    /// # Errors
    ///
    /// - [`HerdError::Registry`] if no model is registered under `name`
    /// - [`HerdError::CowIndex`] if the herd is empty
    pub fn input_mapping(&self, name: &str) -> Result<(&Record, &Mapping), HerdError> {
        let (_, mapping) = self.registry.get(name)?;
        let reference = self.cow(0)?;
        Ok((reference.input(), mapping))
    }

    /// Returns `(index, id)` for every cow.
    #[must_use]
    pub fn list_cows(&self) -> Vec<(usize, &CowId)> {
        self.cows.iter().map(Cow::id).enumerate().collect()
    }

    /// Returns the results stored on the cow at `index`.
    pub fn list_results(&self, index: usize) -> Result<&Record, HerdError> {
        self.cow(index).map(Cow::results)
    }

    /// Returns one result stored on the cow at `index`.
    pub fn get_result(&self, index: usize, result_id: &str) -> Result<Option<&Value>, HerdError> {
        self.cow(index).map(|cow| cow.get_result(result_id))
    }

    /// Applies `operation` to every cow in order.
    ///
    /// Unlike a sweep, a failing [`CowOperation::RunModel`] stops at the
    /// first cow that fails. Cows before it keep their new results.
    ///
    /// # Errors
    ///
    /// - [`HerdError::Registry`] if the model to run is not registered
    /// - [`HerdError::Run`] for the first cow that fails to run it
    pub fn execute_operation(
        &mut self,
        operation: &CowOperation,
    ) -> Result<Vec<(CowId, OperationOutcome)>, HerdError> {
        match operation {
            CowOperation::RunModel { model } => {
                let (model, mapping) = self.registry.get(model)?;
                let (model, mapping) = (model.clone(), mapping.clone());
                let mut outcomes = Vec::with_capacity(self.cows.len());
                for cow in &mut self.cows {
                    let result_id = cow.run_model(&model, &mapping).map_err(|source| HerdError::Run {
                        cow: cow.id().clone(),
                        source,
                    })?;
                    outcomes.push((cow.id().clone(), OperationOutcome::ResultId(result_id)));
                }
                Ok(outcomes)
            }
            CowOperation::ResultCount => Ok(self
                .cows
                .iter()
                .map(|cow| (cow.id().clone(), OperationOutcome::ResultCount(cow.result_count())))
                .collect()),
            CowOperation::InputShape => Ok(self
                .cows
                .iter()
                .map(|cow| (cow.id().clone(), OperationOutcome::Shape(cow.input_shape())))
                .collect()),
        }
    }
}
