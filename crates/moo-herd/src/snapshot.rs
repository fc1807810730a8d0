//! Herd snapshots.
//!
//! A [`HerdSnapshot`] is the persistable form of a [`Herd`]: cows with their
//! results and run counters, sweep metadata, and each registration as a
//! model name, its declared parameters and its mapping. Callables are not
//! persisted; [`Herd::restore`] re-attaches them by name from a
//! [`ModelCatalog`].

use std::collections::BTreeMap;

use camino::Utf8Path;
use moo_registry::{Mapping, ModelCatalog, ModelRegistry, ModelSignature, Param};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Cow, Herd, HerdError, SnapshotError, SweepMetadata};

/// A persisted registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// The model name.
    pub name: String,
    /// The declared parameters at the time of saving.
    pub params: Vec<Param>,
    /// The mapping computed at registration.
    pub mapping: Mapping,
}

/// The persisted form of a [`Herd`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdSnapshot {
    /// The herd name.
    pub name: String,
    /// Every cow, in herd order.
    pub cows: Vec<Cow>,
    /// Registrations, sorted by model name.
    pub registry: Vec<RegistrySnapshot>,
    /// Sweep metadata keyed by sweep id.
    #[serde(default)]
    pub metadata: BTreeMap<String, SweepMetadata>,
    /// Sweeps run so far.
    #[serde(default)]
    pub sweeps: u64,
}

impl HerdSnapshot {
    /// Encodes the snapshot as compact JSON.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::NonFinite`] if any cow holds an infinite or NaN
    /// float, which would otherwise be written as `null`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        self.check_finite()?;
        Ok(serde_json::to_vec(self)?)
    }

    /// Encodes the snapshot as indented JSON.
    pub fn to_bytes_pretty(&self) -> Result<Vec<u8>, SnapshotError> {
        self.check_finite()?;
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn check_finite(&self) -> Result<(), SnapshotError> {
        for cow in &self.cows {
            let arguments = cow
                .metadata()
                .iter()
                .find_map(|(id, meta)| {
                    let args_finite = meta.input_args.is_finite() && meta.default_args.is_finite();
                    (!args_finite).then_some(id.as_str())
                });
            let key = cow
                .input()
                .first_non_finite()
                .or_else(|| cow.results().first_non_finite())
                .or(arguments);
            if let Some(key) = key {
                return Err(SnapshotError::NonFinite {
                    cow: cow.id().clone(),
                    key: key.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Decodes a snapshot produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Herd {
    /// Captures the herd's full state.
    #[must_use]
    pub fn snapshot(&self) -> HerdSnapshot {
        let registry = self
            .registry
            .list()
            .into_iter()
            .filter_map(|listing| {
                let (model, _) = self.registry.get(&listing.name).ok()?;
                Some(RegistrySnapshot {
                    params: model.signature().params().to_vec(),
                    name: listing.name,
                    mapping: listing.mapping,
                })
            })
            .collect();

        HerdSnapshot {
            name: self.name.clone(),
            cows: self.cows.clone(),
            registry,
            metadata: self.metadata.clone(),
            sweeps: self.sweeps,
        }
    }

    /// Rebuilds a herd from a snapshot, taking callables from `catalog`.
    ///
    /// Stored mappings are reused as-is; they are not recomputed.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::UnknownModel`] if a registration has no model of
    ///   that name in `catalog`
    /// - [`SnapshotError::SignatureMismatch`] if the catalog's model declares
    ///   different parameter names than were saved
    pub fn restore(snapshot: HerdSnapshot, catalog: &ModelCatalog) -> Result<Self, SnapshotError> {
        let mut registry = ModelRegistry::new();
        for entry in snapshot.registry {
            let model = catalog
                .get(&entry.name)
                .ok_or_else(|| SnapshotError::UnknownModel {
                    name: entry.name.clone(),
                })?;
            let saved = ModelSignature::with_params(entry.name.as_str(), entry.params);
            if !model.signature().same_params(&saved) {
                return Err(SnapshotError::SignatureMismatch { name: entry.name });
            }
            registry.register_with_mapping(model.clone(), entry.mapping);
        }

        Ok(Self {
            name: snapshot.name,
            cows: snapshot.cows,
            registry,
            metadata: snapshot.metadata,
            sweeps: snapshot.sweeps,
        })
    }

    /// Writes a snapshot of the herd to `path`.
    pub fn save(&self, path: &Utf8Path, pretty: bool) -> Result<(), HerdError> {
        let snapshot = self.snapshot();
        let bytes = if pretty {
            snapshot.to_bytes_pretty()?
        } else {
            snapshot.to_bytes()?
        };
        std::fs::write(path, bytes).map_err(|source| SnapshotError::Io {
            path: path.to_owned(),
            source,
        })?;
        info!(herd = %self.name, %path, cows = self.cows.len(), "Saved herd");
        Ok(())
    }

    /// Reads a snapshot from `path` and restores it against `catalog`.
    pub fn load(path: &Utf8Path, catalog: &ModelCatalog) -> Result<Self, HerdError> {
        let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.to_owned(),
            source,
        })?;
        let herd = Self::restore(HerdSnapshot::from_bytes(&bytes)?, catalog)?;
        info!(herd = %herd.name, %path, cows = herd.cows.len(), "Loaded herd");
        Ok(herd)
    }
}
