//! Execution modes for model sweeps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseModeError;

/// How a herd sweep distributes model runs across cows.
///
/// Only [`Linear`](Self::Linear) is implemented. The parallel modes are
/// reserved names that fail before any cow is touched.
///
/// # Examples
///
/// ```
/// use moo_core::ExecutionMode;
///
/// let mode: ExecutionMode = "linear".parse().unwrap();
/// assert!(mode.is_supported());
///
/// assert!("gpu".parse::<ExecutionMode>().is_ok_and(|m| !m.is_supported()));
/// assert!("turbo".parse::<ExecutionMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run cows one after another on the calling thread.
    #[default]
    Linear,
    /// Reserved for a CPU worker pool.
    Cpu,
    /// Reserved for GPU offload.
    Gpu,
}

impl ExecutionMode {
    /// Returns the canonical lower-case name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }

    /// Returns `true` if sweeps can run in this mode.
    #[inline]
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Linear)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            other => Err(ParseModeError {
                mode: other.to_owned(),
            }),
        }
    }
}
