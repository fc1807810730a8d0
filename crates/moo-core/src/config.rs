//! Configuration structures for the simoolator harness.
//!
//! - [`RunConfig`] - Sweep settings (default mode, failure logging)
//! - [`DisplayConfig`] - Presentation settings (colors, type annotations)
//! - [`SnapshotConfig`] - Snapshot encoding settings
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! missing fields filled from those defaults.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ExecutionMode};

/// When to color terminal output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColorScheme {
    /// Color unless `NO_COLOR` is set.
    #[default]
    Auto,
    /// Always emit color codes.
    Always,
    /// Never emit color codes.
    Never,
}

/// Configuration for model sweeps.
///
/// # Examples
///
/// ```
/// use moo_core::{ExecutionMode, RunConfig};
///
/// let config = RunConfig::default();
/// assert_eq!(config.default_mode, ExecutionMode::Linear);
/// assert!(config.log_failures);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Mode used when a sweep is started without an explicit mode.
    pub default_mode: ExecutionMode,

    /// Whether to log a summary line for every cow that failed in a sweep.
    pub log_failures: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            default_mode: ExecutionMode::Linear,
            log_failures: true,
        }
    }
}

/// Configuration for rendering input trees and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Annotate tree leaves with their type name.
    pub show_types: bool,

    /// Color scheme for mapped keys.
    pub color_scheme: ColorScheme,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_types: true,
            color_scheme: ColorScheme::Auto,
        }
    }
}

/// Configuration for herd snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Write human-readable (indented) snapshot files.
    pub pretty: bool,
}

/// Root configuration for the harness.
///
/// # Examples
///
/// ```
/// use moo_core::Config;
///
/// let config = Config::from_json_str(r#"{"snapshot": {"pretty": true}}"#).unwrap();
/// assert!(config.snapshot.pretty);
/// assert!(config.display.show_types);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sweep configuration.
    pub run: RunConfig,

    /// Display configuration.
    pub display: DisplayConfig,

    /// Snapshot configuration.
    pub snapshot: SnapshotConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path.as_std_path()).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config_defaults() {
        let config = DisplayConfig::default();
        assert!(config.show_types);
        assert_eq!(config.color_scheme, ColorScheme::Auto);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let config = Config::from_json_str(r#"{"run": {"default_mode": "cpu"}}"#).unwrap();
        assert_eq!(config.run.default_mode, ExecutionMode::Cpu);
        // Other fields should have defaults
        assert!(config.run.log_failures);
        assert!(!config.snapshot.pretty);
    }

    #[test]
    fn test_config_rejects_unknown_mode() {
        let result = Config::from_json_str(r#"{"run": {"default_mode": "turbo"}}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simoo.json");
        std::fs::write(&path, r#"{"display": {"color_scheme": "never"}}"#).unwrap();
        let path = camino::Utf8PathBuf::try_from(path).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.display.color_scheme, ColorScheme::Never);
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = Config::from_file(Utf8Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
