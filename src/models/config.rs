//! Configuration models for dcop-yaml.
//!
//! Every tunable of a conversion run lives here. All sections are optional
//! in the TOML file; omitted values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "dcop-yaml.toml";

/// Top-level configuration for dcop-yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Scenario timeline settings
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// PDCOP conversion settings
    #[serde(default)]
    pub pdcop: PdcopConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the problem and scenario documents
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./yaml-files")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Delays used when laying events onto a scenario timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Delay of the leading `w0` wait event
    #[serde(default = "default_initial_delay")]
    pub initial_delay: u64,

    /// Wait after each random variable change (D-DCOP)
    #[serde(default = "default_resolution_delay")]
    pub resolution_delay: u64,

    /// Wait after each agent command (DynaGraph)
    #[serde(default = "default_command_delay")]
    pub command_delay: u64,
}

fn default_initial_delay() -> u64 {
    1
}

fn default_resolution_delay() -> u64 {
    1
}

fn default_command_delay() -> u64 {
    12
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            resolution_delay: default_resolution_delay(),
            command_delay: default_command_delay(),
        }
    }
}

/// PDCOP conversion configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdcopConfig {
    /// Seed for the resolution-event shuffle; system entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file if present.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output.dir must not be empty".to_string()));
        }
        if self.scenario.command_delay == 0 || self.scenario.resolution_delay == 0 {
            return Err(ConfigError::Invalid(
                "scenario delays between events must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
