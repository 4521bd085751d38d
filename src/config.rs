//! Configuration file handling.
//!
//! This module provides loading and saving of layerscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/layerscan/config.toml`
//! - macOS: `~/Library/Application Support/layerscan/config.toml`
//! - Windows: `%APPDATA%\layerscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! detectors = ["os-release", "nodejs"]
//! rpm_binary = "/usr/bin/rpm"
//! max_file_size = 52428800
//! default_format = "json"
//! log_level = "debug"
//! log_format = "compact"
//! parallel = true
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detector::{SystemRpm, BUILTIN_DETECTORS};
use crate::logging::LOG_FORMATS;

/// Largest file, in bytes, the layer loader reads by default.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Application configuration.
///
/// It can be loaded from a TOML file or created with default values.
///
/// # Example
///
/// ```no_run
/// use layerscan::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Detectors: {}", config.detectors.join(", "));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enabled detectors, in priority order. The first match wins.
    ///
    /// Default: every built-in detector
    pub detectors: Vec<String>,

    /// Executable used to query RPM databases.
    ///
    /// Default: "rpm"
    pub rpm_binary: String,

    /// Files larger than this many bytes are skipped when loading a layer.
    ///
    /// Default: 50 MiB
    pub max_file_size: u64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Log filter directive, e.g. "info" or "layerscan=debug".
    ///
    /// Default: "warn"
    pub log_level: String,

    /// Valid values: "compact", "pretty", "json"
    /// Default: "compact"
    pub log_format: String,

    /// Whether to scan multiple layers concurrently.
    ///
    /// Default: true
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detectors: BUILTIN_DETECTORS.iter().map(|d| d.to_string()).collect(),
            rpm_binary: SystemRpm::DEFAULT_BINARY.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            default_format: "table".to_string(),
            log_level: "warn".to_string(),
            log_format: "compact".to_string(),
            parallel: true,
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if it
    /// doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        for name in &self.detectors {
            if !BUILTIN_DETECTORS.contains(&name.as_str()) {
                bail!(
                    "unknown detector '{}' in config, expected one of: {}",
                    name,
                    BUILTIN_DETECTORS.join(", ")
                );
            }
        }
        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            bail!(
                "unknown log_format '{}' in config, expected one of: {}",
                self.log_format,
                LOG_FORMATS.join(", ")
            );
        }
        if self.max_file_size == 0 {
            bail!("max_file_size must be greater than zero");
        }
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use layerscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("layerscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("layerscan")
            .join("config.toml")
    }

    /// Reads the file at `path` and reports whether it is usable.
    pub fn inspect(path: &Path) -> ConfigFileStatus {
        if !path.exists() {
            return ConfigFileStatus::Missing;
        }
        match Self::load_from(path) {
            Ok(config) => ConfigFileStatus::Valid(config),
            Err(err) => ConfigFileStatus::Invalid(format!("{:#}", err)),
        }
    }

    /// Renders every setting, including the defaults a file leaves out.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Outcome of [`Config::inspect`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFileStatus {
    Missing,
    Valid(Config),
    /// The file exists but cannot be read, parsed or validated.
    Invalid(String),
}
