//! Configuration management for docxr
//!
//! docxr stores configuration in ~/.docxr/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// docxr configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Maximum number of validation issues to list on the console
    #[serde(default = "default_max_display_errors")]
    pub max_display_errors: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_display_errors: Some(10),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output root for create-copies mode, used by --copies
    #[serde(default)]
    pub default_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a debug log to ~/.docxr/docxr.log
    #[serde(default = "default_debug")]
    pub debug: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { debug: Some(false) }
    }
}

// Default functions for serde
fn default_max_display_errors() -> Option<usize> {
    Some(10)
}
fn default_debug() -> Option<bool> {
    Some(false)
}

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let config_dir = home_dir.join(".docxr");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    Ok(config_dir.join("config.toml"))
}

/// Get the default configuration file content with comments
fn default_config_content() -> &'static str {
    r#"# docxr Configuration File
#
# This file controls default behavior for docxr. Values set here can be
# overridden by command-line flags.

[processing]
# Maximum number of pattern validation issues to list (default: 10)
# Issues beyond this count are summarized as "... and N more".
max_display_errors = 10

[output]
# Default output root for create-copies mode (optional)
# Used by the --copies flag; --output-dir overrides it.
#default_dir = "/home/user/Documents/docxr-output"

[logging]
# Write a debug log to ~/.docxr/docxr.log (default: false)
debug = false
"#
}

/// Save the default commented configuration file
pub fn save_default_config() -> Result<()> {
    let config_path = config_file_path()?;

    fs::write(&config_path, default_config_content()).with_context(|| {
        format!(
            "Failed to write default config file: {}",
            config_path.display()
        )
    })?;

    Ok(())
}

/// Load configuration from file, creating default if needed
///
/// If the config file doesn't exist, creates it with defaults and returns them.
/// If the config file is malformed, recreates it with defaults.
pub fn load_config() -> Result<Config> {
    let config_path = config_file_path()?;

    if !config_path.exists() {
        save_default_config()?;
    }

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: Config = match toml::from_str(&config_str) {
        Ok(config) => config,
        Err(_) => {
            // Config is malformed, recreate with defaults
            save_default_config()?;
            return Ok(Config::default());
        }
    };

    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(max) = config.processing.max_display_errors {
        if max == 0 {
            anyhow::bail!("Invalid max_display_errors: 0 (must be at least 1)");
        }
        if max > 100 {
            anyhow::bail!("Invalid max_display_errors: {max} (max 100)");
        }
    }

    Ok(())
}
