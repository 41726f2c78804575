//! TOML-based configuration for airtracker.
//!
//! Supports a config file (airtracker.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! path = "${AIR_TRACKER_DB}"
//!
//! [explorer]
//! row_cap = 100
//!
//! [export]
//! delimiter = ";"
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compose::{ExplorerOptions, DEFAULT_ROW_CAP, MAX_ROW_CAP};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "AIRTRACKER_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where the flight database lives.
    pub database: DatabaseSettings,

    /// Explorer view limits.
    pub explorer: ExplorerSettings,

    /// Catalog export format.
    pub export: ExportSettings,

    /// Log verbosity.
    pub logging: LoggingSettings,
}

/// Database location.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite file (supports ${ENV_VAR} expansion).
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "air_tracker.db".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// The path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.path).map(PathBuf::from)
    }
}

/// Explorer view limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Maximum rows returned by the explorer (1..=200).
    pub row_cap: u64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            row_cap: DEFAULT_ROW_CAP,
        }
    }
}

impl ExplorerSettings {
    pub fn options(&self) -> ExplorerOptions {
        ExplorerOptions {
            row_cap: self.row_cap,
        }
    }
}

/// Delimited export settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Single field delimiter character.
    pub delimiter: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
        }
    }
}

impl ExportSettings {
    /// The delimiter as a char, if it is exactly one character.
    pub fn delimiter_char(&self) -> Result<char, SettingsError> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '"' && c != '\n' && c != '\r' => Ok(c),
            _ => Err(SettingsError::InvalidConfig(format!(
                "export.delimiter must be a single character other than a quote or line break, got {:?}",
                self.delimiter
            ))),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `AIRTRACKER_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `AIRTRACKER_CONFIG`
    /// 2. `./airtracker.toml`
    /// 3. `~/.config/airtracker/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("airtracker.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("airtracker").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_ROW_CAP).contains(&self.explorer.row_cap) {
            return Err(SettingsError::InvalidConfig(format!(
                "explorer.row_cap must be between 1 and {}, got {}",
                MAX_ROW_CAP, self.explorer.row_cap
            )));
        }
        self.export.delimiter_char()?;
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch != '}') {
                name.push(ch);
            }
            if chars.next_if_eq(&'}').is_none() {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated ${{{}", name
                )));
            }
            name
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
