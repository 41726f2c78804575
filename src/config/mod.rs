//! Configuration module for airtracker.
//!
//! Handles the settings file, environment variable expansion, and defaults.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, ExplorerSettings, ExportSettings, LoggingSettings,
    Settings, SettingsError, CONFIG_ENV,
};
