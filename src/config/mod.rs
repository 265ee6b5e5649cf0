//! Configuration module for schemagraph.
//!
//! Handles engine selection, naming conventions, and the TOML settings file.

mod conventions;
mod engine;
mod settings;

pub use conventions::SchemaConfig;
pub use engine::{ConfigError, Engine};
pub use settings::{
    expand_env_vars, AnalysisSettings, CatalogSettings, LoggingSettings, SamplingSettings,
    Settings, SettingsError,
};
