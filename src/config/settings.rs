//! TOML-based configuration for schemagraph.
//!
//! Supports a config file (schemagraph.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [catalog]
//! engine = "sqlite"
//! path = "${DATA_DIR}/app.db"
//!
//! [analysis]
//! data_driven = true
//! junction_policy = "strict"
//!
//! [sampling]
//! sample_size = 100
//! query_timeout_secs = 5
//! confidence_threshold = 0.5
//! cache_ttl_seconds = 3600
//!
//! [conventions]
//! ignored_tables = ["audit_log"]
//!
//! [logging]
//! debug = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::conventions::SchemaConfig;
use super::engine::{ConfigError, Engine};
use crate::graph::JunctionPolicy;

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

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub analysis: AnalysisSettings,
    pub sampling: SamplingSettings,
    pub conventions: SchemaConfig,
    pub logging: LoggingSettings,
}

/// Which catalog to read.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Engine name (mysql, mariadb, sqlite, postgres, bigquery, clickhouse).
    pub engine: Option<String>,

    /// SQLite database file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// JSON catalog snapshot file (supports ${ENV_VAR} expansion).
    pub snapshot: Option<String>,
}

impl CatalogSettings {
    /// Parse the configured engine, defaulting to SQLite.
    pub fn engine(&self) -> Result<Engine, SettingsError> {
        match &self.engine {
            Some(name) => Ok(Engine::from_str(name)?),
            None => Ok(Engine::default()),
        }
    }

    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    pub fn resolved_snapshot(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.snapshot
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Pipeline switches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Run the sampling-based analyzer in addition to naming and FK analysis.
    pub data_driven: bool,

    /// Shape test used for junction tables.
    pub junction_policy: JunctionPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            data_driven: false,
            junction_policy: JunctionPolicy::Strict,
        }
    }
}

/// Data-driven analyzer tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Distinct values fetched per column.
    pub sample_size: usize,

    /// Hard timeout per sample query.
    pub query_timeout_secs: u64,

    /// Overlap ratio a candidate must exceed to be kept.
    pub confidence_threshold: f64,

    /// Lifetime of cached samples and overlap results.
    pub cache_ttl_seconds: u64,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            sample_size: 100,
            query_timeout_secs: 5,
            confidence_threshold: 0.5,
            cache_ttl_seconds: 3600,
        }
    }
}

impl SamplingSettings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Emit debug-level progress messages.
    pub debug: bool,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMAGRAPH_CONFIG`
    /// 2. `./schemagraph.toml`
    /// 3. `~/.config/schemagraph/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SCHEMAGRAPH_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("schemagraph.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("schemagraph").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
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
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            // `${}` and an unclosed `${NAME` name no variable
            if chars.next().is_none() || name.is_empty() {
                return Err(SettingsError::MissingEnvVar(format!("${{{}", name)));
            }
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
