//! Supported database engines.

use serde::{Deserialize, Serialize};

/// Error type for engine and convention configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported database engine: {0}. Supported: mysql, mariadb, sqlite, postgres, bigquery, clickhouse")]
    UnsupportedEngine(String),
}

/// Database engines the analyzer can generate sampling SQL for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    MySql,
    MariaDb,
    #[default]
    Sqlite,
    Postgres,
    BigQuery,
    ClickHouse,
}

impl Engine {
    /// Parse engine from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Engine::MySql),
            "mariadb" | "maria" => Ok(Engine::MariaDb),
            "sqlite" | "sqlite3" => Ok(Engine::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Engine::Postgres),
            "bigquery" | "bq" => Ok(Engine::BigQuery),
            "clickhouse" | "ch" => Ok(Engine::ClickHouse),
            other => Err(ConfigError::UnsupportedEngine(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::MariaDb => "mariadb",
            Engine::Sqlite => "sqlite",
            Engine::Postgres => "postgres",
            Engine::BigQuery => "bigquery",
            Engine::ClickHouse => "clickhouse",
        }
    }

    pub fn all() -> &'static [Engine] {
        &[
            Engine::MySql,
            Engine::MariaDb,
            Engine::Sqlite,
            Engine::Postgres,
            Engine::BigQuery,
            Engine::ClickHouse,
        ]
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
