//! Engine-specific sample queries.
//!
//! The data-driven analyzer needs "up to N distinct values of column C in
//! table T". Each engine has its own way of asking for a cheap random sample:
//!
//! | Engine | Strategy |
//! |--------|----------|
//! | MySQL / MariaDB | `ORDER BY RAND()` |
//! | SQLite / Postgres | `ORDER BY RANDOM()` |
//! | BigQuery | `WHERE RAND() < fraction` (avoids a full sort) |
//! | ClickHouse | `SAMPLE fraction` subquery, then `ORDER BY rand()` |
//!
//! Strategies are pure; they hold no state and never touch a connection.

mod engines;

pub use engines::{
    BigQuerySampling, ClickHouseSampling, MariaDbSampling, MySqlSampling, PostgresSampling,
    SqliteSampling,
};

use crate::config::{ConfigError, Engine};

/// Builds the SQL that fetches a distinct-value sample for one column.
pub trait SamplingStrategy: Send + Sync {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String;
}

/// Strategy for an engine.
pub fn create_sampling_strategy(engine: Engine) -> Box<dyn SamplingStrategy> {
    match engine {
        Engine::MySql => Box::new(MySqlSampling),
        Engine::MariaDb => Box::new(MariaDbSampling),
        Engine::Sqlite => Box::new(SqliteSampling),
        Engine::Postgres => Box::new(PostgresSampling),
        Engine::BigQuery => Box::new(BigQuerySampling),
        Engine::ClickHouse => Box::new(ClickHouseSampling),
    }
}

/// Strategy for an engine given by name. Unknown names are rejected.
pub fn sampling_strategy_for(engine: &str) -> Result<Box<dyn SamplingStrategy>, ConfigError> {
    Ok(create_sampling_strategy(Engine::from_str(engine)?))
}

// =============================================================================
// Identifier quoting
// =============================================================================

/// Quote identifier with double quotes (Postgres, SQLite).
pub(crate) fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks (MySQL, MariaDB, BigQuery, ClickHouse).
pub(crate) fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote each dot-separated part of a possibly schema-qualified name.
pub(crate) fn quote_qualified(name: &str, quote: fn(&str) -> String) -> String {
    name.split('.').map(quote).collect::<Vec<_>>().join(".")
}

/// Fraction of rows to scan so that roughly `sample_size` survive, capped at 1.
pub(crate) fn sampling_fraction(sample_size: usize) -> f64 {
    (sample_size as f64 / 1000.0).min(1.0)
}
