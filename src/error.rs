//! Top-level error type for an analysis run.

use crate::catalog::CatalogError;
use crate::config::{ConfigError, SettingsError};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A catalog call the run cannot continue without.
    #[error("Schema extraction failed during {operation}{}: {source}", table_context(.table))]
    SchemaExtraction {
        operation: &'static str,
        table: Option<String>,
        #[source]
        source: CatalogError,
    },

    #[error("Export failed for {path}: {message}")]
    Export { path: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

fn table_context(table: &Option<String>) -> String {
    match table {
        Some(t) => format!(" (table {})", t),
        None => String::new(),
    }
}

impl AnalysisError {
    pub fn extraction(operation: &'static str, source: CatalogError) -> Self {
        Self::SchemaExtraction {
            operation,
            table: None,
            source,
        }
    }

    pub fn extraction_for_table(
        operation: &'static str,
        table: impl Into<String>,
        source: CatalogError,
    ) -> Self {
        Self::SchemaExtraction {
            operation,
            table: Some(table.into()),
            source,
        }
    }

    pub fn export(path: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        Self::Export {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
