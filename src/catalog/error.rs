//! Catalog error types.

/// Errors raised by a catalog connector.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
