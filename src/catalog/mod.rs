//! Catalog access.
//!
//! A [`CatalogConnector`] abstracts over the ways of reading a database's
//! metadata. Analysis code only ever sees this trait:
//!
//! ```text
//! ┌──────────────────┐    get_tables / get_columns / get_foreign_keys ...
//! │ DatabaseAnalyzer │ ──────────────────────────────────────────────────┐
//! └──────────────────┘                                                   ▼
//!                                                  ┌──────────────────────────┐
//!                                                  │ dyn CatalogConnector     │
//!                                                  ├──────────────────────────┤
//!                                                  │ SnapshotCatalog (JSON)   │
//!                                                  │ SqliteCatalog (rusqlite) │
//!                                                  └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schemagraph::catalog::{CatalogConnector, SqliteCatalog};
//!
//! async fn example() -> CatalogResult<()> {
//!     let catalog = SqliteCatalog::open("app.db")?;
//!     for table in catalog.get_tables().await? {
//!         let fks = catalog.get_foreign_keys(&table).await?;
//!         println!("{table}: {} foreign keys", fks.len());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod snapshot;
mod sqlite;

pub use error::{CatalogError, CatalogResult};
pub use snapshot::{CatalogSnapshot, SnapshotCatalog, TableSnapshot};
pub use sqlite::SqliteCatalog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Engine;
use crate::model::{Column, ConstraintInfo, IndexInfo, ProcedureInfo, ViewInfo};

/// One result row keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A declared foreign key on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyInfo {
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKeyInfo {
    pub fn new(
        column_name: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }

    /// All three parts are present.
    pub fn is_complete(&self) -> bool {
        !self.column_name.is_empty()
            && !self.referenced_table.is_empty()
            && !self.referenced_column.is_empty()
    }
}

/// Read access to a database catalog.
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    /// Engine the catalog belongs to; selects the sampling SQL.
    fn engine(&self) -> Engine;

    /// Table names in catalog order.
    async fn get_tables(&self) -> CatalogResult<Vec<String>>;

    /// Columns of a table in catalog order.
    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<Column>>;

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>>;

    async fn get_indexes(&self, table: &str) -> CatalogResult<Vec<IndexInfo>>;

    async fn get_constraints(&self, table: &str) -> CatalogResult<Vec<ConstraintInfo>>;

    /// Engines without stored procedures keep the default.
    async fn get_stored_procedures(&self) -> CatalogResult<Vec<ProcedureInfo>> {
        Ok(Vec::new())
    }

    async fn get_views(&self) -> CatalogResult<Vec<ViewInfo>>;

    /// Run a read-only query, returning rows as JSON objects.
    async fn query(&self, sql: &str) -> CatalogResult<Vec<Row>>;
}
