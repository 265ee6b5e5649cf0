//! Catalog → table model extraction.

use std::sync::Arc;

use crate::catalog::CatalogConnector;
use crate::config::SchemaConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::logging::Logger;
use crate::model::{Column, Table};

/// Reads tables and columns from a catalog.
///
/// Any catalog failure here is fatal: relationship analysis is meaningless
/// without a complete table list.
pub struct SchemaAnalyzer {
    connector: Arc<dyn CatalogConnector>,
    conventions: SchemaConfig,
    logger: Logger,
}

impl SchemaAnalyzer {
    pub fn new(
        connector: Arc<dyn CatalogConnector>,
        conventions: SchemaConfig,
        logger: Logger,
    ) -> Self {
        Self {
            connector,
            conventions,
            logger: logger.scoped("schemagraph::analyzer::schema"),
        }
    }

    /// Tables in catalog order, minus ignored tables.
    ///
    /// Column lookups run concurrently. A table with no flagged primary key
    /// but a column named `id` gets that column as its primary key.
    pub async fn extract(&self) -> AnalysisResult<Vec<Table>> {
        let names = self
            .connector
            .get_tables()
            .await
            .map_err(|e| AnalysisError::extraction("get_tables", e))?;
        self.logger.debug(format_args!("Catalog reports {} tables", names.len()));

        let names: Vec<String> = names
            .into_iter()
            .filter(|name| {
                let ignored = self.conventions.is_ignored_table(name);
                if ignored {
                    self.logger.debug(format_args!("Skipping ignored table {}", name));
                }
                !ignored
            })
            .collect();

        let lookups = names.iter().map(|name| self.connector.get_columns(name));
        let results = futures::future::join_all(lookups).await;

        names
            .into_iter()
            .zip(results)
            .map(|(name, result)| {
                let columns = result
                    .map_err(|e| AnalysisError::extraction_for_table("get_columns", &name, e))?;
                Ok(self.build_table(name, columns))
            })
            .collect()
    }

    fn build_table(&self, name: String, columns: Vec<Column>) -> Table {
        let mut table = Table::new(name, columns);
        if table.primary_keys.is_empty() {
            if let Some(id) = table.column_ignore_case("id") {
                let id = id.name.clone();
                self.logger
                    .debug(format_args!("Inferred primary key '{}' for {}", id, table.name));
                table.primary_keys = vec![id];
            }
        }
        table
    }
}
