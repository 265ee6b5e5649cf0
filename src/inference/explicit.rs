use std::sync::Arc;

use crate::catalog::CatalogConnector;
use crate::logging::Logger;
use crate::model::{Relationship, Table};

/// Turns catalog-declared foreign keys into ground-truth relationships.
pub struct ExplicitAnalyzer {
    connector: Arc<dyn CatalogConnector>,
    logger: Logger,
}

impl ExplicitAnalyzer {
    pub fn new(connector: Arc<dyn CatalogConnector>, logger: Logger) -> Self {
        Self {
            connector,
            logger: logger.scoped("schemagraph::inference::explicit"),
        }
    }

    /// Foreign-key lookups run concurrently; results keep table order.
    ///
    /// A failed lookup is logged and contributes nothing. Incomplete
    /// descriptors (missing column or target) are skipped.
    pub async fn analyze(&self, tables: &[Table]) -> Vec<Relationship> {
        self.logger.debug(format_args!(
            "Analyzing declared foreign keys for {} tables",
            tables.len()
        ));

        let lookups = tables
            .iter()
            .map(|t| self.connector.get_foreign_keys(&t.name));
        let results = futures::future::join_all(lookups).await;

        let mut relationships = Vec::new();
        for (table, result) in tables.iter().zip(results) {
            let fks = match result {
                Ok(fks) => fks,
                Err(e) => {
                    self.logger.error(format_args!(
                        "Failed to read foreign keys for table {}: {}",
                        table.name, e
                    ));
                    continue;
                }
            };

            relationships.extend(fks.into_iter().filter(|fk| fk.is_complete()).map(|fk| {
                Relationship::explicit(
                    &table.name,
                    fk.column_name,
                    fk.referenced_table,
                    fk.referenced_column,
                )
            }));
        }

        self.logger.debug(format_args!(
            "Explicit analysis complete. Found {} relationships",
            relationships.len()
        ));
        relationships
    }
}
