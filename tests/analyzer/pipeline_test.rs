// tests/analyzer/pipeline_test.rs
use std::sync::Arc;

use async_trait::async_trait;
use schemagraph::analyzer::{AnalyzerOptions, DatabaseAnalyzer};
use schemagraph::catalog::{
    CatalogConnector, CatalogError, CatalogResult, ForeignKeyInfo, Row, SnapshotCatalog,
    SqliteCatalog, TableSnapshot,
};
use schemagraph::config::Engine;
use schemagraph::error::AnalysisError;
use schemagraph::inference::DataDrivenConfig;
use schemagraph::logging::Logger;
use schemagraph::model::{
    Column, ConstraintInfo, IndexInfo, ProcedureInfo, RelationshipType, ViewInfo,
};
use serde_json::json;

fn store_catalog() -> SnapshotCatalog {
    SnapshotCatalog::new(Engine::Postgres)
        .with_table(
            TableSnapshot::new(
                "user_roles",
                vec![
                    Column::new("user_id", "integer").primary_key(),
                    Column::new("role_id", "integer").primary_key(),
                ],
            )
            .with_foreign_key("user_id", "users", "id")
            .with_foreign_key("role_id", "roles", "id"),
        )
        .with_table(TableSnapshot::new(
            "orders",
            vec![
                Column::new("id", "integer").primary_key(),
                Column::new("user_id", "integer"),
            ],
        ))
        .with_table(
            TableSnapshot::new(
                "users",
                vec![
                    Column::new("id", "integer").primary_key(),
                    Column::new("name", "text"),
                    Column::new("email", "text"),
                ],
            )
            .with_index(IndexInfo {
                name: "users_email_key".to_string(),
                column_name: "email".to_string(),
                is_unique: true,
            }),
        )
        .with_table(TableSnapshot::new(
            "roles",
            vec![Column::new("id", "integer").primary_key()],
        ))
        .with_table(TableSnapshot::new(
            "schema_migrations",
            vec![Column::new("version", "text")],
        ))
        .with_view(ViewInfo {
            name: "active_users".to_string(),
            definition: "SELECT * FROM users".to_string(),
            is_materialized: false,
        })
}

fn analyzer(connector: Arc<dyn CatalogConnector>, options: AnalyzerOptions) -> DatabaseAnalyzer {
    DatabaseAnalyzer::new(connector, options, Logger::default())
}

#[tokio::test]
async fn test_snapshot_catalog_end_to_end() {
    let schema = analyzer(Arc::new(store_catalog()), AnalyzerOptions::default())
        .analyze()
        .await
        .unwrap();

    assert_eq!(schema.table_names(), vec!["users", "roles", "orders", "user_roles"]);

    assert_eq!(schema.relationships.len(), 3);
    let explicit = schema.relationships.iter().filter(|r| !r.is_inferred).count();
    assert_eq!(explicit, 2);
    let implicit = schema
        .relationships
        .iter()
        .find(|r| r.source_table == "orders")
        .unwrap();
    assert_eq!(implicit.target_table, "users");
    assert_eq!(implicit.relationship_type, Some(RelationshipType::Implicit));

    assert!(schema.circular_dependencies.is_empty());
    assert_eq!(schema.junction_tables, vec!["user_roles"]);
    assert_eq!(schema.views.len(), 1);
    assert!(schema.stored_procedures.is_empty());

    let users = schema.table("users").unwrap();
    assert_eq!(users.indexes.as_ref().map(Vec::len), Some(1));
    assert_eq!(users.constraints, Some(vec![]));
}

#[tokio::test]
async fn test_data_driven_finds_unnamed_reference() {
    let catalog = store_catalog()
        .with_table(
            TableSnapshot::new(
                "purchases",
                vec![
                    Column::new("id", "integer").primary_key(),
                    Column::new("buyer_key", "integer"),
                ],
            )
            .with_row(json!({ "id": 1, "buyer_key": 3 }))
            .with_row(json!({ "id": 2, "buyer_key": 3 })),
        );
    let catalog = add_rows(catalog);

    let options = AnalyzerOptions::default().with_data_driven(DataDrivenConfig::default());
    let schema = analyzer(Arc::new(catalog), options).analyze().await.unwrap();

    let found = schema
        .relationships
        .iter()
        .find(|r| r.source_table == "purchases")
        .unwrap();
    assert_eq!(found.source_columns, vec!["buyer_key"]);
    assert_eq!(found.target_table, "users");
    assert_eq!(found.relationship_type, Some(RelationshipType::DataDriven));
    assert_eq!(found.confidence, 1.0);
}

/// Sample rows for `users` and `roles` on top of the base catalog.
fn add_rows(catalog: SnapshotCatalog) -> SnapshotCatalog {
    let mut snapshot = catalog.snapshot().clone();
    for table in &mut snapshot.tables {
        let ids: &[i64] = match table.name.as_str() {
            "users" => &[1, 2, 3],
            "roles" => &[1, 2],
            _ => continue,
        };
        for id in ids {
            *table = table.clone().with_row(json!({ "id": id }));
        }
    }
    SnapshotCatalog::from_snapshot(snapshot)
}

#[tokio::test]
async fn test_sqlite_catalog_end_to_end() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    catalog
        .execute_batch(
            "CREATE TABLE orders (
                 id INTEGER PRIMARY KEY,
                 customer_id INTEGER REFERENCES customers(id)
             );
             CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
             CREATE INDEX orders_customer_idx ON orders(customer_id);
             CREATE VIEW customer_orders AS
                 SELECT c.name, o.id FROM customers c JOIN orders o ON o.customer_id = c.id;",
        )
        .unwrap();

    let schema = analyzer(Arc::new(catalog), AnalyzerOptions::default())
        .analyze()
        .await
        .unwrap();

    assert_eq!(schema.table_names(), vec!["customers", "orders"]);
    assert_eq!(schema.relationships.len(), 1);
    assert!(!schema.relationships[0].is_inferred);
    assert_eq!(schema.views[0].name, "customer_orders");

    let orders = schema.table("orders").unwrap();
    let indexes = orders.indexes.as_ref().unwrap();
    assert!(indexes.iter().any(|i| i.name == "orders_customer_idx"));
    assert_eq!(orders.constraints.as_ref().map(Vec::len), Some(2));
}

/// Delegates to a snapshot but fails selected calls.
struct FlakyCatalog {
    inner: SnapshotCatalog,
    fail_tables: bool,
    fail_metadata: bool,
}

fn boom() -> CatalogError {
    CatalogError::Query("connection reset".to_string())
}

#[async_trait]
impl CatalogConnector for FlakyCatalog {
    fn engine(&self) -> Engine {
        self.inner.engine()
    }

    async fn get_tables(&self) -> CatalogResult<Vec<String>> {
        if self.fail_tables {
            return Err(boom());
        }
        self.inner.get_tables().await
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<Column>> {
        self.inner.get_columns(table).await
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        if self.fail_metadata && table == "user_roles" {
            return Err(boom());
        }
        self.inner.get_foreign_keys(table).await
    }

    async fn get_indexes(&self, table: &str) -> CatalogResult<Vec<IndexInfo>> {
        if self.fail_metadata {
            return Err(boom());
        }
        self.inner.get_indexes(table).await
    }

    async fn get_constraints(&self, table: &str) -> CatalogResult<Vec<ConstraintInfo>> {
        self.inner.get_constraints(table).await
    }

    async fn get_stored_procedures(&self) -> CatalogResult<Vec<ProcedureInfo>> {
        if self.fail_metadata {
            return Err(boom());
        }
        self.inner.get_stored_procedures().await
    }

    async fn get_views(&self) -> CatalogResult<Vec<ViewInfo>> {
        if self.fail_metadata {
            return Err(boom());
        }
        self.inner.get_views().await
    }

    async fn query(&self, sql: &str) -> CatalogResult<Vec<Row>> {
        self.inner.query(sql).await
    }
}

#[tokio::test]
async fn test_table_listing_failure_aborts() {
    let catalog = FlakyCatalog {
        inner: store_catalog(),
        fail_tables: true,
        fail_metadata: false,
    };
    let err = analyzer(Arc::new(catalog), AnalyzerOptions::default())
        .analyze()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::SchemaExtraction {
            operation: "get_tables",
            table: None,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Schema extraction failed during get_tables: Query failed: connection reset"
    );
}

#[tokio::test]
async fn test_metadata_failures_degrade_to_empty() {
    let catalog = FlakyCatalog {
        inner: store_catalog(),
        fail_tables: false,
        fail_metadata: true,
    };
    let schema = analyzer(Arc::new(catalog), AnalyzerOptions::default())
        .analyze()
        .await
        .unwrap();

    assert_eq!(schema.tables.len(), 4);
    assert!(schema
        .tables
        .iter()
        .all(|t| t.indexes.as_ref().is_some_and(Vec::is_empty)));
    assert!(schema.views.is_empty());
    assert!(schema.stored_procedures.is_empty());

    // Declared keys are lost but naming still links the junction table
    assert!(schema.relationships.iter().all(|r| r.is_inferred));
    assert!(schema
        .relationships
        .iter()
        .any(|r| r.source_table == "user_roles" && r.target_table == "roles"));
}
