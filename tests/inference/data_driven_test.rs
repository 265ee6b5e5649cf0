// tests/inference/data_driven_test.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use schemagraph::catalog::{
    CatalogConnector, CatalogResult, ForeignKeyInfo, Row, SnapshotCatalog, SqliteCatalog,
    TableSnapshot,
};
use schemagraph::config::{Engine, SchemaConfig};
use schemagraph::inference::{DataDrivenAnalyzer, DataDrivenConfig};
use schemagraph::logging::Logger;
use schemagraph::model::{
    Column, ConstraintInfo, IndexInfo, RelationshipType, Table, ViewInfo,
};
use schemagraph::sampling::{create_sampling_strategy, SamplingStrategy};
use serde_json::json;

/// Snapshot catalog that counts sample queries and can answer them slowly.
struct InstrumentedCatalog {
    inner: SnapshotCatalog,
    delay: Option<Duration>,
    queries: AtomicUsize,
}

impl InstrumentedCatalog {
    fn new(inner: SnapshotCatalog) -> Self {
        Self {
            inner,
            delay: None,
            queries: AtomicUsize::new(0),
        }
    }

    fn slow(inner: SnapshotCatalog, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(inner)
        }
    }

    fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogConnector for InstrumentedCatalog {
    fn engine(&self) -> Engine {
        self.inner.engine()
    }

    async fn get_tables(&self) -> CatalogResult<Vec<String>> {
        self.inner.get_tables().await
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<Column>> {
        self.inner.get_columns(table).await
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        self.inner.get_foreign_keys(table).await
    }

    async fn get_indexes(&self, table: &str) -> CatalogResult<Vec<IndexInfo>> {
        self.inner.get_indexes(table).await
    }

    async fn get_constraints(&self, table: &str) -> CatalogResult<Vec<ConstraintInfo>> {
        self.inner.get_constraints(table).await
    }

    async fn get_views(&self) -> CatalogResult<Vec<ViewInfo>> {
        self.inner.get_views().await
    }

    async fn query(&self, sql: &str) -> CatalogResult<Vec<Row>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.query(sql).await
    }
}

fn tables() -> Vec<Table> {
    vec![
        Table::new("users", vec![Column::new("id", "integer").primary_key()]),
        Table::new(
            "orders",
            vec![
                Column::new("id", "integer").primary_key(),
                Column::new("user_id", "integer"),
            ],
        ),
    ]
}

/// Three of the four sampled `orders.user_id` values exist in `users.id`.
fn catalog() -> SnapshotCatalog {
    let mut users = TableSnapshot::new("users", tables()[0].columns.clone());
    for id in 1..=4 {
        users = users.with_row(json!({ "id": id }));
    }
    let mut orders = TableSnapshot::new("orders", tables()[1].columns.clone());
    for (id, user_id) in [(1, 1), (2, 2), (3, 3), (4, 9), (5, 1)] {
        orders = orders.with_row(json!({ "id": id, "user_id": user_id }));
    }
    SnapshotCatalog::new(Engine::Sqlite)
        .with_table(users)
        .with_table(orders)
}

fn analyzer(connector: Arc<InstrumentedCatalog>, config: DataDrivenConfig) -> DataDrivenAnalyzer {
    DataDrivenAnalyzer::new(
        connector,
        create_sampling_strategy(Engine::Sqlite),
        &SchemaConfig::default(),
        config,
        Logger::default(),
    )
}

#[tokio::test]
async fn test_overlap_above_threshold_is_reported() {
    let connector = Arc::new(InstrumentedCatalog::new(catalog()));
    let rels = analyzer(connector, DataDrivenConfig::default())
        .analyze(&tables())
        .await;

    assert_eq!(rels.len(), 1);
    let rel = &rels[0];
    assert_eq!(rel.source_table, "orders");
    assert_eq!(rel.source_columns, vec!["user_id"]);
    assert_eq!(rel.target_table, "users");
    assert_eq!(rel.target_columns, vec!["id"]);
    assert_eq!(rel.confidence, 0.75);
    assert!(rel.is_inferred);
    assert_eq!(rel.relationship_type, Some(RelationshipType::DataDriven));
}

#[tokio::test]
async fn test_overlap_at_or_below_threshold_is_dropped() {
    let connector = Arc::new(InstrumentedCatalog::new(catalog()));
    let config = DataDrivenConfig::default().with_confidence_threshold(0.75);
    let rels = analyzer(connector, config).analyze(&tables()).await;
    assert!(rels.is_empty());
}

#[tokio::test]
async fn test_repeat_analysis_reuses_cached_scores() {
    let connector = Arc::new(InstrumentedCatalog::new(catalog()));
    let analyzer = analyzer(Arc::clone(&connector), DataDrivenConfig::default());

    let first = analyzer.analyze(&tables()).await;
    assert_eq!(connector.query_count(), 2);
    assert_eq!(analyzer.cached_samples(), 2);

    let second = analyzer.analyze(&tables()).await;
    assert_eq!(connector.query_count(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_expired_cache_samples_again() {
    let connector = Arc::new(InstrumentedCatalog::new(catalog()));
    let config = DataDrivenConfig::default().with_cache_ttl(Duration::from_millis(10));
    let analyzer = analyzer(Arc::clone(&connector), config);

    analyzer.analyze(&tables()).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    analyzer.analyze(&tables()).await;

    assert_eq!(connector.query_count(), 4);
}

#[tokio::test]
async fn test_slow_sample_counts_as_no_data() {
    let connector = Arc::new(InstrumentedCatalog::slow(
        catalog(),
        Duration::from_millis(500),
    ));
    let config = DataDrivenConfig::default().with_query_timeout(Duration::from_millis(20));
    let analyzer = analyzer(connector, config);

    let rels = analyzer.analyze(&tables()).await;
    assert!(rels.is_empty());
    assert_eq!(analyzer.cached_samples(), 0);
}

#[tokio::test]
async fn test_failed_sample_query_is_not_fatal() {
    // `orders` has no snapshot, so its sample query errors
    let users_only = SnapshotCatalog::new(Engine::Sqlite)
        .with_table(TableSnapshot::new("users", tables()[0].columns.clone()));
    let connector = Arc::new(InstrumentedCatalog::new(users_only));

    let rels = analyzer(connector, DataDrivenConfig::default())
        .analyze(&tables())
        .await;
    assert!(rels.is_empty());
}

/// Large enough that an `ORDER BY RANDOM()` sample takes well over the timeout.
fn large_sqlite_catalog() -> SqliteCatalog {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    catalog
        .execute_batch(
            "
            CREATE TABLE users (id INTEGER PRIMARY KEY);
            CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER);
            WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 500000)
            INSERT INTO users (id) SELECT n FROM seq;
            INSERT INTO orders (id, user_id) SELECT id, id FROM users;
            ",
        )
        .unwrap();
    catalog
}

#[tokio::test]
async fn test_sqlite_sample_timeout_interrupts_query() {
    let catalog = Arc::new(large_sqlite_catalog());
    let sql = create_sampling_strategy(Engine::Sqlite).sample_query("orders", "user_id", 1000);

    let started = Instant::now();
    let full = catalog.query(&sql).await.unwrap();
    let uncapped = started.elapsed();
    assert_eq!(full.len(), 1000);

    let analyzer = DataDrivenAnalyzer::new(
        Arc::clone(&catalog) as Arc<dyn CatalogConnector>,
        create_sampling_strategy(Engine::Sqlite),
        &SchemaConfig::default(),
        DataDrivenConfig::default().with_query_timeout(Duration::from_millis(10)),
        Logger::default(),
    );

    let started = Instant::now();
    let rels = analyzer.analyze(&tables()).await;
    // The connection is free again only once the timed-out statement stopped
    let rows = catalog.query("SELECT 1 AS one").await.unwrap();
    let capped = started.elapsed();

    assert!(rels.is_empty());
    assert_eq!(analyzer.cached_samples(), 0);
    assert_eq!(rows[0]["one"], json!(1));
    assert!(
        capped < uncapped,
        "timed-out sample took {:?}, a full sample takes {:?}",
        capped,
        uncapped
    );
}
