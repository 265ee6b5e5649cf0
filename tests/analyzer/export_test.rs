// tests/analyzer/export_test.rs
use std::fs;
use std::sync::Arc;

use schemagraph::analyzer::{AnalyzerOptions, DatabaseAnalyzer};
use schemagraph::catalog::{SnapshotCatalog, TableSnapshot};
use schemagraph::config::Engine;
use schemagraph::export::{export_json, import_json};
use schemagraph::logging::Logger;
use schemagraph::model::{Column, Relationship, SchemaData, Table};

fn sample_schema() -> SchemaData {
    SchemaData {
        tables: vec![
            Table::new("users", vec![Column::new("id", "integer").primary_key()]),
            Table::new(
                "orders",
                vec![
                    Column::new("id", "integer").primary_key(),
                    Column::new("user_id", "integer"),
                ],
            ),
        ],
        relationships: vec![Relationship::explicit("orders", "user_id", "users", "id")],
        circular_dependencies: vec![vec!["orders".to_string(), "users".to_string()]],
        junction_tables: vec![],
        stored_procedures: vec![],
        views: vec![],
    }
}

#[test]
fn test_export_then_import_preserves_schema() {
    let dir = std::env::temp_dir().join("schemagraph-export-test").join("nested");
    let path = dir.join("database-schema.json");
    let _ = fs::remove_dir_all(&dir);

    let schema = sample_schema();
    export_json(&schema, &path).unwrap();
    assert_eq!(import_json(&path).unwrap(), schema);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_exported_field_names() {
    let path = std::env::temp_dir().join("schemagraph-field-names.json");
    export_json(&sample_schema(), &path).unwrap();

    let json = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rel = &value["relationships"][0];
    assert_eq!(rel["sourceTable"], "orders");
    assert_eq!(rel["sourceColumns"][0], "user_id");
    assert_eq!(rel["isInferred"], false);
    assert_eq!(rel["confidence"], 1.0);
    assert_eq!(value["tables"][1]["primaryKeys"][0], "id");
    assert_eq!(value["circularDependencies"][0][1], "users");
    assert!(value["junctionTables"].as_array().unwrap().is_empty());

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn test_analyze_to_file_writes_artifact() {
    let catalog = SnapshotCatalog::new(Engine::Sqlite)
        .with_table(TableSnapshot::new(
            "orders",
            vec![
                Column::new("id", "integer").primary_key(),
                Column::new("user_id", "integer"),
            ],
        ))
        .with_table(TableSnapshot::new(
            "users",
            vec![Column::new("id", "integer").primary_key()],
        ));
    let analyzer =
        DatabaseAnalyzer::new(Arc::new(catalog), AnalyzerOptions::default(), Logger::default());

    let path = std::env::temp_dir().join("schemagraph-analyze-to-file.json");
    let schema = analyzer.analyze_to_file(&path).await.unwrap();

    assert_eq!(import_json(&path).unwrap(), schema);
    assert_eq!(schema.table_names(), vec!["users", "orders"]);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_import_missing_file_fails() {
    let path = std::env::temp_dir().join("schemagraph-does-not-exist.json");
    let err = import_json(&path).unwrap_err();
    assert!(err.to_string().contains("schemagraph-does-not-exist.json"));
}
