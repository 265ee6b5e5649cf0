// tests/inference/implicit_test.rs
use schemagraph::config::SchemaConfig;
use schemagraph::inference::ImplicitAnalyzer;
use schemagraph::logging::Logger;
use schemagraph::model::{Column, RelationshipType, Table};

fn analyzer() -> ImplicitAnalyzer {
    ImplicitAnalyzer::new(SchemaConfig::default(), Logger::default())
}

fn users() -> Table {
    Table::new(
        "users",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("name", "text"),
        ],
    )
}

#[test]
fn test_user_id_references_users() {
    let orders = Table::new(
        "orders",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("user_id", "integer"),
        ],
    );

    let rels = analyzer().analyze(&[users(), orders]);
    assert_eq!(rels.len(), 1);

    let rel = &rels[0];
    assert_eq!(rel.source_table, "orders");
    assert_eq!(rel.source_columns, vec!["user_id"]);
    assert_eq!(rel.target_table, "users");
    assert_eq!(rel.target_columns, vec!["id"]);
    assert!(rel.is_inferred);
    assert!(rel.confidence >= 0.9, "confidence {}", rel.confidence);
    assert_eq!(rel.relationship_type, Some(RelationshipType::Implicit));
}

#[test]
fn test_singular_table_name_matches() {
    let person = Table::new("person", vec![Column::new("id", "bigint").primary_key()]);
    let visits = Table::new(
        "visits",
        vec![
            Column::new("id", "bigint").primary_key(),
            Column::new("person_id", "bigint"),
        ],
    );

    let rels = analyzer().analyze(&[person, visits]);
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].target_table, "person");
}

#[test]
fn test_incompatible_types_are_rejected() {
    let orders = Table::new(
        "orders",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("user_id", "uuid"),
        ],
    );
    assert!(analyzer().analyze(&[users(), orders]).is_empty());
}

#[test]
fn test_type_parameters_are_ignored() {
    let accounts = Table::new(
        "accounts",
        vec![Column::new("id", "varchar(36)").primary_key()],
    );
    let invoices = Table::new(
        "invoices",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("account_id", "VARCHAR(64)"),
        ],
    );
    let rels = analyzer().analyze(&[accounts, invoices]);
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].target_table, "accounts");
}

#[test]
fn test_self_reference_when_column_names_own_table() {
    let nodes = Table::new(
        "nodes",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("node_id", "integer"),
        ],
    );
    let rels = analyzer().analyze(&[nodes]);
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].source_table, "nodes");
    assert_eq!(rels[0].target_table, "nodes");
    assert_eq!(rels[0].target_columns, vec!["id"]);
}

#[test]
fn test_primary_key_never_references_itself() {
    let users = Table::new("users", vec![Column::new("user_id", "integer").primary_key()]);
    assert!(analyzer().analyze(&[users]).is_empty());
}

#[test]
fn test_ignored_columns_are_skipped() {
    let orders = Table::new(
        "orders",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("user_id", "integer"),
        ],
    );
    let config = SchemaConfig::default().with_ignored_columns(vec!["user_id".to_string()]);
    let analyzer = ImplicitAnalyzer::new(config, Logger::default());
    assert!(analyzer.analyze(&[users(), orders]).is_empty());
}
