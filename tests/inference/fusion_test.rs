// tests/inference/fusion_test.rs
use schemagraph::inference::fuse_relationships;
use schemagraph::model::{Relationship, RelationshipType};

fn inferred(source: &str, column: &str, target: &str, confidence: f64) -> Relationship {
    Relationship::inferred(source, column, target, "id", confidence, RelationshipType::Implicit)
}

#[test]
fn test_higher_confidence_wins_at_same_key() {
    let fused = fuse_relationships(vec![
        inferred("orders", "user_id", "users", 0.3),
        inferred("orders", "user_id", "users", 0.7),
    ]);
    assert_eq!(fused.len(), 1);
    assert_eq!(fused[0].confidence, 0.7);
}

#[test]
fn test_explicit_beats_any_inferred_confidence() {
    let mut strong = inferred("orders", "user_id", "users", 1.0);
    strong.relationship_type = Some(RelationshipType::DataDriven);

    let fused = fuse_relationships(vec![
        strong,
        Relationship::explicit("orders", "user_id", "users", "id"),
    ]);
    assert_eq!(fused.len(), 1);
    assert!(!fused[0].is_inferred);
    assert_eq!(fused[0].relationship_type, Some(RelationshipType::Explicit));
}

#[test]
fn test_case_sensitive_tables_are_not_merged() {
    // e.g. quoted "Users" next to users in Postgres
    let fused = fuse_relationships(vec![
        inferred("orders", "user_id", "Users", 0.6),
        inferred("orders", "user_id", "users", 0.9),
    ]);
    assert_eq!(fused.len(), 2);
    let targets: Vec<&str> = fused.iter().map(|r| r.target_table.as_str()).collect();
    assert_eq!(targets, vec!["users", "Users"]);
}

#[test]
fn test_output_sorted_by_descending_confidence() {
    let fused = fuse_relationships(vec![
        inferred("a", "x_id", "x", 0.55),
        Relationship::explicit("b", "y_id", "y", "id"),
        inferred("c", "z_id", "z", 0.8),
    ]);
    let confidences: Vec<f64> = fused.iter().map(|r| r.confidence).collect();
    assert_eq!(confidences, vec![1.0, 0.8, 0.55]);
}

#[test]
fn test_fusing_twice_changes_nothing() {
    let once = fuse_relationships(vec![
        inferred("orders", "user_id", "users", 0.4),
        inferred("orders", "user_id", "users", 0.9),
        inferred("order_items", "order_id", "orders", 0.9),
        Relationship::explicit("order_items", "product_id", "products", "id"),
    ]);
    let twice = fuse_relationships(once.clone());
    assert_eq!(once, twice);
}
