use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Relationship, Table};

/// Shape test applied to tables with two or more outgoing relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JunctionPolicy {
    /// Every column is a primary-key column or a relationship source column.
    #[default]
    Strict,
    /// Mostly key columns: FK columns ≥ 50%, unexplained columns ≤ 20%,
    /// at most 7 columns. Audit/measure/status columns and identifier-looking
    /// columns are tolerated.
    Ratio,
}

const MIN_FK_RATIO: f64 = 0.5;
const MAX_EXTRA_RATIO: f64 = 0.2;
const MAX_COLUMNS: usize = 7;

static METADATA_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:created|updated|modified)(?:_at)?|timestamp|date|quantity|amount|price|cost|status|type)$",
    )
    .expect("metadata column pattern is valid")
});

fn is_metadata_column(name: &str) -> bool {
    METADATA_COLUMN.is_match(name)
}

/// Ends in `id` but is not `id` itself, e.g. `external_id`, `batchid`.
fn is_identifier_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with("id") && lower != "id"
}

/// Names of tables that model many-to-many associations, in input order.
pub fn detect_junction_tables(
    tables: &[Table],
    relationships: &[Relationship],
    policy: JunctionPolicy,
) -> Vec<String> {
    tables
        .iter()
        .filter(|table| is_junction(table, relationships, policy))
        .map(|table| table.name.clone())
        .collect()
}

fn is_junction(table: &Table, relationships: &[Relationship], policy: JunctionPolicy) -> bool {
    let outgoing: Vec<&Relationship> = relationships
        .iter()
        .filter(|r| r.source_table == table.name)
        .collect();

    let distinct: HashSet<_> = outgoing.iter().map(|r| r.key()).collect();
    if distinct.len() < 2 {
        return false;
    }

    let fk_columns: HashSet<&str> = outgoing
        .iter()
        .flat_map(|r| r.source_columns.iter().map(String::as_str))
        .collect();
    let is_key = |name: &str| table.is_primary_key(name) || fk_columns.contains(name);

    match policy {
        JunctionPolicy::Strict => table.columns.iter().all(|c| is_key(&c.name)),
        JunctionPolicy::Ratio => {
            let total = table.columns.len();
            if total == 0 || total > MAX_COLUMNS {
                return false;
            }
            let extra = table
                .columns
                .iter()
                .filter(|c| !is_key(&c.name))
                .filter(|c| !is_metadata_column(&c.name) && !is_identifier_column(&c.name))
                .count();
            let fk_ratio = fk_columns.len() as f64 / total as f64;
            let extra_ratio = extra as f64 / total as f64;
            fk_ratio >= MIN_FK_RATIO && extra_ratio <= MAX_EXTRA_RATIO
        }
    }
}
