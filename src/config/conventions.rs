//! Naming conventions consulted by the relationship heuristics.

use serde::{Deserialize, Serialize};

/// Recognized naming conventions.
///
/// Every list has a built-in default. Deserializing a partial document
/// (e.g. a `[conventions]` TOML section that only sets `ignored_tables`)
/// keeps the defaults for the lists it does not mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub foreign_key_suffixes: Vec<String>,
    pub foreign_key_prefixes: Vec<String>,
    pub primary_key_suffixes: Vec<String>,
    pub primary_key_prefixes: Vec<String>,
    pub many_to_many_suffixes: Vec<String>,
    pub ignored_tables: Vec<String>,
    pub ignored_columns: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            foreign_key_suffixes: strings(&[
                "_id",
                "_key",
                "_code",
                "_fk",
                "_ref",
                "_uuid",
                "_no",
                "_number",
                "_identifier",
            ]),
            foreign_key_prefixes: strings(&["fk_", "foreign_", "ref_", "external_", "linked_"]),
            primary_key_suffixes: strings(&[
                "_id",
                "_key",
                "_pk",
                "_uuid",
                "_code",
                "_identifier",
                "_serial",
                "_sequence",
            ]),
            primary_key_prefixes: strings(&["pk_", "primary_", "id_", "main_", "key_"]),
            many_to_many_suffixes: strings(&[
                "_mapping",
                "_map",
                "_junction",
                "_link",
                "_bridge",
                "_xref",
                "_relation",
                "_association",
                "_pivot",
                "_join",
            ]),
            ignored_tables: strings(&[
                "migrations",
                "seeds",
                "schema_migrations",
                "flyway_schema_history",
                "ar_internal_metadata",
                "django_migrations",
                "alembic_version",
                "knex_migrations",
                "sequelize_meta",
                "changelog",
            ]),
            ignored_columns: strings(&[
                "created_at",
                "updated_at",
                "deleted_at",
                "modified_at",
                "timestamp",
                "version",
                "created_by",
                "updated_by",
                "is_deleted",
                "is_active",
                "last_modified",
                "revision",
            ]),
        }
    }
}

impl SchemaConfig {
    /// Builder: replace the ignored tables list.
    pub fn with_ignored_tables(mut self, tables: Vec<String>) -> Self {
        self.ignored_tables = tables;
        self
    }

    /// Builder: replace the ignored columns list.
    pub fn with_ignored_columns(mut self, columns: Vec<String>) -> Self {
        self.ignored_columns = columns;
        self
    }

    pub fn is_ignored_table(&self, name: &str) -> bool {
        self.ignored_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name))
    }

    pub fn is_ignored_column(&self, name: &str) -> bool {
        self.ignored_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name))
    }

    /// First foreign-key suffix the lowercase name ends with.
    pub fn matching_fk_suffix(&self, lower_name: &str) -> Option<&str> {
        self.foreign_key_suffixes
            .iter()
            .map(String::as_str)
            .find(|s| lower_name.ends_with(s))
    }

    /// First foreign-key prefix the lowercase name starts with.
    pub fn matching_fk_prefix(&self, lower_name: &str) -> Option<&str> {
        self.foreign_key_prefixes
            .iter()
            .map(String::as_str)
            .find(|p| lower_name.starts_with(p))
    }

    /// Whether a column name looks like a foreign key under these conventions.
    pub fn looks_like_foreign_key(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.matching_fk_suffix(&lower).is_some() || self.matching_fk_prefix(&lower).is_some()
    }

    /// Whether a column name looks like a primary key under these conventions.
    pub fn looks_like_primary_key(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        lower == "id"
            || self.primary_key_suffixes.iter().any(|s| lower.ends_with(s))
            || self.primary_key_prefixes.iter().any(|p| lower.starts_with(p))
    }

    /// A copy with extra foreign-key suffixes and prefixes appended (no duplicates).
    pub fn broadened(&self, suffixes: &[&str], prefixes: &[&str]) -> Self {
        let mut config = self.clone();
        for s in suffixes {
            if !config.foreign_key_suffixes.iter().any(|x| x == s) {
                config.foreign_key_suffixes.push(s.to_string());
            }
        }
        for p in prefixes {
            if !config.foreign_key_prefixes.iter().any(|x| x == p) {
                config.foreign_key_prefixes.push(p.to_string());
            }
        }
        config
    }
}
