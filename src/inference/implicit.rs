use std::collections::HashSet;

use crate::config::SchemaConfig;
use crate::logging::Logger;
use crate::model::{Column, Relationship, RelationshipType, Table};

use super::inflection::name_variants;
use super::scores::naming;
use super::types::types_compatible;

/// Infers relationships from column naming conventions.
///
/// `orders.user_id` is a candidate reference to a table named `user` or
/// `users`; the target column is that table's primary key (or a same-named
/// or `id` column) and must share the source column's base type.
pub struct ImplicitAnalyzer {
    config: SchemaConfig,
    logger: Logger,
}

impl ImplicitAnalyzer {
    pub fn new(config: SchemaConfig, logger: Logger) -> Self {
        Self {
            config,
            logger: logger.scoped("schemagraph::inference::implicit"),
        }
    }

    pub fn analyze(&self, tables: &[Table]) -> Vec<Relationship> {
        self.logger.debug(format_args!("Analyzing implicit relationships..."));
        let mut relationships = Vec::new();

        for source in tables {
            for column in source
                .columns
                .iter()
                .filter(|c| !self.config.is_ignored_column(&c.name))
                .filter(|c| self.config.looks_like_foreign_key(&c.name))
            {
                let candidates = self.candidate_table_names(&column.name);
                for target in tables
                    .iter()
                    .filter(|t| candidates.contains(&t.name.to_lowercase()))
                {
                    if target.name == source.name && !column_names_table(column, source) {
                        continue;
                    }
                    let Some(target_column) = find_target_column(target, column) else {
                        continue;
                    };
                    if target.name == source.name && target_column.name == column.name {
                        continue;
                    }
                    if !types_compatible(&column.data_type, &target_column.data_type) {
                        continue;
                    }

                    let confidence = score(source, column, target, target_column);
                    relationships.push(Relationship::inferred(
                        &source.name,
                        &column.name,
                        &target.name,
                        &target_column.name,
                        confidence,
                        RelationshipType::Implicit,
                    ));
                }
            }
        }

        self.logger.debug(format_args!(
            "Implicit analysis complete. Found {} potential relationships",
            relationships.len()
        ));
        relationships
    }

    /// Table names a column could point at, lowercase.
    ///
    /// The first matching suffix and the first matching prefix are each
    /// stripped; every stem contributes itself, its singular, and its plural.
    fn candidate_table_names(&self, column: &str) -> HashSet<String> {
        let name = column.to_lowercase();
        let mut names = HashSet::new();
        if name == "id" {
            return names;
        }

        let mut stems = Vec::new();
        if let Some(suffix) = self.config.matching_fk_suffix(&name) {
            stems.push(&name[..name.len() - suffix.len()]);
        }
        if let Some(prefix) = self.config.matching_fk_prefix(&name) {
            stems.push(&name[prefix.len()..]);
        }
        if stems.is_empty() {
            stems.push(name.as_str());
        }

        for stem in stems.into_iter().filter(|s| !s.is_empty()) {
            names.extend(name_variants(stem));
        }
        names
    }
}

/// The column name mentions its own table, e.g. `employees.employee_manager_id`.
pub(crate) fn column_names_table(column: &Column, table: &Table) -> bool {
    let column = column.name.to_lowercase();
    name_variants(&table.name)
        .iter()
        .any(|variant| !variant.is_empty() && column.contains(variant.as_str()))
}

/// First declared primary key, then a same-named column, then `id` / `{table}_id`.
fn find_target_column<'a>(target: &'a Table, source_column: &Column) -> Option<&'a Column> {
    if let Some(pk) = target.first_primary_key() {
        return Some(pk);
    }
    if let Some(same) = target.column_ignore_case(&source_column.name) {
        return Some(same);
    }
    let table_id = format!("{}_id", target.name.to_lowercase());
    target.columns.iter().find(|c| {
        let lower = c.name.to_lowercase();
        lower == "id" || lower == table_id
    })
}

fn score(source: &Table, column: &Column, target: &Table, target_column: &Column) -> f64 {
    let source_col = column.name.to_lowercase();
    let target_col = target_column.name.to_lowercase();
    let target_names = name_variants(&target.name);
    let source_names = name_variants(&source.name);

    let mut confidence = naming::BASE;

    if source_col == target_col {
        confidence += naming::SAME_COLUMN_NAME;
    }

    let source_embeds_target = target_names.iter().any(|n| source_col.contains(n.as_str()));
    let target_embeds_source = source_names.iter().any(|n| target_col.contains(n.as_str()));
    if source_embeds_target || target_embeds_source {
        confidence += naming::EMBEDS_TABLE_NAME;
    }

    if target.is_primary_key(&target_column.name) {
        confidence += naming::TARGET_IS_PRIMARY_KEY;
    }

    if column.data_type == target_column.data_type {
        confidence += naming::IDENTICAL_TYPE;
    }

    if target_names
        .iter()
        .any(|n| source_col == format!("{}_id", n) || source_col == format!("id_{}", n))
    {
        confidence += naming::CONVENTIONAL_FK_NAME;
    }

    confidence.min(naming::CAP)
}
