//! In-memory catalog, optionally loaded from a JSON snapshot file.
//!
//! A snapshot records what a live connector would report (tables, columns,
//! foreign keys, indexes, constraints, views, procedures) plus optional row
//! data. Sample queries produced by the sampling strategies are answered
//! from the recorded rows, so the data-driven analyzer works offline.
//!
//! ```json
//! {
//!   "engine": "postgres",
//!   "tables": [
//!     {
//!       "name": "orders",
//!       "columns": [{ "name": "id", "type": "int", "isPrimaryKey": true }],
//!       "foreignKeys": [{ "columnName": "user_id", "referencedTable": "users", "referencedColumn": "id" }],
//!       "rows": [{ "id": 1, "user_id": 7 }]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CatalogConnector, CatalogError, CatalogResult, ForeignKeyInfo, Row};
use crate::config::Engine;
use crate::model::{Column, ConstraintInfo, IndexInfo, ProcedureInfo, ViewInfo};

/// `SELECT [DISTINCT] <col> FROM <table>`, with any identifier quoting.
/// The leftmost match that names a real table wins, which skips the
/// outer `FROM (subquery)` of nested sample queries.
static SAMPLE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)SELECT\s+(?:DISTINCT\s+)?([\w$`"\[\]]+)\s+FROM\s+([\w$.`"\[\]]+)"#)
        .expect("sample query pattern is valid")
});

static LIMIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bLIMIT\s+(\d+)").expect("limit pattern is valid"));

fn unquote(ident: &str) -> String {
    ident
        .chars()
        .filter(|c| !matches!(c, '`' | '"' | '[' | ']'))
        .collect()
}

/// Recorded metadata and rows for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyInfo>,
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
    #[serde(default)]
    pub constraints: Vec<ConstraintInfo>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TableSnapshot {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            ..Default::default()
        }
    }

    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyInfo::new(
            column,
            referenced_table,
            referenced_column,
        ));
        self
    }

    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintInfo) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Append a row. Non-object values are ignored.
    pub fn with_row(mut self, row: Value) -> Self {
        if let Value::Object(map) = row {
            self.rows.push(map);
        }
        self
    }

    /// Distinct non-null values of `column`, in row order.
    fn distinct_values(&self, column: &str, limit: usize) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert(v.to_string()))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// The serialized form of a [`SnapshotCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub engine: Engine,
    pub tables: Vec<TableSnapshot>,
    #[serde(default)]
    pub views: Vec<ViewInfo>,
    #[serde(default)]
    pub stored_procedures: Vec<ProcedureInfo>,
}

/// A catalog served entirely from memory.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    snapshot: CatalogSnapshot,
}

impl SnapshotCatalog {
    pub fn new(engine: Engine) -> Self {
        Self {
            snapshot: CatalogSnapshot {
                engine,
                ..Default::default()
            },
        }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
        Ok(Self { snapshot })
    }

    pub fn with_table(mut self, table: TableSnapshot) -> Self {
        self.snapshot.tables.push(table);
        self
    }

    pub fn with_view(mut self, view: ViewInfo) -> Self {
        self.snapshot.views.push(view);
        self
    }

    pub fn with_procedure(mut self, procedure: ProcedureInfo) -> Self {
        self.snapshot.stored_procedures.push(procedure);
        self
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Exact name first, then the unqualified part of `schema.table`.
    fn find_table(&self, name: &str) -> Option<&TableSnapshot> {
        let tables = &self.snapshot.tables;
        tables.iter().find(|t| t.name == name).or_else(|| {
            let short = name.rsplit('.').next().unwrap_or(name);
            tables.iter().find(|t| t.name == short)
        })
    }

    fn table(&self, name: &str) -> CatalogResult<&TableSnapshot> {
        self.find_table(name)
            .ok_or_else(|| CatalogError::TableNotFound(name.to_string()))
    }

    fn answer_sample_query(&self, sql: &str) -> CatalogResult<Vec<Row>> {
        let limit = LIMIT
            .captures(sql)
            .and_then(|c| c[1].parse::<usize>().ok())
            .unwrap_or(usize::MAX);

        let mut last_table = None;
        for caps in SAMPLE_QUERY.captures_iter(sql) {
            let column = unquote(&caps[1]);
            let table_name = unquote(&caps[2]);
            if let Some(table) = self.find_table(&table_name) {
                let rows = table
                    .distinct_values(&column, limit)
                    .into_iter()
                    .map(|value| {
                        let mut row = Row::new();
                        row.insert(column.clone(), value);
                        row
                    })
                    .collect();
                return Ok(rows);
            }
            last_table = Some(table_name);
        }

        match last_table {
            Some(table) => Err(CatalogError::TableNotFound(table)),
            None => Err(CatalogError::Unsupported(format!(
                "snapshot catalog cannot execute: {}",
                sql
            ))),
        }
    }
}

#[async_trait]
impl CatalogConnector for SnapshotCatalog {
    fn engine(&self) -> Engine {
        self.snapshot.engine
    }

    async fn get_tables(&self) -> CatalogResult<Vec<String>> {
        Ok(self.snapshot.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<Column>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn get_indexes(&self, table: &str) -> CatalogResult<Vec<IndexInfo>> {
        Ok(self.table(table)?.indexes.clone())
    }

    async fn get_constraints(&self, table: &str) -> CatalogResult<Vec<ConstraintInfo>> {
        Ok(self.table(table)?.constraints.clone())
    }

    async fn get_stored_procedures(&self) -> CatalogResult<Vec<ProcedureInfo>> {
        Ok(self.snapshot.stored_procedures.clone())
    }

    async fn get_views(&self) -> CatalogResult<Vec<ViewInfo>> {
        Ok(self.snapshot.views.clone())
    }

    async fn query(&self, sql: &str) -> CatalogResult<Vec<Row>> {
        self.answer_sample_query(sql)
    }
}
