//! Catalog model types and the final schema graph artifact.
//!
//! Field names serialize in camelCase; they are the contract with any tool
//! that consumes the exported JSON.

pub mod relationship;
pub mod table;

pub use relationship::{Relationship, RelationshipKey, RelationshipType};
pub use table::{
    Column, ConstraintInfo, ConstraintType, IndexInfo, ProcedureInfo, Table, ViewInfo,
};

use serde::{Deserialize, Serialize};

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaData {
    /// Tables in topological order (referenced tables first).
    pub tables: Vec<Table>,
    /// Fused relationships, highest confidence first.
    pub relationships: Vec<Relationship>,
    /// Cycles among explicit foreign keys, as table-name paths.
    pub circular_dependencies: Vec<Vec<String>>,
    pub junction_tables: Vec<String>,
    #[serde(default)]
    pub stored_procedures: Vec<ProcedureInfo>,
    #[serde(default)]
    pub views: Vec<ViewInfo>,
}

impl SchemaData {
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}
