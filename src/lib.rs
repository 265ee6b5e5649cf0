//! # schemagraph
//!
//! Reads a relational database catalog, infers the relationships between its
//! tables, and emits an ordered schema graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        CatalogConnector (SQLite, JSON snapshot)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [analyzer::SchemaAnalyzer]
//! ┌─────────────────────────────────────────────────────────┐
//! │                Tables + Columns (model)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Explicit FKs + naming conventions + sampled overlap    │
//! │              fused into one set of edges                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Topological order, circular deps, junction tables      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [export]
//! ┌─────────────────────────────────────────────────────────┐
//! │               database-schema.json                       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod analyzer;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod inference;
pub mod logging;
pub mod model;
pub mod sampling;

pub use analyzer::{AnalyzerOptions, DatabaseAnalyzer};
pub use error::{AnalysisError, AnalysisResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analyzer::{AnalyzerOptions, DatabaseAnalyzer, SchemaAnalyzer};
    pub use crate::catalog::{
        CatalogConnector, CatalogError, CatalogResult, SnapshotCatalog, SqliteCatalog,
    };
    pub use crate::config::{Engine, SchemaConfig, Settings};
    pub use crate::error::{AnalysisError, AnalysisResult};
    pub use crate::export::{export_json, import_json};
    pub use crate::graph::JunctionPolicy;
    pub use crate::inference::DataDrivenConfig;
    pub use crate::logging::Logger;
    pub use crate::model::{
        Column, Relationship, RelationshipKey, RelationshipType, SchemaData, Table,
    };
}
