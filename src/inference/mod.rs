//! Relationship inference.
//!
//! Three independent analyzers produce relationship evidence from a list of
//! extracted tables; fusion reduces their concatenated output to one
//! relationship per endpoint key.
//!
//! # Architecture
//!
//! ```text
//!                ┌──────────────────────┐
//!   tables ───┬─▶│ ExplicitAnalyzer     │──┐  declared foreign keys (1.0)
//!             │  └──────────────────────┘  │
//!             │  ┌──────────────────────┐  │
//!             ├─▶│ ImplicitAnalyzer     │──┼─▶ fuse_relationships ─▶ Vec<Relationship>
//!             │  └──────────────────────┘  │
//!             │  ┌──────────────────────┐  │
//!             └─▶│ DataDrivenAnalyzer   │──┘  sampled value overlap (opt-in)
//!                └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schemagraph::inference::{fuse_relationships, ImplicitAnalyzer};
//!
//! let implicit = ImplicitAnalyzer::new(SchemaConfig::default(), logger);
//! let relationships = fuse_relationships(implicit.analyze(&tables));
//! ```

mod data_driven;
mod explicit;
mod fusion;
mod implicit;
pub mod inflection;
pub mod types;

pub use data_driven::{overlap_confidence, DataDrivenAnalyzer, DataDrivenConfig};
pub use explicit::ExplicitAnalyzer;
pub use fusion::fuse_relationships;
pub use implicit::ImplicitAnalyzer;

/// Named confidence values used by the analyzers.
pub mod scores {
    /// Declared foreign keys.
    pub const EXPLICIT: f64 = 1.0;

    /// Naming heuristics.
    pub mod naming {
        /// Starting score for any type-compatible naming candidate.
        pub const BASE: f64 = 0.5;
        /// Source and target column names are identical.
        pub const SAME_COLUMN_NAME: f64 = 0.3;
        /// One side's column name embeds the other side's table name.
        pub const EMBEDS_TABLE_NAME: f64 = 0.2;
        /// Target column is a declared primary key.
        pub const TARGET_IS_PRIMARY_KEY: f64 = 0.2;
        /// Raw type strings are identical.
        pub const IDENTICAL_TYPE: f64 = 0.1;
        /// Source column is exactly `{table}_id` or `id_{table}`.
        pub const CONVENTIONAL_FK_NAME: f64 = 0.2;
        pub const CAP: f64 = 1.0;
    }

    /// Sampled value overlap.
    pub mod overlap {
        /// Default acceptance threshold; a candidate must score strictly above it.
        pub const DEFAULT_THRESHOLD: f64 = 0.5;
    }
}
