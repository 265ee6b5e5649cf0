//! Relationship facts between tables.

use serde::{Deserialize, Serialize};

/// Evidence source tag for a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    /// Inferred from column and table naming conventions.
    Implicit,
    /// Declared by a catalog foreign key.
    Explicit,
    /// Inferred from overlapping sampled values.
    DataDriven,
    /// Reserved for embedding-based scoring; no analyzer emits it.
    Semantic,
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Implicit => write!(f, "implicit"),
            Self::Explicit => write!(f, "explicit"),
            Self::DataDriven => write!(f, "data-driven"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

/// A directed relationship: `source_table.source_columns` references
/// `target_table.target_columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source_table: String,
    pub source_columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
    pub is_inferred: bool,
    /// Confidence score (0.0 to 1.0). Always 1.0 for explicit relationships.
    pub confidence: f64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
}

impl Relationship {
    /// A catalog-declared foreign key.
    pub fn explicit(
        source_table: impl Into<String>,
        source_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            source_columns: vec![source_column.into()],
            target_table: target_table.into(),
            target_columns: vec![target_column.into()],
            is_inferred: false,
            confidence: 1.0,
            relationship_type: Some(RelationshipType::Explicit),
        }
    }

    /// A single-column inferred relationship. Confidence is clamped to `[0, 1]`.
    pub fn inferred(
        source_table: impl Into<String>,
        source_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
        confidence: f64,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            source_columns: vec![source_column.into()],
            target_table: target_table.into(),
            target_columns: vec![target_column.into()],
            is_inferred: true,
            confidence: confidence.clamp(0.0, 1.0),
            relationship_type: Some(relationship_type),
        }
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::from_relationship(self)
    }

    pub fn is_self_reference(&self) -> bool {
        self.source_table == self.target_table
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{} ({:.2})",
            self.source_table,
            self.source_columns.join(","),
            self.target_table,
            self.target_columns.join(","),
            self.confidence
        )
    }
}

/// A unique key identifying a relationship by its endpoints.
///
/// Multi-column endpoints are joined with `,`. Names compare exactly, as
/// the catalog reports them.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct RelationshipKey {
    pub source_table: String,
    pub source_columns: String,
    pub target_table: String,
    pub target_columns: String,
}

impl RelationshipKey {
    #[must_use]
    pub fn new(
        source_table: &str,
        source_columns: &[String],
        target_table: &str,
        target_columns: &[String],
    ) -> Self {
        Self {
            source_table: source_table.to_string(),
            source_columns: source_columns.join(","),
            target_table: target_table.to_string(),
            target_columns: target_columns.join(","),
        }
    }

    #[must_use]
    pub fn from_relationship(rel: &Relationship) -> Self {
        Self::new(
            &rel.source_table,
            &rel.source_columns,
            &rel.target_table,
            &rel.target_columns,
        )
    }
}

impl std::fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.source_table, self.source_columns, self.target_table, self.target_columns
        )
    }
}
