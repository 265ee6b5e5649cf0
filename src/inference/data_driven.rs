//! Relationship inference from sampled column values.
//!
//! For each candidate `(source column, target key column)` pair the analyzer
//! pulls a distinct-value sample of both sides and scores the overlap:
//!
//! ```text
//! confidence = |S ∩ T| / min(|S|, |T|)
//! ```
//!
//! Candidates scoring strictly above the threshold become `data-driven`
//! relationships. Samples and scores are cached with a TTL so repeated runs
//! on the same analyzer do not re-query the database.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::TtlCache;
use crate::catalog::{CatalogConnector, Row};
use crate::config::{SamplingSettings, SchemaConfig};
use crate::logging::Logger;
use crate::model::{Column, Relationship, RelationshipKey, RelationshipType, Table};
use crate::sampling::SamplingStrategy;

use super::implicit::column_names_table;
use super::scores::overlap;
use super::types::{is_array_type, types_compatible};

/// Extra naming patterns accepted as candidate foreign keys during sampling.
const EXTRA_FK_SUFFIXES: &[&str] = &["_key", "_code", "_num"];
const EXTRA_FK_PREFIXES: &[&str] = &["fk_"];

/// Tuning for the data-driven analyzer.
#[derive(Debug, Clone)]
pub struct DataDrivenConfig {
    /// Distinct values fetched per column.
    pub sample_size: usize,
    /// Hard limit per sample query; a timeout counts as "no data".
    pub query_timeout: Duration,
    /// Overlap a candidate must exceed (strictly) to be kept.
    pub confidence_threshold: f64,
    /// Lifetime of cached samples and scores.
    pub cache_ttl: Duration,
}

impl Default for DataDrivenConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            query_timeout: Duration::from_secs(5),
            confidence_threshold: overlap::DEFAULT_THRESHOLD,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl From<&SamplingSettings> for DataDrivenConfig {
    fn from(settings: &SamplingSettings) -> Self {
        Self {
            sample_size: settings.sample_size,
            query_timeout: settings.query_timeout(),
            confidence_threshold: settings.confidence_threshold,
            cache_ttl: settings.cache_ttl(),
        }
    }
}

impl DataDrivenConfig {
    /// Builder: set the sample size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Builder: set the per-query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Builder: set the acceptance threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Builder: set the cache lifetime.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Overlap of two value sets relative to the smaller one. Empty input scores 0.
pub fn overlap_confidence(source: &HashSet<String>, target: &HashSet<String>) -> f64 {
    if source.is_empty() || target.is_empty() {
        return 0.0;
    }
    let shared = source.intersection(target).count();
    shared as f64 / source.len().min(target.len()) as f64
}

/// Text used to compare sampled values. Nulls and empty strings are dropped.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The sampled column's value in a row. Engines may echo the column name
/// with different casing or quoting, so a single-column row is accepted as is.
fn column_value<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    row.get(column)
        .or_else(|| row.iter().find(|(k, _)| k.eq_ignore_ascii_case(column)).map(|(_, v)| v))
        .or_else(|| if row.len() == 1 { row.values().next() } else { None })
}

type SampleKey = (String, String);

pub struct DataDrivenAnalyzer {
    connector: Arc<dyn CatalogConnector>,
    strategy: Box<dyn SamplingStrategy>,
    conventions: SchemaConfig,
    config: DataDrivenConfig,
    samples: TtlCache<SampleKey, HashSet<String>>,
    scores: TtlCache<RelationshipKey, f64>,
    logger: Logger,
}

impl DataDrivenAnalyzer {
    pub fn new(
        connector: Arc<dyn CatalogConnector>,
        strategy: Box<dyn SamplingStrategy>,
        conventions: &SchemaConfig,
        config: DataDrivenConfig,
        logger: Logger,
    ) -> Self {
        let ttl = config.cache_ttl;
        Self {
            connector,
            strategy,
            conventions: conventions.broadened(EXTRA_FK_SUFFIXES, EXTRA_FK_PREFIXES),
            config,
            samples: TtlCache::new(ttl),
            scores: TtlCache::new(ttl),
            logger: logger.scoped("schemagraph::inference::data_driven"),
        }
    }

    /// Drop expired samples and scores. Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        self.samples.purge_expired() + self.scores.purge_expired()
    }

    /// Number of cached column samples.
    pub fn cached_samples(&self) -> usize {
        self.samples.len()
    }

    pub async fn analyze(&self, tables: &[Table]) -> Vec<Relationship> {
        let started = std::time::Instant::now();
        let purged = self.purge_expired();
        if purged > 0 {
            self.logger
                .debug(format_args!("Purged {} expired cache entries", purged));
        }

        let candidates = self.candidates(tables);
        self.logger.debug(format_args!(
            "Identified {} candidate pairs for sampling",
            candidates.len()
        ));

        let mut relationships = Vec::new();
        for (source, column, target, target_column) in candidates {
            let Some(confidence) = self.score(source, column, target, target_column).await else {
                continue;
            };

            if confidence > self.config.confidence_threshold {
                let rel = Relationship::inferred(
                    &source.name,
                    &column.name,
                    &target.name,
                    &target_column.name,
                    confidence,
                    RelationshipType::DataDriven,
                );
                self.logger.debug(format_args!("Found relationship: {}", rel));
                relationships.push(rel);
            } else {
                self.logger.debug(format_args!(
                    "Rejected {}.{} -> {}.{} (confidence {:.2})",
                    source.name, column.name, target.name, target_column.name, confidence
                ));
            }
        }

        self.logger.debug(format_args!(
            "Data-driven analysis complete. Found {} relationships in {:.2}s",
            relationships.len(),
            started.elapsed().as_secs_f64()
        ));
        relationships
    }

    /// Source columns that look like references, paired with each table's key column.
    fn candidates<'a>(
        &self,
        tables: &'a [Table],
    ) -> Vec<(&'a Table, &'a Column, &'a Table, &'a Column)> {
        let mut out = Vec::new();
        for source in tables {
            for column in source.columns.iter().filter(|c| self.is_candidate_source(c)) {
                for target in tables {
                    if target.name == source.name && !column_names_table(column, source) {
                        continue;
                    }
                    let Some(target_column) = self.key_column(target) else {
                        continue;
                    };
                    if target.name == source.name && target_column.name == column.name {
                        continue;
                    }
                    if !types_compatible(&column.data_type, &target_column.data_type) {
                        continue;
                    }
                    out.push((source, column, target, target_column));
                }
            }
        }
        out
    }

    fn is_candidate_source(&self, column: &Column) -> bool {
        !self.conventions.is_ignored_column(&column.name)
            && (self.conventions.looks_like_foreign_key(&column.name)
                || is_array_type(&column.data_type))
    }

    /// First declared primary key, else the first key-looking column.
    fn key_column<'a>(&self, table: &'a Table) -> Option<&'a Column> {
        table.first_primary_key().or_else(|| {
            table
                .columns
                .iter()
                .find(|c| self.conventions.looks_like_primary_key(&c.name))
        })
    }

    /// Overlap score, or `None` when a sample could not be fetched.
    async fn score(
        &self,
        source: &Table,
        column: &Column,
        target: &Table,
        target_column: &Column,
    ) -> Option<f64> {
        let key = RelationshipKey::new(
            &source.name,
            std::slice::from_ref(&column.name),
            &target.name,
            std::slice::from_ref(&target_column.name),
        );
        if let Some(cached) = self.scores.get(&key) {
            self.logger.debug(format_args!("Using cached score for {}", key));
            return Some(cached);
        }

        let source_values = self.sample(&source.name, &column.name).await?;
        let target_values = self.sample(&target.name, &target_column.name).await?;
        let confidence = overlap_confidence(&source_values, &target_values);
        self.scores.insert(key, confidence);
        Some(confidence)
    }

    /// Distinct sample of one column. Failures and timeouts are not cached.
    async fn sample(&self, table: &str, column: &str) -> Option<HashSet<String>> {
        let key = (table.to_string(), column.to_string());
        if let Some(cached) = self.samples.get(&key) {
            return Some(cached);
        }

        let sql = self
            .strategy
            .sample_query(table, column, self.config.sample_size);
        self.logger.debug(format_args!("Sample query: {}", sql));

        let query = self.connector.query(&sql);
        let rows = match tokio::time::timeout(self.config.query_timeout, query).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                self.logger.error(format_args!(
                    "Error getting sample data for {}.{}: {}",
                    table, column, e
                ));
                return None;
            }
            Err(_) => {
                self.logger.warn(format_args!(
                    "Timeout fetching sample data for {}.{} after {:?}",
                    table, column, self.config.query_timeout
                ));
                return None;
            }
        };

        let values: HashSet<String> = rows
            .iter()
            .filter_map(|row| column_value(row, column))
            .filter_map(value_text)
            .collect();
        self.logger.debug(format_args!(
            "Fetched {} sample values for {}.{}",
            values.len(),
            table,
            column
        ));
        self.samples.insert(key, values.clone());
        Some(values)
    }
}
