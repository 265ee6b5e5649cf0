//! End-to-end analysis from a live catalog to a [`SchemaData`] artifact.
//!
//! ```text
//! Catalog → Extract tables → Infer + fuse relationships → Attach indexes/constraints
//!         → Procedures/views → Topological order → Cycles → Junction tables
//! ```
//!
//! Only schema extraction can fail a run. Every later catalog call degrades
//! to an empty result with a warning.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use schemagraph::analyzer::{AnalyzerOptions, DatabaseAnalyzer};
//! use schemagraph::catalog::SqliteCatalog;
//!
//! let catalog = Arc::new(SqliteCatalog::open("app.db")?);
//! let analyzer = DatabaseAnalyzer::new(catalog, AnalyzerOptions::default(), Logger::default());
//! let schema = analyzer.analyze_to_file("database-schema.json").await?;
//! println!("{} tables, {} relationships", schema.tables.len(), schema.relationships.len());
//! ```

mod schema;

pub use schema::SchemaAnalyzer;

use std::path::Path;
use std::sync::Arc;

use crate::catalog::CatalogConnector;
use crate::config::{Engine, SchemaConfig, Settings};
use crate::error::AnalysisResult;
use crate::export::export_json;
use crate::graph::{
    detect_junction_tables, find_circular_dependencies, topological_sort, JunctionPolicy,
};
use crate::inference::{
    fuse_relationships, DataDrivenAnalyzer, DataDrivenConfig, ExplicitAnalyzer, ImplicitAnalyzer,
};
use crate::logging::Logger;
use crate::model::{ProcedureInfo, Relationship, SchemaData, Table, ViewInfo};
use crate::sampling::create_sampling_strategy;

// ============================================================================
// Options
// ============================================================================

/// Knobs for one analyzer instance.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerOptions {
    pub conventions: SchemaConfig,
    /// Enables value-overlap inference when set.
    pub data_driven: Option<DataDrivenConfig>,
    pub junction_policy: JunctionPolicy,
    /// Overrides the connector's engine when choosing sampling SQL.
    pub sampling_engine: Option<Engine>,
}

impl AnalyzerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            conventions: settings.conventions.clone(),
            data_driven: settings
                .analysis
                .data_driven
                .then(|| DataDrivenConfig::from(&settings.sampling)),
            junction_policy: settings.analysis.junction_policy,
            sampling_engine: None,
        }
    }

    pub fn with_conventions(mut self, conventions: SchemaConfig) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_data_driven(mut self, config: DataDrivenConfig) -> Self {
        self.data_driven = Some(config);
        self
    }

    pub fn with_junction_policy(mut self, policy: JunctionPolicy) -> Self {
        self.junction_policy = policy;
        self
    }

    pub fn with_sampling_engine(mut self, engine: Engine) -> Self {
        self.sampling_engine = Some(engine);
        self
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Runs the full analysis pipeline against one catalog.
///
/// The data-driven analyzer and its caches live as long as this value, so
/// repeated runs reuse sampled values until their TTL expires.
pub struct DatabaseAnalyzer {
    connector: Arc<dyn CatalogConnector>,
    schema: SchemaAnalyzer,
    explicit: ExplicitAnalyzer,
    implicit: ImplicitAnalyzer,
    data_driven: Option<DataDrivenAnalyzer>,
    junction_policy: JunctionPolicy,
    logger: Logger,
}

impl DatabaseAnalyzer {
    pub fn new(
        connector: Arc<dyn CatalogConnector>,
        options: AnalyzerOptions,
        logger: Logger,
    ) -> Self {
        let data_driven = options.data_driven.map(|config| {
            let engine = options.sampling_engine.unwrap_or_else(|| connector.engine());
            DataDrivenAnalyzer::new(
                Arc::clone(&connector),
                create_sampling_strategy(engine),
                &options.conventions,
                config,
                logger,
            )
        });

        let schema =
            SchemaAnalyzer::new(Arc::clone(&connector), options.conventions.clone(), logger);
        Self {
            schema,
            explicit: ExplicitAnalyzer::new(Arc::clone(&connector), logger),
            implicit: ImplicitAnalyzer::new(options.conventions, logger),
            data_driven,
            junction_policy: options.junction_policy,
            connector,
            logger: logger.scoped("schemagraph::analyzer"),
        }
    }

    pub fn data_driven(&self) -> Option<&DataDrivenAnalyzer> {
        self.data_driven.as_ref()
    }

    /// Run the pipeline and return the schema graph.
    pub async fn analyze(&self) -> AnalysisResult<SchemaData> {
        self.logger.info(format_args!("Analyzing {} catalog", self.connector.engine()));

        let tables = self.schema.extract().await?;
        self.logger.info(format_args!("Found {} tables", tables.len()));

        let relationships = self.relationships(&tables).await;
        self.logger.info(format_args!("Found {} relationships", relationships.len()));

        let augmented = self.augment(&tables).await;
        let (stored_procedures, views) = self.schema_objects().await;

        let circular_dependencies = find_circular_dependencies(&tables, &relationships);
        if !circular_dependencies.is_empty() {
            self.logger.warn(format_args!(
                "Found {} circular dependencies",
                circular_dependencies.len()
            ));
        }
        let junction_tables =
            detect_junction_tables(&augmented, &relationships, self.junction_policy);
        let tables = topological_sort(augmented, &relationships);

        Ok(SchemaData {
            tables,
            relationships,
            circular_dependencies,
            junction_tables,
            stored_procedures,
            views,
        })
    }

    /// Run the pipeline and write the result as pretty JSON to `path`.
    pub async fn analyze_to_file(&self, path: impl AsRef<Path>) -> AnalysisResult<SchemaData> {
        let schema = self.analyze().await?;
        export_json(&schema, path.as_ref())?;
        self.logger.info(format_args!(
            "Schema analysis exported to {}",
            path.as_ref().display()
        ));
        Ok(schema)
    }

    async fn relationships(&self, tables: &[Table]) -> Vec<Relationship> {
        let explicit = self.explicit.analyze(tables).await;
        let implicit = self.implicit.analyze(tables);
        self.logger.debug(format_args!(
            "Explicit: {}, implicit: {}",
            explicit.len(),
            implicit.len()
        ));

        let data_driven = match &self.data_driven {
            Some(analyzer) => analyzer.analyze(tables).await,
            None => Vec::new(),
        };
        if self.data_driven.is_some() {
            self.logger.debug(format_args!("Data-driven: {}", data_driven.len()));
        }

        fuse_relationships(explicit.into_iter().chain(implicit).chain(data_driven))
    }

    /// Copy each table with its indexes and constraints attached.
    async fn augment(&self, tables: &[Table]) -> Vec<Table> {
        let lookups = tables.iter().map(|table| async move {
            let indexes = match self.connector.get_indexes(&table.name).await {
                Ok(indexes) => indexes,
                Err(e) => {
                    self.logger
                        .warn(format_args!("Could not read indexes for {}: {}", table.name, e));
                    Vec::new()
                }
            };
            let constraints = match self.connector.get_constraints(&table.name).await {
                Ok(constraints) => constraints,
                Err(e) => {
                    self.logger.warn(format_args!(
                        "Could not read constraints for {}: {}",
                        table.name, e
                    ));
                    Vec::new()
                }
            };

            let mut table = table.clone();
            table.indexes = Some(indexes);
            table.constraints = Some(constraints);
            table
        });
        futures::future::join_all(lookups).await
    }

    async fn schema_objects(&self) -> (Vec<ProcedureInfo>, Vec<ViewInfo>) {
        let (procedures, views) =
            futures::join!(self.connector.get_stored_procedures(), self.connector.get_views());

        let procedures = procedures.unwrap_or_else(|e| {
            self.logger.warn(format_args!("Could not read stored procedures: {}", e));
            Vec::new()
        });
        let views = views.unwrap_or_else(|e| {
            self.logger.warn(format_args!("Could not read views: {}", e));
            Vec::new()
        });
        (procedures, views)
    }
}
