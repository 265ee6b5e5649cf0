//! schemagraph CLI - Analyze a database catalog into a schema graph
//!
//! Usage:
//!   schemagraph analyze [--sqlite <db> | --catalog <snapshot.json>] [--output <file>]
//!   schemagraph inspect <database-schema.json>
//!
//! Examples:
//!   schemagraph analyze --sqlite app.db --debug
//!   schemagraph analyze --catalog warehouse.json --data-driven --sample-size 500
//!   schemagraph inspect database-schema.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use schemagraph::analyzer::{AnalyzerOptions, DatabaseAnalyzer};
use schemagraph::catalog::{CatalogConnector, SnapshotCatalog, SqliteCatalog};
use schemagraph::config::{Engine, Settings};
use schemagraph::export::{import_json, DEFAULT_OUTPUT};
use schemagraph::graph::JunctionPolicy;
use schemagraph::inference::DataDrivenConfig;
use schemagraph::logging::Logger;

#[derive(Parser)]
#[command(name = "schemagraph")]
#[command(about = "schemagraph - Infer table relationships and dependency order from a database catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a catalog and write the schema graph as JSON
    Analyze {
        /// SQLite database file
        #[arg(long, conflicts_with = "catalog")]
        sqlite: Option<PathBuf>,

        /// JSON catalog snapshot
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Engine whose SQL dialect is used for sample queries
        #[arg(short, long)]
        engine: Option<String>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (defaults to SCHEMAGRAPH_CONFIG, ./schemagraph.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also infer relationships from sampled column values
        #[arg(long)]
        data_driven: bool,

        /// Distinct values sampled per column
        #[arg(long)]
        sample_size: Option<usize>,

        /// How strictly junction tables are recognized
        #[arg(long)]
        junction_policy: Option<PolicyArg>,

        /// Verbose logging
        #[arg(short, long)]
        debug: bool,
    },

    /// Summarize a previously exported schema graph
    Inspect {
        /// Path to the exported JSON file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Strict,
    Ratio,
}

impl From<PolicyArg> for JunctionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => JunctionPolicy::Strict,
            PolicyArg::Ratio => JunctionPolicy::Ratio,
        }
    }
}

struct AnalyzeArgs {
    sqlite: Option<PathBuf>,
    catalog: Option<PathBuf>,
    engine: Option<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    data_driven: bool,
    sample_size: Option<usize>,
    junction_policy: Option<PolicyArg>,
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            sqlite,
            catalog,
            engine,
            output,
            config,
            data_driven,
            sample_size,
            junction_policy,
            debug,
        } => {
            cmd_analyze(AnalyzeArgs {
                sqlite,
                catalog,
                engine,
                output,
                config,
                data_driven,
                sample_size,
                junction_policy,
                debug,
            })
            .await
        }
        Commands::Inspect { file } => cmd_inspect(&file),
    }
}

async fn cmd_analyze(args: AnalyzeArgs) -> ExitCode {
    let settings = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let debug = args.debug || settings.logging.debug;
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let logger = Logger::new(debug);

    let connector = match open_catalog(&args, &settings) {
        Ok(c) => c,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let mut options = AnalyzerOptions::from_settings(&settings);
    if let Some(policy) = args.junction_policy {
        options.junction_policy = policy.into();
    }
    if args.data_driven || args.sample_size.is_some() {
        let config = options
            .data_driven
            .take()
            .unwrap_or_else(|| DataDrivenConfig::from(&settings.sampling));
        options.data_driven = Some(match args.sample_size {
            Some(size) => config.with_sample_size(size),
            None => config,
        });
    }
    match sampling_engine(&args, &settings) {
        Ok(Some(engine)) => options.sampling_engine = Some(engine),
        Ok(None) => {}
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    }

    let output = args.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let analyzer = DatabaseAnalyzer::new(connector, options, logger);

    match analyzer.analyze_to_file(&output).await {
        Ok(schema) => {
            println!(
                "Analyzed {} tables, {} relationships, {} circular dependencies, {} junction tables",
                schema.tables.len(),
                schema.relationships.len(),
                schema.circular_dependencies.len(),
                schema.junction_tables.len()
            );
            println!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_catalog(
    args: &AnalyzeArgs,
    settings: &Settings,
) -> Result<Arc<dyn CatalogConnector>, String> {
    let configured_path = settings
        .catalog
        .resolved_path()
        .map_err(|e| format!("Invalid catalog path: {}", e))?;
    let configured_snapshot = settings
        .catalog
        .resolved_snapshot()
        .map_err(|e| format!("Invalid snapshot path: {}", e))?;

    // An explicit --sqlite wins over a configured snapshot
    let snapshot = match (&args.catalog, &args.sqlite) {
        (Some(path), _) => Some(path.clone()),
        (None, None) => configured_snapshot,
        (None, Some(_)) => None,
    };
    if let Some(path) = snapshot {
        return SnapshotCatalog::from_file(&path)
            .map(|c| Arc::new(c) as Arc<dyn CatalogConnector>)
            .map_err(|e| format!("Error reading catalog snapshot '{}': {}", path.display(), e));
    }

    match args.sqlite.clone().or(configured_path) {
        Some(path) => SqliteCatalog::open(&path)
            .map(|c| Arc::new(c) as Arc<dyn CatalogConnector>)
            .map_err(|e| format!("Error opening SQLite database '{}': {}", path.display(), e)),
        None => Err(
            "No catalog given: pass --sqlite or --catalog, or set [catalog] in the config"
                .to_string(),
        ),
    }
}

fn sampling_engine(args: &AnalyzeArgs, settings: &Settings) -> Result<Option<Engine>, String> {
    if let Some(name) = &args.engine {
        return Engine::from_str(name).map(Some).map_err(|e| e.to_string());
    }
    if settings.catalog.engine.is_some() {
        return settings.catalog.engine().map(Some).map_err(|e| e.to_string());
    }
    Ok(None)
}

fn cmd_inspect(file: &Path) -> ExitCode {
    let schema = match import_json(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("File: {}", file.display());
    println!();

    println!("Tables (dependency order):");
    for table in &schema.tables {
        println!("  - {} ({} columns)", table.name, table.columns.len());
    }
    println!();

    if !schema.relationships.is_empty() {
        println!("Relationships:");
        for rel in &schema.relationships {
            println!("  - {}", rel);
        }
        println!();
    }

    if !schema.circular_dependencies.is_empty() {
        println!("Circular dependencies:");
        for cycle in &schema.circular_dependencies {
            println!("  - {}", cycle.join(" -> "));
        }
        println!();
    }

    if schema.junction_tables.is_empty() {
        println!("No junction tables.");
    } else {
        println!("Junction tables: {}", schema.junction_tables.join(", "));
    }

    ExitCode::SUCCESS
}
