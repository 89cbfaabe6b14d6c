//! modelgen CLI - SQLAlchemy model generation from a live PostgreSQL schema.
//!
//! Two modes: `list-tables` prints the catalog's table names and writes
//! nothing; `generate` renders one model module per table plus the shared
//! base and package index. Exit codes: 0 success, 2 connectivity failure,
//! 3 schema error (missing table, name collision), 4 output I/O failure.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use modelgen::codegen::{generate, GenerationRequest, TableStatus};
use modelgen::schema::{PgInspector, SchemaInspector};
use modelgen::{load_config, GeneratorError};

#[derive(Parser)]
#[command(name = "modelgen")]
#[command(version, about = "Generate SQLAlchemy models from a PostgreSQL schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tables in the database, performing no writes
    ListTables {
        /// Path to the YAML config file with the pgsql section
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Generate model files from the database schema
    Generate {
        /// Path to the YAML config file with the pgsql section
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output directory for the generated package
        #[arg(short, long, default_value = "models")]
        output: PathBuf,

        /// Generate only these tables (all tables when omitted)
        #[arg(short, long, num_args = 1..)]
        tables: Option<Vec<String>>,

        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ListTables { config } => list_tables(&config),
        Commands::Generate {
            config,
            output,
            tables,
            json,
        } => run_generate(&config, output, tables, json),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Build an inspector from `DATABASE_URL` or the config file.
fn connect(config_path: &Path) -> Result<PgInspector, GeneratorError> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        println!("🔌 Connecting via DATABASE_URL");
        return PgInspector::connect(&url);
    }

    let config = load_config(config_path)?;
    println!(
        "🔌 Connecting to {}:{}/{}",
        config.pgsql.host, config.pgsql.port, config.pgsql.database
    );
    PgInspector::connect(&config.pgsql.database_url())
}

fn list_tables(config_path: &Path) -> Result<i32, GeneratorError> {
    let mut inspector = connect(config_path)?;
    let tables = inspector.list_tables()?;

    if tables.is_empty() {
        println!("⚠ No tables found in the database");
        return Ok(0);
    }

    println!("📊 Found {} tables:", tables.len());
    for (i, table) in tables.iter().enumerate() {
        println!("  {}. {}", i + 1, table);
    }

    Ok(0)
}

fn run_generate(
    config_path: &Path,
    output: PathBuf,
    tables: Option<Vec<String>>,
    json: bool,
) -> Result<i32, GeneratorError> {
    let inspector = connect(config_path)?;

    let request = GenerationRequest {
        tables,
        output_dir: output,
        generated_at: None,
    };

    println!("🔧 Generating models into {}...", request.output_dir.display());
    let report = generate(inspector, &request)?;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| GeneratorError::Config(format!("Failed to encode report: {}", e)))?;
        println!("{}", rendered);
    } else {
        for table in &report.tables {
            match &table.status {
                TableStatus::Written => {
                    println!("  ✓ {} -> {}", table.table, table.file.as_deref().unwrap_or("?"));
                }
                TableStatus::Failed { message } => {
                    println!("  ✗ {} - {}", table.table, message);
                }
            }
            for warning in &table.warnings {
                println!("    ⚠ {}", warning);
            }
        }

        let written = report
            .tables
            .iter()
            .filter(|t| t.status == TableStatus::Written)
            .count();
        println!(
            "✨ Generation complete: {} of {} tables written, {} warnings",
            written,
            report.tables.len(),
            report.warning_count()
        );
    }

    if report.has_failures() {
        Ok(4)
    } else {
        Ok(0)
    }
}
