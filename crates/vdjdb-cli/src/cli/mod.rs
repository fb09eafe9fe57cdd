mod columns;
mod config;
mod fetch;
mod find;
mod init;
mod run;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vdjdb::dataset::{TabularDataset, CONSTRUCT_COLUMNS};
use vdjdb::export::ExportService;
use vdjdb::services::{
    AcquireService, ConfigService, FilterSpecification, LoadOptions, ProjectConfig, QueryService,
};

/// Parse `column=value` filter arguments; repeating a column accepts either value
pub fn parse_filters(pairs: &[String]) -> Result<FilterSpecification> {
    let mut filter = FilterSpecification::new();
    for pair in pairs {
        let (column, value) = pair.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("Invalid filter format (expected column=value): {}", pair)
        })?;
        if column.is_empty() {
            return Err(anyhow::anyhow!("Filter has an empty column name: {}", pair));
        }
        filter.insert(column, value);
    }
    Ok(filter)
}

/// Narrow results to the TCR construct columns when requested
pub fn select_columns(results: TabularDataset, construct_only: bool) -> Result<TabularDataset> {
    if construct_only {
        Ok(results.project(CONSTRUCT_COLUMNS)?)
    } else {
        Ok(results)
    }
}

/// Configuration and services for the project in the working directory
pub struct Project {
    root: PathBuf,
    config_service: ConfigService,
    config: ProjectConfig,
}

impl Project {
    pub fn open() -> Result<Self> {
        let root = PathBuf::from(".");
        let config_service = ConfigService::new(&root);
        let config = config_service.load()?;
        Ok(Self {
            root,
            config_service,
            config,
        })
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        self.config_service.resolve_cache_path(&self.root)
    }

    pub fn acquirer(&self) -> Result<AcquireService> {
        AcquireService::from_config(&self.config.source, self.cache_path()?)
    }

    pub fn query_service(&self) -> Result<QueryService> {
        Ok(QueryService::new(
            self.acquirer()?,
            LoadOptions::from_config(&self.config),
        ))
    }

    pub fn export_service(&self) -> Result<ExportService> {
        Ok(ExportService::new(
            self.config_service.resolve_output_dir(&self.root)?,
        ))
    }
}

#[derive(Parser)]
#[command(name = "search-vdjdb")]
#[command(about = "Fetch, cache and query the latest VDJdb release", long_about = None)]
pub struct Cli {
    /// Enable verbose output (info logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default project configuration
    Init(init::InitArgs),

    /// Download the latest release, replacing the cached snapshot
    Fetch(fetch::FetchArgs),

    /// Filter the cached snapshot by column values
    Find(find::FindArgs),

    /// Run every named query in a query file
    Run(run::RunArgs),

    /// List snapshot columns and their inferred types
    Columns(columns::ColumnsArgs),

    /// Show the cached snapshot
    Status(status::StatusArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Fetch(args) => fetch::execute(args),
        Commands::Find(args) => find::execute(args),
        Commands::Run(args) => run::execute(args),
        Commands::Columns(args) => columns::execute(args),
        Commands::Status(args) => status::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
