//! Scholar CLI
//!
//! Main entry point for the scholar command-line tool.
//! Searches a persisted passage index and prints reports for a chat layer.

mod commands;

use clap::{Parser, Subcommand};
use commands::{InfoCommand, InspectCommand, SearchCommand};
use scholar_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Scholar - metadata-aware passage retrieval
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(about = "Metadata-aware passage retrieval over a vector index", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "SCHOLAR_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the index directory
    #[arg(short, long, global = true, env = "SCHOLAR_INDEX_PATH")]
    index: Option<PathBuf>,

    /// Embedding provider (openai, mock)
    #[arg(short, long, global = true, env = "SCHOLAR_EMBEDDING_PROVIDER")]
    provider: Option<String>,

    /// Embedding model identifier
    #[arg(short = 'm', long, global = true, env = "SCHOLAR_EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the index and print matching passages
    Search(SearchCommand),

    /// Sample the index and list metadata fields and values
    Inspect(InspectCommand),

    /// Show index and embedding model details
    Info(InfoCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from file and environment
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.index,
        cli.provider,
        cli.embedding_model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("Scholar CLI starting");
    tracing::debug!("Index: {:?}", config.index_path);
    tracing::debug!("Provider: {}", config.embedding.provider);
    tracing::debug!("Model: {}", config.embedding.model);

    // Missing credentials stop here, before the index is touched
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        return Err(e);
    }

    let command_name = match &cli.command {
        Commands::Search(_) => "search",
        Commands::Inspect(_) => "inspect",
        Commands::Info(_) => "info",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Inspect(cmd) => cmd.execute(&config).await,
        Commands::Info(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
