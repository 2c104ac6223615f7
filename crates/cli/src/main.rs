//! Folio CLI
//!
//! Main entry point for the folio command-line tool.
//! Ingests documents into page-aware, chunked units ready for embedding.

mod commands;

use clap::{Parser, Subcommand};
use commands::{IngestCommand, InspectCommand};
use folio_core::{config::AppConfig, logging, AppResult, ConfigOverrides};
use std::path::PathBuf;
use tracing::Instrument;

/// Folio - page-aware document chunking for vector stores
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Page-aware document chunking for vector stores", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FOLIO_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.folio/config.yaml)
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

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
    /// Ingest a file or directory into the configured sink
    Ingest(IngestCommand),

    /// Show pages, labels and chunks of one document without storing
    Inspect(InspectCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from file and environment, then apply flags
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;
    let config = config.with_overrides(ConfigOverrides {
        workspace: cli.workspace,
        config_file: cli.config,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
        log_json: cli.log_json,
        ..Default::default()
    });

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("Folio CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Inspect(_) => "inspect",
    };
    let span = tracing::info_span!("command", name = command_name);

    let result = async {
        match cli.command {
            Commands::Ingest(cmd) => cmd.execute(config).await,
            Commands::Inspect(cmd) => cmd.execute(config).await,
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
