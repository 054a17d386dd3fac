//! evigraph CLI - evidence subgraphs from a knowledge graph
//!
//! For every record (a key plus the entities mentioned with it), evigraph
//! resolves the entities against a SPARQL knowledge graph, fetches their
//! one-hop neighborhoods, and keeps the approximate Steiner subgraph that
//! connects them, together with its largest connected piece.

use std::path::PathBuf;
use std::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod output;

use commands::doctor::DoctorArgs;
use commands::generate::GenerateArgs;
use commands::inspect::InspectArgs;
use commands::subgraph::SubgraphArgs;
use config::CliConfig;
use output::OutputFormat;

/// evigraph - Steiner evidence subgraphs over a SPARQL knowledge graph
#[derive(Parser)]
#[command(name = "evigraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  evigraph generate records.json              Run every record against the endpoint
  evigraph generate records.json --limit 10   Try the first ten records
  evigraph generate records.json --triples kg.json
                                              Run offline against a triple dump
  evigraph subgraph Q90 Q142 --compact        Connect two entities ad hoc
  evigraph inspect outputs/final_results.json Summarize an artifact
  evigraph doctor                             Check config, endpoint and output dirs")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Output format (table, json)
    #[arg(short = 'F', long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (default: ./.evigraphrc.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat an unreadable or invalid config file as an error
    #[arg(long, global = true)]
    strict: bool,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate subgraphs for every record in a JSON file
    Generate(GenerateArgs),

    /// Build the subgraph connecting a few entities and print it
    Subgraph(SubgraphArgs),

    /// Summarize a final or intermediate artifact
    Inspect(InspectArgs),

    /// Check config validity, endpoint reachability and output directories
    Doctor(DoctorArgs),

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn setup_logging(verbose: bool, quiet: bool, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path.display(), e))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_ref())?;

    let cwd = std::env::current_dir()?;
    let config = CliConfig::load(&cwd, cli.config.as_deref(), cli.strict)?;

    // --format wins over [output].format, which wins over table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    });

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Generate(args) => {
            commands::generate::run(args, config.engine, cli.quiet, format).await
        }
        Commands::Subgraph(args) => commands::subgraph::run(args, config.engine, format).await,
        Commands::Inspect(args) => commands::inspect::run(args, format),
        Commands::Doctor(args) => commands::doctor::run(args, config.engine, format).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "evigraph", &mut std::io::stdout());
            Ok(())
        }
    }
}
