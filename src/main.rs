//! # Cronograma CLI (`cronograma`)
//!
//! Builds the study schedule from the spreadsheets in the data directory and
//! either serves it over HTTP or answers one-off queries from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! cronograma --config ./config/cronograma.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cronograma serve` | Build the schedule and start the HTTP API |
//! | `cronograma build` | Build and print a summary (or the JSON with `--json`) |
//! | `cronograma search "<term>"` | Search the schedule |
//! | `cronograma sources` | List the spreadsheets that would be read |
//!
//! ## Examples
//!
//! ```bash
//! # Zero-config: spreadsheets in the current directory, port 5000
//! cronograma serve
//!
//! # Same, on another port
//! PORT=8080 cronograma serve
//!
//! # What would be loaded, and from where
//! cronograma sources --config ./config/cronograma.toml
//!
//! # Search from the terminal
//! cronograma search "cardiologia" --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cronograma::{config, ingest, search, server, sources};

/// Cronograma: study schedule spreadsheets, folded into a week → day →
/// topic → subtopic → lesson tree and served as JSON.
#[derive(Parser)]
#[command(
    name = "cronograma",
    about = "Study schedule API built from spreadsheet exports",
    version,
    long_about = "Reads every CSV/XLSX schedule in the data directory, groups the rows \
    by week, day, topic, and subtopic, and exposes the result and a free-text search \
    over HTTP and from the command line."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cronograma.toml`. When the file does not exist
    /// the built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/cronograma.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes
    /// precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Build the schedule and serve it over HTTP.
    ///
    /// Binds to `[server].bind`; the `PORT` environment variable overrides
    /// the port.
    Serve,

    /// Build the schedule and print a summary.
    Build {
        /// Print the schedule JSON (as served by `/api/cronograma`) instead.
        #[arg(long)]
        json: bool,
    },

    /// Search the schedule.
    ///
    /// Case-insensitive substring match against week, day, and lesson
    /// paths.
    Search {
        /// The term to search for.
        term: String,

        /// Print the JSON body served by `/api/buscar` instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List the spreadsheets that would be read, in processing order.
    Sources,
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "cronograma=info,tower_http=info",
        1 => "cronograma=debug,tower_http=debug",
        _ => "cronograma=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout carries command output
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_or_minimal(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Build { json } => {
            ingest::run_build(&cfg, json)?;
        }
        Commands::Search { term, json } => {
            search::run_search(&cfg, &term, json)?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
    }

    Ok(())
}
