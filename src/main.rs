//! # TEA Techniques CLI (`tea`)
//!
//! Validates the technique catalog and builds the static JSON artifacts the
//! site reads.
//!
//! ## Usage
//!
//! ```bash
//! tea --config ./config/tea.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tea build` | Validate, index and write all JSON artifacts |
//! | `tea validate` | Report data errors and warnings without writing |
//! | `tea stats` | Summarize techniques, goals and tag usage |
//! | `tea search "<query>"` | Keyword search over techniques |
//! | `tea get <slug>` | Show one technique with grouped tags |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tea_techniques::progress::ProgressMode;
use tea_techniques::{build, config, get, search, stats, validate};

/// TEA Techniques CLI: build the static data for the techniques catalog.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/tea.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "tea",
    about = "Build and query the TEA techniques catalog",
    version,
    long_about = "Validates curated AI-assurance technique records, indexes them by tag, \
    assurance goal and goal dimension, and writes the JSON files behind the static techniques site."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tea.toml")]
    config: PathBuf,

    /// Verbose logging (repeat for more).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Build every JSON artifact into `[data].output_dir`.
    ///
    /// Files whose contents are unchanged are not rewritten, so repeated
    /// builds over the same input leave the output tree untouched.
    Build {
        /// Remove generated subdirectories before writing.
        #[arg(long)]
        clean: bool,

        /// Progress on stderr: `off`, `human`, or `json`.
        /// Defaults to `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Validate technique data and print every problem found.
    Validate {
        /// Treat warnings as errors.
        #[arg(long)]
        strict: bool,
    },

    /// Print catalog statistics.
    Stats,

    /// Keyword search over techniques.
    Search {
        /// The search query string.
        query: String,

        /// Only techniques listing this goal (name or slug).
        #[arg(long)]
        goal: Option<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one technique by slug.
    Get {
        /// Technique slug.
        slug: String,

        /// Only expand this goal's dimensions (name or slug).
        #[arg(long)]
        goal: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Build { clean, progress } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            build::run_build(&cfg, clean, mode).await?;
        }
        Commands::Validate { strict } => {
            validate::run_validate(&cfg, strict)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Search { query, goal, limit } => {
            search::run_search(&cfg, &query, goal.as_deref(), limit)?;
        }
        Commands::Get { slug, goal, json } => {
            get::run_get(&cfg, &slug, goal.as_deref(), json)?;
        }
    }

    Ok(())
}
