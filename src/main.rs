//! Lingocast - turns a news podcast feed into a vocabulary-learning site
//!
//! This is the command-line entry point. All work happens in `lingocast_core`;
//! the handlers in `cli` wire configuration to it and report results.

mod cli;

use clap::{Parser, Subcommand};
use lingocast_core::{error::Result, AppConfig};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "lingocast")]
#[command(about = "Vocabulary-annotated news for language learners", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Config file (defaults to lingocast.toml in the working directory)
    #[arg(short, long, env = "LINGOCAST_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process new feed articles and render the site
    Run {
        /// Most articles to process (overrides max_articles)
        #[arg(long)]
        limit: Option<usize>,

        /// Reprocess articles that were already processed
        #[arg(long)]
        force: bool,

        /// Skip rendering the site afterwards
        #[arg(long)]
        no_render: bool,
    },

    /// Render the site from stored articles without fetching anything
    Render,

    /// Print highlighted HTML for a text file (stdin when omitted)
    Highlight {
        /// JSON file with a list of vocabulary terms
        #[arg(long)]
        terms: PathBuf,

        /// Text to highlight
        file: Option<PathBuf>,
    },

    /// Run repeatedly on a fixed interval until interrupted
    Watch {
        /// Minutes between runs
        #[arg(long, default_value = "60")]
        interval_minutes: u64,

        /// Most articles to process per run (overrides max_articles)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the effective configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use the requested level for our crates, WARN for noisy HTTP internals
    let filter = EnvFilter::new(format!(
        "lingocast={0},lingocast_core={0},reqwest=warn,hyper=warn",
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Lingocast v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            limit,
            force,
            no_render,
        } => cli::run::handle(&config, limit, force, no_render).await,
        Commands::Render => cli::render::handle(&config),
        Commands::Highlight { terms, file } => cli::highlight::handle(&terms, file.as_deref()),
        Commands::Watch {
            interval_minutes,
            limit,
        } => cli::watch::handle(&config, interval_minutes, limit).await,
        Commands::Config => cli::config::handle(&config),
    }
}
