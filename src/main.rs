//! Comic-Sync main entry point
//!
//! This is the command-line interface for the Comic-Sync catalog crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comic_sync::config::load_config_with_hash;
use comic_sync::output;
use comic_sync::storage::open_storage;
use comic_sync::{Coordinator, Operation, Outcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Comic-Sync: an incremental comic catalog crawler
///
/// Comic-Sync discovers items from a paginated catalog, stores their details
/// and chapter images, and later pulls only newly published chapters.
#[derive(Parser, Debug)]
#[command(name = "comic-sync")]
#[command(version)]
#[command(about = "An incremental comic catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl listing pages and store items not seen before
    Discover {
        /// First listing page
        #[arg(long, default_value_t = 1)]
        start: u32,

        /// Last listing page (inclusive)
        #[arg(long)]
        end: u32,
    },

    /// Fetch one item with all its chapters and print it
    FetchOne {
        /// Item detail page URL
        url: String,

        /// Insert the fetched item into the store
        #[arg(long)]
        save: bool,
    },

    /// Fetch a single chapter of an item and print it
    FetchChapter {
        /// Item detail page URL
        url: String,

        /// Chapter number
        number: u64,
    },

    /// Pull newly published chapters for every stored item
    Refresh,

    /// Show statistics from the store
    Stats,
}

impl From<Command> for Operation {
    fn from(command: Command) -> Self {
        match command {
            Command::Discover { start, end } => Operation::Discover { start, end },
            Command::FetchOne { url, save } => Operation::FetchOne { url, save },
            Command::FetchChapter { url, number } => Operation::FetchChapter { url, number },
            Command::Refresh => Operation::RefreshAll,
            Command::Stats => Operation::Stats,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let store = open_storage(&config.store)
        .with_context(|| format!("Failed to open store {}", config.store.path))?;
    tracing::debug!(
        "Store opened: {} (collection '{}')",
        config.store.path,
        config.store.collection
    );

    let mut coordinator = Coordinator::new(config, store).context("Failed to start crawler")?;

    let operation = Operation::from(cli.command);
    let name = operation.name();
    let result = coordinator.dispatch(operation).await;

    // Close the store whether or not the operation succeeded
    coordinator.shutdown().context("Failed to close store")?;

    let outcome = result.with_context(|| format!("{} failed", name))?;
    report(&outcome)?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("comic_sync=info,warn"),
            1 => EnvFilter::new("comic_sync=debug,info"),
            2 => EnvFilter::new("comic_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Prints an operation's result to stdout
fn report(outcome: &Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Discovery(report) => output::print_discovery(report),
        Outcome::Item { record, saved } => {
            output::print_item(record)?;
            if *saved {
                eprintln!("✓ Stored {}", record.item_path);
            }
        }
        Outcome::Chapter(chapter) => output::print_chapter(chapter)?,
        Outcome::Refresh(report) => output::print_refresh(report),
        Outcome::Stats(stats) => output::print_statistics(stats),
    }
    Ok(())
}
