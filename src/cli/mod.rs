//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod locate;
pub mod rank;

use crate::config::Config;
use crate::device::{get_locator, ip::IpLocator};
use crate::error::Result;
use crate::geo::{get_geocoder, nominatim::NominatimBackend};
use crate::resolver::storage::FileStore;
use crate::resolver::LocationResolver;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Resolve your location and rank nearby vendors
#[derive(Parser)]
#[command(name = "shop-locator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locate this device (network-based)
    Locate(locate::LocateArgs),

    /// Resolve a place by name
    Search(locate::SearchArgs),

    /// Show the last known location without any network call
    Show(locate::ShowArgs),

    /// Rank vendors from a JSON file by driving distance
    Rank(rank::RankArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Resolver wired to the configured services and the durable store
pub type CliResolver = LocationResolver<IpLocator, NominatimBackend, FileStore>;

pub(crate) fn build_resolver(config: &Config) -> Result<CliResolver> {
    Ok(LocationResolver::new(
        get_locator(config)?,
        get_geocoder(config)?,
        FileStore::new()?,
    ))
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Locate(args) => locate::run_locate(args).await,
        Commands::Search(args) => locate::run_search(args).await,
        Commands::Show(args) => locate::run_show(args),
        Commands::Rank(args) => rank::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}
