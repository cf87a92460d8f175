//! Location command handlers
//!
//! `locate` acquires the device position, `search` resolves a place name,
//! `show` prints the stored record.

use crate::cli::build_resolver;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, OutputFormatter};
use crate::resolver::storage::{load_last_known, FileStore};
use crate::resolver::ResolvedLocation;
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Place to search for (e.g. "Kochi")
    pub query: String,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

/// Show command arguments
#[derive(Args)]
pub struct ShowArgs {
    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

pub(crate) fn formatter(name: Option<String>, config: &Config) -> Result<Box<dyn OutputFormatter>> {
    let name = name.unwrap_or_else(|| config.ranking.format.clone());
    get_formatter(&name).ok_or_else(|| {
        let known: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!("Unknown format: {} (available: {})", name, known.join(", ")))
    })
}

fn print_location(formatter: &dyn OutputFormatter, location: &ResolvedLocation) -> Result<()> {
    print!("{}", formatter.location(location)?);
    Ok(())
}

/// Run the locate command
pub async fn run_locate(args: LocateArgs) -> Result<()> {
    let config = Config::load()?;
    let formatter = formatter(args.format, &config)?;
    let resolver = build_resolver(&config)?;

    let location = resolver.request_device_location().await?;
    print_location(formatter.as_ref(), &location)
}

/// Run the search command
pub async fn run_search(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let formatter = formatter(args.format, &config)?;
    let resolver = build_resolver(&config)?;

    let location = resolver.request_manual_location(&args.query).await?;
    print_location(formatter.as_ref(), &location)
}

/// Run the show command
pub fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load()?;
    let formatter = formatter(args.format, &config)?;

    match load_last_known(&FileStore::new()?)? {
        Some(location) => print_location(formatter.as_ref(), &location),
        None => {
            eprintln!("No stored location. Run `shop-locator locate` or `shop-locator search <place>`.");
            Ok(())
        }
    }
}
