//! Rank command handler
//!
//! Ranks a vendor list by driving distance from the stored location.

use crate::cli::locate::formatter;
use crate::config::Config;
use crate::coord::Coordinate;
use crate::distance::DistanceMatrixService;
use crate::entity::Vendor;
use crate::error::{Error, Result};
use crate::rank::rank;
use crate::resolver::storage::{load_last_known, FileStore};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Rank command arguments
#[derive(Args)]
pub struct RankArgs {
    /// JSON file with an array of vendors (id, name, latitude, longitude)
    pub file: PathBuf,

    /// Origin latitude (defaults to the stored location)
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Origin longitude (defaults to the stored location)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Label for vendors without a distance
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

fn origin(args: &RankArgs) -> Result<Coordinate> {
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        return Coordinate::try_new(lat, lng);
    }

    load_last_known(&FileStore::new()?)?
        .map(|location| location.coordinate)
        .ok_or_else(|| {
            Error::Validation(
                "No location available. Run `shop-locator locate`, `shop-locator search <place>`, or pass --lat/--lng".to_string(),
            )
        })
}

fn read_vendors(path: &PathBuf) -> Result<Vec<Vendor>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run the rank command
pub async fn run(args: RankArgs) -> Result<()> {
    let config = Config::load()?;
    let formatter = formatter(args.format.clone(), &config)?;
    let origin = origin(&args)?;
    let vendors = read_vendors(&args.file)?;

    let service = DistanceMatrixService::from_config(&config)?;
    let distances = service.compute_distances(origin, &vendors).await?;
    info!(
        vendors = vendors.len(),
        resolved = distances.len(),
        "distances computed"
    );

    let placeholder = args.placeholder.unwrap_or(config.ranking.placeholder);
    let ranked = rank(&vendors, &distances, &placeholder);

    print!("{}", formatter.ranking(origin, &ranked)?);
    Ok(())
}
