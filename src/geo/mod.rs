//! Geocoding module
//!
//! Forward geocoding (free text to coordinates) and reverse geocoding
//! (coordinates to a city-level place label). Both directions are
//! best-effort: backends report failures as `None` and log the cause.

pub mod nominatim;

use crate::config::Config;
use crate::constants::geocoding::UNKNOWN_LOCATION;
use crate::coord::Coordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A forward geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardMatch {
    pub coordinate: Coordinate,
    /// Full display name (e.g. "Kochi, Ernakulam, Kerala, India")
    pub display_name: String,
}

impl ForwardMatch {
    /// Short place label: the first comma-delimited segment of the display
    /// name, or the query itself when that segment is empty
    pub fn short_label(&self, query: &str) -> String {
        let first = self.display_name.split(',').next().unwrap_or("").trim();
        if first.is_empty() {
            query.trim().to_string()
        } else {
            first.to_string()
        }
    }
}

/// Address block of a reverse geocoding response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressFields {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub county: Option<String>,
}

/// Pick a place label from an address block
///
/// Precedence: city, town, village, suburb, county. An address block with
/// none of these yields "Unknown Location"; no address block yields `None`.
pub fn select_place_label(address: Option<&AddressFields>) -> Option<String> {
    let address = address?;
    let label = [
        &address.city,
        &address.town,
        &address.village,
        &address.suburb,
        &address.county,
    ]
    .into_iter()
    .flatten()
    .map(|s| s.trim())
    .find(|s| !s.is_empty())
    .unwrap_or(UNKNOWN_LOCATION);

    Some(label.to_string())
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a free-text query to its best match
    ///
    /// Returns `None` when nothing matches or the service fails
    fn forward(&self, query: &str) -> impl Future<Output = Option<ForwardMatch>> + Send;

    /// Reverse geocode a coordinate to a place label
    ///
    /// Returns `None` on service failure or malformed payload; the caller
    /// still holds a valid coordinate
    fn reverse(&self, coordinate: Coordinate) -> impl Future<Output = Option<String>> + Send;
}

/// Build the configured geocoding backend
pub fn get_geocoder(config: &Config) -> Result<nominatim::NominatimBackend> {
    nominatim::NominatimBackend::with_base_url(
        &config.geocoding.base_url,
        &config.geocoding.user_agent,
        config.geocoding.zoom,
    )
}
